use super::*;
use serde_json::json;
use shared::{domain::Algorithm, protocol::Page};

fn analysis(id: &str, sample_id: &str) -> Analysis {
    serde_json::from_value(json!({
        "id": id,
        "created_at": "2018-01-01T00:00:00Z",
        "sample": { "id": sample_id }
    }))
    .expect("analysis")
}

fn nuvs_detail(id: &str) -> AnalysisDetail {
    serde_json::from_value(json!({
        "id": id,
        "algorithm": "nuvs",
        "ready": true,
        "results": [{ "index": 3 }, { "index": 5 }]
    }))
    .expect("detail")
}

fn hit(id: &str, expanded: bool) -> PathoscopeHit {
    PathoscopeHit {
        id: id.to_string(),
        name: String::new(),
        abbreviation: String::new(),
        pi: 0.0,
        coverage: 0.0,
        depth: 0.0,
        isolates: Vec::new(),
        expanded,
    }
}

fn blast_of(state: &AnalysesState, index: u32) -> Option<Value> {
    state
        .detail
        .as_ref()
        .and_then(|detail| detail.results.iter().find(|result| result.index == index))
        .and_then(|result| result.blast.clone())
}

#[test]
fn default_state_has_both_filters_on_and_descending_coverage_sort() {
    let state = AnalysesState::default();
    assert!(state.filter_isolates);
    assert!(state.filter_otus);
    assert!(!state.show_reads);
    assert!(state.sort_descending);
    assert_eq!(state.sort_key, SortKey::Coverage);
    assert!(state.documents.is_none());
}

#[test]
fn unhandled_actions_return_state_unchanged() {
    let state = AnalysesState {
        term: "foo".into(),
        ..AnalysesState::default()
    };
    assert_eq!(reduce(state.clone(), &Action::ListUsersRequested), state);
}

#[test]
fn ws_insert_into_uninitialized_listing_yields_singleton() {
    let state = AnalysesState {
        sample_id: Some("foo".into()),
        ..AnalysesState::default()
    };
    let data = analysis("a1", "foo");
    let next = reduce(state, &Action::WsInsertAnalysis { data: data.clone() });
    assert_eq!(next.documents, Some(vec![data]));
}

#[test]
fn ws_insert_skips_analyses_of_another_sample() {
    let state = AnalysesState {
        sample_id: Some("foo".into()),
        documents: Some(vec![analysis("a1", "foo")]),
        ..AnalysesState::default()
    };
    let next = reduce(
        state.clone(),
        &Action::WsInsertAnalysis {
            data: analysis("a2", "bar"),
        },
    );
    assert_eq!(next, state);

    let next = reduce(
        state,
        &Action::WsInsertAnalysis {
            data: analysis("a2", "foo"),
        },
    );
    let ids: Vec<_> = next
        .documents
        .unwrap_or_default()
        .into_iter()
        .map(|doc| doc.id)
        .collect();
    assert_eq!(ids, vec!["a1", "a2"]);
}

#[test]
fn ws_update_replaces_the_whole_record() {
    let mut original = analysis("123abc", "baz");
    original.extra.insert("foo".into(), json!("test"));
    let state = AnalysesState {
        sample_id: Some("baz".into()),
        documents: Some(vec![original]),
        ..AnalysesState::default()
    };
    let mut updated = analysis("123abc", "baz");
    updated.extra.insert("foo".into(), json!("bar"));

    let next = reduce(
        state,
        &Action::WsUpdateAnalysis {
            data: updated.clone(),
        },
    );
    assert_eq!(next.documents, Some(vec![updated]));
}

#[test]
fn ws_remove_drops_listed_ids() {
    let state = AnalysesState {
        documents: Some(vec![analysis("foo", "s"), analysis("bar", "s")]),
        ..AnalysesState::default()
    };
    let next = reduce(
        state,
        &Action::WsRemoveAnalysis {
            data: vec!["foo".into()],
        },
    );
    assert_eq!(next.documents, Some(vec![analysis("bar", "s")]));
}

#[test]
fn find_requested_records_term_and_sample() {
    let next = reduce(
        AnalysesState::default(),
        &Action::FindAnalysesRequested {
            sample_id: "s1".into(),
            term: "foo".into(),
            page: None,
        },
    );
    assert_eq!(next.term, "foo");
    assert_eq!(next.sample_id.as_deref(), Some("s1"));
}

#[test]
fn find_succeeded_replaces_documents_and_paging() {
    let page = Page {
        documents: Vec::new(),
        info: PageInfo {
            page: 1,
            page_count: 1,
            ..PageInfo::default()
        },
    };
    let next = reduce(
        AnalysesState::default(),
        &Action::FindAnalysesSucceeded { data: page.clone() },
    );
    assert_eq!(next.documents, Some(Vec::new()));
    assert_eq!(next.page_info, Some(page.info));
}

#[test]
fn get_requested_clears_detail_and_data() {
    let detail = nuvs_detail("a1");
    let state = AnalysesState {
        detail: Some(detail.clone()),
        data: Some(AnalysisData::Raw(detail)),
        ..AnalysesState::default()
    };
    let next = reduce(
        state,
        &Action::GetAnalysisRequested {
            analysis_id: "a2".into(),
        },
    );
    assert!(next.detail.is_none());
    assert!(next.data.is_none());
}

#[test]
fn get_succeeded_for_nuvs_mirrors_raw_payload() {
    let detail = nuvs_detail("a1");
    let next = reduce(
        AnalysesState::default(),
        &Action::GetAnalysisSucceeded {
            data: detail.clone(),
        },
    );
    assert_eq!(next.detail, Some(detail.clone()));
    assert_eq!(next.data, Some(AnalysisData::Raw(detail)));
}

#[test]
fn get_succeeded_formats_ready_pathoscope_analyses() {
    let detail: AnalysisDetail = serde_json::from_value(json!({
        "id": "p1",
        "algorithm": "pathoscope_bowtie",
        "ready": true,
        "diagnosis": [
            { "id": "otu1", "name": "Tobacco mosaic virus", "abbreviation": "TMV", "pi": 0.5, "coverage": 0.9, "depth": 12.0, "isolates": [] },
            "not a hit"
        ]
    }))
    .expect("detail");
    assert_eq!(detail.algorithm, Some(Algorithm::PathoscopeBowtie));

    let next = reduce(
        AnalysesState::default(),
        &Action::GetAnalysisSucceeded {
            data: detail.clone(),
        },
    );
    assert_eq!(next.detail, Some(detail));
    match next.data {
        Some(AnalysisData::Formatted(hits)) => {
            assert_eq!(hits.len(), 1);
            assert_eq!(hits[0].id, "otu1");
            assert_eq!(hits[0].abbreviation, "TMV");
            assert!(!hits[0].expanded);
        }
        other => panic!("expected formatted hits, got {other:?}"),
    }
}

#[test]
fn get_succeeded_keeps_unready_pathoscope_raw() {
    let detail: AnalysisDetail = serde_json::from_value(json!({
        "id": "p1",
        "algorithm": "pathoscope_bowtie",
        "ready": false
    }))
    .expect("detail");
    let next = reduce(
        AnalysesState::default(),
        &Action::GetAnalysisSucceeded {
            data: detail.clone(),
        },
    );
    assert_eq!(next.data, Some(AnalysisData::Raw(detail)));
}

#[test]
fn clear_analysis_drops_detail_and_data() {
    let detail = nuvs_detail("a1");
    let state = AnalysesState {
        detail: Some(detail.clone()),
        data: Some(AnalysisData::Raw(detail)),
        ..AnalysesState::default()
    };
    let next = reduce(state, &Action::ClearAnalysis);
    assert!(next.detail.is_none());
    assert!(next.data.is_none());
}

#[test]
fn collapse_sets_every_hit_collapsed() {
    let data = Some(AnalysisData::Formatted(vec![
        hit("test1", true),
        hit("test2", false),
        hit("test3", true),
    ]));
    assert_eq!(
        collapse(data),
        Some(AnalysisData::Formatted(vec![
            hit("test1", false),
            hit("test2", false),
            hit("test3", false),
        ]))
    );
}

#[test]
fn collapse_of_empty_hits_is_unchanged() {
    let state = AnalysesState {
        data: Some(AnalysisData::Formatted(Vec::new())),
        ..AnalysesState::default()
    };
    assert_eq!(reduce(state.clone(), &Action::CollapseAnalysis), state);
}

#[test]
fn toggle_expanded_flips_only_the_matching_hit() {
    let data = Some(AnalysisData::Formatted(vec![
        hit("test1", true),
        hit("test2", false),
        hit("test3", true),
    ]));
    assert_eq!(
        toggle_expanded(data, "test1"),
        Some(AnalysisData::Formatted(vec![
            hit("test1", false),
            hit("test2", false),
            hit("test3", true),
        ]))
    );
}

#[test]
fn filter_key_flips_only_its_own_filter() {
    let state = AnalysesState {
        filter_isolates: false,
        filter_otus: false,
        ..AnalysesState::default()
    };

    let next = set_filter(state.clone(), Some(FilterKey::Isolates));
    assert!(next.filter_isolates);
    assert!(!next.filter_otus);

    let next = set_filter(state, Some(FilterKey::Otus));
    assert!(!next.filter_isolates);
    assert!(next.filter_otus);
}

#[test]
fn filter_without_key_turns_both_on_when_both_are_off() {
    let state = AnalysesState {
        filter_isolates: false,
        filter_otus: false,
        ..AnalysesState::default()
    };
    let next = reduce(state, &Action::SetPathoscopeFilter { key: None });
    assert!(next.filter_isolates);
    assert!(next.filter_otus);
}

#[test]
fn filter_without_key_turns_both_off_when_either_is_on() {
    for (isolates, otus) in [(true, false), (false, true), (true, true)] {
        let state = AnalysesState {
            filter_isolates: isolates,
            filter_otus: otus,
            ..AnalysesState::default()
        };
        let next = set_filter(state, None);
        assert!(!next.filter_isolates);
        assert!(!next.filter_otus);
    }
}

#[test]
fn display_toggles_and_sort_key() {
    let state = AnalysesState::default();
    let next = reduce(state.clone(), &Action::ToggleShowPathoscopeReads);
    assert!(next.show_reads);
    let next = reduce(next, &Action::ToggleSortPathoscopeDescending);
    assert!(!next.sort_descending);
    let next = reduce(next, &Action::SetPathoscopeSortKey { key: SortKey::Pi });
    assert_eq!(next.sort_key, SortKey::Pi);
}

#[test]
fn list_ready_indexes_stores_the_listing() {
    let next = reduce(
        AnalysesState::default(),
        &Action::ListReadyIndexesSucceeded { data: Vec::new() },
    );
    assert_eq!(next.ready_indexes, Some(Vec::new()));
}

#[test]
fn blast_requested_marks_the_sequence_pending() {
    let state = AnalysesState {
        detail: Some(nuvs_detail("testid")),
        ..AnalysesState::default()
    };
    let next = reduce(
        state,
        &Action::BlastNuvsRequested {
            analysis_id: "testid".into(),
            sequence_index: 3,
        },
    );
    assert_eq!(blast_of(&next, 3), Some(json!({ "ready": false })));
    assert_eq!(blast_of(&next, 5), None);
}

#[test]
fn blast_succeeded_attaches_result_to_the_sequence() {
    let state = AnalysesState {
        detail: Some(nuvs_detail("testid")),
        ..AnalysesState::default()
    };
    let next = reduce(
        state,
        &Action::BlastNuvsSucceeded {
            analysis_id: "testid".into(),
            sequence_index: 3,
            data: json!({ "rid": "R1", "ready": true }),
        },
    );
    assert_eq!(blast_of(&next, 3), Some(json!({ "rid": "R1", "ready": true })));
    assert_eq!(blast_of(&next, 5), None);
}

#[test]
fn blast_failed_records_the_error_on_the_sequence() {
    let state = AnalysesState {
        detail: Some(nuvs_detail("testid")),
        ..AnalysesState::default()
    };
    let next = reduce(
        state,
        &Action::BlastNuvsFailed {
            analysis_id: "testid".into(),
            sequence_index: 5,
            error: RequestFailure::new(Some(502), "BLAST unavailable"),
        },
    );
    assert_eq!(
        blast_of(&next, 5),
        Some(json!({ "ready": false, "error": "BLAST unavailable" }))
    );
}

#[test]
fn blast_for_another_analysis_leaves_state_untouched() {
    let state = AnalysesState {
        detail: Some(nuvs_detail("foo")),
        ..AnalysesState::default()
    };
    let next = set_nuvs_blast(state.clone(), "bar", 3, json!({ "payload": "data" }));
    assert_eq!(next, state);

    let empty = AnalysesState::default();
    assert_eq!(set_nuvs_blast(empty.clone(), "foo", 3, json!({})), empty);
}

#[test]
fn failures_are_recorded() {
    let error = RequestFailure::new(Some(404), "Not found");
    let requested = reduce(
        AnalysesState::default(),
        &Action::GetAnalysisRequested {
            analysis_id: "a1".into(),
        },
    );
    assert_eq!(requested.analysis_id.as_deref(), Some("a1"));

    let next = reduce(
        requested,
        &Action::GetAnalysisFailed {
            analysis_id: "a1".into(),
            error: error.clone(),
        },
    );
    assert_eq!(next.error, Some(error));
}

#[test]
fn failure_for_another_analysis_leaves_state_untouched() {
    let state = AnalysesState {
        analysis_id: Some("a2".into()),
        ..AnalysesState::default()
    };
    let next = reduce(
        state.clone(),
        &Action::GetAnalysisFailed {
            analysis_id: "a1".into(),
            error: RequestFailure::new(Some(404), "Not found"),
        },
    );
    assert_eq!(next, state);

    let next = reduce(
        AnalysesState::default(),
        &Action::GetAnalysisFailed {
            analysis_id: "a1".into(),
            error: RequestFailure::new(Some(404), "Not found"),
        },
    );
    assert_eq!(next, AnalysesState::default());
}
