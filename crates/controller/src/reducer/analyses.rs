//! Analyses listing, the analysis detail view and its Pathoscope / NuVs
//! presentation state.

use serde::Serialize;
use serde_json::{json, Value};
use shared::{
    domain::{Analysis, AnalysisDetail, IndexSummary, PathoscopeHit},
    error::RequestFailure,
    protocol::PageInfo,
};
use tracing::warn;

use super::collection;
use crate::actions::{Action, FilterKey, SortKey};

/// What the detail view renders: formatted Pathoscope hits for ready
/// Pathoscope analyses, otherwise the raw document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnalysisData {
    Formatted(Vec<PathoscopeHit>),
    Raw(AnalysisDetail),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysesState {
    pub documents: Option<Vec<Analysis>>,
    pub page_info: Option<PageInfo>,
    pub term: String,
    pub sample_id: Option<String>,
    /// Id of the most recently requested detail.
    pub analysis_id: Option<String>,
    pub detail: Option<AnalysisDetail>,
    pub data: Option<AnalysisData>,
    pub ready_indexes: Option<Vec<IndexSummary>>,
    pub filter_isolates: bool,
    pub filter_otus: bool,
    pub show_reads: bool,
    pub sort_descending: bool,
    pub sort_key: SortKey,
    pub error: Option<RequestFailure>,
}

impl Default for AnalysesState {
    fn default() -> Self {
        Self {
            documents: None,
            page_info: None,
            term: String::new(),
            sample_id: None,
            analysis_id: None,
            detail: None,
            data: None,
            ready_indexes: None,
            filter_isolates: true,
            filter_otus: true,
            show_reads: false,
            sort_descending: true,
            sort_key: SortKey::Coverage,
            error: None,
        }
    }
}

pub fn reduce(state: AnalysesState, action: &Action) -> AnalysesState {
    match action {
        Action::WsInsertAnalysis { data } => {
            let out_of_scope = matches!(
                (state.sample_id.as_deref(), data.sample_id()),
                (Some(current), Some(sample_id)) if current != sample_id
            );
            let empty = state.documents.as_ref().map_or(true, Vec::is_empty);
            if out_of_scope && !empty {
                return state;
            }
            AnalysesState {
                documents: collection::insert(state.documents, data.clone()),
                ..state
            }
        }
        Action::WsUpdateAnalysis { data } => AnalysesState {
            documents: collection::update(state.documents, data.clone()),
            ..state
        },
        Action::WsRemoveAnalysis { data } => AnalysesState {
            documents: collection::remove(state.documents, data),
            ..state
        },
        Action::FindAnalysesRequested {
            sample_id, term, ..
        } => AnalysesState {
            term: term.clone(),
            sample_id: Some(sample_id.clone()),
            ..state
        },
        Action::FindAnalysesSucceeded { data } => AnalysesState {
            documents: Some(data.documents.clone()),
            page_info: Some(data.info),
            error: None,
            ..state
        },
        Action::GetAnalysisRequested { analysis_id } => AnalysesState {
            analysis_id: Some(analysis_id.clone()),
            detail: None,
            data: None,
            ..state
        },
        Action::GetAnalysisSucceeded { data } => {
            let display = if data.is_ready_pathoscope() {
                AnalysisData::Formatted(format_pathoscope(data))
            } else {
                AnalysisData::Raw(data.clone())
            };
            AnalysesState {
                detail: Some(data.clone()),
                data: Some(display),
                error: None,
                ..state
            }
        }
        Action::ClearAnalysis => AnalysesState {
            data: None,
            detail: None,
            ..state
        },
        Action::CollapseAnalysis => AnalysesState {
            data: collapse(state.data),
            ..state
        },
        Action::ToggleAnalysisExpanded { id } => AnalysesState {
            data: toggle_expanded(state.data, id),
            ..state
        },
        Action::SetPathoscopeFilter { key } => set_filter(state, *key),
        Action::ToggleShowPathoscopeReads => AnalysesState {
            show_reads: !state.show_reads,
            ..state
        },
        Action::ToggleSortPathoscopeDescending => AnalysesState {
            sort_descending: !state.sort_descending,
            ..state
        },
        Action::SetPathoscopeSortKey { key } => AnalysesState {
            sort_key: *key,
            ..state
        },
        Action::BlastNuvsRequested {
            analysis_id,
            sequence_index,
        } => set_nuvs_blast(state, analysis_id, *sequence_index, json!({ "ready": false })),
        Action::BlastNuvsSucceeded {
            analysis_id,
            sequence_index,
            data,
        } => set_nuvs_blast(state, analysis_id, *sequence_index, data.clone()),
        Action::BlastNuvsFailed {
            analysis_id,
            sequence_index,
            error,
        } => set_nuvs_blast(
            state,
            analysis_id,
            *sequence_index,
            json!({ "ready": false, "error": error.message }),
        ),
        Action::ListReadyIndexesSucceeded { data } => AnalysesState {
            ready_indexes: Some(data.clone()),
            ..state
        },
        Action::GetAnalysisFailed { analysis_id, error }
            if state.analysis_id.as_ref() == Some(analysis_id) =>
        {
            AnalysesState {
                error: Some(error.clone()),
                ..state
            }
        }
        Action::FindAnalysesFailed { error } | Action::ListReadyIndexesFailed { error } => {
            AnalysesState {
                error: Some(error.clone()),
                ..state
            }
        }
        _ => state,
    }
}

/// Sets `expanded = false` on every formatted hit.
pub fn collapse(data: Option<AnalysisData>) -> Option<AnalysisData> {
    match data {
        Some(AnalysisData::Formatted(hits)) => Some(AnalysisData::Formatted(
            hits.into_iter()
                .map(|hit| PathoscopeHit {
                    expanded: false,
                    ..hit
                })
                .collect(),
        )),
        other => other,
    }
}

/// Flips `expanded` on the hit with `id`; every other hit is left as is.
pub fn toggle_expanded(data: Option<AnalysisData>, id: &str) -> Option<AnalysisData> {
    match data {
        Some(AnalysisData::Formatted(hits)) => Some(AnalysisData::Formatted(
            hits.into_iter()
                .map(|hit| {
                    if hit.id == id {
                        PathoscopeHit {
                            expanded: !hit.expanded,
                            ..hit
                        }
                    } else {
                        hit
                    }
                })
                .collect(),
        )),
        other => other,
    }
}

/// A key flips only its own filter. Without a key both filters are set
/// together: on when both are currently off, otherwise off.
pub fn set_filter(state: AnalysesState, key: Option<FilterKey>) -> AnalysesState {
    match key {
        Some(FilterKey::Isolates) => AnalysesState {
            filter_isolates: !state.filter_isolates,
            ..state
        },
        Some(FilterKey::Otus) => AnalysesState {
            filter_otus: !state.filter_otus,
            ..state
        },
        None => {
            let value = !(state.filter_isolates || state.filter_otus);
            AnalysesState {
                filter_isolates: value,
                filter_otus: value,
                ..state
            }
        }
    }
}

/// Replaces `blast` on the NuVs result at `sequence_index` of the loaded
/// detail. Leaves state untouched unless `analysis_id` is the loaded detail.
pub fn set_nuvs_blast(
    mut state: AnalysesState,
    analysis_id: &str,
    sequence_index: u32,
    blast: Value,
) -> AnalysesState {
    if let Some(detail) = state
        .detail
        .as_mut()
        .filter(|detail| detail.id == analysis_id)
    {
        if let Some(result) = detail
            .results
            .iter_mut()
            .find(|result| result.index == sequence_index)
        {
            result.blast = Some(blast);
        }
    }
    state
}

pub fn format_pathoscope(detail: &AnalysisDetail) -> Vec<PathoscopeHit> {
    detail
        .diagnosis
        .iter()
        .filter_map(|entry| {
            match serde_json::from_value::<PathoscopeHit>(entry.clone()) {
                Ok(hit) => Some(PathoscopeHit {
                    expanded: false,
                    ..hit
                }),
                Err(err) => {
                    warn!(analysis_id = %detail.id, "skipping malformed diagnosis entry: {err}");
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/analyses_tests.rs"]
mod tests;
