use super::*;
use crate::{
    store::{Store, StoreHandle},
    test_support::{settle, FakeApi},
};
use serde_json::json;
use tokio::sync::broadcast;

fn start(api: Arc<FakeApi>) -> (StoreHandle, broadcast::Receiver<Action>) {
    let (store, _task) = Store::spawn(WorkflowExecutor::with_default_workflows(api));
    let actions = store.subscribe_actions();
    (store, actions)
}

fn drain(actions: &mut broadcast::Receiver<Action>) -> Vec<Action> {
    let mut seen = Vec::new();
    while let Ok(action) = actions.try_recv() {
        seen.push(action);
    }
    seen
}

fn kinds(actions: &[Action]) -> Vec<&'static str> {
    actions.iter().map(Action::kind).collect()
}

fn user_ids(store: &StoreHandle) -> Vec<String> {
    store
        .snapshot()
        .users
        .documents
        .clone()
        .unwrap_or_default()
        .into_iter()
        .map(|user| user.id)
        .collect()
}

#[test]
fn default_workflows_use_the_documented_policies() {
    let executor = WorkflowExecutor::with_default_workflows(FakeApi::new());
    let policies = executor.policies();
    let policy_of = |name: &str| {
        policies
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, policy)| *policy)
    };

    assert_eq!(policy_of("list_users"), Some(Policy::Latest));
    assert_eq!(
        policy_of("create_user"),
        Some(Policy::Throttle(Duration::from_millis(200)))
    );
    assert_eq!(
        policy_of("find_hmms_on_location"),
        Some(Policy::Throttle(Duration::from_millis(300)))
    );
    assert_eq!(
        policy_of("install_hmms"),
        Some(Policy::Throttle(Duration::from_millis(500)))
    );
    assert_eq!(policy_of("add_user_to_group"), Some(Policy::Every));
    assert_eq!(policy_of("blast_nuvs"), Some(Policy::Every));
    assert_eq!(policy_of("remove_file"), Some(Policy::Every));
    assert!(!executor.is_empty());
}

#[tokio::test(start_paused = true)]
async fn latest_only_discards_results_of_superseded_runs() {
    let api = FakeApi::new();
    let first = api.gate("list_users");
    let second = api.gate("list_users");
    let (store, mut actions) = start(api.clone());

    store.dispatch(Action::ListUsersRequested).expect("dispatch");
    settle().await;
    store.dispatch(Action::ListUsersRequested).expect("dispatch");
    settle().await;
    assert_eq!(api.calls_to("list_users"), 2);

    second
        .send(json!([{ "id": "second" }]))
        .expect("release second");
    settle().await;
    first.send(json!([{ "id": "first" }])).expect("release first");
    settle().await;

    assert_eq!(user_ids(&store), vec!["second"]);
    let seen = drain(&mut actions);
    let succeeded = kinds(&seen)
        .into_iter()
        .filter(|kind| *kind == "LIST_USERS_SUCCEEDED")
        .count();
    assert_eq!(succeeded, 1);
    assert!(!store.snapshot().app.pending);
}

#[tokio::test(start_paused = true)]
async fn superseded_result_queued_behind_a_newer_request_is_dropped() {
    let api = FakeApi::new();
    let first = api.gate("get_analysis");
    let second = api.gate("get_analysis");
    let (store, mut actions) = start(api.clone());
    let detail_id = |store: &StoreHandle| {
        store
            .snapshot()
            .analyses
            .detail
            .as_ref()
            .map(|detail| detail.id.clone())
    };

    store
        .dispatch(Action::GetAnalysisRequested {
            analysis_id: "a".into(),
        })
        .expect("dispatch");
    settle().await;

    // The first result is released before the store has seen the second
    // request, so it reaches the queue right behind it.
    first
        .send(json!({ "id": "a", "algorithm": "nuvs", "ready": true, "results": [] }))
        .expect("release first");
    store
        .dispatch(Action::GetAnalysisRequested {
            analysis_id: "b".into(),
        })
        .expect("dispatch");
    settle().await;

    assert_eq!(api.calls(), vec!["get_analysis a", "get_analysis b"]);
    assert_eq!(detail_id(&store), None);

    second.send(json!("not an analysis")).expect("release second");
    settle().await;

    let snapshot = store.snapshot();
    assert_eq!(detail_id(&store), None);
    assert_eq!(snapshot.analyses.analysis_id.as_deref(), Some("b"));
    assert!(snapshot.analyses.error.is_some());
    assert!(!kinds(&drain(&mut actions)).contains(&"GET_ANALYSIS_SUCCEEDED"));
}

#[tokio::test(start_paused = true)]
async fn pending_flag_brackets_list_users() {
    let api = FakeApi::new();
    let gate = api.gate("list_users");
    let (store, _actions) = start(api);

    store.dispatch(Action::ListUsersRequested).expect("dispatch");
    settle().await;
    assert!(store.snapshot().app.pending);

    gate.send(json!([])).expect("release");
    settle().await;
    assert!(!store.snapshot().app.pending);
}

#[tokio::test(start_paused = true)]
async fn throttle_ignores_triggers_inside_the_window() {
    let api = FakeApi::new();
    api.respond("create_user", json!({ "id": "alice" }));
    let (store, _actions) = start(api.clone());
    let create = || Action::CreateUserRequested {
        user_id: "alice".into(),
        password: "hunter22".into(),
        force_reset: false,
    };

    store.dispatch(create()).expect("dispatch");
    store.dispatch(create()).expect("dispatch");
    settle().await;
    assert_eq!(api.calls_to("create_user"), 1);

    tokio::time::sleep(Duration::from_millis(250)).await;
    store.dispatch(create()).expect("dispatch");
    settle().await;
    assert_eq!(api.calls_to("create_user"), 2);
}

#[tokio::test(start_paused = true)]
async fn create_user_navigates_to_the_new_user() {
    let api = FakeApi::new();
    api.respond("create_user", json!({ "id": "alice", "force_reset": true }));
    let (store, mut actions) = start(api.clone());

    store
        .dispatch(Action::CreateUserRequested {
            user_id: "alice".into(),
            password: "hunter22".into(),
            force_reset: true,
        })
        .expect("dispatch");
    settle().await;

    assert_eq!(api.calls(), vec!["create_user alice true"]);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.router.location.pathname, "/settings/users/alice");
    assert_eq!(
        snapshot.router.location.state,
        Some(json!({ "createUser": false }))
    );
    assert_eq!(
        snapshot.users.detail.as_ref().map(|user| user.id.as_str()),
        Some("alice")
    );

    let seen = drain(&mut actions);
    assert_eq!(
        kinds(&seen),
        vec![
            "CREATE_USER_REQUESTED",
            "SET_APP_PENDING",
            "CREATE_USER_SUCCEEDED",
            "PUSH",
            "UNSET_APP_PENDING",
            "@@router/LOCATION_CHANGE",
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn every_occurrence_runs_each_trigger() {
    let api = FakeApi::new();
    let first = api.gate("add_user_to_group");
    let second = api.gate("add_user_to_group");
    let (store, mut actions) = start(api.clone());

    for group_id in ["technicians", "administrators"] {
        store
            .dispatch(Action::AddUserToGroupRequested {
                user_id: "bob".into(),
                group_id: group_id.into(),
            })
            .expect("dispatch");
    }
    settle().await;
    assert_eq!(
        api.calls(),
        vec![
            "add_user_to_group bob technicians",
            "add_user_to_group bob administrators",
        ]
    );

    second
        .send(json!({ "id": "bob", "groups": ["administrators"] }))
        .expect("release");
    first
        .send(json!({ "id": "bob", "groups": ["technicians"] }))
        .expect("release");
    settle().await;

    let succeeded = kinds(&drain(&mut actions))
        .into_iter()
        .filter(|kind| *kind == "ADD_USER_TO_GROUP_SUCCEEDED")
        .count();
    assert_eq!(succeeded, 2);
}

#[tokio::test(start_paused = true)]
async fn mismatched_passwords_fail_without_calling_the_api() {
    let api = FakeApi::new();
    let (store, _actions) = start(api.clone());

    store
        .dispatch(Action::SetPasswordRequested {
            user_id: "bob".into(),
            password: "hunter22".into(),
            confirm: "hunter23".into(),
        })
        .expect("dispatch");
    settle().await;

    assert!(api.calls().is_empty());
    assert_eq!(
        store.snapshot().users.password_error.as_deref(),
        Some("Passwords don't match")
    );
}

#[tokio::test(start_paused = true)]
async fn api_errors_become_failed_actions_with_status() {
    let api = FakeApi::new();
    api.fail("get_analysis", 404, "Not found");
    let (store, mut actions) = start(api);

    store
        .dispatch(Action::GetAnalysisRequested {
            analysis_id: "a1".into(),
        })
        .expect("dispatch");
    settle().await;

    let failure = RequestFailure::new(Some(404), "Not found");
    assert_eq!(store.snapshot().analyses.error, Some(failure.clone()));
    assert!(drain(&mut actions).contains(&Action::GetAnalysisFailed {
        analysis_id: "a1".into(),
        error: failure,
    }));
}

#[tokio::test(start_paused = true)]
async fn blast_results_are_correlated_to_their_sequence() {
    let api = FakeApi::new();
    api.respond("blast_nuvs", json!({ "rid": "R1", "ready": true }));
    let (store, mut actions) = start(api.clone());

    store
        .dispatch(Action::BlastNuvsRequested {
            analysis_id: "a1".into(),
            sequence_index: 4,
        })
        .expect("dispatch");
    settle().await;

    assert_eq!(api.calls(), vec!["blast_nuvs a1 4"]);
    assert!(drain(&mut actions).contains(&Action::BlastNuvsSucceeded {
        analysis_id: "a1".into(),
        sequence_index: 4,
        data: json!({ "rid": "R1", "ready": true }),
    }));
}

#[tokio::test(start_paused = true)]
async fn visiting_the_hmm_page_finds_hmms_from_the_query_string() {
    let api = FakeApi::new();
    api.respond(
        "find_hmms",
        json!({ "documents": [{ "id": "h1", "cluster": 3 }], "page": 2, "page_count": 2 }),
    );
    let (store, _actions) = start(api.clone());

    store
        .dispatch(Action::Push {
            path: "/refs".into(),
            state: None,
        })
        .expect("dispatch");
    settle().await;
    assert!(api.calls().is_empty());

    tokio::time::sleep(Duration::from_millis(400)).await;
    store
        .dispatch(Action::Push {
            path: "/hmm?find=rdrp&page=2".into(),
            state: None,
        })
        .expect("dispatch");
    settle().await;

    assert_eq!(api.calls(), vec!["find_hmms find=rdrp page=2"]);
    let snapshot = store.snapshot();
    assert_eq!(snapshot.router.location.search, "?find=rdrp&page=2");
    assert_eq!(snapshot.hmm.page_info.map(|info| info.page), Some(2));
    assert_eq!(
        snapshot.hmm.documents.as_ref().map(Vec::len),
        Some(1)
    );
}

#[tokio::test(start_paused = true)]
async fn update_setting_sends_a_single_key_document() {
    let api = FakeApi::new();
    api.respond("update_settings", json!({ "nuvs_proc": 4, "proc": 8 }));
    let (store, _actions) = start(api.clone());

    store
        .dispatch(Action::UpdateSettingRequested {
            key: "nuvs_proc".into(),
            value: json!(4),
        })
        .expect("dispatch");
    settle().await;

    assert_eq!(api.calls(), vec![r#"update_settings {"nuvs_proc":4}"#]);
    let snapshot = store.snapshot();
    let data = snapshot.settings.data.as_ref().expect("settings");
    assert_eq!(data.get_u64("proc"), Some(8));
}

#[tokio::test(start_paused = true)]
async fn removed_files_leave_the_listing() {
    let api = FakeApi::new();
    api.respond(
        "find_files",
        json!({ "documents": [{ "id": "f1", "type": "reads" }, { "id": "f2", "type": "reads" }] }),
    );
    api.respond("remove_file", json!(null));
    let (store, _actions) = start(api.clone());

    store
        .dispatch(Action::FindFilesRequested {
            file_type: "reads".into(),
            term: String::new(),
            page: None,
        })
        .expect("dispatch");
    settle().await;
    store
        .dispatch(Action::RemoveFileRequested {
            file_id: "f1".into(),
        })
        .expect("dispatch");
    settle().await;

    assert_eq!(api.calls(), vec!["find_files reads find= page=", "remove_file f1"]);
    let ids: Vec<_> = store
        .snapshot()
        .files
        .documents
        .clone()
        .unwrap_or_default()
        .into_iter()
        .map(|file| file.id)
        .collect();
    assert_eq!(ids, vec!["f2"]);
}

#[test]
fn query_from_search_reads_find_and_page() {
    let query = hmm::query_from_search("?find=rna%20polymerase&page=3");
    assert_eq!(query.term.as_deref(), Some("rna polymerase"));
    assert_eq!(query.page, Some(3));

    let query = hmm::query_from_search("");
    assert_eq!(query.term, None);
    assert_eq!(query.page, None);

    assert_eq!(hmm::query_from_search("?page=two").page, None);
}
