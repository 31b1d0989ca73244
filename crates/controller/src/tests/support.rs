//! In-memory `ApiClient` for store and workflow tests.

use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use client_core::{ApiClient, ClientError, ClientResult};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use shared::{
    domain::{
        Analysis, AnalysisDetail, HmmAnnotation, HmmStatus, IndexSummary, Reference, Release,
        SettingsDocument, Subtraction, UploadedFile, User,
    },
    error::{ApiError, ErrorCode},
    protocol::{FindQuery, Page},
};
use tokio::sync::oneshot;

type Canned = Result<Value, (u16, String)>;

/// Records every call as `"operation arg1 arg2"` and answers from canned
/// responses. Operations with queued gates block until the gate is released
/// and answer with the value sent through it.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<String>>,
    responses: Mutex<HashMap<&'static str, Canned>>,
    gates: Mutex<HashMap<&'static str, VecDeque<oneshot::Receiver<Value>>>>,
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, operation: &'static str, value: Value) {
        self.responses
            .lock()
            .expect("responses")
            .insert(operation, Ok(value));
    }

    pub fn fail(&self, operation: &'static str, status: u16, message: &str) {
        self.responses
            .lock()
            .expect("responses")
            .insert(operation, Err((status, message.to_string())));
    }

    /// The next call of `operation` waits for the returned sender.
    pub fn gate(&self, operation: &'static str) -> oneshot::Sender<Value> {
        let (tx, rx) = oneshot::channel();
        self.gates
            .lock()
            .expect("gates")
            .entry(operation)
            .or_default()
            .push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls").clone()
    }

    pub fn calls_to(&self, operation: &str) -> usize {
        self.calls()
            .iter()
            .filter(|call| call.split(' ').next() == Some(operation))
            .count()
    }

    async fn call<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        args: &[&str],
    ) -> ClientResult<T> {
        let mut call = operation.to_string();
        for arg in args {
            call.push(' ');
            call.push_str(arg);
        }
        self.calls.lock().expect("calls").push(call);

        let gate = self
            .gates
            .lock()
            .expect("gates")
            .get_mut(operation)
            .and_then(VecDeque::pop_front);
        if let Some(gate) = gate {
            let value = gate.await.unwrap_or(Value::Null);
            return Ok(serde_json::from_value(value)?);
        }

        let canned = self.responses.lock().expect("responses").get(operation).cloned();
        match canned {
            Some(Ok(value)) => Ok(serde_json::from_value(value)?),
            Some(Err((status, message))) => Err(ClientError::Http {
                status,
                error: ApiError::new(ErrorCode::Unknown, message),
            }),
            None => Ok(serde_json::from_value(json!({}))?),
        }
    }
}

fn query_args(query: &FindQuery) -> String {
    format!(
        "find={} page={}",
        query.term.as_deref().unwrap_or_default(),
        query.page.map(|page| page.to_string()).unwrap_or_default()
    )
}

#[async_trait]
impl ApiClient for FakeApi {
    async fn list_users(&self) -> ClientResult<Vec<User>> {
        self.call("list_users", &[]).await
    }

    async fn create_user(
        &self,
        user_id: &str,
        _password: &str,
        force_reset: bool,
    ) -> ClientResult<User> {
        self.call("create_user", &[user_id, &force_reset.to_string()])
            .await
    }

    async fn set_password(&self, user_id: &str, _password: &str) -> ClientResult<User> {
        self.call("set_password", &[user_id]).await
    }

    async fn set_force_reset(&self, user_id: &str, enabled: bool) -> ClientResult<User> {
        self.call("set_force_reset", &[user_id, &enabled.to_string()])
            .await
    }

    async fn set_primary_group(&self, user_id: &str, group_id: &str) -> ClientResult<User> {
        self.call("set_primary_group", &[user_id, group_id]).await
    }

    async fn add_user_to_group(&self, user_id: &str, group_id: &str) -> ClientResult<User> {
        self.call("add_user_to_group", &[user_id, group_id]).await
    }

    async fn remove_user_from_group(&self, user_id: &str, group_id: &str) -> ClientResult<User> {
        self.call("remove_user_from_group", &[user_id, group_id])
            .await
    }

    async fn find_hmms(&self, query: &FindQuery) -> ClientResult<Page<HmmAnnotation>> {
        self.call("find_hmms", &[&query_args(query)]).await
    }

    async fn get_hmm(&self, hmm_id: &str) -> ClientResult<HmmAnnotation> {
        self.call("get_hmm", &[hmm_id]).await
    }

    async fn install_hmms(&self) -> ClientResult<HmmStatus> {
        self.call("install_hmms", &[]).await
    }

    async fn find_analyses(
        &self,
        sample_id: &str,
        query: &FindQuery,
    ) -> ClientResult<Page<Analysis>> {
        self.call("find_analyses", &[sample_id, &query_args(query)])
            .await
    }

    async fn get_analysis(&self, analysis_id: &str) -> ClientResult<AnalysisDetail> {
        self.call("get_analysis", &[analysis_id]).await
    }

    async fn blast_nuvs(&self, analysis_id: &str, sequence_index: u32) -> ClientResult<Value> {
        self.call("blast_nuvs", &[analysis_id, &sequence_index.to_string()])
            .await
    }

    async fn list_ready_indexes(&self) -> ClientResult<Vec<IndexSummary>> {
        self.call("list_ready_indexes", &[]).await
    }

    async fn find_references(&self, query: &FindQuery) -> ClientResult<Page<Reference>> {
        self.call("find_references", &[&query_args(query)]).await
    }

    async fn get_reference(&self, ref_id: &str) -> ClientResult<Reference> {
        self.call("get_reference", &[ref_id]).await
    }

    async fn check_remote_updates(&self, ref_id: &str) -> ClientResult<Release> {
        self.call("check_remote_updates", &[ref_id]).await
    }

    async fn update_remote_reference(&self, ref_id: &str) -> ClientResult<Reference> {
        self.call("update_remote_reference", &[ref_id]).await
    }

    async fn find_subtractions(&self, query: &FindQuery) -> ClientResult<Page<Subtraction>> {
        self.call("find_subtractions", &[&query_args(query)]).await
    }

    async fn get_subtraction(&self, subtraction_id: &str) -> ClientResult<Subtraction> {
        self.call("get_subtraction", &[subtraction_id]).await
    }

    async fn get_settings(&self) -> ClientResult<SettingsDocument> {
        self.call("get_settings", &[]).await
    }

    async fn update_settings(&self, update: &SettingsDocument) -> ClientResult<SettingsDocument> {
        let body = serde_json::to_string(update)?;
        self.call("update_settings", &[&body]).await
    }

    async fn find_files(
        &self,
        file_type: &str,
        query: &FindQuery,
    ) -> ClientResult<Page<UploadedFile>> {
        self.call("find_files", &[file_type, &query_args(query)])
            .await
    }

    async fn remove_file(&self, file_id: &str) -> ClientResult<()> {
        let _: Value = self.call("remove_file", &[file_id]).await?;
        Ok(())
    }
}

/// Lets every spawned task run until idle. Under a paused clock the sleep
/// only completes once nothing else can make progress.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
