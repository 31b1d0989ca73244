use serde::Serialize;
use shared::{
    domain::{HmmAnnotation, HmmStatus},
    error::RequestFailure,
    protocol::PageInfo,
};

use crate::actions::Action;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct HmmState {
    pub documents: Option<Vec<HmmAnnotation>>,
    pub page_info: Option<PageInfo>,
    pub term: String,
    /// Id of the most recently requested detail.
    pub hmm_id: Option<String>,
    pub detail: Option<HmmAnnotation>,
    pub status: Option<HmmStatus>,
    pub error: Option<RequestFailure>,
}

pub fn reduce(state: HmmState, action: &Action) -> HmmState {
    match action {
        Action::FindHmmsRequested { term, .. } => HmmState {
            term: term.clone(),
            ..state
        },
        Action::FindHmmsSucceeded { data } => HmmState {
            documents: Some(data.documents.clone()),
            page_info: Some(data.info),
            error: None,
            ..state
        },
        Action::GetHmmRequested { hmm_id } => HmmState {
            hmm_id: Some(hmm_id.clone()),
            detail: None,
            ..state
        },
        Action::GetHmmSucceeded { data } => HmmState {
            detail: Some(data.clone()),
            error: None,
            ..state
        },
        Action::InstallHmmsSucceeded { data } => HmmState {
            status: Some(data.clone()),
            error: None,
            ..state
        },
        Action::GetHmmFailed { hmm_id, error } if state.hmm_id.as_ref() == Some(hmm_id) => {
            HmmState {
                error: Some(error.clone()),
                ..state
            }
        }
        Action::FindHmmsFailed { error } | Action::InstallHmmsFailed { error } => HmmState {
            error: Some(error.clone()),
            ..state
        },
        _ => state,
    }
}

#[cfg(test)]
#[path = "tests/hmm_tests.rs"]
mod tests;
