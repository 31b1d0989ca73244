use serde::Serialize;
use shared::{domain::Reference, error::RequestFailure, protocol::PageInfo};

use super::collection;
use crate::actions::Action;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ReferencesState {
    pub documents: Option<Vec<Reference>>,
    pub page_info: Option<PageInfo>,
    pub term: String,
    /// Id of the most recently requested detail.
    pub ref_id: Option<String>,
    pub detail: Option<Reference>,
    /// A remote release check is in flight.
    pub checking: bool,
    pub error: Option<RequestFailure>,
}

pub fn reduce(state: ReferencesState, action: &Action) -> ReferencesState {
    match action {
        Action::WsInsertReference { data } => ReferencesState {
            documents: collection::insert(state.documents, data.clone()),
            ..state
        },
        Action::WsUpdateReference { data } | Action::UpdateRemoteReferenceSucceeded { data } => {
            ReferencesState {
                documents: collection::update(state.documents, data.clone()),
                detail: collection::replace_if_same(state.detail, data),
                ..state
            }
        }
        Action::WsRemoveReference { data } => ReferencesState {
            documents: collection::remove(state.documents, data),
            ..state
        },
        Action::FindReferencesRequested { term, .. } => ReferencesState {
            term: term.clone(),
            ..state
        },
        Action::FindReferencesSucceeded { data } => ReferencesState {
            documents: Some(data.documents.clone()),
            page_info: Some(data.info),
            error: None,
            ..state
        },
        Action::GetReferenceRequested { ref_id } => ReferencesState {
            ref_id: Some(ref_id.clone()),
            detail: None,
            ..state
        },
        Action::GetReferenceSucceeded { data } => ReferencesState {
            detail: Some(data.clone()),
            error: None,
            ..state
        },
        Action::CheckRemoteUpdatesRequested { .. } => ReferencesState {
            checking: true,
            ..state
        },
        Action::CheckRemoteUpdatesSucceeded { ref_id, data } => {
            let detail = state.detail.map(|detail| {
                if &detail.id == ref_id {
                    Reference {
                        release: Some(data.clone()),
                        ..detail
                    }
                } else {
                    detail
                }
            });
            ReferencesState {
                detail,
                checking: false,
                ..state
            }
        }
        Action::CheckRemoteUpdatesFailed { ref_id, error } => {
            let current = state.detail.as_ref().is_some_and(|detail| &detail.id == ref_id);
            ReferencesState {
                checking: false,
                error: if current { Some(error.clone()) } else { state.error },
                ..state
            }
        }
        Action::GetReferenceFailed { ref_id, error } if state.ref_id.as_ref() == Some(ref_id) => {
            ReferencesState {
                error: Some(error.clone()),
                ..state
            }
        }
        Action::FindReferencesFailed { error }
        | Action::UpdateRemoteReferenceFailed { error, .. } => ReferencesState {
            error: Some(error.clone()),
            ..state
        },
        _ => state,
    }
}

#[cfg(test)]
#[path = "tests/references_tests.rs"]
mod tests;
