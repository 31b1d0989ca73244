use serde::Serialize;
use shared::{domain::Subtraction, error::RequestFailure, protocol::PageInfo};

use super::collection;
use crate::actions::Action;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SubtractionState {
    pub documents: Option<Vec<Subtraction>>,
    pub page_info: Option<PageInfo>,
    pub term: String,
    /// Id of the most recently requested detail.
    pub subtraction_id: Option<String>,
    pub detail: Option<Subtraction>,
    pub error: Option<RequestFailure>,
}

pub fn reduce(state: SubtractionState, action: &Action) -> SubtractionState {
    match action {
        Action::WsInsertSubtraction { data } => SubtractionState {
            documents: collection::insert(state.documents, data.clone()),
            ..state
        },
        Action::WsUpdateSubtraction { data } => SubtractionState {
            documents: collection::update(state.documents, data.clone()),
            detail: collection::replace_if_same(state.detail, data),
            ..state
        },
        Action::WsRemoveSubtraction { data } => SubtractionState {
            documents: collection::remove(state.documents, data),
            ..state
        },
        Action::FindSubtractionsRequested { term, .. } => SubtractionState {
            term: term.clone(),
            ..state
        },
        Action::FindSubtractionsSucceeded { data } => SubtractionState {
            documents: Some(data.documents.clone()),
            page_info: Some(data.info),
            error: None,
            ..state
        },
        Action::GetSubtractionRequested { subtraction_id } => SubtractionState {
            subtraction_id: Some(subtraction_id.clone()),
            detail: None,
            ..state
        },
        Action::GetSubtractionSucceeded { data } => SubtractionState {
            detail: Some(data.clone()),
            error: None,
            ..state
        },
        Action::GetSubtractionFailed {
            subtraction_id,
            error,
        } if state.subtraction_id.as_ref() == Some(subtraction_id) => SubtractionState {
            error: Some(error.clone()),
            ..state
        },
        Action::FindSubtractionsFailed { error } => SubtractionState {
            error: Some(error.clone()),
            ..state
        },
        _ => state,
    }
}

#[cfg(test)]
#[path = "tests/subtraction_tests.rs"]
mod tests;
