use serde::Serialize;
use shared::{domain::UploadedFile, error::RequestFailure, protocol::PageInfo};

use super::collection;
use crate::actions::Action;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilesState {
    pub documents: Option<Vec<UploadedFile>>,
    pub page_info: Option<PageInfo>,
    pub file_type: Option<String>,
    pub error: Option<RequestFailure>,
}

pub fn reduce(state: FilesState, action: &Action) -> FilesState {
    match action {
        Action::WsInsertFile { data } => {
            if state.file_type.as_deref() != Some(data.file_type.as_str()) {
                return state;
            }
            FilesState {
                documents: collection::insert(state.documents, data.clone()),
                ..state
            }
        }
        Action::WsUpdateFile { data } => FilesState {
            documents: collection::update(state.documents, data.clone()),
            ..state
        },
        Action::WsRemoveFile { data } => FilesState {
            documents: collection::remove(state.documents, data),
            ..state
        },
        Action::FindFilesRequested { file_type, .. } => {
            let documents = if state.file_type.as_ref() == Some(file_type) {
                state.documents
            } else {
                None
            };
            FilesState {
                documents,
                file_type: Some(file_type.clone()),
                ..state
            }
        }
        Action::FindFilesSucceeded { data } => FilesState {
            documents: Some(data.documents.clone()),
            page_info: Some(data.info),
            error: None,
            ..state
        },
        Action::RemoveFileSucceeded { file_id } => FilesState {
            documents: collection::remove(state.documents, std::slice::from_ref(file_id)),
            ..state
        },
        Action::FindFilesFailed { error } | Action::RemoveFileFailed { error, .. } => FilesState {
            error: Some(error.clone()),
            ..state
        },
        _ => state,
    }
}

#[cfg(test)]
#[path = "tests/files_tests.rs"]
mod tests;
