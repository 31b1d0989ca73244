//! Action vocabulary shared by the view layer, the reducers and the workflows.
//!
//! Every variant carries the wire kind it is serialized under (the `"type"`
//! field). Asynchronous operations come in `*_REQUESTED` / `*_SUCCEEDED` /
//! `*_FAILED` triples sharing a base name and, where a result has to be
//! matched back to its request, the same correlation fields.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::{
    domain::{
        Analysis, AnalysisDetail, HmmAnnotation, HmmStatus, IndexSummary, Reference, Release,
        SettingsDocument, Subtraction, UploadedFile, User,
    },
    error::RequestFailure,
    protocol::{Page, PushInterface, PushMessage, PushOperation},
};
use tracing::warn;

pub const REQUESTED: &str = "_REQUESTED";
pub const SUCCEEDED: &str = "_SUCCEEDED";
pub const FAILED: &str = "_FAILED";

/// Which of the two Pathoscope filters a toolbar toggle addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterKey {
    #[serde(rename = "isolates")]
    Isolates,
    #[serde(rename = "OTUs")]
    Otus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Coverage,
    Pi,
    Depth,
}

macro_rules! actions {
    (
        $(
            $kind:literal => $variant:ident $({
                $( $(#[$field_meta:meta])* $field:ident : $ty:ty ),* $(,)?
            })?
        ),* $(,)?
    ) => {
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type", rename_all_fields = "camelCase")]
        pub enum Action {
            $(
                #[serde(rename = $kind)]
                $variant $({ $( $(#[$field_meta])* $field: $ty ),* })?,
            )*
        }

        impl Action {
            /// Wire name of the action, e.g. `LIST_USERS_REQUESTED`.
            pub fn kind(&self) -> &'static str {
                match self {
                    $( Self::$variant { .. } => $kind, )*
                }
            }
        }
    };
}

actions! {
    "SET_APP_PENDING" => SetAppPending,
    "UNSET_APP_PENDING" => UnsetAppPending,
    "PUSH" => Push { path: String, state: Option<Value> },
    "@@router/LOCATION_CHANGE" => LocationChange {
        pathname: String,
        #[serde(default)]
        search: String,
        state: Option<Value>,
    },

    "WS_INSERT_ANALYSIS" => WsInsertAnalysis { data: Analysis },
    "WS_UPDATE_ANALYSIS" => WsUpdateAnalysis { data: Analysis },
    "WS_REMOVE_ANALYSIS" => WsRemoveAnalysis { data: Vec<String> },
    "FIND_ANALYSES_REQUESTED" => FindAnalysesRequested {
        sample_id: String,
        #[serde(default)]
        term: String,
        page: Option<u32>,
    },
    "FIND_ANALYSES_SUCCEEDED" => FindAnalysesSucceeded { data: Page<Analysis> },
    "FIND_ANALYSES_FAILED" => FindAnalysesFailed { error: RequestFailure },
    "GET_ANALYSIS_REQUESTED" => GetAnalysisRequested { analysis_id: String },
    "GET_ANALYSIS_SUCCEEDED" => GetAnalysisSucceeded { data: AnalysisDetail },
    "GET_ANALYSIS_FAILED" => GetAnalysisFailed { analysis_id: String, error: RequestFailure },
    "CLEAR_ANALYSIS" => ClearAnalysis,
    "COLLAPSE_ANALYSIS" => CollapseAnalysis,
    "TOGGLE_ANALYSIS_EXPANDED" => ToggleAnalysisExpanded { id: String },
    "SET_PATHOSCOPE_FILTER" => SetPathoscopeFilter { key: Option<FilterKey> },
    "TOGGLE_SHOW_PATHOSCOPE_READS" => ToggleShowPathoscopeReads,
    "TOGGLE_SORT_PATHOSCOPE_DESCENDING" => ToggleSortPathoscopeDescending,
    "SET_PATHOSCOPE_SORT_KEY" => SetPathoscopeSortKey { key: SortKey },
    "BLAST_NUVS_REQUESTED" => BlastNuvsRequested { analysis_id: String, sequence_index: u32 },
    "BLAST_NUVS_SUCCEEDED" => BlastNuvsSucceeded {
        analysis_id: String,
        sequence_index: u32,
        data: Value,
    },
    "BLAST_NUVS_FAILED" => BlastNuvsFailed {
        analysis_id: String,
        sequence_index: u32,
        error: RequestFailure,
    },
    "LIST_READY_INDEXES_REQUESTED" => ListReadyIndexesRequested,
    "LIST_READY_INDEXES_SUCCEEDED" => ListReadyIndexesSucceeded { data: Vec<IndexSummary> },
    "LIST_READY_INDEXES_FAILED" => ListReadyIndexesFailed { error: RequestFailure },

    "WS_INSERT_USER" => WsInsertUser { data: User },
    "WS_UPDATE_USER" => WsUpdateUser { data: User },
    "WS_REMOVE_USER" => WsRemoveUser { data: Vec<String> },
    "LIST_USERS_REQUESTED" => ListUsersRequested,
    "LIST_USERS_SUCCEEDED" => ListUsersSucceeded { data: Vec<User> },
    "LIST_USERS_FAILED" => ListUsersFailed { error: RequestFailure },
    "CREATE_USER_REQUESTED" => CreateUserRequested {
        user_id: String,
        password: String,
        #[serde(default)]
        force_reset: bool,
    },
    "CREATE_USER_SUCCEEDED" => CreateUserSucceeded { data: User },
    "CREATE_USER_FAILED" => CreateUserFailed { error: RequestFailure },
    "SET_PASSWORD_REQUESTED" => SetPasswordRequested {
        user_id: String,
        password: String,
        confirm: String,
    },
    "SET_PASSWORD_SUCCEEDED" => SetPasswordSucceeded { data: User },
    "SET_PASSWORD_FAILED" => SetPasswordFailed { error: RequestFailure },
    "SET_FORCE_RESET_REQUESTED" => SetForceResetRequested { user_id: String, enabled: bool },
    "SET_FORCE_RESET_SUCCEEDED" => SetForceResetSucceeded { data: User },
    "SET_FORCE_RESET_FAILED" => SetForceResetFailed { error: RequestFailure },
    "SET_PRIMARY_GROUP_REQUESTED" => SetPrimaryGroupRequested {
        user_id: String,
        primary_group: String,
    },
    "SET_PRIMARY_GROUP_SUCCEEDED" => SetPrimaryGroupSucceeded { data: User },
    "SET_PRIMARY_GROUP_FAILED" => SetPrimaryGroupFailed { error: RequestFailure },
    "ADD_USER_TO_GROUP_REQUESTED" => AddUserToGroupRequested { user_id: String, group_id: String },
    "ADD_USER_TO_GROUP_SUCCEEDED" => AddUserToGroupSucceeded { data: User },
    "ADD_USER_TO_GROUP_FAILED" => AddUserToGroupFailed { error: RequestFailure },
    "REMOVE_USER_FROM_GROUP_REQUESTED" => RemoveUserFromGroupRequested {
        user_id: String,
        group_id: String,
    },
    "REMOVE_USER_FROM_GROUP_SUCCEEDED" => RemoveUserFromGroupSucceeded { data: User },
    "REMOVE_USER_FROM_GROUP_FAILED" => RemoveUserFromGroupFailed { error: RequestFailure },

    "WS_INSERT_REFERENCE" => WsInsertReference { data: Reference },
    "WS_UPDATE_REFERENCE" => WsUpdateReference { data: Reference },
    "WS_REMOVE_REFERENCE" => WsRemoveReference { data: Vec<String> },
    "FIND_REFERENCES_REQUESTED" => FindReferencesRequested {
        #[serde(default)]
        term: String,
        page: Option<u32>,
    },
    "FIND_REFERENCES_SUCCEEDED" => FindReferencesSucceeded { data: Page<Reference> },
    "FIND_REFERENCES_FAILED" => FindReferencesFailed { error: RequestFailure },
    "GET_REFERENCE_REQUESTED" => GetReferenceRequested { ref_id: String },
    "GET_REFERENCE_SUCCEEDED" => GetReferenceSucceeded { data: Reference },
    "GET_REFERENCE_FAILED" => GetReferenceFailed { ref_id: String, error: RequestFailure },
    "CHECK_REMOTE_UPDATES_REQUESTED" => CheckRemoteUpdatesRequested { ref_id: String },
    "CHECK_REMOTE_UPDATES_SUCCEEDED" => CheckRemoteUpdatesSucceeded { ref_id: String, data: Release },
    "CHECK_REMOTE_UPDATES_FAILED" => CheckRemoteUpdatesFailed { ref_id: String, error: RequestFailure },
    "UPDATE_REMOTE_REFERENCE_REQUESTED" => UpdateRemoteReferenceRequested { ref_id: String },
    "UPDATE_REMOTE_REFERENCE_SUCCEEDED" => UpdateRemoteReferenceSucceeded { data: Reference },
    "UPDATE_REMOTE_REFERENCE_FAILED" => UpdateRemoteReferenceFailed {
        ref_id: String,
        error: RequestFailure,
    },

    "WS_INSERT_SUBTRACTION" => WsInsertSubtraction { data: Subtraction },
    "WS_UPDATE_SUBTRACTION" => WsUpdateSubtraction { data: Subtraction },
    "WS_REMOVE_SUBTRACTION" => WsRemoveSubtraction { data: Vec<String> },
    "FIND_SUBTRACTIONS_REQUESTED" => FindSubtractionsRequested {
        #[serde(default)]
        term: String,
        page: Option<u32>,
    },
    "FIND_SUBTRACTIONS_SUCCEEDED" => FindSubtractionsSucceeded { data: Page<Subtraction> },
    "FIND_SUBTRACTIONS_FAILED" => FindSubtractionsFailed { error: RequestFailure },
    "GET_SUBTRACTION_REQUESTED" => GetSubtractionRequested { subtraction_id: String },
    "GET_SUBTRACTION_SUCCEEDED" => GetSubtractionSucceeded { data: Subtraction },
    "GET_SUBTRACTION_FAILED" => GetSubtractionFailed {
        subtraction_id: String,
        error: RequestFailure,
    },

    "FIND_HMMS_REQUESTED" => FindHmmsRequested {
        #[serde(default)]
        term: String,
        page: Option<u32>,
    },
    "FIND_HMMS_SUCCEEDED" => FindHmmsSucceeded { data: Page<HmmAnnotation> },
    "FIND_HMMS_FAILED" => FindHmmsFailed { error: RequestFailure },
    "GET_HMM_REQUESTED" => GetHmmRequested { hmm_id: String },
    "GET_HMM_SUCCEEDED" => GetHmmSucceeded { data: HmmAnnotation },
    "GET_HMM_FAILED" => GetHmmFailed { hmm_id: String, error: RequestFailure },
    "INSTALL_HMMS_REQUESTED" => InstallHmmsRequested,
    "INSTALL_HMMS_SUCCEEDED" => InstallHmmsSucceeded { data: HmmStatus },
    "INSTALL_HMMS_FAILED" => InstallHmmsFailed { error: RequestFailure },

    "GET_SETTINGS_REQUESTED" => GetSettingsRequested,
    "GET_SETTINGS_SUCCEEDED" => GetSettingsSucceeded { data: SettingsDocument },
    "GET_SETTINGS_FAILED" => GetSettingsFailed { error: RequestFailure },
    "UPDATE_SETTING_REQUESTED" => UpdateSettingRequested { key: String, value: Value },
    "UPDATE_SETTING_SUCCEEDED" => UpdateSettingSucceeded { data: SettingsDocument },
    "UPDATE_SETTING_FAILED" => UpdateSettingFailed { key: String, error: RequestFailure },

    "WS_INSERT_FILE" => WsInsertFile { data: UploadedFile },
    "WS_UPDATE_FILE" => WsUpdateFile { data: UploadedFile },
    "WS_REMOVE_FILE" => WsRemoveFile { data: Vec<String> },
    "FIND_FILES_REQUESTED" => FindFilesRequested {
        file_type: String,
        #[serde(default)]
        term: String,
        page: Option<u32>,
    },
    "FIND_FILES_SUCCEEDED" => FindFilesSucceeded { data: Page<UploadedFile> },
    "FIND_FILES_FAILED" => FindFilesFailed { error: RequestFailure },
    "REMOVE_FILE_REQUESTED" => RemoveFileRequested { file_id: String },
    "REMOVE_FILE_SUCCEEDED" => RemoveFileSucceeded { file_id: String },
    "REMOVE_FILE_FAILED" => RemoveFileFailed { file_id: String, error: RequestFailure },
}

impl Action {
    /// Base name shared by the three actions of a request lifecycle, e.g.
    /// `LIST_USERS` for `LIST_USERS_REQUESTED`. `None` for plain actions.
    pub fn lifecycle_base(&self) -> Option<&'static str> {
        let kind = self.kind();
        [REQUESTED, SUCCEEDED, FAILED]
            .into_iter()
            .find_map(|suffix| kind.strip_suffix(suffix))
    }

    pub fn is_terminal(&self) -> bool {
        let kind = self.kind();
        kind.ends_with(SUCCEEDED) || kind.ends_with(FAILED)
    }

    pub fn failure(&self) -> Option<&RequestFailure> {
        match self {
            Self::FindAnalysesFailed { error }
            | Self::GetAnalysisFailed { error, .. }
            | Self::BlastNuvsFailed { error, .. }
            | Self::ListReadyIndexesFailed { error }
            | Self::ListUsersFailed { error }
            | Self::CreateUserFailed { error }
            | Self::SetPasswordFailed { error }
            | Self::SetForceResetFailed { error }
            | Self::SetPrimaryGroupFailed { error }
            | Self::AddUserToGroupFailed { error }
            | Self::RemoveUserFromGroupFailed { error }
            | Self::FindReferencesFailed { error }
            | Self::GetReferenceFailed { error, .. }
            | Self::CheckRemoteUpdatesFailed { error, .. }
            | Self::UpdateRemoteReferenceFailed { error, .. }
            | Self::FindSubtractionsFailed { error }
            | Self::GetSubtractionFailed { error, .. }
            | Self::FindHmmsFailed { error }
            | Self::GetHmmFailed { error, .. }
            | Self::InstallHmmsFailed { error }
            | Self::GetSettingsFailed { error }
            | Self::UpdateSettingFailed { error, .. }
            | Self::FindFilesFailed { error }
            | Self::RemoveFileFailed { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Maps a websocket push message onto the matching `WS_*` action.
    ///
    /// Returns `None` for interfaces this client does not track and for
    /// payloads that do not decode.
    pub fn from_push(message: PushMessage) -> Option<Self> {
        let PushMessage {
            interface,
            operation,
            data,
        } = message;

        let decoded = match (interface, operation) {
            (PushInterface::Analyses, PushOperation::Insert) => {
                serde_json::from_value(data).map(|data| Self::WsInsertAnalysis { data })
            }
            (PushInterface::Analyses, PushOperation::Update) => {
                serde_json::from_value(data).map(|data| Self::WsUpdateAnalysis { data })
            }
            (PushInterface::Analyses, PushOperation::Remove) => {
                serde_json::from_value(data).map(|data| Self::WsRemoveAnalysis { data })
            }
            (PushInterface::Users, PushOperation::Insert) => {
                serde_json::from_value(data).map(|data| Self::WsInsertUser { data })
            }
            (PushInterface::Users, PushOperation::Update) => {
                serde_json::from_value(data).map(|data| Self::WsUpdateUser { data })
            }
            (PushInterface::Users, PushOperation::Remove) => {
                serde_json::from_value(data).map(|data| Self::WsRemoveUser { data })
            }
            (PushInterface::References, PushOperation::Insert) => {
                serde_json::from_value(data).map(|data| Self::WsInsertReference { data })
            }
            (PushInterface::References, PushOperation::Update) => {
                serde_json::from_value(data).map(|data| Self::WsUpdateReference { data })
            }
            (PushInterface::References, PushOperation::Remove) => {
                serde_json::from_value(data).map(|data| Self::WsRemoveReference { data })
            }
            (PushInterface::Subtraction, PushOperation::Insert) => {
                serde_json::from_value(data).map(|data| Self::WsInsertSubtraction { data })
            }
            (PushInterface::Subtraction, PushOperation::Update) => {
                serde_json::from_value(data).map(|data| Self::WsUpdateSubtraction { data })
            }
            (PushInterface::Subtraction, PushOperation::Remove) => {
                serde_json::from_value(data).map(|data| Self::WsRemoveSubtraction { data })
            }
            (PushInterface::Files, PushOperation::Insert) => {
                serde_json::from_value(data).map(|data| Self::WsInsertFile { data })
            }
            (PushInterface::Files, PushOperation::Update) => {
                serde_json::from_value(data).map(|data| Self::WsUpdateFile { data })
            }
            (PushInterface::Files, PushOperation::Remove) => {
                serde_json::from_value(data).map(|data| Self::WsRemoveFile { data })
            }
            _ => return None,
        };

        match decoded {
            Ok(action) => Some(action),
            Err(err) => {
                warn!(?interface, ?operation, "dropping undecodable push message: {err}");
                None
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/actions_tests.rs"]
mod tests;
