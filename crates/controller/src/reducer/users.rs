use serde::Serialize;
use shared::{domain::User, error::RequestFailure};

use super::collection;
use crate::actions::Action;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UsersState {
    pub documents: Option<Vec<User>>,
    pub detail: Option<User>,
    pub create_error: Option<RequestFailure>,
    pub password_error: Option<String>,
    pub error: Option<RequestFailure>,
}

pub fn reduce(state: UsersState, action: &Action) -> UsersState {
    match action {
        Action::ListUsersSucceeded { data } => UsersState {
            documents: Some(data.clone()),
            error: None,
            ..state
        },
        Action::WsInsertUser { data } => UsersState {
            documents: collection::insert(state.documents, data.clone()),
            ..state
        },
        Action::WsUpdateUser { data } => apply_user(state, data),
        Action::WsRemoveUser { data } => UsersState {
            documents: collection::remove(state.documents, data),
            detail: state.detail.filter(|detail| !data.contains(&detail.id)),
            ..state
        },
        Action::CreateUserRequested { .. } => UsersState {
            create_error: None,
            ..state
        },
        Action::CreateUserSucceeded { data } => UsersState {
            documents: collection::insert(state.documents, data.clone()),
            detail: Some(data.clone()),
            create_error: None,
            ..state
        },
        Action::CreateUserFailed { error } => UsersState {
            create_error: Some(error.clone()),
            ..state
        },
        Action::SetPasswordRequested { .. } => UsersState {
            password_error: None,
            ..state
        },
        Action::SetPasswordFailed { error } => UsersState {
            password_error: Some(error.message.clone()),
            ..state
        },
        Action::SetPasswordSucceeded { data }
        | Action::SetForceResetSucceeded { data }
        | Action::SetPrimaryGroupSucceeded { data }
        | Action::AddUserToGroupSucceeded { data }
        | Action::RemoveUserFromGroupSucceeded { data } => apply_user(state, data),
        Action::ListUsersFailed { error }
        | Action::SetForceResetFailed { error }
        | Action::SetPrimaryGroupFailed { error }
        | Action::AddUserToGroupFailed { error }
        | Action::RemoveUserFromGroupFailed { error } => UsersState {
            error: Some(error.clone()),
            ..state
        },
        _ => state,
    }
}

/// Replaces the user record in the listing and in the open detail view.
fn apply_user(state: UsersState, user: &User) -> UsersState {
    UsersState {
        documents: collection::update(state.documents, user.clone()),
        detail: collection::replace_if_same(state.detail, user),
        error: None,
        ..state
    }
}

#[cfg(test)]
#[path = "tests/users_tests.rs"]
mod tests;
