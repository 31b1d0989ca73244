use serde::Serialize;

use crate::actions::Action;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AppState {
    pub pending: bool,
}

pub fn reduce(state: AppState, action: &Action) -> AppState {
    match action {
        Action::SetAppPending => AppState { pending: true },
        Action::UnsetAppPending => AppState { pending: false },
        _ => state,
    }
}
