//! Pure state transitions: `(sub-state, action) -> sub-state`.
//!
//! Every reducer takes its sub-state by value and returns the next one.
//! Actions a reducer does not handle hand the input back untouched.

pub mod analyses;
pub mod app;
pub mod collection;
pub mod files;
pub mod hmm;
pub mod references;
pub mod router;
pub mod settings;
pub mod subtraction;
pub mod users;

use serde::Serialize;

use crate::actions::Action;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct State {
    pub app: app::AppState,
    pub router: router::RouterState,
    pub analyses: analyses::AnalysesState,
    pub users: users::UsersState,
    pub references: references::ReferencesState,
    pub subtraction: subtraction::SubtractionState,
    pub hmm: hmm::HmmState,
    pub settings: settings::SettingsState,
    pub files: files::FilesState,
}

pub fn reduce(state: State, action: &Action) -> State {
    State {
        app: app::reduce(state.app, action),
        router: router::reduce(state.router, action),
        analyses: analyses::reduce(state.analyses, action),
        users: users::reduce(state.users, action),
        references: references::reduce(state.references, action),
        subtraction: subtraction::reduce(state.subtraction, action),
        hmm: hmm::reduce(state.hmm, action),
        settings: settings::reduce(state.settings, action),
        files: files::reduce(state.files, action),
    }
}
