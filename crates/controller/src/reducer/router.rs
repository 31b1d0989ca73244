use serde::Serialize;
use serde_json::Value;

use crate::actions::Action;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub pathname: String,
    pub search: String,
    pub state: Option<Value>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            pathname: "/".to_string(),
            search: String::new(),
            state: None,
        }
    }
}

impl Location {
    /// Splits a `push` target such as `/hmm?find=foo` into path and search.
    pub fn from_path(path: &str, state: Option<Value>) -> Self {
        let (pathname, search) = match path.split_once('?') {
            Some((pathname, query)) => (pathname, format!("?{query}")),
            None => (path, String::new()),
        };
        Self {
            pathname: if pathname.is_empty() { "/" } else { pathname }.to_string(),
            search,
            state,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RouterState {
    pub location: Location,
}

/// Only `LOCATION_CHANGE` moves the location; `PUSH` is turned into one by
/// the navigation workflow.
pub fn reduce(state: RouterState, action: &Action) -> RouterState {
    match action {
        Action::LocationChange {
            pathname,
            search,
            state: location_state,
        } => RouterState {
            location: Location {
                pathname: pathname.clone(),
                search: search.clone(),
                state: location_state.clone(),
            },
        },
        _ => state,
    }
}
