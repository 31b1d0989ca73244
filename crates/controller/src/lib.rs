//! Controller layer: action vocabulary, reducer state transitions, the state
//! store loop and workflow orchestration against the API client.

pub mod actions;
pub mod reducer;
pub mod store;
pub mod workflows;

pub use actions::Action;
pub use reducer::State;
pub use store::{DispatchError, Store, StoreHandle};
pub use workflows::{Policy, WorkflowExecutor};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
