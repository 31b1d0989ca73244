//! Turns `PUSH` navigation requests into router location changes.

use futures::{future::BoxFuture, FutureExt};

use super::{WorkflowContext, WorkflowExecutor};
use crate::{actions::Action, reducer::router::Location};

pub(super) fn register(executor: &mut WorkflowExecutor) {
    executor.take_every(
        "navigate",
        |action| matches!(action, Action::Push { .. }),
        navigate,
    );
}

fn navigate(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::Push { path, state } = action else {
            return;
        };
        let Location {
            pathname,
            search,
            state,
        } = Location::from_path(&path, state);
        ctx.dispatch(Action::LocationChange {
            pathname,
            search,
            state,
        });
    }
    .boxed()
}
