use futures::{future::BoxFuture, FutureExt};
use shared::protocol::FindQuery;

use super::{api_call, WorkflowContext, WorkflowExecutor};
use crate::actions::Action;

pub(super) fn register(executor: &mut WorkflowExecutor) {
    executor
        .take_latest(
            "find_subtractions",
            |action| matches!(action, Action::FindSubtractionsRequested { .. }),
            find_subtractions,
        )
        .take_latest(
            "get_subtraction",
            |action| matches!(action, Action::GetSubtractionRequested { .. }),
            get_subtraction,
        );
}

fn find_subtractions(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::FindSubtractionsRequested { term, page } = action else {
            return;
        };
        let query = FindQuery::new(term, page);
        api_call(
            &ctx,
            ctx.api.find_subtractions(&query),
            |data| Action::FindSubtractionsSucceeded { data },
            |error| Action::FindSubtractionsFailed { error },
        )
        .await;
    }
    .boxed()
}

fn get_subtraction(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::GetSubtractionRequested { subtraction_id } = action else {
            return;
        };
        api_call(
            &ctx,
            ctx.api.get_subtraction(&subtraction_id),
            |data| Action::GetSubtractionSucceeded { data },
            |error| Action::GetSubtractionFailed {
                subtraction_id: subtraction_id.clone(),
                error,
            },
        )
        .await;
    }
    .boxed()
}
