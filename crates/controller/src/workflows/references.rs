use std::time::Duration;

use futures::{future::BoxFuture, FutureExt};
use shared::protocol::FindQuery;

use super::{api_call, WorkflowContext, WorkflowExecutor};
use crate::actions::Action;

const REMOTE_THROTTLE: Duration = Duration::from_millis(500);

pub(super) fn register(executor: &mut WorkflowExecutor) {
    executor
        .take_latest(
            "find_references",
            |action| matches!(action, Action::FindReferencesRequested { .. }),
            find_references,
        )
        .take_latest(
            "get_reference",
            |action| matches!(action, Action::GetReferenceRequested { .. }),
            get_reference,
        )
        .throttle(
            "check_remote_updates",
            REMOTE_THROTTLE,
            |action| matches!(action, Action::CheckRemoteUpdatesRequested { .. }),
            check_remote_updates,
        )
        .throttle(
            "update_remote_reference",
            REMOTE_THROTTLE,
            |action| matches!(action, Action::UpdateRemoteReferenceRequested { .. }),
            update_remote_reference,
        );
}

fn find_references(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::FindReferencesRequested { term, page } = action else {
            return;
        };
        let query = FindQuery::new(term, page);
        api_call(
            &ctx,
            ctx.api.find_references(&query),
            |data| Action::FindReferencesSucceeded { data },
            |error| Action::FindReferencesFailed { error },
        )
        .await;
    }
    .boxed()
}

fn get_reference(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::GetReferenceRequested { ref_id } = action else {
            return;
        };
        api_call(
            &ctx,
            ctx.api.get_reference(&ref_id),
            |data| Action::GetReferenceSucceeded { data },
            |error| Action::GetReferenceFailed {
                ref_id: ref_id.clone(),
                error,
            },
        )
        .await;
    }
    .boxed()
}

fn check_remote_updates(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::CheckRemoteUpdatesRequested { ref_id } = action else {
            return;
        };
        api_call(
            &ctx,
            ctx.api.check_remote_updates(&ref_id),
            |data| Action::CheckRemoteUpdatesSucceeded {
                ref_id: ref_id.clone(),
                data,
            },
            |error| Action::CheckRemoteUpdatesFailed {
                ref_id: ref_id.clone(),
                error,
            },
        )
        .await;
    }
    .boxed()
}

fn update_remote_reference(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::UpdateRemoteReferenceRequested { ref_id } = action else {
            return;
        };
        api_call(
            &ctx,
            ctx.api.update_remote_reference(&ref_id),
            |data| Action::UpdateRemoteReferenceSucceeded { data },
            |error| Action::UpdateRemoteReferenceFailed {
                ref_id: ref_id.clone(),
                error,
            },
        )
        .await;
    }
    .boxed()
}
