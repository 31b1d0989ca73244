use futures::{future::BoxFuture, FutureExt};
use shared::protocol::FindQuery;

use super::{api_call, WorkflowContext, WorkflowExecutor};
use crate::actions::Action;

pub(super) fn register(executor: &mut WorkflowExecutor) {
    executor
        .take_latest(
            "find_files",
            |action| matches!(action, Action::FindFilesRequested { .. }),
            find_files,
        )
        .take_every(
            "remove_file",
            |action| matches!(action, Action::RemoveFileRequested { .. }),
            remove_file,
        );
}

fn find_files(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::FindFilesRequested {
            file_type,
            term,
            page,
        } = action
        else {
            return;
        };
        let query = FindQuery::new(term, page);
        api_call(
            &ctx,
            ctx.api.find_files(&file_type, &query),
            |data| Action::FindFilesSucceeded { data },
            |error| Action::FindFilesFailed { error },
        )
        .await;
    }
    .boxed()
}

fn remove_file(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::RemoveFileRequested { file_id } = action else {
            return;
        };
        api_call(
            &ctx,
            ctx.api.remove_file(&file_id),
            |()| Action::RemoveFileSucceeded {
                file_id: file_id.clone(),
            },
            |error| Action::RemoveFileFailed {
                file_id: file_id.clone(),
                error,
            },
        )
        .await;
    }
    .boxed()
}
