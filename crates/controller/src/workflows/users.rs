use std::time::Duration;

use futures::{future::BoxFuture, FutureExt};
use serde_json::json;
use shared::error::RequestFailure;
use tracing::warn;

use super::{api_call, with_pending, WorkflowContext, WorkflowExecutor};
use crate::actions::Action;

const CREATE_USER_THROTTLE: Duration = Duration::from_millis(200);

pub(super) fn register(executor: &mut WorkflowExecutor) {
    executor
        .take_latest(
            "list_users",
            |action| matches!(action, Action::ListUsersRequested),
            list_users,
        )
        .throttle(
            "create_user",
            CREATE_USER_THROTTLE,
            |action| matches!(action, Action::CreateUserRequested { .. }),
            create_user,
        )
        .take_latest(
            "set_password",
            |action| matches!(action, Action::SetPasswordRequested { .. }),
            set_password,
        )
        .take_latest(
            "set_force_reset",
            |action| matches!(action, Action::SetForceResetRequested { .. }),
            set_force_reset,
        )
        .take_latest(
            "set_primary_group",
            |action| matches!(action, Action::SetPrimaryGroupRequested { .. }),
            set_primary_group,
        )
        .take_every(
            "add_user_to_group",
            |action| matches!(action, Action::AddUserToGroupRequested { .. }),
            add_user_to_group,
        )
        .take_every(
            "remove_user_from_group",
            |action| matches!(action, Action::RemoveUserFromGroupRequested { .. }),
            remove_user_from_group,
        );
}

fn list_users(_action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        with_pending(
            &ctx,
            api_call(
                &ctx,
                ctx.api.list_users(),
                |data| Action::ListUsersSucceeded { data },
                |error| Action::ListUsersFailed { error },
            ),
        )
        .await;
    }
    .boxed()
}

fn create_user(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::CreateUserRequested {
            user_id,
            password,
            force_reset,
        } = action
        else {
            return;
        };
        with_pending(&ctx, async {
            match ctx.api.create_user(&user_id, &password, force_reset).await {
                Ok(data) => {
                    ctx.dispatch(Action::CreateUserSucceeded { data });
                    // Close the create dialog and open the new user.
                    ctx.dispatch(Action::Push {
                        path: format!("/settings/users/{user_id}"),
                        state: Some(json!({ "createUser": false })),
                    });
                }
                Err(err) => {
                    warn!(workflow = "create_user", "request failed: {err}");
                    ctx.dispatch(Action::CreateUserFailed {
                        error: RequestFailure::from(err),
                    });
                }
            }
        })
        .await;
    }
    .boxed()
}

fn set_password(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::SetPasswordRequested {
            user_id,
            password,
            confirm,
        } = action
        else {
            return;
        };
        if password != confirm {
            ctx.dispatch(Action::SetPasswordFailed {
                error: RequestFailure::local("Passwords don't match"),
            });
            return;
        }
        api_call(
            &ctx,
            ctx.api.set_password(&user_id, &password),
            |data| Action::SetPasswordSucceeded { data },
            |error| Action::SetPasswordFailed { error },
        )
        .await;
    }
    .boxed()
}

fn set_force_reset(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::SetForceResetRequested { user_id, enabled } = action else {
            return;
        };
        api_call(
            &ctx,
            ctx.api.set_force_reset(&user_id, enabled),
            |data| Action::SetForceResetSucceeded { data },
            |error| Action::SetForceResetFailed { error },
        )
        .await;
    }
    .boxed()
}

fn set_primary_group(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::SetPrimaryGroupRequested {
            user_id,
            primary_group,
        } = action
        else {
            return;
        };
        api_call(
            &ctx,
            ctx.api.set_primary_group(&user_id, &primary_group),
            |data| Action::SetPrimaryGroupSucceeded { data },
            |error| Action::SetPrimaryGroupFailed { error },
        )
        .await;
    }
    .boxed()
}

fn add_user_to_group(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::AddUserToGroupRequested { user_id, group_id } = action else {
            return;
        };
        api_call(
            &ctx,
            ctx.api.add_user_to_group(&user_id, &group_id),
            |data| Action::AddUserToGroupSucceeded { data },
            |error| Action::AddUserToGroupFailed { error },
        )
        .await;
    }
    .boxed()
}

fn remove_user_from_group(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::RemoveUserFromGroupRequested { user_id, group_id } = action else {
            return;
        };
        api_call(
            &ctx,
            ctx.api.remove_user_from_group(&user_id, &group_id),
            |data| Action::RemoveUserFromGroupSucceeded { data },
            |error| Action::RemoveUserFromGroupFailed { error },
        )
        .await;
    }
    .boxed()
}
