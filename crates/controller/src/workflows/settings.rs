use futures::{future::BoxFuture, FutureExt};
use serde_json::Map;
use shared::domain::SettingsDocument;

use super::{api_call, WorkflowContext, WorkflowExecutor};
use crate::actions::Action;

pub(super) fn register(executor: &mut WorkflowExecutor) {
    executor
        .take_latest(
            "get_settings",
            |action| matches!(action, Action::GetSettingsRequested),
            get_settings,
        )
        .take_every(
            "update_setting",
            |action| matches!(action, Action::UpdateSettingRequested { .. }),
            update_setting,
        );
}

fn get_settings(_action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        api_call(
            &ctx,
            ctx.api.get_settings(),
            |data| Action::GetSettingsSucceeded { data },
            |error| Action::GetSettingsFailed { error },
        )
        .await;
    }
    .boxed()
}

fn update_setting(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::UpdateSettingRequested { key, value } = action else {
            return;
        };
        let mut update = Map::new();
        update.insert(key.clone(), value);
        let update = SettingsDocument(update);
        api_call(
            &ctx,
            ctx.api.update_settings(&update),
            |data| Action::UpdateSettingSucceeded { data },
            |error| Action::UpdateSettingFailed {
                key: key.clone(),
                error,
            },
        )
        .await;
    }
    .boxed()
}
