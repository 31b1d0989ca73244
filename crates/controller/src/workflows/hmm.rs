use std::time::Duration;

use futures::{future::BoxFuture, FutureExt};
use shared::protocol::FindQuery;

use super::{api_call, WorkflowContext, WorkflowExecutor};
use crate::actions::Action;

const HMM_PATH: &str = "/hmm";
const LOCATION_THROTTLE: Duration = Duration::from_millis(300);
const INSTALL_THROTTLE: Duration = Duration::from_millis(500);

pub(super) fn register(executor: &mut WorkflowExecutor) {
    executor
        .throttle(
            "find_hmms_on_location",
            LOCATION_THROTTLE,
            |action| {
                matches!(action, Action::LocationChange { pathname, .. } if pathname == HMM_PATH)
            },
            find_hmms_on_location,
        )
        .take_latest(
            "find_hmms",
            |action| matches!(action, Action::FindHmmsRequested { .. }),
            find_hmms,
        )
        .take_latest(
            "get_hmm",
            |action| matches!(action, Action::GetHmmRequested { .. }),
            get_hmm,
        )
        .throttle(
            "install_hmms",
            INSTALL_THROTTLE,
            |action| matches!(action, Action::InstallHmmsRequested),
            install_hmms,
        );
}

/// Reads `find` and `page` from a location search string such as
/// `?find=rdrp&page=2`. Unparseable pages are ignored.
pub fn query_from_search(search: &str) -> FindQuery {
    let mut term = String::new();
    let mut page = None;
    for (key, value) in url::form_urlencoded::parse(search.trim_start_matches('?').as_bytes()) {
        match key.as_ref() {
            "find" => term = value.into_owned(),
            "page" => page = value.parse().ok(),
            _ => {}
        }
    }
    FindQuery::new(term, page)
}

fn find_hmms_on_location(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::LocationChange { search, .. } = action else {
            return;
        };
        let query = query_from_search(&search);
        api_call(
            &ctx,
            ctx.api.find_hmms(&query),
            |data| Action::FindHmmsSucceeded { data },
            |error| Action::FindHmmsFailed { error },
        )
        .await;
    }
    .boxed()
}

fn find_hmms(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::FindHmmsRequested { term, page } = action else {
            return;
        };
        let query = FindQuery::new(term, page);
        api_call(
            &ctx,
            ctx.api.find_hmms(&query),
            |data| Action::FindHmmsSucceeded { data },
            |error| Action::FindHmmsFailed { error },
        )
        .await;
    }
    .boxed()
}

fn get_hmm(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::GetHmmRequested { hmm_id } = action else {
            return;
        };
        api_call(
            &ctx,
            ctx.api.get_hmm(&hmm_id),
            |data| Action::GetHmmSucceeded { data },
            |error| Action::GetHmmFailed {
                hmm_id: hmm_id.clone(),
                error,
            },
        )
        .await;
    }
    .boxed()
}

fn install_hmms(_action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        api_call(
            &ctx,
            ctx.api.install_hmms(),
            |data| Action::InstallHmmsSucceeded { data },
            |error| Action::InstallHmmsFailed { error },
        )
        .await;
    }
    .boxed()
}
