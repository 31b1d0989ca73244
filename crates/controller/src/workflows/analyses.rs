use futures::{future::BoxFuture, FutureExt};
use shared::protocol::FindQuery;

use super::{api_call, WorkflowContext, WorkflowExecutor};
use crate::actions::Action;

pub(super) fn register(executor: &mut WorkflowExecutor) {
    executor
        .take_latest(
            "find_analyses",
            |action| matches!(action, Action::FindAnalysesRequested { .. }),
            find_analyses,
        )
        .take_latest(
            "get_analysis",
            |action| matches!(action, Action::GetAnalysisRequested { .. }),
            get_analysis,
        )
        .take_every(
            "blast_nuvs",
            |action| matches!(action, Action::BlastNuvsRequested { .. }),
            blast_nuvs,
        )
        .take_latest(
            "list_ready_indexes",
            |action| matches!(action, Action::ListReadyIndexesRequested),
            list_ready_indexes,
        );
}

fn find_analyses(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::FindAnalysesRequested {
            sample_id,
            term,
            page,
        } = action
        else {
            return;
        };
        let query = FindQuery::new(term, page);
        api_call(
            &ctx,
            ctx.api.find_analyses(&sample_id, &query),
            |data| Action::FindAnalysesSucceeded { data },
            |error| Action::FindAnalysesFailed { error },
        )
        .await;
    }
    .boxed()
}

fn get_analysis(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::GetAnalysisRequested { analysis_id } = action else {
            return;
        };
        api_call(
            &ctx,
            ctx.api.get_analysis(&analysis_id),
            |data| Action::GetAnalysisSucceeded { data },
            |error| Action::GetAnalysisFailed {
                analysis_id: analysis_id.clone(),
                error,
            },
        )
        .await;
    }
    .boxed()
}

fn blast_nuvs(action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        let Action::BlastNuvsRequested {
            analysis_id,
            sequence_index,
        } = action
        else {
            return;
        };
        api_call(
            &ctx,
            ctx.api.blast_nuvs(&analysis_id, sequence_index),
            |data| Action::BlastNuvsSucceeded {
                analysis_id: analysis_id.clone(),
                sequence_index,
                data,
            },
            |error| Action::BlastNuvsFailed {
                analysis_id: analysis_id.clone(),
                sequence_index,
                error,
            },
        )
        .await;
    }
    .boxed()
}

fn list_ready_indexes(_action: Action, ctx: WorkflowContext) -> BoxFuture<'static, ()> {
    async move {
        api_call(
            &ctx,
            ctx.api.list_ready_indexes(),
            |data| Action::ListReadyIndexesSucceeded { data },
            |error| Action::ListReadyIndexesFailed { error },
        )
        .await;
    }
    .boxed()
}
