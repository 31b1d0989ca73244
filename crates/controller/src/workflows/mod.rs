//! Workflow executor: bridges `*_REQUESTED` actions to API calls and back.
//!
//! A workflow is registered against an action matcher together with a
//! concurrency [`Policy`]. Every matching action that the policy accepts
//! spawns one task running the workflow. The task only affects state by
//! dispatching actions back into the store.

mod analyses;
mod files;
mod hmm;
mod navigation;
mod references;
mod settings;
mod subtraction;
mod users;

use std::{future::Future, sync::Arc, time::Duration};

use client_core::{ApiClient, ClientResult};
use futures::future::BoxFuture;
use shared::error::RequestFailure;
use tokio::{sync::mpsc, time::Instant};
use tracing::{debug, warn};

use crate::{actions::Action, store::Envelope};

pub type Matcher = fn(&Action) -> bool;
pub type WorkflowFn = fn(Action, WorkflowContext) -> BoxFuture<'static, ()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Policy {
    /// Only the most recently started run may have its results reduced.
    /// Earlier runs are left to finish; their results are discarded.
    Latest,
    /// A trigger is accepted only when no trigger was accepted within the
    /// window. Triggers inside the window are ignored, not queued.
    Throttle(Duration),
    Every,
}

/// The latest-only run an action was dispatched from.
///
/// Checked by the store right before reduction, in the same loop that
/// starts newer runs, so a result queued behind a newer trigger is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Origin {
    registration: usize,
    generation: u64,
}

/// Sends a workflow's actions back into the store.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Envelope>,
    origin: Option<Origin>,
    workflow: &'static str,
}

impl Dispatcher {
    /// Delivers `action`; the store drops it if this run has been superseded
    /// by the time it is reduced.
    pub fn dispatch(&self, action: Action) {
        self.send(Envelope {
            action,
            origin: self.origin,
        });
    }

    /// Delivers `action` even from a superseded run.
    pub fn dispatch_always(&self, action: Action) {
        self.send(Envelope {
            action,
            origin: None,
        });
    }

    fn send(&self, envelope: Envelope) {
        if self.tx.send(envelope).is_err() {
            debug!(workflow = self.workflow, "workflow: store closed");
        }
    }

    pub fn workflow(&self) -> &'static str {
        self.workflow
    }
}

/// Everything a running workflow may touch.
#[derive(Clone)]
pub struct WorkflowContext {
    pub api: Arc<dyn ApiClient>,
    pub dispatcher: Dispatcher,
}

impl WorkflowContext {
    pub fn dispatch(&self, action: Action) {
        self.dispatcher.dispatch(action);
    }
}

/// Awaits one API call and dispatches exactly one terminal action for it.
pub async fn api_call<T, F>(
    ctx: &WorkflowContext,
    call: F,
    succeeded: impl FnOnce(T) -> Action,
    failed: impl FnOnce(RequestFailure) -> Action,
) where
    F: Future<Output = ClientResult<T>>,
{
    match call.await {
        Ok(value) => ctx.dispatch(succeeded(value)),
        Err(err) => {
            warn!(workflow = ctx.dispatcher.workflow(), "request failed: {err}");
            ctx.dispatch(failed(RequestFailure::from(err)));
        }
    }
}

/// Brackets `work` with `SET_APP_PENDING` / `UNSET_APP_PENDING`.
pub async fn with_pending<F>(ctx: &WorkflowContext, work: F)
where
    F: Future<Output = ()>,
{
    ctx.dispatcher.dispatch_always(Action::SetAppPending);
    work.await;
    ctx.dispatcher.dispatch_always(Action::UnsetAppPending);
}

struct Registration {
    name: &'static str,
    matches: Matcher,
    policy: Policy,
    run: WorkflowFn,
    generation: u64,
    last_accepted: Option<Instant>,
}

pub struct WorkflowExecutor {
    api: Arc<dyn ApiClient>,
    registrations: Vec<Registration>,
}

impl WorkflowExecutor {
    pub fn new(api: Arc<dyn ApiClient>) -> Self {
        Self {
            api,
            registrations: Vec::new(),
        }
    }

    /// Executor with every administration workflow registered.
    pub fn with_default_workflows(api: Arc<dyn ApiClient>) -> Self {
        let mut executor = Self::new(api);
        navigation::register(&mut executor);
        users::register(&mut executor);
        hmm::register(&mut executor);
        analyses::register(&mut executor);
        references::register(&mut executor);
        subtraction::register(&mut executor);
        settings::register(&mut executor);
        files::register(&mut executor);
        executor
    }

    pub fn take_latest(&mut self, name: &'static str, matches: Matcher, run: WorkflowFn) -> &mut Self {
        self.register(name, matches, Policy::Latest, run)
    }

    pub fn throttle(
        &mut self,
        name: &'static str,
        window: Duration,
        matches: Matcher,
        run: WorkflowFn,
    ) -> &mut Self {
        self.register(name, matches, Policy::Throttle(window), run)
    }

    pub fn take_every(&mut self, name: &'static str, matches: Matcher, run: WorkflowFn) -> &mut Self {
        self.register(name, matches, Policy::Every, run)
    }

    pub fn register(
        &mut self,
        name: &'static str,
        matches: Matcher,
        policy: Policy,
        run: WorkflowFn,
    ) -> &mut Self {
        self.registrations.push(Registration {
            name,
            matches,
            policy,
            run,
            generation: 0,
            last_accepted: None,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }

    /// Registered workflow names with their policies, in registration order.
    pub fn policies(&self) -> Vec<(&'static str, Policy)> {
        self.registrations
            .iter()
            .map(|registration| (registration.name, registration.policy))
            .collect()
    }

    /// `false` once a newer run of the originating workflow was started.
    pub(crate) fn is_current(&self, origin: Origin) -> bool {
        self.registrations
            .get(origin.registration)
            .is_some_and(|registration| registration.generation == origin.generation)
    }

    /// Offers `action` to every registration. Must run inside a tokio runtime.
    pub(crate) fn handle(&mut self, action: &Action, tx: &mpsc::UnboundedSender<Envelope>) {
        let now = Instant::now();
        for (index, registration) in self.registrations.iter_mut().enumerate() {
            if !(registration.matches)(action) {
                continue;
            }

            let origin = match registration.policy {
                Policy::Every => None,
                Policy::Latest => {
                    registration.generation += 1;
                    Some(Origin {
                        registration: index,
                        generation: registration.generation,
                    })
                }
                Policy::Throttle(window) => {
                    if let Some(last) = registration.last_accepted {
                        if now.duration_since(last) < window {
                            debug!(
                                workflow = registration.name,
                                kind = action.kind(),
                                "workflow: throttled"
                            );
                            continue;
                        }
                    }
                    registration.last_accepted = Some(now);
                    None
                }
            };

            let ctx = WorkflowContext {
                api: self.api.clone(),
                dispatcher: Dispatcher {
                    tx: tx.clone(),
                    origin,
                    workflow: registration.name,
                },
            };
            debug!(
                workflow = registration.name,
                kind = action.kind(),
                "workflow: started"
            );
            tokio::spawn((registration.run)(action.clone(), ctx));
        }
    }
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
