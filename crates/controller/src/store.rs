//! Single-writer state store.
//!
//! The store task owns [`State`] and the [`WorkflowExecutor`]. Actions are
//! taken off one channel and each is reduced to completion before the next
//! one is looked at. After every action the new snapshot is published, the
//! action is re-broadcast to observers and then offered to the executor.

use std::sync::Arc;

use thiserror::Error;
use tokio::{
    sync::{broadcast, mpsc, watch},
    task::JoinHandle,
};
use tracing::{debug, info};

use crate::{
    actions::Action,
    reducer::{self, State},
    workflows::{Origin, WorkflowExecutor},
};

const ACTION_BROADCAST_CAPACITY: usize = 1024;

/// An action on its way into the store, stamped with the latest-only run
/// that produced it, if any.
#[derive(Debug)]
pub(crate) struct Envelope {
    pub(crate) action: Action,
    pub(crate) origin: Option<Origin>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("state store is no longer running")]
    Closed,
}

/// Cloneable entry point used by front ends to talk to a running store.
#[derive(Clone)]
pub struct StoreHandle {
    tx: mpsc::UnboundedSender<Envelope>,
    snapshots: watch::Receiver<Arc<State>>,
    actions: broadcast::Sender<Action>,
}

impl StoreHandle {
    pub fn dispatch(&self, action: Action) -> Result<(), DispatchError> {
        self.tx
            .send(Envelope {
                action,
                origin: None,
            })
            .map_err(|_| DispatchError::Closed)
    }

    /// Latest published state.
    pub fn snapshot(&self) -> Arc<State> {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<State>> {
        self.snapshots.clone()
    }

    /// Every reduced action, in reduction order.
    pub fn subscribe_actions(&self) -> broadcast::Receiver<Action> {
        self.actions.subscribe()
    }

    /// Dispatches a `*_REQUESTED` action and waits for the first terminal
    /// action of the same lifecycle. Returns that action together with the
    /// latest snapshot once it has been observed; the snapshot includes the
    /// terminal action and may include actions reduced after it.
    ///
    /// Actions without a lifecycle resolve as soon as they are reduced.
    pub async fn dispatch_and_wait(
        &self,
        action: Action,
    ) -> Result<(Action, Arc<State>), DispatchError> {
        let mut actions = self.subscribe_actions();
        let base = action.lifecycle_base();
        let kind = action.kind();
        self.dispatch(action)?;

        loop {
            let observed = match actions.recv().await {
                Ok(observed) => observed,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    debug!(skipped, "store: action observer lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return Err(DispatchError::Closed),
            };
            let done = match base {
                Some(base) => observed.is_terminal() && observed.lifecycle_base() == Some(base),
                None => observed.kind() == kind,
            };
            if done {
                return Ok((observed, self.snapshot()));
            }
        }
    }
}

pub struct Store {
    state: State,
    executor: WorkflowExecutor,
    rx: mpsc::UnboundedReceiver<Envelope>,
    tx: mpsc::WeakUnboundedSender<Envelope>,
    snapshots: watch::Sender<Arc<State>>,
    actions: broadcast::Sender<Action>,
}

impl Store {
    pub fn new(state: State, executor: WorkflowExecutor) -> (Self, StoreHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (snapshots, snapshot_rx) = watch::channel(Arc::new(state.clone()));
        let (actions, _) = broadcast::channel(ACTION_BROADCAST_CAPACITY);

        let store = Self {
            state,
            executor,
            rx,
            tx: tx.downgrade(),
            snapshots,
            actions: actions.clone(),
        };
        let handle = StoreHandle {
            tx,
            snapshots: snapshot_rx,
            actions,
        };
        (store, handle)
    }

    /// Starts the store loop on the current runtime with a default state.
    pub fn spawn(executor: WorkflowExecutor) -> (StoreHandle, JoinHandle<()>) {
        let (store, handle) = Self::new(State::default(), executor);
        (handle, tokio::spawn(store.run()))
    }

    /// Runs until every handle and every in-flight workflow has been dropped.
    pub async fn run(mut self) {
        info!(workflows = self.executor.len(), "store: started");
        while let Some(envelope) = self.rx.recv().await {
            self.apply(envelope);
        }
        info!("store: stopped");
    }

    fn apply(&mut self, Envelope { action, origin }: Envelope) {
        if let Some(origin) = origin {
            if !self.executor.is_current(origin) {
                debug!(kind = action.kind(), "store: dropping result of superseded workflow");
                return;
            }
        }

        let state = std::mem::take(&mut self.state);
        self.state = reducer::reduce(state, &action);
        debug!(kind = action.kind(), "store: reduced action");

        self.snapshots.send_replace(Arc::new(self.state.clone()));
        // No observers is fine.
        let _ = self.actions.send(action.clone());

        match self.tx.upgrade() {
            Some(tx) => self.executor.handle(&action, &tx),
            None => debug!(kind = action.kind(), "store: draining, workflows not started"),
        }
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
