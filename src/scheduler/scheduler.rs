use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tracing::{debug, info, warn};

use super::handle::{PendingHandle, Resolution, Resolver, Shared, Trigger};
use super::registry::{PendingGuard, PendingKey, PendingRegistry};
use super::SchedulerError;
use crate::intent::{IntentState, MutationIntent};
use crate::model::{Entity, EntityId};

/// Arms grace windows and resolves each intent exactly once.
///
/// Clones share the per-id registry, so a delete started through one clone
/// blocks a second delete of the same id through another.
#[derive(Clone, Default)]
pub struct DeferredScheduler {
    registry: PendingRegistry,
    runtime: Option<Handle>,
}

impl DeferredScheduler {
    /// Scheduler that runs timers on the ambient tokio runtime.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run timers and commits on `runtime`, so `start` can be called from a
    /// thread that is not inside a runtime (e.g. a UI thread).
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// True while a delete of `id` in `E`'s collection is unresolved or committing.
    pub fn is_pending<E: Entity>(&self, id: EntityId) -> bool {
        self.registry.contains(&PendingKey {
            collection: E::COLLECTION,
            id,
        })
    }

    /// Number of targeted intents not yet in a terminal state.
    pub fn pending_count(&self) -> usize {
        self.registry.len()
    }

    /// Arm a grace window for `intent`.
    ///
    /// - `on_cancel` runs synchronously inside the winning `resolve(true)`.
    /// - `on_commit` runs as a task once the intent commits; `Ok` moves the
    ///   intent to `Committed`, `Err` to `Failed`. Any reconciliation of the
    ///   store belongs inside `on_commit`, before it returns.
    ///
    /// Fails with [`SchedulerError::AlreadyPending`] when the intent targets
    /// an id that already has an unresolved intent.
    pub fn start<E, C, F, Er, X>(
        &self,
        intent: MutationIntent<E>,
        window: Duration,
        on_commit: C,
        on_cancel: X,
    ) -> Result<PendingHandle, SchedulerError>
    where
        E: Entity,
        C: FnOnce(MutationIntent<E>) -> F + Send + 'static,
        F: Future<Output = Result<(), Er>> + Send + 'static,
        Er: fmt::Display + Send + 'static,
        X: FnOnce(MutationIntent<E>) + Send + 'static,
    {
        let runtime = match &self.runtime {
            Some(runtime) => runtime.clone(),
            None => Handle::try_current().map_err(|_| SchedulerError::NoRuntime)?,
        };

        let guard = match intent.target_id() {
            Some(id) => self.registry.claim(PendingKey {
                collection: E::COLLECTION,
                id,
            })?,
            None => PendingGuard::none(&self.registry),
        };

        let id = intent.id();
        let kind = intent.kind();
        let target_id = intent.target_id();
        let commit_runtime = runtime.clone();

        let resolver: Resolver = Box::new(move |rejected, shared: Arc<Shared>| {
            if rejected {
                on_cancel(intent);
                drop(guard);
                shared.advance(IntentState::Cancelled);
                debug!(intent = %shared.id, "intent cancelled");
                return Resolution::Cancelled;
            }

            shared.advance(IntentState::Committing);
            let task = CommitTask {
                guard: Some(guard),
                shared,
            };
            commit_runtime.spawn(async move {
                let outcome = on_commit(intent).await;
                task.finish(outcome);
            });
            Resolution::Committing
        });

        let shared = Arc::new(Shared::new(id, kind, E::COLLECTION, target_id, resolver));

        let timer = PendingHandle::new(Arc::clone(&shared));
        let task = runtime.spawn(async move {
            tokio::time::sleep(window).await;
            timer.resolve_from(Trigger::Timeout, false);
        });
        shared.set_timer(task.abort_handle());

        debug!(
            intent = %id,
            %kind,
            collection = E::COLLECTION,
            target = ?target_id,
            window_ms = window.as_millis() as u64,
            "intent armed"
        );

        Ok(PendingHandle::new(shared))
    }
}

/// The committing half of an intent, owned by the spawned commit task.
///
/// Holds the registry guard until the commit reports. If the task goes away
/// without reporting (panic in `on_commit`, abort, runtime shutdown), drop
/// releases the key and moves the intent to `Failed`.
struct CommitTask {
    guard: Option<PendingGuard>,
    shared: Arc<Shared>,
}

impl CommitTask {
    fn finish<Er: fmt::Display>(mut self, outcome: Result<(), Er>) {
        drop(self.guard.take());
        let shared = &self.shared;
        match outcome {
            Ok(()) => {
                info!(
                    intent = %shared.id,
                    kind = %shared.kind,
                    collection = shared.collection,
                    target = ?shared.target_id,
                    "intent committed"
                );
                shared.advance(IntentState::Committed);
            }
            Err(err) => {
                warn!(
                    intent = %shared.id,
                    kind = %shared.kind,
                    collection = shared.collection,
                    target = ?shared.target_id,
                    error = %err,
                    "intent commit failed"
                );
                shared.advance(IntentState::Failed);
            }
        }
    }
}

impl Drop for CommitTask {
    fn drop(&mut self) {
        let Some(guard) = self.guard.take() else {
            return;
        };
        drop(guard);
        if self.shared.advance(IntentState::Failed) {
            warn!(
                intent = %self.shared.id,
                kind = %self.shared.kind,
                collection = self.shared.collection,
                target = ?self.shared.target_id,
                "commit task ended without an outcome"
            );
        }
    }
}
