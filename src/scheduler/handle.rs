use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::{debug, trace};

use crate::intent::{IntentId, IntentKind, IntentState};
use crate::model::EntityId;

/// What fired a resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// An explicit Undo or Confirm.
    User,
    /// The grace window elapsed.
    Timeout,
}

/// Result of a resolution attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// This attempt won and rolled the intent back.
    Cancelled,
    /// This attempt won and started the commit.
    Committing,
    /// Another attempt already won; nothing happened.
    AlreadyResolved,
}

/// Consumed by whichever attempt resolves the intent first.
pub(crate) type Resolver = Box<dyn FnOnce(bool, Arc<Shared>) -> Resolution + Send>;

pub(crate) struct Shared {
    pub(crate) id: IntentId,
    pub(crate) kind: IntentKind,
    pub(crate) collection: &'static str,
    pub(crate) target_id: Option<EntityId>,
    resolver: Mutex<Option<Resolver>>,
    timer: Mutex<Option<AbortHandle>>,
    state: watch::Sender<IntentState>,
}

impl Shared {
    pub(crate) fn new(
        id: IntentId,
        kind: IntentKind,
        collection: &'static str,
        target_id: Option<EntityId>,
        resolver: Resolver,
    ) -> Self {
        let (state, _) = watch::channel(IntentState::Pending);
        Self {
            id,
            kind,
            collection,
            target_id,
            resolver: Mutex::new(Some(resolver)),
            timer: Mutex::new(None),
            state,
        }
    }

    /// Move to `next` if the transition table allows it. Returns whether it moved.
    pub(crate) fn advance(&self, next: IntentState) -> bool {
        self.state.send_if_modified(|current| {
            if current.can_transition_to(next) {
                *current = next;
                true
            } else {
                false
            }
        })
    }

    pub(crate) fn set_timer(&self, timer: AbortHandle) {
        *self.timer.lock().unwrap_or_else(PoisonError::into_inner) = Some(timer);
    }

    fn take_timer(&self) -> Option<AbortHandle> {
        self.timer
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    /// The one-shot token. Exactly one caller ever gets `Some`.
    fn take_resolver(&self) -> Option<Resolver> {
        self.resolver
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Handle to a pending intent, returned by
/// [`DeferredScheduler::start`](super::DeferredScheduler::start).
///
/// Cheap to clone; all clones resolve the same intent. Dropping every handle
/// does not cancel anything - the window still runs out and commits.
#[derive(Clone)]
pub struct PendingHandle {
    inner: Arc<Shared>,
}

impl PendingHandle {
    pub(crate) fn new(inner: Arc<Shared>) -> Self {
        Self { inner }
    }

    pub fn id(&self) -> IntentId {
        self.inner.id
    }

    pub fn kind(&self) -> IntentKind {
        self.inner.kind
    }

    pub fn collection(&self) -> &'static str {
        self.inner.collection
    }

    pub fn target_id(&self) -> Option<EntityId> {
        self.inner.target_id
    }

    /// Current lifecycle state.
    pub fn state(&self) -> IntentState {
        *self.inner.state.borrow()
    }

    /// True once the intent has left `Pending`.
    pub fn is_resolved(&self) -> bool {
        self.state() != IntentState::Pending
    }

    /// Resolve the intent: `rejected == true` cancels, `false` commits.
    ///
    /// Only the first call across all clones and the timer has any effect.
    pub fn resolve(&self, rejected: bool) -> Resolution {
        self.resolve_from(Trigger::User, rejected)
    }

    /// The "Undo" action.
    pub fn undo(&self) -> Resolution {
        self.resolve(true)
    }

    /// The "Confirm" action.
    pub fn confirm(&self) -> Resolution {
        self.resolve(false)
    }

    pub(crate) fn resolve_from(&self, trigger: Trigger, rejected: bool) -> Resolution {
        let Some(resolver) = self.inner.take_resolver() else {
            trace!(
                intent = %self.inner.id,
                ?trigger,
                rejected,
                "intent already resolved; ignoring"
            );
            return Resolution::AlreadyResolved;
        };

        if trigger == Trigger::User {
            if let Some(timer) = self.inner.take_timer() {
                timer.abort();
            }
        }

        debug!(
            intent = %self.inner.id,
            kind = %self.inner.kind,
            collection = self.inner.collection,
            target = ?self.inner.target_id,
            ?trigger,
            rejected,
            "resolving intent"
        );
        resolver(rejected, Arc::clone(&self.inner))
    }

    /// Wait until the intent reaches `Cancelled`, `Committed` or `Failed`.
    ///
    /// Store reconciliation for that outcome has already happened when this
    /// returns. A commit task that dies before reporting (panic, abort,
    /// runtime shutdown) settles as `Failed` without reconciliation.
    pub async fn settled(&self) -> IntentState {
        let mut rx = self.inner.state.subscribe();
        let result = rx.wait_for(|state| state.is_terminal()).await.map(|s| *s);
        result.unwrap_or_else(|_| *self.inner.state.borrow())
    }
}

impl std::fmt::Debug for PendingHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingHandle")
            .field("id", &self.inner.id)
            .field("kind", &self.inner.kind)
            .field("collection", &self.inner.collection)
            .field("target_id", &self.inner.target_id)
            .field("state", &self.state())
            .finish()
    }
}
