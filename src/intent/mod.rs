//! Mutation intents - one pending delete or create awaiting its grace window.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::{Entity, EntityId};

/// Identity of a single intent, used to correlate prompts, notices and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IntentId(Uuid);

impl IntentId {
    pub fn new() -> Self {
        IntentId(Uuid::new_v4())
    }
}

impl Default for IntentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IntentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentKind {
    Delete,
    Create,
}

impl fmt::Display for IntentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntentKind::Delete => write!(f, "delete"),
            IntentKind::Create => write!(f, "create"),
        }
    }
}

/// Lifecycle of an intent.
///
/// ```text
/// Pending -> Cancelled
/// Pending -> Committing -> Committed
///                       -> Failed
/// ```
///
/// `Cancelled`, `Committed` and `Failed` are absorbing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentState {
    #[default]
    Pending,
    Cancelled,
    Committing,
    Committed,
    Failed,
}

impl IntentState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            IntentState::Cancelled | IntentState::Committed | IntentState::Failed
        )
    }

    pub fn can_transition_to(self, next: IntentState) -> bool {
        matches!(
            (self, next),
            (IntentState::Pending, IntentState::Cancelled)
                | (IntentState::Pending, IntentState::Committing)
                | (IntentState::Committing, IntentState::Committed)
                | (IntentState::Committing, IntentState::Failed)
        )
    }
}

impl fmt::Display for IntentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IntentState::Pending => "pending",
            IntentState::Cancelled => "cancelled",
            IntentState::Committing => "committing",
            IntentState::Committed => "committed",
            IntentState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// What the intent will do once it commits.
#[derive(Debug, Clone)]
enum Operation<E: Entity> {
    /// Remove `snapshot.id()`; the snapshot restores the entity on rollback.
    Delete { snapshot: E },
    /// Send `payload` to the backend; nothing is shown until it answers.
    Create { payload: E::Draft },
}

/// A pending operation on one collection.
///
/// Intents are plain values. Their lifecycle state is owned by the
/// [`PendingHandle`](crate::PendingHandle) the scheduler returns, which is
/// the only place a transition can happen.
#[derive(Debug, Clone)]
pub struct MutationIntent<E: Entity> {
    id: IntentId,
    operation: Operation<E>,
}

impl<E: Entity> MutationIntent<E> {
    /// Intent to delete the entity captured in `snapshot`.
    pub fn delete(snapshot: E) -> Self {
        Self {
            id: IntentId::new(),
            operation: Operation::Delete { snapshot },
        }
    }

    /// Intent to create a new entity from `payload`.
    pub fn create(payload: E::Draft) -> Self {
        Self {
            id: IntentId::new(),
            operation: Operation::Create { payload },
        }
    }

    pub fn id(&self) -> IntentId {
        self.id
    }

    pub fn kind(&self) -> IntentKind {
        match self.operation {
            Operation::Delete { .. } => IntentKind::Delete,
            Operation::Create { .. } => IntentKind::Create,
        }
    }

    /// Target id of a delete; `None` for a create.
    pub fn target_id(&self) -> Option<EntityId> {
        match &self.operation {
            Operation::Delete { snapshot } => Some(snapshot.id()),
            Operation::Create { .. } => None,
        }
    }

    pub fn snapshot(&self) -> Option<&E> {
        match &self.operation {
            Operation::Delete { snapshot } => Some(snapshot),
            Operation::Create { .. } => None,
        }
    }

    pub fn payload(&self) -> Option<&E::Draft> {
        match &self.operation {
            Operation::Delete { .. } => None,
            Operation::Create { payload } => Some(payload),
        }
    }

    pub fn into_snapshot(self) -> Option<E> {
        match self.operation {
            Operation::Delete { snapshot } => Some(snapshot),
            Operation::Create { .. } => None,
        }
    }

    pub fn into_payload(self) -> Option<E::Draft> {
        match self.operation {
            Operation::Delete { .. } => None,
            Operation::Create { payload } => Some(payload),
        }
    }
}
