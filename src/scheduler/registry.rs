use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::SchedulerError;
use crate::model::EntityId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct PendingKey {
    pub collection: &'static str,
    pub id: EntityId,
}

/// Ids with an outstanding intent. One entry per (collection, id).
#[derive(Clone, Default)]
pub(crate) struct PendingRegistry {
    keys: Arc<Mutex<HashSet<PendingKey>>>,
}

impl PendingRegistry {
    fn keys(&self) -> MutexGuard<'_, HashSet<PendingKey>> {
        // The set is only ever inserted into or removed from, so a panic
        // elsewhere cannot leave it half-updated.
        self.keys.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reserve `key`, or fail if it is already reserved.
    pub fn claim(&self, key: PendingKey) -> Result<PendingGuard, SchedulerError> {
        if !self.keys().insert(key) {
            return Err(SchedulerError::AlreadyPending {
                collection: key.collection,
                id: key.id,
            });
        }
        Ok(PendingGuard {
            registry: self.clone(),
            key: Some(key),
        })
    }

    pub fn contains(&self, key: &PendingKey) -> bool {
        self.keys().contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys().len()
    }
}

/// Releases its key when dropped, including when a commit task panics.
pub(crate) struct PendingGuard {
    registry: PendingRegistry,
    key: Option<PendingKey>,
}

impl PendingGuard {
    /// Guard for an intent with no target id; releases nothing.
    pub fn none(registry: &PendingRegistry) -> Self {
        PendingGuard {
            registry: registry.clone(),
            key: None,
        }
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            self.registry.keys().remove(&key);
        }
    }
}
