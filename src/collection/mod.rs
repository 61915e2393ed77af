//! CollectionStore - the client-side set of entities a list view renders.
//!
//! The store is keyed by entity id and always iterates in ascending id order.
//! Order is a property of the key, never of insertion history, so an entity
//! put back after a rollback lands in its correct place without the store
//! remembering where it used to be.
//!
//! ## Example
//!
//! ```
//! use tourdesk::{CollectionStore, Tour};
//!
//! let store = CollectionStore::from_items(vec![
//!     Tour { id: 3, ..Tour::default() },
//!     Tour { id: 1, ..Tour::default() },
//! ]);
//!
//! let removed = store.remove(3).unwrap();
//! assert!(removed.is_some());
//! store.insert(removed.unwrap()).unwrap();
//! assert_eq!(store.ids().unwrap(), vec![1, 3]);
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::model::{Entity, EntityId};

/// Error type for collection store operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store lock was poisoned by a panicking writer.
    LockPoisoned(&'static str),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::LockPoisoned(operation) => {
                write!(f, "collection lock poisoned during {}", operation)
            }
        }
    }
}

impl std::error::Error for StoreError {}

/// Outcome of [`CollectionStore::insert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Inserted {
    /// The id was absent and is now present.
    New,
    /// An entity with the same id was overwritten.
    Replaced,
}

/// Ordered, identity-keyed entity set. Clone-friendly via Arc; every clone
/// is another handle to the same entities.
pub struct CollectionStore<E> {
    items: Arc<RwLock<BTreeMap<EntityId, E>>>,
}

impl<E> Clone for CollectionStore<E> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<E: Entity> Default for CollectionStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> CollectionStore<E> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            items: Arc::new(RwLock::new(BTreeMap::new())),
        }
    }

    /// Build a store from entities in arbitrary order. A later duplicate id
    /// replaces an earlier one.
    pub fn from_items(items: impl IntoIterator<Item = E>) -> Self {
        Self {
            items: Arc::new(RwLock::new(index(items))),
        }
    }

    fn read(
        &self,
        operation: &'static str,
    ) -> Result<RwLockReadGuard<'_, BTreeMap<EntityId, E>>, StoreError> {
        self.items
            .read()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    fn write(
        &self,
        operation: &'static str,
    ) -> Result<RwLockWriteGuard<'_, BTreeMap<EntityId, E>>, StoreError> {
        self.items
            .write()
            .map_err(|_| StoreError::LockPoisoned(operation))
    }

    /// Swap the whole contents, e.g. after a fresh fetch or a search.
    pub fn replace_all(&self, items: impl IntoIterator<Item = E>) -> Result<usize, StoreError> {
        let fresh = index(items);
        let mut storage = self.write("replace_all")?;
        *storage = fresh;
        Ok(storage.len())
    }

    /// Insert or replace by id. Never produces a duplicate.
    pub fn insert(&self, entity: E) -> Result<Inserted, StoreError> {
        let mut storage = self.write("insert")?;
        match storage.insert(entity.id(), entity) {
            Some(_) => Ok(Inserted::Replaced),
            None => Ok(Inserted::New),
        }
    }

    /// Remove by id, returning the removed entity.
    pub fn remove(&self, id: EntityId) -> Result<Option<E>, StoreError> {
        let mut storage = self.write("remove")?;
        Ok(storage.remove(&id))
    }

    /// Copy of the entity's current value, taken before a removal so the
    /// removal can be undone.
    pub fn snapshot_of(&self, id: EntityId) -> Result<Option<E>, StoreError> {
        self.get(id)
    }

    pub fn get(&self, id: EntityId) -> Result<Option<E>, StoreError> {
        let storage = self.read("get")?;
        Ok(storage.get(&id).cloned())
    }

    pub fn contains(&self, id: EntityId) -> Result<bool, StoreError> {
        let storage = self.read("contains")?;
        Ok(storage.contains_key(&id))
    }

    /// All entities in ascending id order.
    pub fn items(&self) -> Result<Vec<E>, StoreError> {
        let storage = self.read("items")?;
        Ok(storage.values().cloned().collect())
    }

    /// All ids in ascending order.
    pub fn ids(&self) -> Result<Vec<EntityId>, StoreError> {
        let storage = self.read("ids")?;
        Ok(storage.keys().copied().collect())
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.read("len")?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.read("is_empty")?.is_empty())
    }
}

fn index<E: Entity>(items: impl IntoIterator<Item = E>) -> BTreeMap<EntityId, E> {
    items.into_iter().map(|e| (e.id(), e)).collect()
}
