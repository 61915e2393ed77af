use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use super::{Gateway, GatewayError, UpdateGateway};
use crate::model::{Draft, Entity, EntityId};

/// A recorded gateway invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayCall {
    List,
    Delete(EntityId),
    Create,
    Update(EntityId),
}

struct State<E> {
    entities: BTreeMap<EntityId, E>,
    next_id: EntityId,
    failures: VecDeque<GatewayError>,
    calls: Vec<GatewayCall>,
    latency: Option<Duration>,
}

/// In-memory backend. Clone-friendly via Arc; clones share state.
///
/// Ids for created entities continue from the highest seeded id.
/// Failures queued with [`fail_next`](Self::fail_next) are consumed by the
/// next delete, create or update, in order.
pub struct InMemoryGateway<E> {
    state: Arc<Mutex<State<E>>>,
}

impl<E> Clone for InMemoryGateway<E> {
    fn clone(&self) -> Self {
        Self {
            state: Arc::clone(&self.state),
        }
    }
}

impl<E: Entity> Default for InMemoryGateway<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> InMemoryGateway<E> {
    pub fn new() -> Self {
        Self::with_entities(Vec::new())
    }

    /// Seed the backend with existing entities.
    pub fn with_entities(entities: impl IntoIterator<Item = E>) -> Self {
        let entities: BTreeMap<EntityId, E> =
            entities.into_iter().map(|e| (e.id(), e)).collect();
        let next_id = entities.keys().next_back().copied().unwrap_or(0) + 1;
        Self {
            state: Arc::new(Mutex::new(State {
                entities,
                next_id,
                failures: VecDeque::new(),
                calls: Vec::new(),
                latency: None,
            })),
        }
    }

    /// Delay every call by `latency`.
    pub fn with_latency(self, latency: Duration) -> Self {
        self.state().latency = Some(latency);
        self
    }

    fn state(&self) -> MutexGuard<'_, State<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make the next delete, create or update fail with `error`.
    pub fn fail_next(&self, error: GatewayError) {
        self.state().failures.push_back(error);
    }

    /// Every call received so far, oldest first.
    pub fn calls(&self) -> Vec<GatewayCall> {
        self.state().calls.clone()
    }

    pub fn delete_calls(&self) -> Vec<EntityId> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                GatewayCall::Delete(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn create_calls(&self) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| **call == GatewayCall::Create)
            .count()
    }

    pub fn update_calls(&self) -> Vec<EntityId> {
        self.state()
            .calls
            .iter()
            .filter_map(|call| match call {
                GatewayCall::Update(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// Backend-side copy of `id`.
    pub fn get(&self, id: EntityId) -> Option<E> {
        self.state().entities.get(&id).cloned()
    }

    /// Backend-side ids, ascending.
    pub fn ids(&self) -> Vec<EntityId> {
        self.state().entities.keys().copied().collect()
    }

    async fn delay(&self) {
        let latency = self.state().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl<E: Entity> Gateway<E> for InMemoryGateway<E> {
    async fn list(&self) -> Result<Vec<E>, GatewayError> {
        self.delay().await;
        let mut state = self.state();
        state.calls.push(GatewayCall::List);
        // Newest first, so callers cannot lean on the backend's ordering.
        Ok(state.entities.values().rev().cloned().collect())
    }

    async fn delete(&self, id: EntityId) -> Result<(), GatewayError> {
        self.delay().await;
        let mut state = self.state();
        state.calls.push(GatewayCall::Delete(id));
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        match state.entities.remove(&id) {
            Some(_) => Ok(()),
            None => Err(GatewayError::rejected(
                404,
                format!("{} {} not found", E::LABEL, id),
            )),
        }
    }

    async fn create(&self, draft: E::Draft) -> Result<E, GatewayError> {
        self.delay().await;
        let mut state = self.state();
        state.calls.push(GatewayCall::Create);
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        let id = state.next_id;
        state.next_id += 1;
        let entity = draft.into_entity(id);
        state.entities.insert(id, entity.clone());
        Ok(entity)
    }
}

impl<E: Entity> UpdateGateway<E> for InMemoryGateway<E> {
    async fn update(&self, entity: E) -> Result<E, GatewayError> {
        self.delay().await;
        let id = entity.id();
        let mut state = self.state();
        state.calls.push(GatewayCall::Update(id));
        if let Some(err) = state.failures.pop_front() {
            return Err(err);
        }
        match state.entities.get_mut(&id) {
            Some(stored) => {
                *stored = entity.clone();
                Ok(entity)
            }
            None => Err(GatewayError::rejected(
                404,
                format!("{} {} not found", E::LABEL, id),
            )),
        }
    }
}
