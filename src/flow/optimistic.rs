use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use super::{FlowError, FlowMessages};
use crate::collection::CollectionStore;
use crate::config::{ClientConfig, GraceWindows};
use crate::confirm::{ConfirmationChannel, ConfirmationPrompt, Notice};
use crate::gateway::{Gateway, GatewayError, UpdateGateway};
use crate::intent::MutationIntent;
use crate::model::{Draft, Entity, EntityId};
use crate::scheduler::{DeferredScheduler, PendingHandle, SchedulerError};

/// One collection with optimistic delete and deferred create.
///
/// Collections that are not worth an undo window (comments, bookings) can
/// use [`create_now`](Self::create_now) instead, and editable ones get
/// [`update`](Self::update).
///
/// Clone-friendly; clones share the store, gateway, channel and scheduler.
pub struct OptimisticCollection<E, G, C> {
    store: CollectionStore<E>,
    gateway: Arc<G>,
    channel: Arc<C>,
    scheduler: DeferredScheduler,
    windows: GraceWindows,
    notice_ttl: Duration,
    messages: FlowMessages,
}

impl<E, G, C> Clone for OptimisticCollection<E, G, C> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            gateway: Arc::clone(&self.gateway),
            channel: Arc::clone(&self.channel),
            scheduler: self.scheduler.clone(),
            windows: self.windows,
            notice_ttl: self.notice_ttl,
            messages: self.messages.clone(),
        }
    }
}

impl<E, G, C> OptimisticCollection<E, G, C>
where
    E: Entity,
    G: Gateway<E>,
    C: ConfirmationChannel,
{
    pub fn new(gateway: G, channel: C) -> Self {
        Self {
            store: CollectionStore::new(),
            gateway: Arc::new(gateway),
            channel: Arc::new(channel),
            scheduler: DeferredScheduler::new(),
            windows: GraceWindows::default(),
            notice_ttl: ClientConfig::default().notice_duration(),
            messages: FlowMessages::for_entity::<E>(),
        }
    }

    /// Render from an existing store (e.g. one shared with another view).
    pub fn with_store(mut self, store: CollectionStore<E>) -> Self {
        self.store = store;
        self
    }

    /// Share a scheduler, e.g. one built with an explicit runtime handle.
    pub fn with_scheduler(mut self, scheduler: DeferredScheduler) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_windows(mut self, windows: GraceWindows) -> Self {
        self.windows = windows;
        self
    }

    /// How long outcome notices stay up.
    pub fn with_notice_duration(mut self, ttl: Duration) -> Self {
        self.notice_ttl = ttl;
        self
    }

    pub fn with_messages(mut self, messages: FlowMessages) -> Self {
        self.messages = messages;
        self
    }

    /// Take grace windows and notice duration from `config`.
    pub fn with_config(self, config: &ClientConfig) -> Self {
        self.with_windows(config.windows())
            .with_notice_duration(config.notice_duration())
    }

    pub fn store(&self) -> &CollectionStore<E> {
        &self.store
    }

    pub fn scheduler(&self) -> &DeferredScheduler {
        &self.scheduler
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    pub fn windows(&self) -> GraceWindows {
        self.windows
    }

    /// Current entities, ascending by id.
    pub fn items(&self) -> Result<Vec<E>, FlowError> {
        Ok(self.store.items()?)
    }

    pub fn ids(&self) -> Result<Vec<EntityId>, FlowError> {
        Ok(self.store.ids()?)
    }

    /// Fetch the collection from the gateway and install it.
    pub async fn load(&self) -> Result<usize, FlowError> {
        let items = self.gateway.list().await?;
        self.replace_all(items)
    }

    /// Install `items` as the whole collection, sorted by id. Entities with
    /// an unresolved delete stay hidden.
    pub fn replace_all(&self, items: impl IntoIterator<Item = E>) -> Result<usize, FlowError> {
        let scheduler = &self.scheduler;
        let visible = items
            .into_iter()
            .filter(|entity| !scheduler.is_pending::<E>(entity.id()));
        Ok(self.store.replace_all(visible)?)
    }

    /// Optimistically delete `id`.
    ///
    /// The entity disappears from the store immediately. `Ok(None)` when
    /// there is no such entity; nothing is scheduled in that case.
    pub fn delete(&self, id: EntityId) -> Result<Option<PendingHandle>, FlowError> {
        if self.scheduler.is_pending::<E>(id) {
            return Err(SchedulerError::AlreadyPending {
                collection: E::COLLECTION,
                id,
            }
            .into());
        }

        let snapshot = match self.store.remove(id)? {
            Some(snapshot) => snapshot,
            None => {
                debug!(collection = E::COLLECTION, id, "delete of unknown id ignored");
                return Ok(None);
            }
        };
        let restore = snapshot.clone();

        let on_cancel = {
            let store = self.store.clone();
            let channel = Arc::clone(&self.channel);
            let message = self.messages.delete_cancelled.clone();
            let ttl = self.notice_ttl;
            move |intent: MutationIntent<E>| {
                let intent_id = intent.id();
                if let Some(snapshot) = intent.into_snapshot() {
                    restore_snapshot(&store, snapshot);
                }
                channel.notify(Notice::info(message).for_intent(intent_id).auto_close(ttl));
            }
        };

        let on_commit = {
            let store = self.store.clone();
            let gateway = Arc::clone(&self.gateway);
            let channel = Arc::clone(&self.channel);
            let deleted = self.messages.deleted.clone();
            let fallback = self.messages.delete_failed.clone();
            let ttl = self.notice_ttl;
            move |intent: MutationIntent<E>| async move {
                let intent_id = intent.id();
                match gateway.delete(id).await {
                    Ok(()) => {
                        channel.notify(Notice::success(deleted).for_intent(intent_id).auto_close(ttl));
                        Ok(())
                    }
                    Err(err) => {
                        if let Some(snapshot) = intent.into_snapshot() {
                            restore_snapshot(&store, snapshot);
                        }
                        channel.notify(
                            Notice::error(err.display_message(&fallback))
                                .for_intent(intent_id)
                                .auto_close(ttl),
                        );
                        Err::<(), GatewayError>(err)
                    }
                }
            }
        };

        let window = self.windows.delete;
        let handle = match self.scheduler.start(
            MutationIntent::delete(snapshot),
            window,
            on_commit,
            on_cancel,
        ) {
            Ok(handle) => handle,
            Err(err) => {
                restore_snapshot(&self.store, restore);
                return Err(err.into());
            }
        };

        self.present(&handle, window);
        Ok(Some(handle))
    }

    /// Schedule creation of `draft`.
    ///
    /// The draft is validated first. The store is untouched until the
    /// backend returns the created entity.
    pub fn create(&self, draft: E::Draft) -> Result<PendingHandle, FlowError> {
        draft.validate()?;

        let on_cancel = {
            let channel = Arc::clone(&self.channel);
            let message = self.messages.create_cancelled.clone();
            let ttl = self.notice_ttl;
            move |intent: MutationIntent<E>| {
                channel.notify(Notice::info(message).for_intent(intent.id()).auto_close(ttl));
            }
        };

        let on_commit = {
            let store = self.store.clone();
            let gateway = Arc::clone(&self.gateway);
            let channel = Arc::clone(&self.channel);
            let created = self.messages.created.clone();
            let fallback = self.messages.create_failed.clone();
            let ttl = self.notice_ttl;
            let payload = draft.clone();
            move |intent: MutationIntent<E>| async move {
                let intent_id = intent.id();
                match gateway.create(payload).await {
                    Ok(entity) => {
                        if let Err(err) = store.insert(entity) {
                            warn!(intent = %intent_id, error = %err, "created entity not stored");
                        }
                        channel.notify(Notice::success(created).for_intent(intent_id).auto_close(ttl));
                        Ok(())
                    }
                    Err(err) => {
                        channel.notify(
                            Notice::error(err.display_message(&fallback))
                                .for_intent(intent_id)
                                .auto_close(ttl),
                        );
                        Err::<(), GatewayError>(err)
                    }
                }
            }
        };

        let window = self.windows.create;
        let handle = self
            .scheduler
            .start(MutationIntent::create(draft), window, on_commit, on_cancel)?;
        self.present(&handle, window);
        Ok(handle)
    }

    /// Create `draft` on the backend right away, without a grace window.
    ///
    /// The draft is validated first. The created entity is inserted once the
    /// backend returns it; on failure an error notice is sent and the store
    /// is untouched.
    pub async fn create_now(&self, draft: E::Draft) -> Result<E, FlowError> {
        draft.validate()?;
        match self.gateway.create(draft).await {
            Ok(entity) => {
                self.store.insert(entity.clone())?;
                self.notify(Notice::success(self.messages.created.clone()));
                Ok(entity)
            }
            Err(err) => {
                self.notify(Notice::error(err.display_message(&self.messages.create_failed)));
                Err(err.into())
            }
        }
    }

    fn notify(&self, notice: Notice) {
        self.channel.notify(notice.auto_close(self.notice_ttl));
    }

    fn present(&self, handle: &PendingHandle, window: Duration) {
        self.channel.present(ConfirmationPrompt::new(
            handle.clone(),
            self.messages.prompt.clone(),
            window,
        ));
    }
}

impl<E, G, C> OptimisticCollection<E, G, C>
where
    E: Entity,
    G: UpdateGateway<E>,
    C: ConfirmationChannel,
{
    /// Save an edited `entity` and swap the stored copy for the backend's.
    ///
    /// Refused while a delete of the same id is unresolved. If a delete
    /// starts while the request is in flight, the answer is not inserted,
    /// so the entity stays hidden.
    pub async fn update(&self, entity: E) -> Result<E, FlowError> {
        let id = entity.id();
        if self.scheduler.is_pending::<E>(id) {
            return Err(SchedulerError::AlreadyPending {
                collection: E::COLLECTION,
                id,
            }
            .into());
        }

        match self.gateway.update(entity).await {
            Ok(updated) => {
                if self.scheduler.is_pending::<E>(id) {
                    debug!(collection = E::COLLECTION, id, "updated entity has a pending delete");
                } else {
                    self.store.insert(updated.clone())?;
                }
                self.notify(Notice::success(self.messages.updated.clone()));
                Ok(updated)
            }
            Err(err) => {
                self.notify(Notice::error(err.display_message(&self.messages.update_failed)));
                Err(err.into())
            }
        }
    }
}

fn restore_snapshot<E: Entity>(store: &CollectionStore<E>, snapshot: E) {
    let id = snapshot.id();
    match store.insert(snapshot) {
        Ok(_) => debug!(collection = E::COLLECTION, id, "snapshot restored"),
        Err(err) => warn!(collection = E::COLLECTION, id, error = %err, "snapshot restore failed"),
    }
}
