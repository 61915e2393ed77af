//! Client core for a tour booking app: optimistic deletes and deferred
//! creates with a short undo window, rollback on backend failure, and a
//! pluggable backend gateway.
//!
//! The building blocks are usable on their own:
//!
//! - [`CollectionStore`] - the sorted, id-keyed list a view renders
//! - [`DeferredScheduler`] - arms a grace window and resolves each intent once
//! - [`ConfirmationChannel`] - where Undo / Confirm prompts and notices go
//! - [`Gateway`] - list / delete / create against the backend, plus
//!   [`UpdateGateway`] for collections that can be edited
//!
//! [`OptimisticCollection`] wires them together for one collection.

mod collection;
mod config;
mod confirm;
mod flow;
mod gateway;
mod intent;
mod model;
mod scheduler;

pub use collection::{CollectionStore, Inserted, StoreError};
pub use config::{ClientConfig, ConfigError, GraceWindows};
pub use confirm::{
    ConfirmationChannel, ConfirmationPrompt, Notice, NoticeLevel, RecordingChannel,
    TracingChannel,
};
#[cfg(feature = "emitter")]
pub use confirm::{EmitterChannel, PromptView, NOTICE_EVENT, PROMPT_EVENT};
pub use flow::{FlowError, FlowMessages, OptimisticCollection};
#[cfg(feature = "http")]
pub use gateway::{HttpBookingGateway, HttpClient, HttpCommentGateway, HttpTourGateway};
pub use gateway::{Gateway, GatewayCall, GatewayError, InMemoryGateway, UpdateGateway};
pub use intent::{IntentId, IntentKind, IntentState, MutationIntent};
pub use model::{
    Booking, BookingDraft, Comment, CommentDraft, Draft, Entity, EntityId, FieldError, Tour,
    TourDraft, TourSearch, ValidationErrors,
};
pub use scheduler::{DeferredScheduler, PendingHandle, Resolution, SchedulerError, Trigger};
