//! Optimistic flows - the orchestration that ties store, scheduler, channel
//! and gateway together for one collection.
//!
//! - **Delete** removes the entity from the store at once, arms the delete
//!   window and prompts. Undo puts the snapshot back; commit calls the
//!   gateway and puts the snapshot back if the backend refuses.
//! - **Create** validates the draft, arms the create window and prompts.
//!   Nothing is shown until the backend answers with the new entity.
//! - **Create now** skips the window: validate, call the backend, insert.
//!   Comments and bookings are added this way.
//! - **Update** sends an edited entity and swaps the stored copy for the
//!   backend's answer. Only for gateways that implement `UpdateGateway`.
//!
//! ## Example
//!
//! ```
//! use tourdesk::{
//!     InMemoryGateway, IntentState, OptimisticCollection, RecordingChannel, Tour,
//! };
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let gateway = InMemoryGateway::with_entities(vec![
//!     Tour { id: 1, ..Tour::default() },
//!     Tour { id: 2, ..Tour::default() },
//! ]);
//! let channel = RecordingChannel::new();
//! let tours: OptimisticCollection<Tour, _, _> =
//!     OptimisticCollection::new(gateway, channel.clone());
//! tours.load().await.unwrap();
//!
//! let handle = tours.delete(2).unwrap().unwrap();
//! assert_eq!(tours.ids().unwrap(), vec![1]);
//!
//! channel.last_prompt().unwrap().undo();
//! assert_eq!(handle.settled().await, IntentState::Cancelled);
//! assert_eq!(tours.ids().unwrap(), vec![1, 2]);
//! # }
//! ```

mod messages;
mod optimistic;

use std::fmt;

use crate::collection::StoreError;
use crate::gateway::GatewayError;
use crate::model::ValidationErrors;
use crate::scheduler::SchedulerError;

pub use messages::FlowMessages;
pub use optimistic::OptimisticCollection;

/// Error type for optimistic flow operations.
#[derive(Debug, Clone, PartialEq)]
pub enum FlowError {
    Store(StoreError),
    Scheduler(SchedulerError),
    Gateway(GatewayError),
    /// The draft failed validation; nothing was scheduled.
    Invalid(ValidationErrors),
}

impl fmt::Display for FlowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowError::Store(err) => write!(f, "store error: {}", err),
            FlowError::Scheduler(err) => write!(f, "scheduler error: {}", err),
            FlowError::Gateway(err) => write!(f, "gateway error: {}", err),
            FlowError::Invalid(err) => write!(f, "invalid draft: {}", err),
        }
    }
}

impl std::error::Error for FlowError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FlowError::Store(err) => Some(err),
            FlowError::Scheduler(err) => Some(err),
            FlowError::Gateway(err) => Some(err),
            FlowError::Invalid(_) => None,
        }
    }
}

impl From<StoreError> for FlowError {
    fn from(err: StoreError) -> Self {
        FlowError::Store(err)
    }
}

impl From<SchedulerError> for FlowError {
    fn from(err: SchedulerError) -> Self {
        FlowError::Scheduler(err)
    }
}

impl From<GatewayError> for FlowError {
    fn from(err: GatewayError) -> Self {
        FlowError::Gateway(err)
    }
}

impl From<ValidationErrors> for FlowError {
    fn from(err: ValidationErrors) -> Self {
        FlowError::Invalid(err)
    }
}
