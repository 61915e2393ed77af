//! Deferred commits - a grace window between a user action and its backend call.
//!
//! [`DeferredScheduler::start`] arms a timer for a [`MutationIntent`] and
//! returns a [`PendingHandle`]. The intent is resolved exactly once, by
//! whichever comes first:
//!
//! - an explicit `resolve(true)` / `undo()` - runs the cancel callback, no backend call
//! - an explicit `resolve(false)` / `confirm()` - runs the commit callback now
//! - the window elapsing - runs the commit callback
//!
//! Every later attempt (a second click, or the timer firing after a click)
//! returns [`Resolution::AlreadyResolved`] and does nothing.
//!
//! ## Example
//!
//! ```
//! use std::time::Duration;
//! use tourdesk::{DeferredScheduler, IntentState, MutationIntent, Resolution, Tour};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let scheduler = DeferredScheduler::new();
//! let intent = MutationIntent::delete(Tour { id: 1, ..Tour::default() });
//!
//! let handle = scheduler
//!     .start(
//!         intent,
//!         Duration::from_secs(3),
//!         |_intent| async { Ok::<(), String>(()) },
//!         |_intent| {},
//!     )
//!     .unwrap();
//!
//! assert_eq!(handle.undo(), Resolution::Cancelled);
//! assert_eq!(handle.confirm(), Resolution::AlreadyResolved);
//! assert_eq!(handle.settled().await, IntentState::Cancelled);
//! # }
//! ```
//!
//! [`MutationIntent`]: crate::MutationIntent

mod handle;
mod registry;
mod scheduler;

use std::fmt;

use crate::model::EntityId;

pub use handle::{PendingHandle, Resolution, Trigger};
pub use scheduler::DeferredScheduler;

/// Error type for arming a deferred commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// A delete on this id is still inside its window or still committing.
    AlreadyPending {
        collection: &'static str,
        id: EntityId,
    },
    /// No tokio runtime was available to run the timer on.
    NoRuntime,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchedulerError::AlreadyPending { collection, id } => {
                write!(f, "a mutation is already pending for {}:{}", collection, id)
            }
            SchedulerError::NoRuntime => {
                write!(f, "deferred commit requires a tokio runtime")
            }
        }
    }
}

impl std::error::Error for SchedulerError {}
