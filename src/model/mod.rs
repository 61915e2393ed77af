//! Domain entities held by the client - tours, the comments left on them,
//! and the user's bookings.
//!
//! Every entity is identified by an integer id assigned by the backend. Drafts
//! are the not-yet-persisted shape sent to the backend on create; the backend
//! answers with the full entity carrying its server-assigned id.
//!
//! ## Example
//!
//! ```
//! use tourdesk::{Entity, Tour};
//!
//! let tour = Tour {
//!     id: 7,
//!     name: "Dolomites".into(),
//!     ..Tour::default()
//! };
//! assert_eq!(tour.id(), 7);
//! assert_eq!(Tour::COLLECTION, "tours");
//! ```

mod booking;
mod comment;
mod tour;
mod validation;

use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

pub use booking::{Booking, BookingDraft};
pub use comment::{Comment, CommentDraft};
pub use tour::{Tour, TourDraft, TourSearch};
pub use validation::{FieldError, ValidationErrors};

/// Server-assigned entity identity.
pub type EntityId = i64;

/// Trait for types that live in a [`CollectionStore`](crate::CollectionStore).
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The REST collection name for this entity type (e.g. "tours").
    const COLLECTION: &'static str;

    /// Human-readable singular name, used in user-facing notices.
    const LABEL: &'static str;

    /// Payload sent to the backend to create a new entity of this type.
    type Draft: Draft<Entity = Self>;

    /// Returns the unique identifier for this entity.
    fn id(&self) -> EntityId;
}

/// A not-yet-created entity.
pub trait Draft: fmt::Debug + Serialize + Clone + Send + Sync + 'static {
    type Entity;

    /// Check the draft before it is handed to the backend.
    fn validate(&self) -> Result<(), ValidationErrors> {
        Ok(())
    }

    /// Materialize the draft with a server-assigned id.
    fn into_entity(self, id: EntityId) -> Self::Entity;
}
