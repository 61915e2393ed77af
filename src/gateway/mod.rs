//! Backend gateway - the authoritative list / delete / create calls, and
//! update for the collections the backend lets you edit.
//!
//! The optimistic flows only need three operations per collection, so
//! [`Gateway`] stays narrow; [`UpdateGateway`] adds `PUT`. Implementations
//! provided:
//!
//! - [`InMemoryGateway`] - a scriptable fake backend with call recording and
//!   failure injection, for tests and offline use
//! - [`HttpTourGateway`] / [`HttpCommentGateway`] / [`HttpBookingGateway`] -
//!   the REST service, via `reqwest` (feature `http`)

#[cfg(feature = "http")]
mod http;
mod in_memory;

use std::fmt;
use std::future::Future;

use crate::model::{Entity, EntityId};

#[cfg(feature = "http")]
pub use http::{HttpBookingGateway, HttpClient, HttpCommentGateway, HttpTourGateway};
pub use in_memory::{GatewayCall, InMemoryGateway};

/// Remote operations for one collection of `E`.
pub trait Gateway<E: Entity>: Send + Sync + 'static {
    /// Fetch the collection. Order is whatever the backend returns.
    fn list(&self) -> impl Future<Output = Result<Vec<E>, GatewayError>> + Send;

    /// Delete `id` on the backend.
    fn delete(&self, id: EntityId) -> impl Future<Output = Result<(), GatewayError>> + Send;

    /// Create from `draft`; returns the entity with its server-assigned id.
    fn create(&self, draft: E::Draft) -> impl Future<Output = Result<E, GatewayError>> + Send;
}

/// Collections whose entities can be edited in place.
pub trait UpdateGateway<E: Entity>: Gateway<E> {
    /// Replace `entity` on the backend; returns the stored version.
    fn update(&self, entity: E) -> impl Future<Output = Result<E, GatewayError>> + Send;
}

/// Error type for gateway calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The backend answered with a non-success status. `message` is the
    /// response body, which the backend writes for end users.
    Rejected { status: u16, message: String },
    /// The request never got an answer (connection, timeout, ...).
    Transport(String),
    /// The answer could not be decoded.
    Decode(String),
}

impl GatewayError {
    pub fn rejected(status: u16, message: impl Into<String>) -> Self {
        GatewayError::Rejected {
            status,
            message: message.into(),
        }
    }

    /// The backend's own explanation, if it gave one.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            GatewayError::Rejected { message, .. } if !message.trim().is_empty() => {
                Some(message.trim())
            }
            _ => None,
        }
    }

    /// Text to show the user: the backend's explanation, else `fallback`.
    pub fn display_message(&self, fallback: &str) -> String {
        self.user_message().unwrap_or(fallback).to_string()
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Rejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GatewayError::Rejected { status, message } => {
                write!(f, "backend rejected request ({}): {}", status, message)
            }
            GatewayError::Transport(msg) => write!(f, "gateway transport error: {}", msg),
            GatewayError::Decode(msg) => write!(f, "gateway decode error: {}", msg),
        }
    }
}

impl std::error::Error for GatewayError {}
