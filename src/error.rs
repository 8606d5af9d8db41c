//! Error taxonomy for the backend API seam.
//!
//! Three kinds of failure cross the transport boundary, and they are handled
//! very differently:
//!
//! - [`ApiError::Validation`] — the backend rejected the entity (4xx with a
//!   field/entity message). Recovered locally: the gateway turns it into a
//!   `*Failed` command so the message lands in the owning slice's error slot.
//!   Cache data is never touched.
//! - [`ApiError::Transport`] — 5xx or network failure. Never absorbed into
//!   cache state; logged and propagated to the caller.
//! - [`ApiError::NotFound`] — a detail request named an id the backend does
//!   not know. Propagated so the router can show a not-found view.

use thiserror::Error;

use crate::model::EntityId;

/// Result alias used throughout the gateway.
pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// A failure reported by the backend API collaborator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend rejected the request with a user-facing message (4xx).
    #[error("{0}")]
    Validation(String),

    /// The request never completed cleanly (network failure or 5xx).
    #[error("transport failure: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The requested entity does not exist on the backend.
    #[error("not found: {0}")]
    NotFound(EntityId),
}

impl ApiError {
    /// Build a transport error from a plain message.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            source: None,
        }
    }

    /// True for failures that are recovered locally (attached to an error
    /// slot rather than propagated).
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }
}
