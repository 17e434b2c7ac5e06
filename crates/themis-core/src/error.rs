//! Error taxonomy shared by every Themis service.
//!
//! Each service call surfaces exactly one of these; the HTTP layer maps them
//! onto status codes.

use thiserror::Error;
use uuid::Uuid;

use crate::visit::ApprovalStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("authentication required")]
  Unauthenticated,

  #[error("forbidden")]
  Forbidden,

  #[error("{0} not found")]
  NotFound(String),

  #[error("validation failed: {0}")]
  Validation(String),

  #[error("visit request {request_id} is already {status}")]
  InvalidStateTransition {
    request_id: Uuid,
    status:     ApprovalStatus,
  },

  #[error("visitor {visitor_id} is blacklisted for puc {puc_id}")]
  Blacklisted { visitor_id: Uuid, puc_id: Uuid },

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("credential error: {0}")]
  Credentials(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Stable snake_case identifier for the error kind, used in API bodies.
  pub fn kind(&self) -> &'static str {
    match self {
      Self::Unauthenticated => "unauthenticated",
      Self::Forbidden => "forbidden",
      Self::NotFound(_) => "not_found",
      Self::Validation(_) => "validation_error",
      Self::InvalidStateTransition { .. } => "invalid_state_transition",
      Self::Blacklisted { .. } => "blacklisted",
      Self::Conflict(_) => "conflict",
      Self::Credentials(_) | Self::Store(_) => "internal",
    }
  }

  /// Lift a backend error into the taxonomy. Backends decide which of their
  /// failures are domain outcomes (e.g. a lost compare-and-set) and which are
  /// internal.
  pub fn from_store<E: Into<Error>>(err: E) -> Self { err.into() }

  pub(crate) fn validation(msg: impl Into<String>) -> Self {
    Self::Validation(msg.into())
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
