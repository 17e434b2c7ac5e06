//! Error type for `themis-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

use themis_core::visit::ApprovalStatus;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("sqlite error: {0}")]
  Sqlite(#[from] rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("decode error: {0}")]
  Decode(String),

  #[error("username {0:?} is already taken")]
  UsernameTaken(String),

  #[error("crime category {0:?} already exists")]
  CategoryExists(String),

  #[error("{0} not found")]
  NotFound(String),

  /// The compare-and-set on `approval_status` found a terminal state.
  #[error("visit request {request_id} is already {status}")]
  InvalidTransition {
    request_id: Uuid,
    status:     ApprovalStatus,
  },

  #[error("visitor {visitor_id} is blacklisted for puc {puc_id}")]
  Blacklisted { visitor_id: Uuid, puc_id: Uuid },

  #[error("visitor {visitor_id} is already blacklisted for puc {puc_id}")]
  AlreadyBlacklisted { visitor_id: Uuid, puc_id: Uuid },

  /// A foreign key named a row that does not exist.
  #[error("{0}")]
  InvalidReference(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl From<Error> for themis_core::Error {
  fn from(err: Error) -> Self {
    use themis_core::Error as Core;
    match err {
      Error::UsernameTaken(name) => Core::Conflict(format!("username {name:?} is already taken")),
      Error::CategoryExists(name) => {
        Core::Conflict(format!("crime category {name:?} already exists"))
      }
      Error::AlreadyBlacklisted { visitor_id, puc_id } => Core::Conflict(format!(
        "visitor {visitor_id} is already blacklisted for puc {puc_id}"
      )),
      Error::NotFound(what) => Core::NotFound(what),
      Error::InvalidTransition { request_id, status } => {
        Core::InvalidStateTransition { request_id, status }
      }
      Error::Blacklisted { visitor_id, puc_id } => Core::Blacklisted { visitor_id, puc_id },
      Error::InvalidReference(msg) => Core::Validation(msg),
      other => Core::Store(Box::new(other)),
    }
  }
}
