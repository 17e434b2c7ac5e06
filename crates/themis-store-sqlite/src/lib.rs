//! SQLite backend for the Themis facility store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated
//! connection thread without blocking the async runtime. Every multi-step
//! write runs as one transaction inside a single call on that thread, which
//! is what makes visit-request decisions first-writer-wins.

mod encode;
mod schema;
mod store;
mod tx;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
