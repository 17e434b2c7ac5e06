//! Core types, services and trait definitions for the Themis facility
//! service.
//!
//! This crate is deliberately free of HTTP and database dependencies. The
//! storage backend (`themis-store-sqlite`) implements [`store::FacilityStore`];
//! the HTTP layer (`themis-api`) drives the services defined here.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod access;
pub mod audit;
pub mod blacklist;
pub mod classification;
pub mod credentials;
pub mod error;
pub mod lifecycle;
pub mod puc;
pub mod query;
pub mod report;
pub mod store;
pub mod user;
pub mod visit;
pub mod visitor;

pub use error::{Error, Result};
