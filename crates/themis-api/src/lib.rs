//! JSON REST API for Themis.
//!
//! Exposes an axum [`Router`] backed by any [`themis_core::store::FacilityStore`].
//! Every route except login and signup requires an `Authorization: Bearer`
//! token issued by [`auth::TokenIssuer`]. TLS and tracing layers are the
//! caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", themis_api::api_router(state))
//! ```

pub mod auth;
pub mod blacklist;
pub mod classifications;
pub mod error;
pub mod extract;
pub mod pucs;
pub mod reports;
pub mod session;
pub mod users;
pub mod visit_requests;
pub mod visitors;


use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use themis_core::store::FacilityStore;

pub use auth::TokenIssuer;
pub use error::ApiError;

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: FacilityStore> {
  pub store:  Arc<S>,
  pub tokens: Arc<TokenIssuer>,
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router over `state`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(state: AppState<S>) -> Router<()>
where
  S: FacilityStore + Clone + 'static,
{
  Router::new()
    // Session
    .route("/auth/login", post(session::login::<S>))
    .route("/auth/signup", post(session::signup::<S>))
    .route("/auth/profile", get(session::profile::<S>))
    // Users
    .route("/users", get(users::list::<S>).post(users::create::<S>))
    .route("/users/{id}", delete(users::delete::<S>))
    // Classifications
    .route(
      "/crime-categories",
      get(classifications::list_categories::<S>).post(classifications::create_category::<S>),
    )
    .route(
      "/crime-types",
      get(classifications::list_crime_types::<S>).post(classifications::create_crime_type::<S>),
    )
    // Registries
    .route("/pucs", get(pucs::list::<S>).post(pucs::create::<S>))
    .route("/pucs/{id}", get(pucs::get_one::<S>).put(pucs::update::<S>))
    .route("/visitors", get(visitors::list::<S>).post(visitors::create::<S>))
    .route("/visitors/{id}", get(visitors::get_one::<S>).put(visitors::update::<S>))
    // Visit requests
    .route(
      "/visit-requests",
      get(visit_requests::list::<S>).post(visit_requests::create::<S>),
    )
    .route("/visit-requests/{id}", get(visit_requests::get_one::<S>))
    .route("/visit-requests/{id}/approve", put(visit_requests::approve::<S>))
    .route("/visit-requests/{id}/reject", put(visit_requests::reject::<S>))
    // Blacklist
    .route("/blacklist", get(blacklist::list::<S>).post(blacklist::create::<S>))
    .route("/blacklist/check", get(blacklist::check::<S>))
    .route("/blacklist/{id}", delete(blacklist::delete::<S>))
    // Audit and reports
    .route("/audit-logs", get(reports::audit_logs::<S>))
    .route("/reports/dashboard", get(reports::dashboard::<S>))
    .route("/reports/custody", get(reports::custody::<S>))
    .with_state(state)
}
