//! Handlers for crime classification references.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/crime-categories` | Any authenticated user |
//! | `POST` | `/crime-categories` | Admin only; 409 on a duplicate name |
//! | `GET`  | `/crime-types` | Optional `?category_id=` |
//! | `POST` | `/crime-types` | Admin only; 422 for an unknown category |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use themis_core::{
  classification::{Classifications, CrimeCategory, CrimeType, NewCrimeCategory, NewCrimeType},
  store::FacilityStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Session,
  error::ApiError,
  extract::{Json, Query},
};

// ─── Categories ───────────────────────────────────────────────────────────────

/// `GET /crime-categories`
pub async fn list_categories<S>(
  State(state): State<AppState<S>>,
  _session: Session,
) -> Result<Json<Vec<CrimeCategory>>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let categories = Classifications::new(state.store.as_ref()).categories().await?;
  Ok(Json(categories))
}

/// `POST /crime-categories`
pub async fn create_category<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Json(body): Json<NewCrimeCategory>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let category = Classifications::new(state.store.as_ref())
    .create_category(&session.actor, body)
    .await?;
  Ok((StatusCode::CREATED, Json(category)))
}

// ─── Crime types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CrimeTypeParams {
  #[serde(default, deserialize_with = "themis_core::query::empty_as_none")]
  pub category_id: Option<Uuid>,
}

/// `GET /crime-types[?category_id=<uuid>]`
pub async fn list_crime_types<S>(
  State(state): State<AppState<S>>,
  _session: Session,
  Query(params): Query<CrimeTypeParams>,
) -> Result<Json<Vec<CrimeType>>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let crimes = Classifications::new(state.store.as_ref())
    .crime_types(params.category_id)
    .await?;
  Ok(Json(crimes))
}

/// `POST /crime-types`
pub async fn create_crime_type<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Json(body): Json<NewCrimeType>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let crime = Classifications::new(state.store.as_ref())
    .create_crime_type(&session.actor, body)
    .await?;
  Ok((StatusCode::CREATED, Json(crime)))
}
