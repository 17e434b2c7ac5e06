//! Handlers for `/blacklist` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/blacklist` | `?visitor_id=&puc_id=`; staff only |
//! | `GET`    | `/blacklist/check` | `?visitor_id=&puc_id=`, both required |
//! | `POST`   | `/blacklist` | Body: `{"visitor_id":..,"puc_id":..,"reason":..}` |
//! | `DELETE` | `/blacklist/{id}` | Admin only; 204 |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use themis_core::{
  blacklist::{Blacklist, BlacklistEntry, BlacklistQuery, BlacklistRequest},
  store::FacilityStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Session,
  error::ApiError,
  extract::{Json, Path, Query},
};

/// `GET /blacklist`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Query(query): Query<BlacklistQuery>,
) -> Result<Json<Vec<BlacklistEntry>>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let entries = Blacklist::new(state.store.as_ref())
    .list(&session.actor, query)
    .await?;
  Ok(Json(entries))
}

#[derive(Debug, Deserialize)]
pub struct CheckParams {
  pub visitor_id: Uuid,
  pub puc_id:     Uuid,
}

#[derive(Debug, Serialize)]
pub struct CheckResult {
  pub visitor_id:  Uuid,
  pub puc_id:      Uuid,
  pub blacklisted: bool,
}

/// `GET /blacklist/check`
pub async fn check<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Query(params): Query<CheckParams>,
) -> Result<Json<CheckResult>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let blacklisted = Blacklist::new(state.store.as_ref())
    .is_blacklisted(&session.actor, params.visitor_id, params.puc_id)
    .await?;
  Ok(Json(CheckResult {
    visitor_id: params.visitor_id,
    puc_id: params.puc_id,
    blacklisted,
  }))
}

/// `POST /blacklist`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Json(body): Json<BlacklistRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let entry = Blacklist::new(state.store.as_ref())
    .add(&session.actor, body, &session.audit)
    .await?;
  Ok((StatusCode::CREATED, Json(entry)))
}

/// `DELETE /blacklist/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  Blacklist::new(state.store.as_ref())
    .remove(&session.actor, id, &session.audit)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
