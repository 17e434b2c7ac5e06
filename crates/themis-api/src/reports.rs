//! Handlers for `/audit-logs` and `/reports`.

use axum::extract::State;
use themis_core::{
  audit::{self, AuditEntry, AuditQuery},
  report::{CustodyReport, DashboardStats, Reports},
  store::FacilityStore,
};

use crate::{
  AppState,
  auth::Session,
  error::ApiError,
  extract::{Json, Query},
};

/// `GET /audit-logs?event_type=&user_id=&limit=&offset=`
pub async fn audit_logs<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEntry>>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let entries = audit::list(state.store.as_ref(), &session.actor, &query).await?;
  Ok(Json(entries))
}

/// `GET /reports/dashboard`
pub async fn dashboard<S>(
  State(state): State<AppState<S>>,
  session: Session,
) -> Result<Json<DashboardStats>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let stats = Reports::new(state.store.as_ref()).dashboard(&session.actor).await?;
  Ok(Json(stats))
}

/// `GET /reports/custody`
pub async fn custody<S>(
  State(state): State<AppState<S>>,
  session: Session,
) -> Result<Json<CustodyReport>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let report = Reports::new(state.store.as_ref()).custody(&session.actor).await?;
  Ok(Json(report))
}
