//! Handlers for `/visit-requests` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/visit-requests` | `?status=&visitor_id=&puc_id=&from=&to=`; visitors see their own |
//! | `POST` | `/visit-requests` | Visitor only; 403 when blacklisted |
//! | `GET`  | `/visit-requests/{id}` | |
//! | `PUT`  | `/visit-requests/{id}/approve` | May return one-time `credentials` |
//! | `PUT`  | `/visit-requests/{id}/reject` | |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use themis_core::{
  lifecycle::{Approval, VisitLifecycle},
  store::FacilityStore,
  visit::{NewVisitRequest, VisitQuery, VisitRequest},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Session,
  error::ApiError,
  extract::{Json, Path, Query},
};

/// `GET /visit-requests`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Query(query): Query<VisitQuery>,
) -> Result<Json<Vec<VisitRequest>>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let requests = VisitLifecycle::new(state.store.as_ref())
    .list(&session.actor, query)
    .await?;
  Ok(Json(requests))
}

/// `POST /visit-requests`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Json(body): Json<NewVisitRequest>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let request = VisitLifecycle::new(state.store.as_ref())
    .submit(&session.actor, body, &session.audit)
    .await?;
  Ok((StatusCode::CREATED, Json(request)))
}

/// `GET /visit-requests/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
) -> Result<Json<VisitRequest>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let request = VisitLifecycle::new(state.store.as_ref())
    .get(&session.actor, id)
    .await?;
  Ok(Json(request))
}

/// `PUT /visit-requests/{id}/approve`
pub async fn approve<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
) -> Result<Json<Approval>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let approval = VisitLifecycle::new(state.store.as_ref())
    .approve(&session.actor, id, &session.audit)
    .await?;
  Ok(Json(approval))
}

/// `PUT /visit-requests/{id}/reject`
pub async fn reject<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
) -> Result<Json<VisitRequest>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let request = VisitLifecycle::new(state.store.as_ref())
    .reject(&session.actor, id, &session.audit)
    .await?;
  Ok(Json(request))
}
