//! Handlers for `/visitors` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/visitors` | `?text=&linked=` |
//! | `POST` | `/visitors` | Staff only |
//! | `GET`  | `/visitors/{id}` | Staff, or the visitor themself |
//! | `PUT`  | `/visitors/{id}` | Partial update; omitted fields are kept |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use themis_core::{
  store::FacilityStore,
  visitor::{NewVisitor, Visitor, VisitorQuery, VisitorRegistry, VisitorUpdate},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Session,
  error::ApiError,
  extract::{Json, Path, Query},
};

/// `GET /visitors`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Query(query): Query<VisitorQuery>,
) -> Result<Json<Vec<Visitor>>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let visitors = VisitorRegistry::new(state.store.as_ref())
    .list(&session.actor, &query)
    .await?;
  Ok(Json(visitors))
}

/// `POST /visitors`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Json(body): Json<NewVisitor>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let visitor = VisitorRegistry::new(state.store.as_ref())
    .create(&session.actor, body, &session.audit)
    .await?;
  Ok((StatusCode::CREATED, Json(visitor)))
}

/// `GET /visitors/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
) -> Result<Json<Visitor>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let visitor = VisitorRegistry::new(state.store.as_ref())
    .get(&session.actor, id)
    .await?;
  Ok(Json(visitor))
}

/// `PUT /visitors/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
  Json(body): Json<VisitorUpdate>,
) -> Result<Json<Visitor>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let visitor = VisitorRegistry::new(state.store.as_ref())
    .update(&session.actor, id, body, &session.audit)
    .await?;
  Ok(Json(visitor))
}
