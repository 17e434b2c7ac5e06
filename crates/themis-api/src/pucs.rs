//! Handlers for `/pucs` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/pucs` | `?status=&category_id=&text=` |
//! | `POST` | `/pucs` | Staff only |
//! | `GET`  | `/pucs/{id}` | 404 if not found |
//! | `PUT`  | `/pucs/{id}` | Partial update; omitted fields are kept |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use themis_core::{
  puc::{NewPuc, Puc, PucQuery, PucRegistry, PucUpdate},
  store::FacilityStore,
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Session,
  error::ApiError,
  extract::{Json, Path, Query},
};

/// `GET /pucs`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Query(query): Query<PucQuery>,
) -> Result<Json<Vec<Puc>>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let pucs = PucRegistry::new(state.store.as_ref())
    .list(&session.actor, &query)
    .await?;
  Ok(Json(pucs))
}

/// `POST /pucs`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Json(body): Json<NewPuc>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let puc = PucRegistry::new(state.store.as_ref())
    .create(&session.actor, body, &session.audit)
    .await?;
  Ok((StatusCode::CREATED, Json(puc)))
}

/// `GET /pucs/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
) -> Result<Json<Puc>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let puc = PucRegistry::new(state.store.as_ref())
    .get(&session.actor, id)
    .await?;
  Ok(Json(puc))
}

/// `PUT /pucs/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
  Json(body): Json<PucUpdate>,
) -> Result<Json<Puc>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let puc = PucRegistry::new(state.store.as_ref())
    .update(&session.actor, id, body, &session.audit)
    .await?;
  Ok(Json(puc))
}
