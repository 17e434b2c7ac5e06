//! Handlers for `/users` endpoints (admin only).

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use themis_core::{
  access::Role,
  credentials::IssuedCredentials,
  store::FacilityStore,
  user::{CreateUser, User, UserDirectory},
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::Session,
  error::ApiError,
  extract::{Json, Path, Query},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default, deserialize_with = "themis_core::query::empty_as_none")]
  pub role: Option<Role>,
}

/// `GET /users[?role=<role>]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<User>>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let users = UserDirectory::new(state.store.as_ref())
    .list(&session.actor, params.role)
    .await?;
  Ok(Json(users))
}

#[derive(Debug, Serialize)]
pub struct Created {
  pub user:        User,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub credentials: Option<IssuedCredentials>,
}

/// `POST /users`. A generated password is returned once in `credentials`.
pub async fn create<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Json(body): Json<CreateUser>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let (user, credentials) = UserDirectory::new(state.store.as_ref())
    .create(&session.actor, body, &session.audit)
    .await?;
  Ok((StatusCode::CREATED, Json(Created { user, credentials })))
}

/// `DELETE /users/{id}`
pub async fn delete<S>(
  State(state): State<AppState<S>>,
  session: Session,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  UserDirectory::new(state.store.as_ref())
    .delete(&session.actor, id, &session.audit)
    .await?;
  Ok(StatusCode::NO_CONTENT)
}
