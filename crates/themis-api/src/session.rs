//! Handlers for `/auth` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/auth/login` | Body: `{"username":..,"password":..}`; 401 on any mismatch |
//! | `POST` | `/auth/signup` | Creates a visitor login plus identity; 201 |
//! | `GET`  | `/auth/profile` | Bearer token required |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use themis_core::{
  Error,
  access::{NavSection, navigation},
  audit::AuditContext,
  store::FacilityStore,
  user::{Signup, User, UserDirectory},
  visitor::Visitor,
};
use uuid::Uuid;

use crate::{
  AppState,
  auth::{AccessToken, ClientIp, Session},
  error::ApiError,
  extract::Json,
};

// ─── Login ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct LoginBody {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
  #[serde(flatten)]
  pub token: AccessToken,
  pub user:  User,
}

/// `POST /auth/login`
pub async fn login<S>(
  State(state): State<AppState<S>>,
  ClientIp(ip): ClientIp,
  Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let ctx = AuditContext { user_id: None, ip_address: ip };
  let user = UserDirectory::new(state.store.as_ref())
    .authenticate(&body.username, &body.password, &ctx)
    .await?;
  let token = state.tokens.issue(&user)?;
  Ok(Json(LoginResponse { token, user }))
}

// ─── Signup ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct SignupResponse {
  pub user:    User,
  pub visitor: Visitor,
}

/// `POST /auth/signup`
pub async fn signup<S>(
  State(state): State<AppState<S>>,
  ClientIp(ip): ClientIp,
  Json(body): Json<Signup>,
) -> Result<impl IntoResponse, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let ctx = AuditContext { user_id: None, ip_address: ip };
  let (user, visitor) = UserDirectory::new(state.store.as_ref()).signup(body, &ctx).await?;
  Ok((StatusCode::CREATED, Json(SignupResponse { user, visitor })))
}

// ─── Profile ──────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Profile {
  pub user:       User,
  pub visitor_id: Option<Uuid>,
  pub navigation: Vec<NavSection>,
}

/// `GET /auth/profile`
pub async fn profile<S>(
  State(state): State<AppState<S>>,
  session: Session,
) -> Result<Json<Profile>, ApiError>
where
  S: FacilityStore + Clone + 'static,
{
  let user = state
    .store
    .get_user(session.actor.user_id)
    .await
    .map_err(Error::from_store)?
    .ok_or(Error::Unauthenticated)?;
  Ok(Json(Profile {
    navigation: navigation(user.role),
    visitor_id: session.actor.visitor_id,
    user,
  }))
}
