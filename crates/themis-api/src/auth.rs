//! Bearer-token issuance and the authenticated-session extractor.

use std::{convert::Infallible, net::SocketAddr};

use axum::{
  extract::{ConnectInfo, FromRequestParts},
  http::{HeaderMap, header, request::Parts},
};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use themis_core::{
  Error,
  access::{Actor, Role},
  audit::AuditContext,
  store::FacilityStore,
  user::{User, UserDirectory},
};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

// ─── Tokens ──────────────────────────────────────────────────────────────────

pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, thiserror::Error)]
#[error("jwt secret must be at least {MIN_SECRET_LEN} bytes")]
pub struct WeakSecret;

/// JWT claims. `role` is informational; the stored role is authoritative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
  pub sub:      Uuid,
  pub username: String,
  pub role:     Role,
  pub iat:      i64,
  pub exp:      i64,
  pub jti:      String,
}

/// An issued access token.
#[derive(Debug, Clone, Serialize)]
pub struct AccessToken {
  pub token:      String,
  pub token_type: &'static str,
  pub expires_in: i64,
}

/// Signs and validates HS256 access tokens.
pub struct TokenIssuer {
  encoding_key: EncodingKey,
  decoding_key: DecodingKey,
  ttl_secs:     i64,
}

impl TokenIssuer {
  pub fn new(secret: &[u8], ttl_secs: i64) -> Result<Self, WeakSecret> {
    if secret.len() < MIN_SECRET_LEN {
      return Err(WeakSecret);
    }
    Ok(Self {
      encoding_key: EncodingKey::from_secret(secret),
      decoding_key: DecodingKey::from_secret(secret),
      ttl_secs,
    })
  }

  pub fn issue(&self, user: &User) -> Result<AccessToken, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
      sub:      user.user_id,
      username: user.username.clone(),
      role:     user.role,
      iat:      now,
      exp:      now + self.ttl_secs,
      jti:      Uuid::new_v4().to_string(),
    };
    let token = jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;
    Ok(AccessToken { token, token_type: "Bearer", expires_in: self.ttl_secs })
  }

  pub fn validate(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let data = jsonwebtoken::decode::<Claims>(
      token,
      &self.decoding_key,
      &Validation::new(Algorithm::HS256),
    )?;
    Ok(data.claims)
  }
}

// ─── Extractors ──────────────────────────────────────────────────────────────

fn bearer(headers: &HeaderMap) -> Option<&str> {
  headers
    .get(header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.strip_prefix("Bearer "))
    .map(str::trim)
    .filter(|t| !t.is_empty())
}

/// First `X-Forwarded-For` hop, else the socket peer when the server was
/// started with connect info.
fn client_ip(parts: &Parts) -> Option<String> {
  let forwarded = parts
    .headers
    .get("x-forwarded-for")
    .and_then(|v| v.to_str().ok())
    .and_then(|v| v.split(',').next())
    .map(str::trim)
    .filter(|v| !v.is_empty());
  if let Some(ip) = forwarded {
    return Some(ip.to_owned());
  }
  parts
    .extensions
    .get::<ConnectInfo<SocketAddr>>()
    .map(|ConnectInfo(addr)| addr.ip().to_string())
}

/// The caller's address, for unauthenticated routes that still audit.
pub struct ClientIp(pub Option<String>);

impl<T: Send + Sync> FromRequestParts<T> for ClientIp {
  type Rejection = Infallible;

  async fn from_request_parts(parts: &mut Parts, _: &T) -> Result<Self, Self::Rejection> {
    Ok(ClientIp(client_ip(parts)))
  }
}

/// Present in a handler means the bearer token verified and its user still
/// exists. Carries the principal and the audit context for this request.
pub struct Session {
  pub actor: Actor,
  pub audit: AuditContext,
}

impl<S> FromRequestParts<AppState<S>> for Session
where
  S: FacilityStore + Clone + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<S>,
  ) -> Result<Self, Self::Rejection> {
    let token = bearer(&parts.headers).ok_or(Error::Unauthenticated)?;
    let claims = state.tokens.validate(token).map_err(|e| {
      tracing::debug!(error = %e, "bearer token rejected");
      Error::Unauthenticated
    })?;

    let actor = UserDirectory::new(state.store.as_ref())
      .resolve_actor(claims.sub)
      .await?;
    let audit = AuditContext::for_actor(&actor, client_ip(parts));
    Ok(Session { actor, audit })
  }
}
