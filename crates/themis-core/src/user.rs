//! Login accounts and the user directory service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  access::{Action, Actor, Role},
  audit::{self, AuditContext, AuditEvent, record_best_effort},
  credentials::{self, IssuedCredentials},
  store::FacilityStore,
  visitor::{NewVisitor, Visitor},
};

/// A login account. Usernames are unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub user_id:       Uuid,
  pub username:      String,
  /// Argon2 PHC string. Never serialised.
  #[serde(skip_serializing, default)]
  pub password_hash: String,
  pub role:          Role,
  pub email:         Option<String>,
  pub full_name:     Option<String>,
  pub created_at:    DateTime<Utc>,
  pub last_login:    Option<DateTime<Utc>>,
}

/// Input to [`FacilityStore::insert_user`]. The password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
  pub username:      String,
  pub password_hash: String,
  pub role:          Role,
  pub email:         Option<String>,
  pub full_name:     Option<String>,
}

/// A visitor login to create during approval.
///
/// The store appends `1`, `2`, … to `base_username` until it is unique.
#[derive(Debug, Clone)]
pub struct ProvisionPlan {
  pub base_username: String,
  pub password_hash: String,
  pub email:         Option<String>,
  pub full_name:     Option<String>,
}

/// Body of an admin-initiated account creation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
  pub username:  String,
  pub role:      Role,
  /// Generated and returned once when omitted.
  pub password:  Option<String>,
  pub email:     Option<String>,
  pub full_name: Option<String>,
}

/// Body of a visitor self-registration.
#[derive(Debug, Clone, Deserialize)]
pub struct Signup {
  pub username:     String,
  pub password:     String,
  pub first_name:   String,
  pub last_name:    String,
  pub email:        Option<String>,
  pub phone:        Option<String>,
  pub relationship: Option<String>,
}

pub const MIN_PASSWORD_LEN: usize = 8;

fn validate_username(username: &str) -> Result<String> {
  let username = username.trim();
  if username.is_empty() || username.len() > 50 {
    return Err(Error::validation("username must be 1 to 50 characters"));
  }
  if username.chars().any(char::is_whitespace) {
    return Err(Error::validation("username must not contain whitespace"));
  }
  Ok(username.to_owned())
}

fn validate_password(password: &str) -> Result<()> {
  if password.chars().count() < MIN_PASSWORD_LEN {
    return Err(Error::Validation(format!(
      "password must be at least {MIN_PASSWORD_LEN} characters"
    )));
  }
  Ok(())
}

// ─── Service ─────────────────────────────────────────────────────────────────

/// User-directory operations: login, signup, and admin account management.
pub struct UserDirectory<'a, S> {
  store: &'a S,
}

impl<'a, S: FacilityStore> UserDirectory<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Verify a username/password pair. Unknown users and wrong passwords are
  /// indistinguishable.
  pub async fn authenticate(
    &self,
    username: &str,
    password: &str,
    ctx: &AuditContext,
  ) -> Result<User> {
    let user = self
      .store
      .find_user_by_username(username.trim())
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::Unauthenticated)?;

    if !credentials::verify_password(password, &user.password_hash) {
      tracing::info!(username = %user.username, "login rejected");
      return Err(Error::Unauthenticated);
    }

    let user = self.store.record_login(user.user_id).await.map_err(Error::from_store)?;
    record_best_effort(
      self.store,
      &ctx.as_user(user.user_id),
      AuditEvent::Login,
      format!("user {} logged in", user.username),
    )
    .await;
    Ok(user)
  }

  /// Self-registration: always a visitor login plus a linked visitor identity.
  pub async fn signup(
    &self,
    input: Signup,
    ctx: &AuditContext,
  ) -> Result<(User, Visitor)> {
    let username = validate_username(&input.username)?;
    validate_password(&input.password)?;

    let visitor = NewVisitor {
      first_name:   input.first_name,
      last_name:    input.last_name,
      relationship: input.relationship,
      email:        input.email.clone(),
      phone:        input.phone,
    }
    .validated()?;

    let user = NewUser {
      username,
      password_hash: credentials::hash_password(&input.password)?,
      role: Role::Visitor,
      email: input.email,
      full_name: Some(format!("{} {}", visitor.first_name, visitor.last_name)),
    };

    let (user, visitor) = self
      .store
      .register_visitor_account(user, visitor)
      .await
      .map_err(Error::from_store)?;

    tracing::info!(user_id = %user.user_id, visitor_id = %visitor.visitor_id, "visitor signed up");
    record_best_effort(
      self.store,
      &ctx.as_user(user.user_id),
      AuditEvent::Signup,
      format!("visitor account {} registered", user.username),
    )
    .await;
    Ok((user, visitor))
  }

  /// Admin-initiated account creation. Returns the plaintext password once
  /// when it was generated here.
  pub async fn create(
    &self,
    actor: &Actor,
    input: CreateUser,
    ctx: &AuditContext,
  ) -> Result<(User, Option<IssuedCredentials>)> {
    audit::require(self.store, actor, Action::ManageUsers, ctx).await?;

    let username = validate_username(&input.username)?;
    let (password, generated) = match input.password {
      Some(p) => {
        validate_password(&p)?;
        (p, false)
      }
      None => (credentials::generate_password(), true),
    };

    let user = self
      .store
      .insert_user(NewUser {
        username,
        password_hash: credentials::hash_password(&password)?,
        role: input.role,
        email: input.email,
        full_name: input.full_name,
      })
      .await
      .map_err(Error::from_store)?;

    tracing::info!(user_id = %user.user_id, role = %user.role, by = %actor.user_id, "user created");
    record_best_effort(
      self.store,
      ctx,
      AuditEvent::UserCreated,
      format!("created {} account {}", user.role, user.username),
    )
    .await;

    let issued = generated.then(|| IssuedCredentials {
      username: user.username.clone(),
      password,
    });
    Ok((user, issued))
  }

  pub async fn list(&self, actor: &Actor, role: Option<Role>) -> Result<Vec<User>> {
    actor.require(Action::ManageUsers)?;
    self.store.list_users(role).await.map_err(Error::from_store)
  }

  pub async fn delete(
    &self,
    actor: &Actor,
    user_id: Uuid,
    ctx: &AuditContext,
  ) -> Result<()> {
    audit::require(self.store, actor, Action::ManageUsers, ctx).await?;
    if user_id == actor.user_id {
      return Err(Error::validation("cannot delete your own account"));
    }

    let user = self
      .store
      .get_user(user_id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::NotFound(format!("user {user_id}")))?;
    self.store.delete_user(user_id).await.map_err(Error::from_store)?;

    tracing::info!(user_id = %user_id, by = %actor.user_id, "user deleted");
    record_best_effort(
      self.store,
      ctx,
      AuditEvent::UserDeleted,
      format!("deleted account {}", user.username),
    )
    .await;
    Ok(())
  }

  /// Load the principal for an authenticated user id. A deleted user is
  /// treated as unauthenticated.
  pub async fn resolve_actor(&self, user_id: Uuid) -> Result<Actor> {
    let user = self
      .store
      .get_user(user_id)
      .await
      .map_err(Error::from_store)?
      .ok_or(Error::Unauthenticated)?;

    let visitor_id = match user.role {
      Role::Visitor => self
        .store
        .visitor_for_user(user.user_id)
        .await
        .map_err(Error::from_store)?
        .map(|v| v.visitor_id),
      _ => None,
    };

    Ok(Actor {
      user_id: user.user_id,
      username: user.username,
      role: user.role,
      visitor_id,
    })
  }
}
