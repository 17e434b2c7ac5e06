//! Visitor identities and the visitor registry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  access::{Action, Actor},
  audit::{self, AuditContext, AuditEvent, record_best_effort},
  store::FacilityStore,
};

/// A person who visits PUCs. May or may not have a login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Visitor {
  pub visitor_id:     Uuid,
  pub first_name:     String,
  pub last_name:      String,
  /// Relationship to the PUC(s) visited, e.g. "sister", "counsel".
  pub relationship:   Option<String>,
  pub email:          Option<String>,
  pub phone:          Option<String>,
  /// Set once a login has been provisioned; never written by updates.
  pub linked_user_id: Option<Uuid>,
  pub registered_at:  DateTime<Utc>,
}

impl Visitor {
  pub fn full_name(&self) -> String { format!("{} {}", self.first_name, self.last_name) }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewVisitor {
  pub first_name:   String,
  pub last_name:    String,
  pub relationship: Option<String>,
  pub email:        Option<String>,
  pub phone:        Option<String>,
}

/// Blank optional strings become `None`; the rest are trimmed.
pub(crate) fn normalize(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

pub(crate) fn required_name(field: &str, value: &str) -> Result<String> {
  let value = value.trim();
  if value.is_empty() {
    return Err(Error::Validation(format!("{field} must not be empty")));
  }
  if value.chars().count() > 50 {
    return Err(Error::Validation(format!("{field} must be at most 50 characters")));
  }
  Ok(value.to_owned())
}

impl NewVisitor {
  /// Trim and check fields, returning the normalised input.
  pub fn validated(self) -> Result<Self> {
    let email = normalize(self.email);
    if let Some(e) = &email
      && !e.contains('@')
    {
      return Err(Error::Validation(format!("invalid email address {e:?}")));
    }
    Ok(Self {
      first_name: required_name("first_name", &self.first_name)?,
      last_name: required_name("last_name", &self.last_name)?,
      relationship: normalize(self.relationship),
      email,
      phone: normalize(self.phone),
    })
  }
}

/// Field-level update. `None` keeps the prior value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisitorUpdate {
  pub first_name:   Option<String>,
  pub last_name:    Option<String>,
  pub relationship: Option<String>,
  pub email:        Option<String>,
  pub phone:        Option<String>,
}

impl Visitor {
  /// Merge `update` over `self` and re-validate the result.
  pub fn apply(&self, update: VisitorUpdate) -> Result<Visitor> {
    let merged = NewVisitor {
      first_name:   update.first_name.unwrap_or_else(|| self.first_name.clone()),
      last_name:    update.last_name.unwrap_or_else(|| self.last_name.clone()),
      relationship: update.relationship.or_else(|| self.relationship.clone()),
      email:        update.email.or_else(|| self.email.clone()),
      phone:        update.phone.or_else(|| self.phone.clone()),
    }
    .validated()?;

    Ok(Visitor {
      first_name: merged.first_name,
      last_name: merged.last_name,
      relationship: merged.relationship,
      email: merged.email,
      phone: merged.phone,
      ..self.clone()
    })
  }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisitorQuery {
  /// Case-insensitive substring over first, last, and full name.
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub text:   Option<String>,
  /// `true`: only visitors with a login; `false`: only without.
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub linked: Option<bool>,
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct VisitorRegistry<'a, S> {
  store: &'a S,
}

impl<'a, S: FacilityStore> VisitorRegistry<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  pub async fn create(
    &self,
    actor: &Actor,
    input: NewVisitor,
    ctx: &AuditContext,
  ) -> Result<Visitor> {
    audit::require(self.store, actor, Action::ManageVisitors, ctx).await?;
    let visitor = self
      .store
      .insert_visitor(input.validated()?)
      .await
      .map_err(Error::from_store)?;

    tracing::info!(visitor_id = %visitor.visitor_id, by = %actor.user_id, "visitor registered");
    record_best_effort(
      self.store,
      ctx,
      AuditEvent::VisitorCreated,
      format!("registered visitor {} ({})", visitor.full_name(), visitor.visitor_id),
    )
    .await;
    Ok(visitor)
  }

  /// Staff may read any visitor; a visitor may read only their own record.
  pub async fn get(&self, actor: &Actor, visitor_id: Uuid) -> Result<Visitor> {
    if !actor.can(Action::ViewVisitors) && actor.visitor_id != Some(visitor_id) {
      return Err(Error::Forbidden);
    }
    self
      .store
      .get_visitor(visitor_id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::NotFound(format!("visitor {visitor_id}")))
  }

  pub async fn list(&self, actor: &Actor, query: &VisitorQuery) -> Result<Vec<Visitor>> {
    actor.require(Action::ViewVisitors)?;
    self.store.list_visitors(query).await.map_err(Error::from_store)
  }

  pub async fn update(
    &self,
    actor: &Actor,
    visitor_id: Uuid,
    update: VisitorUpdate,
    ctx: &AuditContext,
  ) -> Result<Visitor> {
    audit::require(self.store, actor, Action::ManageVisitors, ctx).await?;
    let current = self
      .store
      .get_visitor(visitor_id)
      .await
      .map_err(Error::from_store)?
      .ok_or_else(|| Error::NotFound(format!("visitor {visitor_id}")))?;

    let updated = current.apply(update)?;
    self.store.replace_visitor(&updated).await.map_err(Error::from_store)?;

    record_best_effort(
      self.store,
      ctx,
      AuditEvent::VisitorUpdated,
      format!("updated visitor {visitor_id}"),
    )
    .await;
    Ok(updated)
  }
}
