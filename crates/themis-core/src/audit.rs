//! Append-only audit log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{
  Error, Result,
  access::{Action, Actor},
  store::FacilityStore,
};

/// Everything that gets written to the audit log.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuditEvent {
  VisitRequestSubmitted,
  VisitApproved,
  VisitRejected,
  BlacklistAdded,
  BlacklistRemoved,
  UserCreated,
  UserDeleted,
  PucCreated,
  PucUpdated,
  VisitorCreated,
  VisitorUpdated,
  Login,
  Signup,
  AuthorizationDenied,
}

impl AuditEvent {
  pub fn as_str(self) -> &'static str { self.into() }
}

/// A persisted audit entry. Never mutated.
///
/// `event_type` stays a string so entries written by older versions remain
/// readable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
  pub audit_id:   Uuid,
  pub user_id:    Option<Uuid>,
  pub event_type: String,
  pub timestamp:  DateTime<Utc>,
  pub ip_address: Option<String>,
  pub notes:      Option<String>,
}

/// Who is acting and from where; threaded through every state change.
#[derive(Debug, Clone, Default)]
pub struct AuditContext {
  pub user_id:    Option<Uuid>,
  pub ip_address: Option<String>,
}

impl AuditContext {
  pub fn for_actor(actor: &Actor, ip_address: Option<String>) -> Self {
    Self { user_id: Some(actor.user_id), ip_address }
  }

  /// The same origin, attributed to `user_id`.
  pub fn as_user(&self, user_id: Uuid) -> Self {
    Self { user_id: Some(user_id), ip_address: self.ip_address.clone() }
  }

  pub fn entry(&self, event: AuditEvent, notes: impl Into<String>) -> NewAuditEntry {
    NewAuditEntry {
      user_id:    self.user_id,
      event,
      ip_address: self.ip_address.clone(),
      notes:      Some(notes.into()),
    }
  }
}

/// Input to [`FacilityStore::append_audit`]. The timestamp is store-assigned.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
  pub user_id:    Option<Uuid>,
  pub event:      AuditEvent,
  pub ip_address: Option<String>,
  pub notes:      Option<String>,
}

pub const DEFAULT_AUDIT_LIMIT: usize = 100;
pub const MAX_AUDIT_LIMIT: usize = 500;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub event_type: Option<AuditEvent>,
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub user_id:    Option<Uuid>,
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub limit:      Option<usize>,
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub offset:     Option<usize>,
}

impl AuditQuery {
  pub fn effective_limit(&self) -> usize {
    self.limit.unwrap_or(DEFAULT_AUDIT_LIMIT).clamp(1, MAX_AUDIT_LIMIT)
  }
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

/// Append an entry, propagating failure.
pub async fn record<S: FacilityStore>(
  store: &S,
  ctx: &AuditContext,
  event: AuditEvent,
  notes: String,
) -> Result<AuditEntry> {
  store
    .append_audit(ctx.entry(event, notes))
    .await
    .map_err(Error::from_store)
}

/// Append an entry for a side-channel event; a failed write is logged and
/// otherwise ignored.
pub async fn record_best_effort<S: FacilityStore>(
  store: &S,
  ctx: &AuditContext,
  event: AuditEvent,
  notes: String,
) {
  if let Err(e) = record(store, ctx, event, notes).await {
    tracing::warn!(event = %event, error = %e, "audit write failed");
  }
}

/// [`Actor::require`], additionally logging a denied attempt to the audit log.
pub async fn require<S: FacilityStore>(
  store: &S,
  actor: &Actor,
  action: Action,
  ctx: &AuditContext,
) -> Result<()> {
  let outcome = actor.require(action);
  if outcome.is_err() {
    record_best_effort(
      store,
      ctx,
      AuditEvent::AuthorizationDenied,
      format!("{} ({}) denied {}", actor.username, actor.role, action),
    )
    .await;
  }
  outcome
}

/// Newest-first audit listing (admin only).
pub async fn list<S: FacilityStore>(
  store: &S,
  actor: &Actor,
  query: &AuditQuery,
) -> Result<Vec<AuditEntry>> {
  actor.require(Action::ViewAuditLog)?;
  store.list_audit(query).await.map_err(Error::from_store)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn event_names_are_snake_case() {
    assert_eq!(AuditEvent::VisitRequestSubmitted.as_str(), "visit_request_submitted");
    assert_eq!(AuditEvent::VisitApproved.as_str(), "visit_approved");
    assert_eq!(AuditEvent::VisitRejected.as_str(), "visit_rejected");
    assert_eq!(
      "authorization_denied".parse::<AuditEvent>().unwrap(),
      AuditEvent::AuthorizationDenied
    );
  }

  #[test]
  fn limit_is_clamped() {
    let q = AuditQuery { limit: Some(10_000), ..Default::default() };
    assert_eq!(q.effective_limit(), MAX_AUDIT_LIMIT);
    assert_eq!(AuditQuery::default().effective_limit(), DEFAULT_AUDIT_LIMIT);
  }
}
