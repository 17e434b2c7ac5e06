//! Standing prohibitions on (visitor, PUC) pairs.
//!
//! An entry blocks every future submission and every pending approval for
//! its pair. Already-approved requests are left untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  access::{Action, Actor},
  audit::{self, AuditContext, AuditEvent},
  store::FacilityStore,
  visitor::normalize,
};

pub const DEFAULT_REASON: &str = "No reason provided";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlacklistEntry {
  pub blacklist_id: Uuid,
  pub visitor_id:   Uuid,
  pub puc_id:       Uuid,
  pub reason:       String,
  pub added_by:     Option<Uuid>,
  pub added_at:     DateTime<Utc>,
}

/// Body of `POST /blacklist`.
#[derive(Debug, Clone, Deserialize)]
pub struct BlacklistRequest {
  pub visitor_id: Uuid,
  pub puc_id:     Uuid,
  pub reason:     Option<String>,
}

/// Input to [`FacilityStore::insert_blacklist_entry`].
#[derive(Debug, Clone)]
pub struct NewBlacklistEntry {
  pub visitor_id: Uuid,
  pub puc_id:     Uuid,
  pub reason:     String,
  pub added_by:   Uuid,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct BlacklistQuery {
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub visitor_id: Option<Uuid>,
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub puc_id:     Option<Uuid>,
}

// ─── Service ─────────────────────────────────────────────────────────────────

pub struct Blacklist<'a, S> {
  store: &'a S,
}

impl<'a, S: FacilityStore> Blacklist<'a, S> {
  pub fn new(store: &'a S) -> Self { Self { store } }

  /// Blacklist a pair. The entry and its audit record commit together.
  pub async fn add(
    &self,
    actor: &Actor,
    input: BlacklistRequest,
    ctx: &AuditContext,
  ) -> Result<BlacklistEntry> {
    audit::require(self.store, actor, Action::AddBlacklistEntry, ctx).await?;

    let reason = normalize(input.reason).unwrap_or_else(|| DEFAULT_REASON.to_owned());
    let audit_entry = ctx.entry(
      AuditEvent::BlacklistAdded,
      format!(
        "blacklisted visitor {} for puc {}: {reason}",
        input.visitor_id, input.puc_id
      ),
    );

    let entry = self
      .store
      .insert_blacklist_entry(
        NewBlacklistEntry {
          visitor_id: input.visitor_id,
          puc_id: input.puc_id,
          reason,
          added_by: actor.user_id,
        },
        audit_entry,
      )
      .await
      .map_err(Error::from_store)?;

    tracing::info!(
      blacklist_id = %entry.blacklist_id,
      visitor_id = %entry.visitor_id,
      puc_id = %entry.puc_id,
      by = %actor.user_id,
      "blacklist entry added"
    );
    Ok(entry)
  }

  /// Remove an entry (admin only).
  pub async fn remove(
    &self,
    actor: &Actor,
    blacklist_id: Uuid,
    ctx: &AuditContext,
  ) -> Result<BlacklistEntry> {
    audit::require(self.store, actor, Action::RemoveBlacklistEntry, ctx).await?;

    let audit_entry = ctx.entry(
      AuditEvent::BlacklistRemoved,
      format!("removed blacklist entry {blacklist_id}"),
    );
    let removed = self
      .store
      .remove_blacklist_entry(blacklist_id, audit_entry)
      .await
      .map_err(Error::from_store)?;

    tracing::info!(blacklist_id = %blacklist_id, by = %actor.user_id, "blacklist entry removed");
    Ok(removed)
  }

  /// Whether the pair is blocked right now. Submission and approval re-check
  /// inside their own transactions.
  pub async fn is_blacklisted(
    &self,
    actor: &Actor,
    visitor_id: Uuid,
    puc_id: Uuid,
  ) -> Result<bool> {
    actor.require(Action::ViewBlacklist)?;
    self
      .store
      .is_blacklisted(visitor_id, puc_id)
      .await
      .map_err(Error::from_store)
  }

  pub async fn list(&self, actor: &Actor, query: BlacklistQuery) -> Result<Vec<BlacklistEntry>> {
    actor.require(Action::ViewBlacklist)?;
    self.store.list_blacklist(query).await.map_err(Error::from_store)
  }
}
