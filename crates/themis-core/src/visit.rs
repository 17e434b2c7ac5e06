//! Visit requests and their approval state machine.
//!
//! A visit request starts `Pending` and moves exactly once, to `Approved` or
//! `Rejected`. Both are terminal.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Status ──────────────────────────────────────────────────────────────────

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ApprovalStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
}

impl ApprovalStatus {
  pub fn as_str(self) -> &'static str { self.into() }

  pub fn is_terminal(self) -> bool { !matches!(self, Self::Pending) }
}

/// The two decisions a reviewer can make on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Approve,
  Reject,
}

impl Decision {
  /// The status a pending request lands in.
  pub fn target(self) -> ApprovalStatus {
    match self {
      Self::Approve => ApprovalStatus::Approved,
      Self::Reject => ApprovalStatus::Rejected,
    }
  }
}

/// Apply `decision` to a request currently in `from`.
///
/// The only legal moves are `Pending → Approved` and `Pending → Rejected`.
pub fn transition(
  request_id: Uuid,
  from: ApprovalStatus,
  decision: Decision,
) -> Result<ApprovalStatus> {
  match from {
    ApprovalStatus::Pending => Ok(decision.target()),
    status => Err(Error::InvalidStateTransition { request_id, status }),
  }
}

// ─── VisitRequest ────────────────────────────────────────────────────────────

/// A requested visitation between one visitor and one PUC.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitRequest {
  pub request_id:      Uuid,
  pub visitor_id:      Uuid,
  pub puc_id:          Uuid,
  pub visit_date:      NaiveDate,
  pub visit_time:      NaiveTime,
  pub purpose:         String,
  pub approval_status: ApprovalStatus,
  pub created_at:      DateTime<Utc>,
  /// The reviewer, once decided.
  pub decided_by:      Option<Uuid>,
  pub decided_at:      Option<DateTime<Utc>>,
}

/// Input to [`crate::lifecycle::VisitLifecycle::submit`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewVisitRequest {
  pub visitor_id: Uuid,
  pub puc_id:     Uuid,
  pub visit_date: NaiveDate,
  pub visit_time: NaiveTime,
  pub purpose:    String,
}

pub const MAX_PURPOSE_LEN: usize = 255;

impl NewVisitRequest {
  /// Check field-level rules against `today`. Trims `purpose` in place.
  pub fn validate(&mut self, today: NaiveDate) -> Result<()> {
    self.purpose = self.purpose.trim().to_owned();
    if self.purpose.is_empty() {
      return Err(Error::validation("purpose must not be empty"));
    }
    if self.purpose.chars().count() > MAX_PURPOSE_LEN {
      return Err(Error::validation(format!(
        "purpose must be at most {MAX_PURPOSE_LEN} characters"
      )));
    }
    if self.visit_date < today {
      return Err(Error::validation(format!(
        "visit date {} is in the past",
        self.visit_date
      )));
    }
    Ok(())
  }
}

/// Filters for listing visit requests. All are conjunctive.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VisitQuery {
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub status:     Option<ApprovalStatus>,
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub visitor_id: Option<Uuid>,
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub puc_id:     Option<Uuid>,
  /// Inclusive lower bound on `visit_date`.
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub from:       Option<NaiveDate>,
  /// Inclusive upper bound on `visit_date`.
  #[serde(default, deserialize_with = "crate::query::empty_as_none")]
  pub to:         Option<NaiveDate>,
}

/// A decision ready to be applied atomically by the store.
#[derive(Debug, Clone)]
pub struct VisitDecision {
  pub request_id: Uuid,
  pub decision:   Decision,
  pub decided_by: Uuid,
  /// Login to create for the visitor on approval, used only if the visitor
  /// is still unlinked when the transition commits.
  pub provision:  Option<crate::user::ProvisionPlan>,
}

/// What the store committed for a [`VisitDecision`].
#[derive(Debug, Clone)]
pub struct DecisionRecord {
  pub request:     VisitRequest,
  /// The user created for the visitor, if provisioning happened.
  pub provisioned: Option<crate::user::User>,
}
