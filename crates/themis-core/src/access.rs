//! Roles, actions, and the capability gate.
//!
//! [`can`] is the single source of truth for authorization. Every mutating
//! service call goes through [`Actor::require`]; role-scoped navigation is
//! derived from the same table so it can never offer more than the gate
//! grants.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator as _, IntoStaticStr};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Role ────────────────────────────────────────────────────────────────────

/// The one role a user holds.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  EnumIter,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
  Admin,
  Officer,
  Visitor,
}

impl Role {
  /// The column / claim representation, e.g. `"officer"`.
  pub fn as_str(self) -> &'static str { self.into() }

  /// Admin or officer.
  pub fn is_staff(self) -> bool { matches!(self, Self::Admin | Self::Officer) }
}

// ─── Action ──────────────────────────────────────────────────────────────────

/// Every operation the gate knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum Action {
  SubmitVisitRequest,
  SubmitOnBehalf,
  DecideVisitRequest,
  ViewAllVisitRequests,
  AddBlacklistEntry,
  RemoveBlacklistEntry,
  ViewBlacklist,
  ManageUsers,
  ViewAuditLog,
  ManagePucs,
  ViewPucs,
  ManageVisitors,
  ViewVisitors,
  ManageClassifications,
  ViewReports,
}

/// Capability table.
///
/// | action | Admin | Officer | Visitor |
/// |---|---|---|---|
/// | submit visit request | no | no | yes (own identity) |
/// | submit for a visitor without a login | yes | yes | no |
/// | approve / reject | yes | yes | no |
/// | add blacklist entry | yes | yes | no |
/// | remove blacklist entry | yes | no | no |
/// | manage users | yes | no | no |
/// | view audit log | yes | no | no |
/// | view PUCs | yes | yes | yes |
/// | manage classifications | yes | no | no |
/// | everything else | yes | yes | no |
pub fn can(role: Role, action: Action) -> bool {
  use Action::*;
  match action {
    SubmitVisitRequest => role == Role::Visitor,
    SubmitOnBehalf => role.is_staff(),
    ViewPucs => true,
    RemoveBlacklistEntry | ManageUsers | ViewAuditLog | ManageClassifications => {
      role == Role::Admin
    }
    DecideVisitRequest
    | ViewAllVisitRequests
    | AddBlacklistEntry
    | ViewBlacklist
    | ManagePucs
    | ManageVisitors
    | ViewVisitors
    | ViewReports => role.is_staff(),
  }
}

// ─── Actor ───────────────────────────────────────────────────────────────────

/// An authenticated principal, resolved per request from the store.
#[derive(Debug, Clone, Serialize)]
pub struct Actor {
  pub user_id:    Uuid,
  pub username:   String,
  pub role:       Role,
  /// The visitor identity linked to this login, if any.
  pub visitor_id: Option<Uuid>,
}

impl Actor {
  /// Fail with [`Error::Forbidden`] unless the actor's role permits `action`.
  pub fn require(&self, action: Action) -> Result<()> {
    if can(self.role, action) {
      Ok(())
    } else {
      tracing::warn!(
        user_id = %self.user_id,
        role = %self.role,
        action = %action,
        "authorization denied"
      );
      Err(Error::Forbidden)
    }
  }

  pub fn can(&self, action: Action) -> bool { can(self.role, action) }
}

// ─── Navigation ──────────────────────────────────────────────────────────────

/// A client navigation section. Purely a UX hint; the server re-checks every
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, EnumIter)]
#[serde(rename_all = "snake_case")]
pub enum NavSection {
  Dashboard,
  Users,
  AuditLog,
  Pucs,
  Visitors,
  VisitLogs,
  Approvals,
  Blacklist,
  Reports,
  MyVisits,
  Account,
}

impl NavSection {
  fn visible_to(self, role: Role) -> bool {
    match self {
      Self::Dashboard | Self::Account => true,
      Self::Users => can(role, Action::ManageUsers),
      Self::AuditLog => can(role, Action::ViewAuditLog),
      Self::Pucs => can(role, Action::ManagePucs),
      Self::Visitors => can(role, Action::ViewVisitors),
      Self::VisitLogs => can(role, Action::ViewAllVisitRequests),
      Self::Approvals => can(role, Action::DecideVisitRequest),
      Self::Blacklist => can(role, Action::ViewBlacklist),
      Self::Reports => can(role, Action::ViewReports),
      Self::MyVisits => can(role, Action::SubmitVisitRequest),
    }
  }
}

/// Sections a user with `role` should be shown, in display order.
pub fn navigation(role: Role) -> Vec<NavSection> {
  NavSection::iter().filter(|s| s.visible_to(role)).collect()
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decision_is_staff_only() {
    assert!(can(Role::Admin, Action::DecideVisitRequest));
    assert!(can(Role::Officer, Action::DecideVisitRequest));
    assert!(!can(Role::Visitor, Action::DecideVisitRequest));
  }

  #[test]
  fn only_visitors_submit() {
    assert!(!can(Role::Admin, Action::SubmitVisitRequest));
    assert!(!can(Role::Officer, Action::SubmitVisitRequest));
    assert!(can(Role::Visitor, Action::SubmitVisitRequest));
  }

  #[test]
  fn staff_submit_on_behalf_of_walk_ins() {
    assert!(can(Role::Admin, Action::SubmitOnBehalf));
    assert!(can(Role::Officer, Action::SubmitOnBehalf));
    assert!(!can(Role::Visitor, Action::SubmitOnBehalf));
  }

  #[test]
  fn blacklist_add_and_remove_differ() {
    assert!(can(Role::Officer, Action::AddBlacklistEntry));
    assert!(!can(Role::Officer, Action::RemoveBlacklistEntry));
    assert!(can(Role::Admin, Action::RemoveBlacklistEntry));
    assert!(!can(Role::Visitor, Action::AddBlacklistEntry));
  }

  #[test]
  fn admin_only_actions() {
    for action in [Action::ManageUsers, Action::ViewAuditLog] {
      assert!(can(Role::Admin, action));
      assert!(!can(Role::Officer, action));
      assert!(!can(Role::Visitor, action));
    }
  }

  #[test]
  fn role_parses_from_column_value() {
    assert_eq!("officer".parse::<Role>().unwrap(), Role::Officer);
    assert_eq!(Role::Admin.as_str(), "admin");
    assert!("Chief".parse::<Role>().is_err());
  }

  #[test]
  fn navigation_follows_the_gate() {
    let visitor = navigation(Role::Visitor);
    assert!(visitor.contains(&NavSection::MyVisits));
    assert!(!visitor.contains(&NavSection::Approvals));

    let officer = navigation(Role::Officer);
    assert!(officer.contains(&NavSection::Approvals));
    assert!(!officer.contains(&NavSection::AuditLog));
    assert!(!officer.contains(&NavSection::MyVisits));

    assert!(navigation(Role::Admin).contains(&NavSection::Users));
  }

  #[test]
  fn require_returns_forbidden() {
    let actor = Actor {
      user_id:    Uuid::new_v4(),
      username:   "v".into(),
      role:       Role::Visitor,
      visitor_id: None,
    };
    assert!(matches!(
      actor.require(Action::DecideVisitRequest),
      Err(Error::Forbidden)
    ));
  }
}
