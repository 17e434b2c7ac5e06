//! The `FacilityStore` trait.
//!
//! Implemented by storage backends (e.g. `themis-store-sqlite`). The services
//! in this crate, and the HTTP layer above them, depend on this abstraction
//! and not on any concrete backend.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  access::Role,
  audit::{AuditEntry, AuditQuery, NewAuditEntry},
  blacklist::{BlacklistEntry, BlacklistQuery, NewBlacklistEntry},
  classification::{CrimeCategory, CrimeType, NewCrimeCategory, NewCrimeType},
  puc::{NewPuc, Puc, PucQuery},
  report::{CustodyReport, DashboardStats},
  user::{NewUser, User},
  visit::{DecisionRecord, NewVisitRequest, VisitDecision, VisitQuery, VisitRequest},
  visitor::{NewVisitor, Visitor, VisitorQuery},
};

/// Abstraction over a Themis store backend.
///
/// Operations that change a visit request or the blacklist take the audit
/// entry describing the change and must commit both together, or neither.
///
/// Backend errors convert into [`crate::Error`]; a backend decides which of
/// its failures are domain outcomes (e.g. a lost compare-and-set becomes
/// [`crate::Error::InvalidStateTransition`]).
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait FacilityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  // ── Users ─────────────────────────────────────────────────────────────

  /// Fails if the username is taken.
  fn insert_user(
    &self,
    input: NewUser,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  fn get_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + '_;

  fn find_user_by_username<'a>(
    &'a self,
    username: &'a str,
  ) -> impl Future<Output = Result<Option<User>, Self::Error>> + Send + 'a;

  fn list_users(
    &self,
    role: Option<Role>,
  ) -> impl Future<Output = Result<Vec<User>, Self::Error>> + Send + '_;

  /// Delete a user, unlinking any visitor identity and clearing references
  /// from decided requests and audit entries.
  fn delete_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Stamp `last_login` and return the updated user.
  fn record_login(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<User, Self::Error>> + Send + '_;

  /// Create a visitor-role user and its linked visitor identity atomically.
  fn register_visitor_account(
    &self,
    user: NewUser,
    visitor: NewVisitor,
  ) -> impl Future<Output = Result<(User, Visitor), Self::Error>> + Send + '_;

  // ── Classifications ───────────────────────────────────────────────────

  fn insert_category(
    &self,
    input: NewCrimeCategory,
  ) -> impl Future<Output = Result<CrimeCategory, Self::Error>> + Send + '_;

  fn get_category(
    &self,
    category_id: Uuid,
  ) -> impl Future<Output = Result<Option<CrimeCategory>, Self::Error>> + Send + '_;

  fn list_categories(
    &self,
  ) -> impl Future<Output = Result<Vec<CrimeCategory>, Self::Error>> + Send + '_;

  fn insert_crime_type(
    &self,
    input: NewCrimeType,
  ) -> impl Future<Output = Result<CrimeType, Self::Error>> + Send + '_;

  fn get_crime_type(
    &self,
    crime_id: Uuid,
  ) -> impl Future<Output = Result<Option<CrimeType>, Self::Error>> + Send + '_;

  fn list_crime_types(
    &self,
    category_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Vec<CrimeType>, Self::Error>> + Send + '_;

  // ── PUCs ──────────────────────────────────────────────────────────────

  fn insert_puc(
    &self,
    input: NewPuc,
  ) -> impl Future<Output = Result<Puc, Self::Error>> + Send + '_;

  fn get_puc(
    &self,
    puc_id: Uuid,
  ) -> impl Future<Output = Result<Option<Puc>, Self::Error>> + Send + '_;

  /// Ordered by last name, then first name.
  fn list_pucs<'a>(
    &'a self,
    query: &'a PucQuery,
  ) -> impl Future<Output = Result<Vec<Puc>, Self::Error>> + Send + 'a;

  /// Overwrite every mutable column of an existing PUC.
  fn replace_puc<'a>(
    &'a self,
    puc: &'a Puc,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Visitors ──────────────────────────────────────────────────────────

  fn insert_visitor(
    &self,
    input: NewVisitor,
  ) -> impl Future<Output = Result<Visitor, Self::Error>> + Send + '_;

  fn get_visitor(
    &self,
    visitor_id: Uuid,
  ) -> impl Future<Output = Result<Option<Visitor>, Self::Error>> + Send + '_;

  /// The visitor identity linked to a login, if any.
  fn visitor_for_user(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<Visitor>, Self::Error>> + Send + '_;

  /// Ordered by last name, then first name.
  fn list_visitors<'a>(
    &'a self,
    query: &'a VisitorQuery,
  ) -> impl Future<Output = Result<Vec<Visitor>, Self::Error>> + Send + 'a;

  /// Overwrite the identity columns of an existing visitor. Never touches
  /// `linked_user_id`.
  fn replace_visitor<'a>(
    &'a self,
    visitor: &'a Visitor,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Blacklist ─────────────────────────────────────────────────────────

  /// Fails on a duplicate pair or an unknown visitor/PUC.
  fn insert_blacklist_entry(
    &self,
    input: NewBlacklistEntry,
    audit: NewAuditEntry,
  ) -> impl Future<Output = Result<BlacklistEntry, Self::Error>> + Send + '_;

  /// Delete an entry and return what was removed.
  fn remove_blacklist_entry(
    &self,
    blacklist_id: Uuid,
    audit: NewAuditEntry,
  ) -> impl Future<Output = Result<BlacklistEntry, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_blacklist(
    &self,
    query: BlacklistQuery,
  ) -> impl Future<Output = Result<Vec<BlacklistEntry>, Self::Error>> + Send + '_;

  fn is_blacklisted(
    &self,
    visitor_id: Uuid,
    puc_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Visit requests ────────────────────────────────────────────────────

  /// Insert a pending request unless the pair is blacklisted.
  fn insert_visit_request(
    &self,
    input: NewVisitRequest,
    audit: NewAuditEntry,
  ) -> impl Future<Output = Result<VisitRequest, Self::Error>> + Send + '_;

  fn get_visit_request(
    &self,
    request_id: Uuid,
  ) -> impl Future<Output = Result<Option<VisitRequest>, Self::Error>> + Send + '_;

  /// Newest `created_at` first.
  fn list_visit_requests<'a>(
    &'a self,
    query: &'a VisitQuery,
  ) -> impl Future<Output = Result<Vec<VisitRequest>, Self::Error>> + Send + 'a;

  /// Move a pending request to its terminal state.
  ///
  /// Atomically: compare-and-set on `pending`, re-check the blacklist when
  /// approving, apply `decision.provision` only if the visitor is still
  /// unlinked, and append `audit`.
  fn decide_visit_request(
    &self,
    decision: VisitDecision,
    audit: NewAuditEntry,
  ) -> impl Future<Output = Result<DecisionRecord, Self::Error>> + Send + '_;

  // ── Audit ─────────────────────────────────────────────────────────────

  fn append_audit(
    &self,
    entry: NewAuditEntry,
  ) -> impl Future<Output = Result<AuditEntry, Self::Error>> + Send + '_;

  /// Newest first.
  fn list_audit<'a>(
    &'a self,
    query: &'a AuditQuery,
  ) -> impl Future<Output = Result<Vec<AuditEntry>, Self::Error>> + Send + 'a;

  // ── Reports ───────────────────────────────────────────────────────────

  fn dashboard_stats(
    &self,
    today: NaiveDate,
  ) -> impl Future<Output = Result<DashboardStats, Self::Error>> + Send + '_;

  fn custody_report(
    &self,
  ) -> impl Future<Output = Result<CustodyReport, Self::Error>> + Send + '_;
}
