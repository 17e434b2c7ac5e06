//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{Days, NaiveDate, NaiveTime, Utc};
use themis_core::{
  access::{Actor, Role},
  audit::{AuditContext, AuditEvent, AuditQuery},
  blacklist::{BlacklistQuery, NewBlacklistEntry},
  classification::{CrimeCategory, CrimeType, NewCrimeCategory, NewCrimeType},
  puc::{CustodyStatus, NewPuc, Puc, PucQuery},
  store::FacilityStore,
  user::{NewUser, User, UserDirectory},
  visit::{ApprovalStatus, Decision, NewVisitRequest, VisitDecision, VisitQuery},
  visitor::{NewVisitor, Visitor, VisitorQuery},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

// ─── Fixtures ────────────────────────────────────────────────────────────────

pub(crate) async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

pub(crate) fn new_user(username: &str, role: Role) -> NewUser {
  NewUser {
    username:      username.into(),
    password_hash: "$argon2id$placeholder".into(),
    role,
    email:         None,
    full_name:     None,
  }
}

pub(crate) fn new_visitor(first: &str, last: &str) -> NewVisitor {
  NewVisitor {
    first_name:   first.into(),
    last_name:    last.into(),
    relationship: Some("sibling".into()),
    email:        Some(format!("{}@example.com", first.to_lowercase())),
    phone:        None,
  }
}

pub(crate) fn audit_ctx() -> AuditContext { AuditContext::default() }

pub(crate) fn in_days(days: u64) -> NaiveDate {
  Utc::now()
    .date_naive()
    .checked_add_days(Days::new(days))
    .expect("date in range")
}

pub(crate) fn visit(visitor_id: Uuid, puc_id: Uuid, date: NaiveDate) -> NewVisitRequest {
  NewVisitRequest {
    visitor_id,
    puc_id,
    visit_date: date,
    visit_time: NaiveTime::from_hms_opt(14, 30, 0).expect("valid time"),
    purpose: "family visit".into(),
  }
}

/// A staff account and the principal acting through it.
pub(crate) async fn staff(s: &SqliteStore, username: &str, role: Role) -> Actor {
  let user = s.insert_user(new_user(username, role)).await.unwrap();
  UserDirectory::new(s).resolve_actor(user.user_id).await.unwrap()
}

/// A signed-up visitor: login plus linked identity.
pub(crate) async fn visitor_account(
  s: &SqliteStore,
  username: &str,
  first: &str,
  last: &str,
) -> (Actor, Visitor) {
  let (user, visitor) = s
    .register_visitor_account(new_user(username, Role::Visitor), new_visitor(first, last))
    .await
    .unwrap();
  let actor = UserDirectory::new(s).resolve_actor(user.user_id).await.unwrap();
  (actor, visitor)
}

pub(crate) async fn classification(s: &SqliteStore, name: &str) -> (CrimeCategory, CrimeType) {
  let category = s
    .insert_category(NewCrimeCategory { name: name.into() })
    .await
    .unwrap();
  let crime = s
    .insert_crime_type(NewCrimeType {
      category_id:   category.category_id,
      name:          format!("{name} offence"),
      law_reference: "RA 9165".into(),
      description:   None,
    })
    .await
    .unwrap();
  (category, crime)
}

pub(crate) fn new_puc(first: &str, last: &str, crime: &CrimeType) -> NewPuc {
  NewPuc {
    first_name:   first.into(),
    last_name:    last.into(),
    gender:       None,
    age:          Some(30),
    arrest_date:  NaiveDate::from_ymd_opt(2026, 1, 10),
    release_date: None,
    status:       CustodyStatus::InCustody,
    category_id:  crime.category_id,
    crime_id:     crime.crime_id,
  }
}

pub(crate) async fn puc(s: &SqliteStore, first: &str, last: &str) -> Puc {
  let (_, crime) = classification(s, &format!("{first}-{last}")).await;
  s.insert_puc(new_puc(first, last, &crime)).await.unwrap()
}

// ─── Users ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_find_user() {
  let s = store().await;
  let user = s.insert_user(new_user("officer1", Role::Officer)).await.unwrap();

  let found = s.find_user_by_username("officer1").await.unwrap().unwrap();
  assert_eq!(found.user_id, user.user_id);
  assert_eq!(found.role, Role::Officer);
  assert!(found.last_login.is_none());

  assert!(s.find_user_by_username("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
  let s = store().await;
  s.insert_user(new_user("jdoe", Role::Officer)).await.unwrap();

  let err = s.insert_user(new_user("jdoe", Role::Admin)).await.unwrap_err();
  assert!(matches!(err, Error::UsernameTaken(ref u) if u == "jdoe"));
  assert!(matches!(themis_core::Error::from(err), themis_core::Error::Conflict(_)));
}

#[tokio::test]
async fn list_users_by_role() {
  let s = store().await;
  s.insert_user(new_user("b_officer", Role::Officer)).await.unwrap();
  s.insert_user(new_user("a_officer", Role::Officer)).await.unwrap();
  s.insert_user(new_user("admin", Role::Admin)).await.unwrap();

  let officers = s.list_users(Some(Role::Officer)).await.unwrap();
  let names: Vec<_> = officers.iter().map(|u| u.username.as_str()).collect();
  assert_eq!(names, ["a_officer", "b_officer"]);
  assert_eq!(s.list_users(None).await.unwrap().len(), 3);
}

#[tokio::test]
async fn record_login_stamps_last_login() {
  let s = store().await;
  let user = s.insert_user(new_user("officer1", Role::Officer)).await.unwrap();
  let updated: User = s.record_login(user.user_id).await.unwrap();
  assert!(updated.last_login.is_some());

  assert!(matches!(
    s.record_login(Uuid::new_v4()).await.unwrap_err(),
    Error::NotFound(_)
  ));
}

#[tokio::test]
async fn signup_links_visitor_to_user() {
  let s = store().await;
  let (actor, visitor) = visitor_account(&s, "asantos", "Ana", "Santos").await;

  assert_eq!(actor.role, Role::Visitor);
  assert_eq!(actor.visitor_id, Some(visitor.visitor_id));
  assert_eq!(visitor.linked_user_id, Some(actor.user_id));

  let linked = s.visitor_for_user(actor.user_id).await.unwrap().unwrap();
  assert_eq!(linked.visitor_id, visitor.visitor_id);
}

#[tokio::test]
async fn signup_with_taken_username_creates_nothing() {
  let s = store().await;
  s.insert_user(new_user("asantos", Role::Officer)).await.unwrap();

  let err = s
    .register_visitor_account(new_user("asantos", Role::Visitor), new_visitor("Ana", "Santos"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::UsernameTaken(_)));
  assert!(s.list_visitors(&VisitorQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_user_unlinks_and_clears_references() {
  let s = store().await;
  let officer = staff(&s, "officer1", Role::Officer).await;
  let (visitor_actor, visitor) = visitor_account(&s, "asantos", "Ana", "Santos").await;
  let p = puc(&s, "Ramon", "Cruz").await;

  let request = s
    .insert_visit_request(
      visit(visitor.visitor_id, p.puc_id, in_days(2)),
      audit_ctx().as_user(visitor_actor.user_id).entry(AuditEvent::VisitRequestSubmitted, "x"),
    )
    .await
    .unwrap();
  s.decide_visit_request(
    VisitDecision {
      request_id: request.request_id,
      decision:   Decision::Reject,
      decided_by: officer.user_id,
      provision:  None,
    },
    audit_ctx().as_user(officer.user_id).entry(AuditEvent::VisitRejected, "x"),
  )
  .await
  .unwrap();

  s.delete_user(visitor_actor.user_id).await.unwrap();
  s.delete_user(officer.user_id).await.unwrap();

  let visitor = s.get_visitor(visitor.visitor_id).await.unwrap().unwrap();
  assert!(visitor.linked_user_id.is_none());
  let request = s.get_visit_request(request.request_id).await.unwrap().unwrap();
  assert!(request.decided_by.is_none());
  assert_eq!(request.approval_status, ApprovalStatus::Rejected);

  let audit = s.list_audit(&AuditQuery::default()).await.unwrap();
  assert!(audit.iter().all(|e| e.user_id.is_none()));

  assert!(matches!(
    s.delete_user(officer.user_id).await.unwrap_err(),
    Error::NotFound(_)
  ));
}

// ─── Classifications & PUCs ──────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_category_is_rejected() {
  let s = store().await;
  s.insert_category(NewCrimeCategory { name: "Theft".into() }).await.unwrap();
  let err = s
    .insert_category(NewCrimeCategory { name: "Theft".into() })
    .await
    .unwrap_err();
  assert!(matches!(err, Error::CategoryExists(_)));
}

#[tokio::test]
async fn crime_type_requires_known_category() {
  let s = store().await;
  let err = s
    .insert_crime_type(NewCrimeType {
      category_id:   Uuid::new_v4(),
      name:          "Robbery".into(),
      law_reference: "RPC Art. 293".into(),
      description:   None,
    })
    .await
    .unwrap_err();
  assert!(matches!(
    themis_core::Error::from(err),
    themis_core::Error::Validation(_)
  ));
}

#[tokio::test]
async fn puc_text_search_is_case_insensitive_and_ordered() {
  let s = store().await;
  let (_, crime) = classification(&s, "Theft").await;
  for (first, last) in [("Maria", "Zamora"), ("Jose", "Abad"), ("Mario", "Abad")] {
    s.insert_puc(new_puc(first, last, &crime)).await.unwrap();
  }

  let all = s.list_pucs(&PucQuery::default()).await.unwrap();
  let names: Vec<_> = all.iter().map(Puc::full_name).collect();
  assert_eq!(names, ["Jose Abad", "Mario Abad", "Maria Zamora"]);

  let hits = s
    .list_pucs(&PucQuery { text: Some("MARI".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(hits.len(), 2);

  let full = s
    .list_pucs(&PucQuery { text: Some("jose abad".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(full.len(), 1);
}

#[tokio::test]
async fn puc_filters_by_status_and_category() {
  let s = store().await;
  let (theft, theft_crime) = classification(&s, "Theft").await;
  let (_, fraud_crime) = classification(&s, "Fraud").await;

  let released = NewPuc {
    status: CustodyStatus::Released,
    release_date: NaiveDate::from_ymd_opt(2026, 2, 1),
    ..new_puc("Ana", "Lim", &theft_crime)
  };
  s.insert_puc(released).await.unwrap();
  s.insert_puc(new_puc("Ben", "Go", &theft_crime)).await.unwrap();
  s.insert_puc(new_puc("Cy", "Tan", &fraud_crime)).await.unwrap();

  let theft_only = s
    .list_pucs(&PucQuery { category_id: Some(theft.category_id), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(theft_only.len(), 2);

  let released = s
    .list_pucs(&PucQuery { status: Some(CustodyStatus::Released), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(released.len(), 1);
  assert_eq!(released[0].release_date, NaiveDate::from_ymd_opt(2026, 2, 1));
}

#[tokio::test]
async fn replace_puc_overwrites_fields() {
  let s = store().await;
  let mut p = puc(&s, "Ramon", "Cruz").await;
  p.status = CustodyStatus::Transferred;
  p.age = Some(41);
  s.replace_puc(&p).await.unwrap();

  let fetched = s.get_puc(p.puc_id).await.unwrap().unwrap();
  assert_eq!(fetched.status, CustodyStatus::Transferred);
  assert_eq!(fetched.age, Some(41));

  p.puc_id = Uuid::new_v4();
  assert!(matches!(s.replace_puc(&p).await.unwrap_err(), Error::NotFound(_)));
}

// ─── Visitors ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn visitor_linked_filter() {
  let s = store().await;
  visitor_account(&s, "asantos", "Ana", "Santos").await;
  s.insert_visitor(new_visitor("Ben", "Reyes")).await.unwrap();

  let linked = s
    .list_visitors(&VisitorQuery { linked: Some(true), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(linked.len(), 1);
  assert_eq!(linked[0].first_name, "Ana");

  let unlinked = s
    .list_visitors(&VisitorQuery { linked: Some(false), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(unlinked.len(), 1);
  assert_eq!(unlinked[0].first_name, "Ben");

  let by_name = s
    .list_visitors(&VisitorQuery { text: Some("rey".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(by_name.len(), 1);
}

#[tokio::test]
async fn replace_visitor_keeps_link() {
  let s = store().await;
  let (actor, mut visitor) = visitor_account(&s, "asantos", "Ana", "Santos").await;
  visitor.phone = Some("555-0199".into());
  visitor.linked_user_id = None;
  s.replace_visitor(&visitor).await.unwrap();

  let fetched = s.get_visitor(visitor.visitor_id).await.unwrap().unwrap();
  assert_eq!(fetched.phone.as_deref(), Some("555-0199"));
  assert_eq!(fetched.linked_user_id, Some(actor.user_id));
}

// ─── Blacklist ───────────────────────────────────────────────────────────────

fn entry(visitor_id: Uuid, puc_id: Uuid, added_by: Uuid) -> NewBlacklistEntry {
  NewBlacklistEntry { visitor_id, puc_id, reason: "security concern".into(), added_by }
}

#[tokio::test]
async fn blacklist_pair_is_unique() {
  let s = store().await;
  let officer = staff(&s, "officer1", Role::Officer).await;
  let v = s.insert_visitor(new_visitor("Ana", "Santos")).await.unwrap();
  let p = puc(&s, "Ramon", "Cruz").await;

  let added = s
    .insert_blacklist_entry(
      entry(v.visitor_id, p.puc_id, officer.user_id),
      audit_ctx().entry(AuditEvent::BlacklistAdded, "x"),
    )
    .await
    .unwrap();
  assert!(s.is_blacklisted(v.visitor_id, p.puc_id).await.unwrap());

  let err = s
    .insert_blacklist_entry(
      entry(v.visitor_id, p.puc_id, officer.user_id),
      audit_ctx().entry(AuditEvent::BlacklistAdded, "x"),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::AlreadyBlacklisted { .. }));

  let listed = s
    .list_blacklist(BlacklistQuery { visitor_id: Some(v.visitor_id), puc_id: None })
    .await
    .unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].blacklist_id, added.blacklist_id);
}

#[tokio::test]
async fn blacklist_requires_known_visitor_and_puc() {
  let s = store().await;
  let officer = staff(&s, "officer1", Role::Officer).await;
  let p = puc(&s, "Ramon", "Cruz").await;

  let err = s
    .insert_blacklist_entry(
      entry(Uuid::new_v4(), p.puc_id, officer.user_id),
      audit_ctx().entry(AuditEvent::BlacklistAdded, "x"),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidReference(_)));
  assert!(s.list_audit(&AuditQuery::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn remove_blacklist_entry() {
  let s = store().await;
  let admin = staff(&s, "admin", Role::Admin).await;
  let v = s.insert_visitor(new_visitor("Ana", "Santos")).await.unwrap();
  let p = puc(&s, "Ramon", "Cruz").await;

  let added = s
    .insert_blacklist_entry(
      entry(v.visitor_id, p.puc_id, admin.user_id),
      audit_ctx().entry(AuditEvent::BlacklistAdded, "x"),
    )
    .await
    .unwrap();
  let removed = s
    .remove_blacklist_entry(added.blacklist_id, audit_ctx().entry(AuditEvent::BlacklistRemoved, "x"))
    .await
    .unwrap();
  assert_eq!(removed.reason, "security concern");
  assert!(!s.is_blacklisted(v.visitor_id, p.puc_id).await.unwrap());

  let err = s
    .remove_blacklist_entry(added.blacklist_id, audit_ctx().entry(AuditEvent::BlacklistRemoved, "x"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound(_)));
}

// ─── Visit requests ──────────────────────────────────────────────────────────

#[tokio::test]
async fn blacklisted_insert_writes_nothing() {
  let s = store().await;
  let officer = staff(&s, "officer1", Role::Officer).await;
  let v = s.insert_visitor(new_visitor("Ana", "Santos")).await.unwrap();
  let p = puc(&s, "Ramon", "Cruz").await;
  s.insert_blacklist_entry(
    entry(v.visitor_id, p.puc_id, officer.user_id),
    audit_ctx().entry(AuditEvent::BlacklistAdded, "x"),
  )
  .await
  .unwrap();

  let err = s
    .insert_visit_request(
      visit(v.visitor_id, p.puc_id, in_days(1)),
      audit_ctx().entry(AuditEvent::VisitRequestSubmitted, "x"),
    )
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Blacklisted { .. }));

  assert!(s.list_visit_requests(&VisitQuery::default()).await.unwrap().is_empty());
  let submitted = s
    .list_audit(&AuditQuery {
      event_type: Some(AuditEvent::VisitRequestSubmitted),
      ..Default::default()
    })
    .await
    .unwrap();
  assert!(submitted.is_empty());
}

#[tokio::test]
async fn visit_request_round_trips_date_and_time() {
  let s = store().await;
  let v = s.insert_visitor(new_visitor("Ana", "Santos")).await.unwrap();
  let p = puc(&s, "Ramon", "Cruz").await;
  let date = in_days(5);

  let created = s
    .insert_visit_request(
      visit(v.visitor_id, p.puc_id, date),
      audit_ctx().entry(AuditEvent::VisitRequestSubmitted, "x"),
    )
    .await
    .unwrap();
  let fetched = s.get_visit_request(created.request_id).await.unwrap().unwrap();
  assert_eq!(fetched.visit_date, date);
  assert_eq!(fetched.visit_time, NaiveTime::from_hms_opt(14, 30, 0).unwrap());
  assert_eq!(fetched.approval_status, ApprovalStatus::Pending);
  assert!(fetched.decided_by.is_none());
}

#[tokio::test]
async fn list_visit_requests_filters_and_orders() {
  let s = store().await;
  let v = s.insert_visitor(new_visitor("Ana", "Santos")).await.unwrap();
  let p = puc(&s, "Ramon", "Cruz").await;
  let q = puc(&s, "Lito", "Diaz").await;

  let mut ids = vec![];
  for (puc_id, days) in [(p.puc_id, 1), (p.puc_id, 3), (q.puc_id, 5)] {
    let r = s
      .insert_visit_request(
        visit(v.visitor_id, puc_id, in_days(days)),
        audit_ctx().entry(AuditEvent::VisitRequestSubmitted, "x"),
      )
      .await
      .unwrap();
    ids.push(r.request_id);
  }

  let all = s.list_visit_requests(&VisitQuery::default()).await.unwrap();
  let order: Vec<_> = all.iter().map(|r| r.request_id).collect();
  assert_eq!(order, [ids[2], ids[1], ids[0]]);

  let for_p = s
    .list_visit_requests(&VisitQuery { puc_id: Some(p.puc_id), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(for_p.len(), 2);

  let window = s
    .list_visit_requests(&VisitQuery {
      from: Some(in_days(3)),
      to: Some(in_days(5)),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(window.len(), 2);

  let pending = s
    .list_visit_requests(&VisitQuery {
      status: Some(ApprovalStatus::Pending),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(pending.len(), 3);
}

// ─── Audit ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn audit_is_newest_first_with_limit_and_filter() {
  let s = store().await;
  let admin = staff(&s, "admin", Role::Admin).await;
  let ctx = AuditContext { user_id: Some(admin.user_id), ip_address: Some("10.0.0.7".into()) };

  for n in 0..5 {
    s.append_audit(ctx.entry(AuditEvent::Login, format!("login {n}"))).await.unwrap();
  }
  s.append_audit(audit_ctx().entry(AuditEvent::Signup, "anonymous")).await.unwrap();

  let page = s
    .list_audit(&AuditQuery { limit: Some(2), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(page.len(), 2);
  assert_eq!(page[0].event_type, "signup");
  assert_eq!(page[1].notes.as_deref(), Some("login 4"));

  let logins = s
    .list_audit(&AuditQuery {
      event_type: Some(AuditEvent::Login),
      user_id: Some(admin.user_id),
      offset: Some(1),
      ..Default::default()
    })
    .await
    .unwrap();
  assert_eq!(logins.len(), 4);
  assert!(logins.iter().all(|e| e.ip_address.as_deref() == Some("10.0.0.7")));
}

#[tokio::test]
async fn audit_offset_past_the_end_is_empty() {
  let s = store().await;
  s.append_audit(audit_ctx().entry(AuditEvent::Signup, "anonymous")).await.unwrap();

  for offset in [1, i64::MAX as usize, usize::MAX] {
    let page = s
      .list_audit(&AuditQuery { offset: Some(offset), ..Default::default() })
      .await
      .unwrap();
    assert!(page.is_empty(), "offset {offset}");
  }
}

// ─── Reports ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn dashboard_counts() {
  let s = store().await;
  let officer = staff(&s, "officer1", Role::Officer).await;
  staff(&s, "admin", Role::Admin).await;
  let (_, v) = visitor_account(&s, "asantos", "Ana", "Santos").await;
  let p = puc(&s, "Ramon", "Cruz").await;

  let today = Utc::now().date_naive();
  let r = s
    .insert_visit_request(
      visit(v.visitor_id, p.puc_id, today),
      audit_ctx().entry(AuditEvent::VisitRequestSubmitted, "x"),
    )
    .await
    .unwrap();
  s.insert_visit_request(
    visit(v.visitor_id, p.puc_id, in_days(1)),
    audit_ctx().entry(AuditEvent::VisitRequestSubmitted, "x"),
  )
  .await
  .unwrap();
  s.decide_visit_request(
    VisitDecision {
      request_id: r.request_id,
      decision:   Decision::Approve,
      decided_by: officer.user_id,
      provision:  None,
    },
    audit_ctx().entry(AuditEvent::VisitApproved, "x"),
  )
  .await
  .unwrap();

  let stats = s.dashboard_stats(today).await.unwrap();
  assert_eq!(stats.pucs, 1);
  assert_eq!(stats.visitors, 1);
  assert_eq!((stats.users.admin, stats.users.officer, stats.users.visitor), (1, 1, 1));
  assert_eq!(stats.visit_requests.pending, 1);
  assert_eq!(stats.visit_requests.approved, 1);
  assert_eq!(stats.visits_today, 1);
  assert_eq!(stats.blacklist_entries, 0);
}

#[tokio::test]
async fn custody_report_groups_and_recent_releases() {
  let s = store().await;
  let (theft, crime) = classification(&s, "Theft").await;
  let (fraud, _) = classification(&s, "Fraud").await;

  for day in 1..=7 {
    s.insert_puc(NewPuc {
      status: CustodyStatus::Released,
      release_date: NaiveDate::from_ymd_opt(2026, 2, day),
      ..new_puc("Released", &format!("P{day}"), &crime)
    })
    .await
    .unwrap();
  }
  s.insert_puc(new_puc("Held", "Q", &crime)).await.unwrap();

  let report = s.custody_report().await.unwrap();
  let counts: Vec<_> = report.by_status.iter().map(|c| (c.status, c.count)).collect();
  assert_eq!(
    counts,
    [
      (CustodyStatus::InCustody, 1),
      (CustodyStatus::Released, 7),
      (CustodyStatus::Transferred, 0),
    ]
  );

  let by_category: Vec<_> = report
    .by_category
    .iter()
    .map(|c| (c.category_id, c.count))
    .collect();
  assert_eq!(by_category, [(fraud.category_id, 0), (theft.category_id, 8)]);

  assert_eq!(report.recent_releases.len(), 5);
  assert_eq!(report.recent_releases[0].release_date, NaiveDate::from_ymd_opt(2026, 2, 7));
}
