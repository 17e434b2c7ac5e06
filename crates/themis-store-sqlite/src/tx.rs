//! Synchronous multi-statement operations.
//!
//! Each public function here runs inside one `tokio_rusqlite` call, on the
//! connection thread, and does all of its work in one transaction. Returning
//! early with an error drops the transaction, which rolls it back.

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension as _, params};
use uuid::Uuid;

use themis_core::{
  access::Role,
  audit::{AuditEntry, NewAuditEntry},
  blacklist::{BlacklistEntry, NewBlacklistEntry},
  user::{NewUser, ProvisionPlan, User},
  visit::{ApprovalStatus, Decision, DecisionRecord, NewVisitRequest, VisitDecision, VisitRequest},
  visitor::{NewVisitor, Visitor},
};

use crate::{
  Error, Result,
  encode::{
    BLACKLIST_COLUMNS, RawBlacklistEntry, RawUser, RawVisitRequest, RawVisitor, USER_COLUMNS,
    VISIT_COLUMNS, VISITOR_COLUMNS, encode_date, encode_dt, encode_time, encode_uuid,
  },
};

// ─── Lookups ─────────────────────────────────────────────────────────────────

fn exists(conn: &Connection, sql: &str, id: Uuid) -> Result<bool> {
  Ok(
    conn
      .query_row(sql, params![encode_uuid(id)], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

pub fn username_taken(conn: &Connection, username: &str) -> Result<bool> {
  Ok(
    conn
      .query_row("SELECT 1 FROM users WHERE username = ?1", params![username], |_| Ok(()))
      .optional()?
      .is_some(),
  )
}

pub fn fetch_user(conn: &Connection, user_id: Uuid) -> Result<Option<User>> {
  conn
    .query_row(
      &format!("SELECT {USER_COLUMNS} FROM users WHERE user_id = ?1"),
      params![encode_uuid(user_id)],
      RawUser::from_row,
    )
    .optional()?
    .map(RawUser::into_user)
    .transpose()
}

pub fn fetch_visitor(conn: &Connection, visitor_id: Uuid) -> Result<Option<Visitor>> {
  conn
    .query_row(
      &format!("SELECT {VISITOR_COLUMNS} FROM visitors WHERE visitor_id = ?1"),
      params![encode_uuid(visitor_id)],
      RawVisitor::from_row,
    )
    .optional()?
    .map(RawVisitor::into_visitor)
    .transpose()
}

pub fn fetch_request(conn: &Connection, request_id: Uuid) -> Result<Option<VisitRequest>> {
  conn
    .query_row(
      &format!("SELECT {VISIT_COLUMNS} FROM visit_requests WHERE request_id = ?1"),
      params![encode_uuid(request_id)],
      RawVisitRequest::from_row,
    )
    .optional()?
    .map(RawVisitRequest::into_request)
    .transpose()
}

fn fetch_blacklist_entry(conn: &Connection, blacklist_id: Uuid) -> Result<Option<BlacklistEntry>> {
  conn
    .query_row(
      &format!("SELECT {BLACKLIST_COLUMNS} FROM blacklist WHERE blacklist_id = ?1"),
      params![encode_uuid(blacklist_id)],
      RawBlacklistEntry::from_row,
    )
    .optional()?
    .map(RawBlacklistEntry::into_entry)
    .transpose()
}

pub fn is_blacklisted(conn: &Connection, visitor_id: Uuid, puc_id: Uuid) -> Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM blacklist WHERE visitor_id = ?1 AND puc_id = ?2",
        params![encode_uuid(visitor_id), encode_uuid(puc_id)],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

fn require_visitor_and_puc(conn: &Connection, visitor_id: Uuid, puc_id: Uuid) -> Result<()> {
  if !exists(conn, "SELECT 1 FROM visitors WHERE visitor_id = ?1", visitor_id)? {
    return Err(Error::InvalidReference(format!("unknown visitor {visitor_id}")));
  }
  if !exists(conn, "SELECT 1 FROM pucs WHERE puc_id = ?1", puc_id)? {
    return Err(Error::InvalidReference(format!("unknown puc {puc_id}")));
  }
  Ok(())
}

// ─── Single-statement writes ─────────────────────────────────────────────────

pub fn append_audit(conn: &Connection, entry: &NewAuditEntry) -> Result<AuditEntry> {
  let audit = AuditEntry {
    audit_id:   Uuid::new_v4(),
    user_id:    entry.user_id,
    event_type: entry.event.as_str().to_owned(),
    timestamp:  Utc::now(),
    ip_address: entry.ip_address.clone(),
    notes:      entry.notes.clone(),
  };
  conn.execute(
    "INSERT INTO audit_log (audit_id, user_id, event_type, timestamp, ip_address, notes)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      encode_uuid(audit.audit_id),
      audit.user_id.map(encode_uuid),
      audit.event_type,
      encode_dt(audit.timestamp),
      audit.ip_address,
      audit.notes,
    ],
  )?;
  Ok(audit)
}

/// Insert a user row, failing with [`Error::UsernameTaken`] on a duplicate.
pub fn insert_user(conn: &Connection, input: NewUser) -> Result<User> {
  if username_taken(conn, &input.username)? {
    return Err(Error::UsernameTaken(input.username));
  }
  let user = User {
    user_id:       Uuid::new_v4(),
    username:      input.username,
    password_hash: input.password_hash,
    role:          input.role,
    email:         input.email,
    full_name:     input.full_name,
    created_at:    Utc::now(),
    last_login:    None,
  };
  conn.execute(
    "INSERT INTO users (user_id, username, password_hash, role, email, full_name, created_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    params![
      encode_uuid(user.user_id),
      user.username,
      user.password_hash,
      user.role.as_str(),
      user.email,
      user.full_name,
      encode_dt(user.created_at),
    ],
  )?;
  Ok(user)
}

pub fn insert_visitor(
  conn: &Connection,
  input: NewVisitor,
  linked_user_id: Option<Uuid>,
) -> Result<Visitor> {
  let visitor = Visitor {
    visitor_id: Uuid::new_v4(),
    first_name: input.first_name,
    last_name: input.last_name,
    relationship: input.relationship,
    email: input.email,
    phone: input.phone,
    linked_user_id,
    registered_at: Utc::now(),
  };
  conn.execute(
    "INSERT INTO visitors (
       visitor_id, first_name, last_name, relationship, email, phone,
       linked_user_id, registered_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    params![
      encode_uuid(visitor.visitor_id),
      visitor.first_name,
      visitor.last_name,
      visitor.relationship,
      visitor.email,
      visitor.phone,
      visitor.linked_user_id.map(encode_uuid),
      encode_dt(visitor.registered_at),
    ],
  )?;
  Ok(visitor)
}

// ─── Transactions ────────────────────────────────────────────────────────────

pub fn register_visitor_account(
  conn: &mut Connection,
  user: NewUser,
  visitor: NewVisitor,
) -> Result<(User, Visitor)> {
  let tx = conn.transaction()?;
  let user = insert_user(&tx, user)?;
  let visitor = insert_visitor(&tx, visitor, Some(user.user_id))?;
  tx.commit()?;
  Ok((user, visitor))
}

pub fn delete_user(conn: &mut Connection, user_id: Uuid) -> Result<()> {
  let tx = conn.transaction()?;
  // visitors.linked_user_id, visit_requests.decided_by, blacklist.added_by
  // and audit_log.user_id are all ON DELETE SET NULL.
  let deleted = tx.execute("DELETE FROM users WHERE user_id = ?1", params![encode_uuid(user_id)])?;
  if deleted == 0 {
    return Err(Error::NotFound(format!("user {user_id}")));
  }
  tx.commit()?;
  Ok(())
}

pub fn insert_visit_request(
  conn: &mut Connection,
  input: NewVisitRequest,
  audit: NewAuditEntry,
) -> Result<VisitRequest> {
  let tx = conn.transaction()?;
  require_visitor_and_puc(&tx, input.visitor_id, input.puc_id)?;
  if is_blacklisted(&tx, input.visitor_id, input.puc_id)? {
    return Err(Error::Blacklisted { visitor_id: input.visitor_id, puc_id: input.puc_id });
  }

  let request = VisitRequest {
    request_id:      Uuid::new_v4(),
    visitor_id:      input.visitor_id,
    puc_id:          input.puc_id,
    visit_date:      input.visit_date,
    visit_time:      input.visit_time,
    purpose:         input.purpose,
    approval_status: ApprovalStatus::Pending,
    created_at:      Utc::now(),
    decided_by:      None,
    decided_at:      None,
  };
  tx.execute(
    "INSERT INTO visit_requests (
       request_id, visitor_id, puc_id, visit_date, visit_time, purpose,
       approval_status, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
    params![
      encode_uuid(request.request_id),
      encode_uuid(request.visitor_id),
      encode_uuid(request.puc_id),
      encode_date(request.visit_date),
      encode_time(request.visit_time),
      request.purpose,
      request.approval_status.as_str(),
      encode_dt(request.created_at),
    ],
  )?;
  append_audit(&tx, &audit)?;
  tx.commit()?;
  Ok(request)
}

/// `base`, or `base1`, `base2`, … whichever is free first.
fn unique_username(conn: &Connection, base: &str) -> Result<String> {
  if !username_taken(conn, base)? {
    return Ok(base.to_owned());
  }
  let mut n: u32 = 1;
  loop {
    let candidate = format!("{base}{n}");
    if !username_taken(conn, &candidate)? {
      return Ok(candidate);
    }
    n += 1;
  }
}

/// Create and link a login for `visitor_id` unless it already has one.
fn provision(conn: &Connection, visitor_id: Uuid, plan: ProvisionPlan) -> Result<Option<User>> {
  let visitor = fetch_visitor(conn, visitor_id)?
    .ok_or_else(|| Error::NotFound(format!("visitor {visitor_id}")))?;
  if visitor.linked_user_id.is_some() {
    return Ok(None);
  }

  let username = unique_username(conn, &plan.base_username)?;
  let user = insert_user(
    conn,
    NewUser {
      username,
      password_hash: plan.password_hash,
      role: Role::Visitor,
      email: plan.email,
      full_name: plan.full_name,
    },
  )?;
  conn.execute(
    "UPDATE visitors SET linked_user_id = ?2 WHERE visitor_id = ?1 AND linked_user_id IS NULL",
    params![encode_uuid(visitor_id), encode_uuid(user.user_id)],
  )?;
  Ok(Some(user))
}

pub fn decide_visit_request(
  conn: &mut Connection,
  decision: VisitDecision,
  audit: NewAuditEntry,
) -> Result<DecisionRecord> {
  let request_id = decision.request_id;
  let tx = conn.transaction()?;

  let current = fetch_request(&tx, request_id)?
    .ok_or_else(|| Error::NotFound(format!("visit request {request_id}")))?;
  if current.approval_status.is_terminal() {
    return Err(Error::InvalidTransition { request_id, status: current.approval_status });
  }
  if decision.decision == Decision::Approve
    && is_blacklisted(&tx, current.visitor_id, current.puc_id)?
  {
    return Err(Error::Blacklisted { visitor_id: current.visitor_id, puc_id: current.puc_id });
  }

  let target = decision.decision.target();
  let changed = tx.execute(
    "UPDATE visit_requests
     SET approval_status = ?2, decided_by = ?3, decided_at = ?4
     WHERE request_id = ?1 AND approval_status = 'pending'",
    params![
      encode_uuid(request_id),
      target.as_str(),
      encode_uuid(decision.decided_by),
      encode_dt(Utc::now()),
    ],
  )?;
  if changed == 0 {
    let status = fetch_request(&tx, request_id)?
      .map(|r| r.approval_status)
      .unwrap_or(current.approval_status);
    return Err(Error::InvalidTransition { request_id, status });
  }

  let provisioned = match (decision.decision, decision.provision) {
    (Decision::Approve, Some(plan)) => provision(&tx, current.visitor_id, plan)?,
    _ => None,
  };
  append_audit(&tx, &audit)?;

  let request = fetch_request(&tx, request_id)?
    .ok_or_else(|| Error::NotFound(format!("visit request {request_id}")))?;
  tx.commit()?;
  Ok(DecisionRecord { request, provisioned })
}

pub fn insert_blacklist_entry(
  conn: &mut Connection,
  input: NewBlacklistEntry,
  audit: NewAuditEntry,
) -> Result<BlacklistEntry> {
  let tx = conn.transaction()?;
  require_visitor_and_puc(&tx, input.visitor_id, input.puc_id)?;
  if is_blacklisted(&tx, input.visitor_id, input.puc_id)? {
    return Err(Error::AlreadyBlacklisted { visitor_id: input.visitor_id, puc_id: input.puc_id });
  }

  let entry = BlacklistEntry {
    blacklist_id: Uuid::new_v4(),
    visitor_id:   input.visitor_id,
    puc_id:       input.puc_id,
    reason:       input.reason,
    added_by:     Some(input.added_by),
    added_at:     Utc::now(),
  };
  tx.execute(
    "INSERT INTO blacklist (blacklist_id, visitor_id, puc_id, reason, added_by, added_at)
     VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    params![
      encode_uuid(entry.blacklist_id),
      encode_uuid(entry.visitor_id),
      encode_uuid(entry.puc_id),
      entry.reason,
      entry.added_by.map(encode_uuid),
      encode_dt(entry.added_at),
    ],
  )?;
  append_audit(&tx, &audit)?;
  tx.commit()?;
  Ok(entry)
}

pub fn remove_blacklist_entry(
  conn: &mut Connection,
  blacklist_id: Uuid,
  audit: NewAuditEntry,
) -> Result<BlacklistEntry> {
  let tx = conn.transaction()?;
  let entry = fetch_blacklist_entry(&tx, blacklist_id)?
    .ok_or_else(|| Error::NotFound(format!("blacklist entry {blacklist_id}")))?;
  tx.execute("DELETE FROM blacklist WHERE blacklist_id = ?1", params![encode_uuid(blacklist_id)])?;
  append_audit(&tx, &audit)?;
  tx.commit()?;
  Ok(entry)
}
