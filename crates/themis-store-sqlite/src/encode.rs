//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are RFC 3339 UTC with fixed microsecond precision, so they sort
//! lexically. Dates are `%Y-%m-%d`, times `%H:%M:%S`. UUIDs are hyphenated
//! lowercase strings. Enums use their snake_case names.

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use rusqlite::Row;
use uuid::Uuid;

use themis_core::{
  access::Role,
  audit::AuditEntry,
  blacklist::BlacklistEntry,
  classification::{CrimeCategory, CrimeType},
  puc::{CustodyStatus, Puc},
  user::User,
  visit::{ApprovalStatus, VisitRequest},
  visitor::Visitor,
};

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

fn decode_opt_uuid(s: Option<String>) -> Result<Option<Uuid>> {
  s.as_deref().map(decode_uuid).transpose()
}

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

fn decode_opt_dt(s: Option<String>) -> Result<Option<DateTime<Utc>>> {
  s.as_deref().map(decode_dt).transpose()
}

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

fn decode_opt_date(s: Option<String>) -> Result<Option<NaiveDate>> {
  s.as_deref().map(decode_date).transpose()
}

pub fn encode_time(t: NaiveTime) -> String { t.format("%H:%M:%S").to_string() }

pub fn decode_time(s: &str) -> Result<NaiveTime> {
  NaiveTime::parse_from_str(s, "%H:%M:%S").map_err(|e| Error::Decode(format!("time {s:?}: {e}")))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_role(s: &str) -> Result<Role> {
  s.parse().map_err(|_| Error::Decode(format!("unknown role: {s:?}")))
}

pub fn decode_approval_status(s: &str) -> Result<ApprovalStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown approval status: {s:?}")))
}

pub fn decode_custody_status(s: &str) -> Result<CustodyStatus> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown custody status: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub const USER_COLUMNS: &str =
  "user_id, username, password_hash, role, email, full_name, created_at, last_login";

/// Raw strings read directly from a `users` row.
pub struct RawUser {
  pub user_id:       String,
  pub username:      String,
  pub password_hash: String,
  pub role:          String,
  pub email:         Option<String>,
  pub full_name:     Option<String>,
  pub created_at:    String,
  pub last_login:    Option<String>,
}

impl RawUser {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      user_id:       row.get(0)?,
      username:      row.get(1)?,
      password_hash: row.get(2)?,
      role:          row.get(3)?,
      email:         row.get(4)?,
      full_name:     row.get(5)?,
      created_at:    row.get(6)?,
      last_login:    row.get(7)?,
    })
  }

  pub fn into_user(self) -> Result<User> {
    Ok(User {
      user_id:       decode_uuid(&self.user_id)?,
      username:      self.username,
      password_hash: self.password_hash,
      role:          decode_role(&self.role)?,
      email:         self.email,
      full_name:     self.full_name,
      created_at:    decode_dt(&self.created_at)?,
      last_login:    decode_opt_dt(self.last_login)?,
    })
  }
}

pub const VISITOR_COLUMNS: &str = "visitor_id, first_name, last_name, relationship, email, phone, \
                                   linked_user_id, registered_at";

pub struct RawVisitor {
  pub visitor_id:     String,
  pub first_name:     String,
  pub last_name:      String,
  pub relationship:   Option<String>,
  pub email:          Option<String>,
  pub phone:          Option<String>,
  pub linked_user_id: Option<String>,
  pub registered_at:  String,
}

impl RawVisitor {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      visitor_id:     row.get(0)?,
      first_name:     row.get(1)?,
      last_name:      row.get(2)?,
      relationship:   row.get(3)?,
      email:          row.get(4)?,
      phone:          row.get(5)?,
      linked_user_id: row.get(6)?,
      registered_at:  row.get(7)?,
    })
  }

  pub fn into_visitor(self) -> Result<Visitor> {
    Ok(Visitor {
      visitor_id:     decode_uuid(&self.visitor_id)?,
      first_name:     self.first_name,
      last_name:      self.last_name,
      relationship:   self.relationship,
      email:          self.email,
      phone:          self.phone,
      linked_user_id: decode_opt_uuid(self.linked_user_id)?,
      registered_at:  decode_dt(&self.registered_at)?,
    })
  }
}

pub const PUC_COLUMNS: &str = "puc_id, first_name, last_name, gender, age, arrest_date, \
                               release_date, status, category_id, crime_id, created_at";

pub struct RawPuc {
  pub puc_id:       String,
  pub first_name:   String,
  pub last_name:    String,
  pub gender:       Option<String>,
  pub age:          Option<i64>,
  pub arrest_date:  Option<String>,
  pub release_date: Option<String>,
  pub status:       String,
  pub category_id:  String,
  pub crime_id:     String,
  pub created_at:   String,
}

impl RawPuc {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      puc_id:       row.get(0)?,
      first_name:   row.get(1)?,
      last_name:    row.get(2)?,
      gender:       row.get(3)?,
      age:          row.get(4)?,
      arrest_date:  row.get(5)?,
      release_date: row.get(6)?,
      status:       row.get(7)?,
      category_id:  row.get(8)?,
      crime_id:     row.get(9)?,
      created_at:   row.get(10)?,
    })
  }

  pub fn into_puc(self) -> Result<Puc> {
    let age = self
      .age
      .map(|a| u16::try_from(a).map_err(|_| Error::Decode(format!("age out of range: {a}"))))
      .transpose()?;
    Ok(Puc {
      puc_id: decode_uuid(&self.puc_id)?,
      first_name: self.first_name,
      last_name: self.last_name,
      gender: self.gender,
      age,
      arrest_date: decode_opt_date(self.arrest_date)?,
      release_date: decode_opt_date(self.release_date)?,
      status: decode_custody_status(&self.status)?,
      category_id: decode_uuid(&self.category_id)?,
      crime_id: decode_uuid(&self.crime_id)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

pub const VISIT_COLUMNS: &str = "request_id, visitor_id, puc_id, visit_date, visit_time, purpose, \
                                 approval_status, created_at, decided_by, decided_at";

pub struct RawVisitRequest {
  pub request_id:      String,
  pub visitor_id:      String,
  pub puc_id:          String,
  pub visit_date:      String,
  pub visit_time:      String,
  pub purpose:         String,
  pub approval_status: String,
  pub created_at:      String,
  pub decided_by:      Option<String>,
  pub decided_at:      Option<String>,
}

impl RawVisitRequest {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      request_id:      row.get(0)?,
      visitor_id:      row.get(1)?,
      puc_id:          row.get(2)?,
      visit_date:      row.get(3)?,
      visit_time:      row.get(4)?,
      purpose:         row.get(5)?,
      approval_status: row.get(6)?,
      created_at:      row.get(7)?,
      decided_by:      row.get(8)?,
      decided_at:      row.get(9)?,
    })
  }

  pub fn into_request(self) -> Result<VisitRequest> {
    Ok(VisitRequest {
      request_id:      decode_uuid(&self.request_id)?,
      visitor_id:      decode_uuid(&self.visitor_id)?,
      puc_id:          decode_uuid(&self.puc_id)?,
      visit_date:      decode_date(&self.visit_date)?,
      visit_time:      decode_time(&self.visit_time)?,
      purpose:         self.purpose,
      approval_status: decode_approval_status(&self.approval_status)?,
      created_at:      decode_dt(&self.created_at)?,
      decided_by:      decode_opt_uuid(self.decided_by)?,
      decided_at:      decode_opt_dt(self.decided_at)?,
    })
  }
}

pub const BLACKLIST_COLUMNS: &str = "blacklist_id, visitor_id, puc_id, reason, added_by, added_at";

pub struct RawBlacklistEntry {
  pub blacklist_id: String,
  pub visitor_id:   String,
  pub puc_id:       String,
  pub reason:       String,
  pub added_by:     Option<String>,
  pub added_at:     String,
}

impl RawBlacklistEntry {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      blacklist_id: row.get(0)?,
      visitor_id:   row.get(1)?,
      puc_id:       row.get(2)?,
      reason:       row.get(3)?,
      added_by:     row.get(4)?,
      added_at:     row.get(5)?,
    })
  }

  pub fn into_entry(self) -> Result<BlacklistEntry> {
    Ok(BlacklistEntry {
      blacklist_id: decode_uuid(&self.blacklist_id)?,
      visitor_id:   decode_uuid(&self.visitor_id)?,
      puc_id:       decode_uuid(&self.puc_id)?,
      reason:       self.reason,
      added_by:     decode_opt_uuid(self.added_by)?,
      added_at:     decode_dt(&self.added_at)?,
    })
  }
}

pub const AUDIT_COLUMNS: &str = "audit_id, user_id, event_type, timestamp, ip_address, notes";

pub struct RawAuditEntry {
  pub audit_id:   String,
  pub user_id:    Option<String>,
  pub event_type: String,
  pub timestamp:  String,
  pub ip_address: Option<String>,
  pub notes:      Option<String>,
}

impl RawAuditEntry {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      audit_id:   row.get(0)?,
      user_id:    row.get(1)?,
      event_type: row.get(2)?,
      timestamp:  row.get(3)?,
      ip_address: row.get(4)?,
      notes:      row.get(5)?,
    })
  }

  pub fn into_entry(self) -> Result<AuditEntry> {
    Ok(AuditEntry {
      audit_id:   decode_uuid(&self.audit_id)?,
      user_id:    decode_opt_uuid(self.user_id)?,
      event_type: self.event_type,
      timestamp:  decode_dt(&self.timestamp)?,
      ip_address: self.ip_address,
      notes:      self.notes,
    })
  }
}

pub struct RawCategory {
  pub category_id: String,
  pub name:        String,
}

impl RawCategory {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self { category_id: row.get(0)?, name: row.get(1)? })
  }

  pub fn into_category(self) -> Result<CrimeCategory> {
    Ok(CrimeCategory { category_id: decode_uuid(&self.category_id)?, name: self.name })
  }
}

pub const CRIME_COLUMNS: &str = "crime_id, category_id, name, law_reference, description";

pub struct RawCrimeType {
  pub crime_id:      String,
  pub category_id:   String,
  pub name:          String,
  pub law_reference: String,
  pub description:   Option<String>,
}

impl RawCrimeType {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      crime_id:      row.get(0)?,
      category_id:   row.get(1)?,
      name:          row.get(2)?,
      law_reference: row.get(3)?,
      description:   row.get(4)?,
    })
  }

  pub fn into_crime_type(self) -> Result<CrimeType> {
    Ok(CrimeType {
      crime_id:      decode_uuid(&self.crime_id)?,
      category_id:   decode_uuid(&self.category_id)?,
      name:          self.name,
      law_reference: self.law_reference,
      description:   self.description,
    })
  }
}

/// `%text%` for a `LIKE … ESCAPE '\'` clause, with wildcards in `text`
/// matched literally.
pub fn like_pattern(text: &str) -> String {
  let mut out = String::with_capacity(text.len() + 2);
  out.push('%');
  for c in text.trim().to_lowercase().chars() {
    if matches!(c, '%' | '_' | '\\') {
      out.push('\\');
    }
    out.push(c);
  }
  out.push('%');
  out
}
