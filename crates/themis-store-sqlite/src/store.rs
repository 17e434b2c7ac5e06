//! [`SqliteStore`], the SQLite implementation of [`FacilityStore`].

use std::{collections::HashMap, path::Path};

use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, OptionalExtension as _, params};
use strum::IntoEnumIterator as _;
use uuid::Uuid;

use themis_core::{
  access::Role,
  audit::{AuditEntry, AuditQuery, NewAuditEntry},
  blacklist::{BlacklistEntry, BlacklistQuery, NewBlacklistEntry},
  classification::{CrimeCategory, CrimeType, NewCrimeCategory, NewCrimeType},
  puc::{CustodyStatus, NewPuc, Puc, PucQuery},
  report::{
    CategoryCount, CustodyReport, DashboardStats, RECENT_RELEASES, RequestCounts, StatusCount,
    UserCounts,
  },
  store::FacilityStore,
  user::{NewUser, User},
  visit::{DecisionRecord, NewVisitRequest, VisitDecision, VisitQuery, VisitRequest},
  visitor::{NewVisitor, Visitor, VisitorQuery},
};

use crate::{
  Error, Result,
  encode::{
    AUDIT_COLUMNS, BLACKLIST_COLUMNS, CRIME_COLUMNS, PUC_COLUMNS, RawAuditEntry,
    RawBlacklistEntry, RawCategory, RawCrimeType, RawPuc, RawUser, RawVisitRequest, RawVisitor,
    USER_COLUMNS, VISIT_COLUMNS, VISITOR_COLUMNS, decode_custody_status, decode_uuid,
    encode_date, encode_dt, encode_uuid, like_pattern,
  },
  schema::SCHEMA,
  tx,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Themis store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted. All clones
/// share the one connection thread, so calls are serialised.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn count(conn: &Connection, sql: &str, params: impl rusqlite::Params) -> rusqlite::Result<u64> {
  conn
    .query_row(sql, params, |row| row.get::<_, i64>(0))
    .map(|n| n.max(0) as u64)
}

fn grouped_counts(conn: &Connection, sql: &str) -> rusqlite::Result<Vec<(String, u64)>> {
  let mut stmt = conn.prepare(sql)?;
  stmt
    .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?.max(0) as u64)))?
    .collect()
}

// ─── FacilityStore impl ──────────────────────────────────────────────────────

impl FacilityStore for SqliteStore {
  type Error = Error;

  // ── Users ─────────────────────────────────────────────────────────────────

  async fn insert_user(&self, input: NewUser) -> Result<User> {
    tracing::debug!(username = %input.username, "insert user");
    self
      .conn
      .call(move |conn| Ok(tx::insert_user(conn, input)))
      .await?
  }

  async fn get_user(&self, user_id: Uuid) -> Result<Option<User>> {
    self
      .conn
      .call(move |conn| Ok(tx::fetch_user(conn, user_id)))
      .await?
  }

  async fn find_user_by_username(&self, username: &str) -> Result<Option<User>> {
    let username = username.to_owned();
    let raw: Option<RawUser> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
              params![username],
              RawUser::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawUser::into_user).transpose()
  }

  async fn list_users(&self, role: Option<Role>) -> Result<Vec<User>> {
    let role_str = role.map(Role::as_str);

    let raws: Vec<RawUser> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {USER_COLUMNS} FROM users
           WHERE (?1 IS NULL OR role = ?1)
           ORDER BY username"
        ))?;
        let rows = stmt
          .query_map(params![role_str], RawUser::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawUser::into_user).collect()
  }

  async fn delete_user(&self, user_id: Uuid) -> Result<()> {
    self
      .conn
      .call(move |conn| Ok(tx::delete_user(conn, user_id)))
      .await?
  }

  async fn record_login(&self, user_id: Uuid) -> Result<User> {
    let now = encode_dt(Utc::now());
    self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE users SET last_login = ?2 WHERE user_id = ?1",
          params![encode_uuid(user_id), now],
        )?;
        if changed == 0 {
          return Ok(Err(Error::NotFound(format!("user {user_id}"))));
        }
        Ok(
          tx::fetch_user(conn, user_id)
            .and_then(|u| u.ok_or_else(|| Error::NotFound(format!("user {user_id}")))),
        )
      })
      .await?
  }

  async fn register_visitor_account(
    &self,
    user: NewUser,
    visitor: NewVisitor,
  ) -> Result<(User, Visitor)> {
    self
      .conn
      .call(move |conn| Ok(tx::register_visitor_account(conn, user, visitor)))
      .await?
  }

  // ── Classifications ───────────────────────────────────────────────────────

  async fn insert_category(&self, input: NewCrimeCategory) -> Result<CrimeCategory> {
    let category = CrimeCategory { category_id: Uuid::new_v4(), name: input.name };
    let id_str = encode_uuid(category.category_id);
    let name = category.name.clone();

    self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM crime_categories WHERE name = ?1",
            params![name],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(Err(Error::CategoryExists(name)));
        }
        conn.execute(
          "INSERT INTO crime_categories (category_id, name) VALUES (?1, ?2)",
          params![id_str, name],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(category)
  }

  async fn get_category(&self, category_id: Uuid) -> Result<Option<CrimeCategory>> {
    let id_str = encode_uuid(category_id);
    let raw: Option<RawCategory> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT category_id, name FROM crime_categories WHERE category_id = ?1",
              params![id_str],
              RawCategory::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCategory::into_category).transpose()
  }

  async fn list_categories(&self) -> Result<Vec<CrimeCategory>> {
    let raws: Vec<RawCategory> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT category_id, name FROM crime_categories ORDER BY name")?;
        let rows = stmt
          .query_map([], RawCategory::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCategory::into_category).collect()
  }

  async fn insert_crime_type(&self, input: NewCrimeType) -> Result<CrimeType> {
    let crime = CrimeType {
      crime_id:      Uuid::new_v4(),
      category_id:   input.category_id,
      name:          input.name,
      law_reference: input.law_reference,
      description:   input.description,
    };
    let row = crime.clone();

    self
      .conn
      .call(move |conn| {
        let category_known = conn
          .query_row(
            "SELECT 1 FROM crime_categories WHERE category_id = ?1",
            params![encode_uuid(row.category_id)],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !category_known {
          return Ok(Err(Error::InvalidReference(format!(
            "unknown crime category {}",
            row.category_id
          ))));
        }
        conn.execute(
          &format!("INSERT INTO crime_types ({CRIME_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)"),
          params![
            encode_uuid(row.crime_id),
            encode_uuid(row.category_id),
            row.name,
            row.law_reference,
            row.description,
          ],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(crime)
  }

  async fn get_crime_type(&self, crime_id: Uuid) -> Result<Option<CrimeType>> {
    let id_str = encode_uuid(crime_id);
    let raw: Option<RawCrimeType> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CRIME_COLUMNS} FROM crime_types WHERE crime_id = ?1"),
              params![id_str],
              RawCrimeType::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCrimeType::into_crime_type).transpose()
  }

  async fn list_crime_types(&self, category_id: Option<Uuid>) -> Result<Vec<CrimeType>> {
    let category_str = category_id.map(encode_uuid);
    let raws: Vec<RawCrimeType> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CRIME_COLUMNS} FROM crime_types
           WHERE (?1 IS NULL OR category_id = ?1)
           ORDER BY name"
        ))?;
        let rows = stmt
          .query_map(params![category_str], RawCrimeType::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCrimeType::into_crime_type).collect()
  }

  // ── PUCs ──────────────────────────────────────────────────────────────────

  async fn insert_puc(&self, input: NewPuc) -> Result<Puc> {
    let puc = Puc {
      puc_id:       Uuid::new_v4(),
      first_name:   input.first_name,
      last_name:    input.last_name,
      gender:       input.gender,
      age:          input.age,
      arrest_date:  input.arrest_date,
      release_date: input.release_date,
      status:       input.status,
      category_id:  input.category_id,
      crime_id:     input.crime_id,
      created_at:   Utc::now(),
    };
    let row = puc.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          &format!(
            "INSERT INTO pucs ({PUC_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
          ),
          params![
            encode_uuid(row.puc_id),
            row.first_name,
            row.last_name,
            row.gender,
            row.age,
            row.arrest_date.map(encode_date),
            row.release_date.map(encode_date),
            row.status.as_str(),
            encode_uuid(row.category_id),
            encode_uuid(row.crime_id),
            encode_dt(row.created_at),
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(puc)
  }

  async fn get_puc(&self, puc_id: Uuid) -> Result<Option<Puc>> {
    let id_str = encode_uuid(puc_id);
    let raw: Option<RawPuc> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {PUC_COLUMNS} FROM pucs WHERE puc_id = ?1"),
              params![id_str],
              RawPuc::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawPuc::into_puc).transpose()
  }

  async fn list_pucs(&self, query: &PucQuery) -> Result<Vec<Puc>> {
    let status_str   = query.status.map(CustodyStatus::as_str);
    let category_str = query.category_id.map(encode_uuid);
    let text_pattern = query.text.as_deref().map(like_pattern);

    let raws: Vec<RawPuc> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          r"SELECT {PUC_COLUMNS} FROM pucs
            WHERE (?1 IS NULL OR status = ?1)
              AND (?2 IS NULL OR category_id = ?2)
              AND (?3 IS NULL
                   OR lower(first_name) LIKE ?3 ESCAPE '\'
                   OR lower(last_name) LIKE ?3 ESCAPE '\'
                   OR lower(first_name || ' ' || last_name) LIKE ?3 ESCAPE '\')
            ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE"
        ))?;
        let rows = stmt
          .query_map(params![status_str, category_str, text_pattern], RawPuc::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPuc::into_puc).collect()
  }

  async fn replace_puc(&self, puc: &Puc) -> Result<()> {
    let row = puc.clone();
    self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE pucs SET
             first_name = ?2, last_name = ?3, gender = ?4, age = ?5,
             arrest_date = ?6, release_date = ?7, status = ?8,
             category_id = ?9, crime_id = ?10
           WHERE puc_id = ?1",
          params![
            encode_uuid(row.puc_id),
            row.first_name,
            row.last_name,
            row.gender,
            row.age,
            row.arrest_date.map(encode_date),
            row.release_date.map(encode_date),
            row.status.as_str(),
            encode_uuid(row.category_id),
            encode_uuid(row.crime_id),
          ],
        )?;
        if changed == 0 {
          return Ok(Err(Error::NotFound(format!("puc {}", row.puc_id))));
        }
        Ok(Ok(()))
      })
      .await?
  }

  // ── Visitors ──────────────────────────────────────────────────────────────

  async fn insert_visitor(&self, input: NewVisitor) -> Result<Visitor> {
    self
      .conn
      .call(move |conn| Ok(tx::insert_visitor(conn, input, None)))
      .await?
  }

  async fn get_visitor(&self, visitor_id: Uuid) -> Result<Option<Visitor>> {
    self
      .conn
      .call(move |conn| Ok(tx::fetch_visitor(conn, visitor_id)))
      .await?
  }

  async fn visitor_for_user(&self, user_id: Uuid) -> Result<Option<Visitor>> {
    let id_str = encode_uuid(user_id);
    let raw: Option<RawVisitor> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {VISITOR_COLUMNS} FROM visitors WHERE linked_user_id = ?1"),
              params![id_str],
              RawVisitor::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawVisitor::into_visitor).transpose()
  }

  async fn list_visitors(&self, query: &VisitorQuery) -> Result<Vec<Visitor>> {
    let text_pattern = query.text.as_deref().map(like_pattern);
    let linked       = query.linked;

    let raws: Vec<RawVisitor> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          r"SELECT {VISITOR_COLUMNS} FROM visitors
            WHERE (?1 IS NULL
                   OR lower(first_name) LIKE ?1 ESCAPE '\'
                   OR lower(last_name) LIKE ?1 ESCAPE '\'
                   OR lower(first_name || ' ' || last_name) LIKE ?1 ESCAPE '\')
              AND (?2 IS NULL OR (linked_user_id IS NOT NULL) = ?2)
            ORDER BY last_name COLLATE NOCASE, first_name COLLATE NOCASE"
        ))?;
        let rows = stmt
          .query_map(params![text_pattern, linked], RawVisitor::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisitor::into_visitor).collect()
  }

  async fn replace_visitor(&self, visitor: &Visitor) -> Result<()> {
    let row = visitor.clone();
    self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "UPDATE visitors SET
             first_name = ?2, last_name = ?3, relationship = ?4, email = ?5, phone = ?6
           WHERE visitor_id = ?1",
          params![
            encode_uuid(row.visitor_id),
            row.first_name,
            row.last_name,
            row.relationship,
            row.email,
            row.phone,
          ],
        )?;
        if changed == 0 {
          return Ok(Err(Error::NotFound(format!("visitor {}", row.visitor_id))));
        }
        Ok(Ok(()))
      })
      .await?
  }

  // ── Blacklist ─────────────────────────────────────────────────────────────

  async fn insert_blacklist_entry(
    &self,
    input: NewBlacklistEntry,
    audit: NewAuditEntry,
  ) -> Result<BlacklistEntry> {
    self
      .conn
      .call(move |conn| Ok(tx::insert_blacklist_entry(conn, input, audit)))
      .await?
  }

  async fn remove_blacklist_entry(
    &self,
    blacklist_id: Uuid,
    audit: NewAuditEntry,
  ) -> Result<BlacklistEntry> {
    self
      .conn
      .call(move |conn| Ok(tx::remove_blacklist_entry(conn, blacklist_id, audit)))
      .await?
  }

  async fn list_blacklist(&self, query: BlacklistQuery) -> Result<Vec<BlacklistEntry>> {
    let visitor_str = query.visitor_id.map(encode_uuid);
    let puc_str     = query.puc_id.map(encode_uuid);

    let raws: Vec<RawBlacklistEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {BLACKLIST_COLUMNS} FROM blacklist
           WHERE (?1 IS NULL OR visitor_id = ?1)
             AND (?2 IS NULL OR puc_id = ?2)
           ORDER BY added_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(params![visitor_str, puc_str], RawBlacklistEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBlacklistEntry::into_entry).collect()
  }

  async fn is_blacklisted(&self, visitor_id: Uuid, puc_id: Uuid) -> Result<bool> {
    self
      .conn
      .call(move |conn| Ok(tx::is_blacklisted(conn, visitor_id, puc_id)))
      .await?
  }

  // ── Visit requests ────────────────────────────────────────────────────────

  async fn insert_visit_request(
    &self,
    input: NewVisitRequest,
    audit: NewAuditEntry,
  ) -> Result<VisitRequest> {
    self
      .conn
      .call(move |conn| Ok(tx::insert_visit_request(conn, input, audit)))
      .await?
  }

  async fn get_visit_request(&self, request_id: Uuid) -> Result<Option<VisitRequest>> {
    self
      .conn
      .call(move |conn| Ok(tx::fetch_request(conn, request_id)))
      .await?
  }

  async fn list_visit_requests(&self, query: &VisitQuery) -> Result<Vec<VisitRequest>> {
    let status_str  = query.status.map(|s| s.as_str());
    let visitor_str = query.visitor_id.map(encode_uuid);
    let puc_str     = query.puc_id.map(encode_uuid);
    let from_str    = query.from.map(encode_date);
    let to_str      = query.to.map(encode_date);

    let raws: Vec<RawVisitRequest> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {VISIT_COLUMNS} FROM visit_requests
           WHERE (?1 IS NULL OR approval_status = ?1)
             AND (?2 IS NULL OR visitor_id = ?2)
             AND (?3 IS NULL OR puc_id = ?3)
             AND (?4 IS NULL OR visit_date >= ?4)
             AND (?5 IS NULL OR visit_date <= ?5)
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(
            params![status_str, visitor_str, puc_str, from_str, to_str],
            RawVisitRequest::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVisitRequest::into_request).collect()
  }

  async fn decide_visit_request(
    &self,
    decision: VisitDecision,
    audit: NewAuditEntry,
  ) -> Result<DecisionRecord> {
    tracing::debug!(request_id = %decision.request_id, decision = ?decision.decision, "decide");
    self
      .conn
      .call(move |conn| Ok(tx::decide_visit_request(conn, decision, audit)))
      .await?
  }

  // ── Audit ─────────────────────────────────────────────────────────────────

  async fn append_audit(&self, entry: NewAuditEntry) -> Result<AuditEntry> {
    self
      .conn
      .call(move |conn| Ok(tx::append_audit(conn, &entry)))
      .await?
  }

  async fn list_audit(&self, query: &AuditQuery) -> Result<Vec<AuditEntry>> {
    let event_str = query.event_type.map(|e| e.as_str());
    let user_str  = query.user_id.map(encode_uuid);
    let limit     = i64::try_from(query.effective_limit()).unwrap_or(i64::MAX);
    let offset    = i64::try_from(query.offset.unwrap_or(0)).unwrap_or(i64::MAX);

    let raws: Vec<RawAuditEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {AUDIT_COLUMNS} FROM audit_log
           WHERE (?1 IS NULL OR event_type = ?1)
             AND (?2 IS NULL OR user_id = ?2)
           ORDER BY timestamp DESC, rowid DESC
           LIMIT ?3 OFFSET ?4"
        ))?;
        let rows = stmt
          .query_map(params![event_str, user_str, limit, offset], RawAuditEntry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAuditEntry::into_entry).collect()
  }

  // ── Reports ───────────────────────────────────────────────────────────────

  async fn dashboard_stats(&self, today: NaiveDate) -> Result<DashboardStats> {
    let today_str = encode_date(today);

    self
      .conn
      .call(move |conn| {
        let mut users = UserCounts::default();
        for (role, n) in grouped_counts(conn, "SELECT role, COUNT(*) FROM users GROUP BY role")? {
          match role.as_str() {
            "admin" => users.admin = n,
            "officer" => users.officer = n,
            "visitor" => users.visitor = n,
            _ => {}
          }
        }

        let mut visit_requests = RequestCounts::default();
        for (status, n) in grouped_counts(
          conn,
          "SELECT approval_status, COUNT(*) FROM visit_requests GROUP BY approval_status",
        )? {
          match status.as_str() {
            "pending" => visit_requests.pending = n,
            "approved" => visit_requests.approved = n,
            "rejected" => visit_requests.rejected = n,
            _ => {}
          }
        }

        Ok(DashboardStats {
          pucs: count(conn, "SELECT COUNT(*) FROM pucs", [])?,
          visitors: count(conn, "SELECT COUNT(*) FROM visitors", [])?,
          users,
          visit_requests,
          visits_today: count(
            conn,
            "SELECT COUNT(*) FROM visit_requests
             WHERE visit_date = ?1 AND approval_status = 'approved'",
            params![today_str],
          )?,
          blacklist_entries: count(conn, "SELECT COUNT(*) FROM blacklist", [])?,
          date: today,
        })
      })
      .await
      .map_err(Error::from)
  }

  async fn custody_report(&self) -> Result<CustodyReport> {
    let (status_rows, category_rows, release_rows) = self
      .conn
      .call(|conn| {
        let status_rows =
          grouped_counts(conn, "SELECT status, COUNT(*) FROM pucs GROUP BY status")?;

        let mut stmt = conn.prepare(
          "SELECT c.category_id, c.name, COUNT(p.puc_id)
           FROM crime_categories c
           LEFT JOIN pucs p ON p.category_id = c.category_id
           GROUP BY c.category_id, c.name
           ORDER BY c.name",
        )?;
        let category_rows = stmt
          .query_map([], |row| {
            Ok((
              row.get::<_, String>(0)?,
              row.get::<_, String>(1)?,
              row.get::<_, i64>(2)?.max(0) as u64,
            ))
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {PUC_COLUMNS} FROM pucs
           WHERE status = 'released' AND release_date IS NOT NULL
           ORDER BY release_date DESC, rowid DESC
           LIMIT ?1"
        ))?;
        let release_rows = stmt
          .query_map(params![RECENT_RELEASES as i64], RawPuc::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((status_rows, category_rows, release_rows))
      })
      .await?;

    let mut by_status: HashMap<CustodyStatus, u64> = HashMap::new();
    for (status, n) in status_rows {
      by_status.insert(decode_custody_status(&status)?, n);
    }

    Ok(CustodyReport {
      by_status:       CustodyStatus::iter()
        .map(|status| StatusCount { status, count: by_status.get(&status).copied().unwrap_or(0) })
        .collect(),
      by_category:     category_rows
        .into_iter()
        .map(|(id, name, count)| Ok(CategoryCount { category_id: decode_uuid(&id)?, name, count }))
        .collect::<Result<_>>()?,
      recent_releases: release_rows.into_iter().map(RawPuc::into_puc).collect::<Result<_>>()?,
    })
  }
}
