//! SQL schema for the Themis SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS users (
    user_id       TEXT PRIMARY KEY,
    username      TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,          -- argon2 PHC string
    role          TEXT NOT NULL CHECK (role IN ('admin', 'officer', 'visitor')),
    email         TEXT,
    full_name     TEXT,
    created_at    TEXT NOT NULL,
    last_login    TEXT
);

CREATE TABLE IF NOT EXISTS crime_categories (
    category_id TEXT PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS crime_types (
    crime_id      TEXT PRIMARY KEY,
    category_id   TEXT NOT NULL REFERENCES crime_categories(category_id),
    name          TEXT NOT NULL,
    law_reference TEXT NOT NULL,
    description   TEXT
);

CREATE TABLE IF NOT EXISTS pucs (
    puc_id       TEXT PRIMARY KEY,
    first_name   TEXT NOT NULL,
    last_name    TEXT NOT NULL,
    gender       TEXT,
    age          INTEGER,
    arrest_date  TEXT,                    -- %Y-%m-%d
    release_date TEXT,
    status       TEXT NOT NULL DEFAULT 'in_custody'
                 CHECK (status IN ('in_custody', 'released', 'transferred')),
    category_id  TEXT NOT NULL REFERENCES crime_categories(category_id),
    crime_id     TEXT NOT NULL REFERENCES crime_types(crime_id),
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS visitors (
    visitor_id     TEXT PRIMARY KEY,
    first_name     TEXT NOT NULL,
    last_name      TEXT NOT NULL,
    relationship   TEXT,
    email          TEXT,
    phone          TEXT,
    linked_user_id TEXT UNIQUE REFERENCES users(user_id) ON DELETE SET NULL,
    registered_at  TEXT NOT NULL
);

-- approval_status only ever moves away from 'pending', once.
CREATE TABLE IF NOT EXISTS visit_requests (
    request_id      TEXT PRIMARY KEY,
    visitor_id      TEXT NOT NULL REFERENCES visitors(visitor_id),
    puc_id          TEXT NOT NULL REFERENCES pucs(puc_id),
    visit_date      TEXT NOT NULL,        -- %Y-%m-%d
    visit_time      TEXT NOT NULL,        -- %H:%M:%S
    purpose         TEXT NOT NULL,
    approval_status TEXT NOT NULL DEFAULT 'pending'
                    CHECK (approval_status IN ('pending', 'approved', 'rejected')),
    created_at      TEXT NOT NULL,
    decided_by      TEXT REFERENCES users(user_id) ON DELETE SET NULL,
    decided_at      TEXT
);

CREATE TABLE IF NOT EXISTS blacklist (
    blacklist_id TEXT PRIMARY KEY,
    visitor_id   TEXT NOT NULL REFERENCES visitors(visitor_id),
    puc_id       TEXT NOT NULL REFERENCES pucs(puc_id),
    reason       TEXT NOT NULL,
    added_by     TEXT REFERENCES users(user_id) ON DELETE SET NULL,
    added_at     TEXT NOT NULL,
    UNIQUE (visitor_id, puc_id)
);

-- Append-only. No UPDATE is ever issued against this table.
CREATE TABLE IF NOT EXISTS audit_log (
    audit_id   TEXT PRIMARY KEY,
    user_id    TEXT REFERENCES users(user_id) ON DELETE SET NULL,
    event_type TEXT NOT NULL,
    timestamp  TEXT NOT NULL,
    ip_address TEXT,
    notes      TEXT
);

CREATE INDEX IF NOT EXISTS visit_requests_pair_idx   ON visit_requests(visitor_id, puc_id);
CREATE INDEX IF NOT EXISTS visit_requests_status_idx ON visit_requests(approval_status);
CREATE INDEX IF NOT EXISTS pucs_name_idx             ON pucs(last_name, first_name);
CREATE INDEX IF NOT EXISTS audit_log_timestamp_idx   ON audit_log(timestamp);

PRAGMA user_version = 1;
";
