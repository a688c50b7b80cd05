//! SQL schema for the CivicLink SQLite store.
//!
//! Executed once at connection startup; every statement is idempotent.

pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

CREATE TABLE IF NOT EXISTS claims (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    claim               TEXT NOT NULL,
    verdict             TEXT NOT NULL,   -- 'true' | 'false' | 'misleading' | 'unverified'
    explanation         TEXT NOT NULL,
    sources             TEXT NOT NULL DEFAULT '[]',
    language            TEXT NOT NULL,
    community           TEXT NOT NULL,
    view_count          INTEGER NOT NULL DEFAULT 0,
    share_count         INTEGER NOT NULL DEFAULT 0,
    recent_mentions_24h INTEGER NOT NULL DEFAULT 0,
    external_sources    TEXT,            -- JSON array or NULL
    created_at          TEXT NOT NULL    -- ISO 8601 UTC
);

CREATE TABLE IF NOT EXISTS waitlist_signups (
    id           TEXT PRIMARY KEY,
    email        TEXT NOT NULL,
    phone        TEXT NOT NULL,
    zip_code     TEXT NOT NULL,
    language     TEXT NOT NULL DEFAULT 'Not specified',
    is_organizer INTEGER NOT NULL DEFAULT 0,
    source       TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS email_templates (
    name    TEXT PRIMARY KEY,
    subject TEXT,
    html    TEXT
);

-- Append-only log of delivered emails.
CREATE TABLE IF NOT EXISTS sent_emails (
    id            INTEGER PRIMARY KEY AUTOINCREMENT,
    to_email      TEXT NOT NULL,
    template_name TEXT NOT NULL,
    status        TEXT NOT NULL,
    sent_at       TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS claims_created_idx ON claims(created_at);

PRAGMA user_version = 1;
";
