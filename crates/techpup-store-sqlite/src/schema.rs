//! SQL schema for the SQLite backend.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS accounts (
    subject_id        TEXT PRIMARY KEY,
    email             TEXT NOT NULL UNIQUE COLLATE NOCASE,
    password_hash     TEXT NOT NULL,    -- argon2 PHC string
    email_confirmed   INTEGER NOT NULL DEFAULT 0,
    created_at        TEXT NOT NULL,    -- ISO 8601 UTC
    challenge_sent_at TEXT              -- last confirmation challenge, or NULL
);

-- One row per document, keyed by the full slash-separated path.
-- set overwrites the whole object, update merges fields, delete is
-- idempotent.
CREATE TABLE IF NOT EXISTS documents (
    path       TEXT PRIMARY KEY,
    fields     TEXT NOT NULL,    -- JSON object
    updated_at TEXT NOT NULL
);

PRAGMA user_version = 1;
";
