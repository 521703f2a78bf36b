//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings, document fields as compact JSON.

use chrono::{DateTime, Utc};
use techpup_core::subject::Subject;
use uuid::Uuid;

use crate::Result;

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String {
  id.hyphenated().to_string()
}

pub fn decode_uuid(s: &str) -> Result<Uuid> {
  Ok(Uuid::parse_str(s)?)
}

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `accounts` row.
pub struct RawAccount {
  pub subject_id:      String,
  pub email:           String,
  pub email_confirmed: bool,
}

impl RawAccount {
  pub fn into_subject(self) -> Result<Subject> {
    Ok(Subject {
      subject_id:      decode_uuid(&self.subject_id)?,
      email:           self.email,
      email_confirmed: self.email_confirmed,
    })
  }
}
