//! [`SqliteBackend`] — the SQLite implementation of the backend traits.

use std::path::Path;

use argon2::{
  Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
  password_hash::SaltString,
};
use chrono::Utc;
use rand_core::OsRng;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use techpup_core::{
  store::{Document, DocumentPath, DocumentStore, IdentityService},
  subject::Subject,
};

use crate::{
  Error, Result,
  encode::{RawAccount, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Backend ─────────────────────────────────────────────────────────────────

/// A TechPup backend stored in a single SQLite file: accounts for identity,
/// path-keyed JSON rows for documents.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteBackend {
  conn: tokio_rusqlite::Connection,
}

impl SqliteBackend {
  /// Open (or create) a backend at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let backend = Self { conn };
    backend.init_schema().await?;
    Ok(backend)
  }

  /// Open an in-memory backend — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let backend = Self { conn };
    backend.init_schema().await?;
    Ok(backend)
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

  /// Flip the confirmation flag for a subject.
  ///
  /// Not part of [`IdentityService`]: the hosted identity provider flips
  /// this when the user follows the emailed link. Local deployments and
  /// tests drive it directly.
  pub async fn confirm_email(&self, subject_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(subject_id);
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts SET email_confirmed = 1 WHERE subject_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;
    if updated == 0 {
      return Err(Error::SubjectNotFound(subject_id));
    }
    Ok(())
  }

  async fn load_account(&self, subject_id: Uuid) -> Result<Option<RawAccount>> {
    let id_str = encode_uuid(subject_id);
    let raw = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT subject_id, email, email_confirmed
               FROM accounts WHERE subject_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawAccount {
                  subject_id:      row.get(0)?,
                  email:           row.get(1)?,
                  email_confirmed: row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;
    Ok(raw)
  }
}

// ─── IdentityService impl ────────────────────────────────────────────────────

impl IdentityService for SqliteBackend {
  type Error = Error;

  async fn sign_up(&self, email: &str, password: &str) -> Result<Subject> {
    let email_check = email.to_owned();
    let taken: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM accounts WHERE email = ?1",
              rusqlite::params![email_check],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    if taken {
      return Err(Error::EmailTaken(email.to_owned()));
    }

    let subject = Subject {
      subject_id:      Uuid::new_v4(),
      email:           email.to_owned(),
      email_confirmed: false,
    };

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(password.as_bytes(), &salt)
      .map_err(|e| Error::PasswordHash(e.to_string()))?
      .to_string();

    let id_str    = encode_uuid(subject.subject_id);
    let email_str = subject.email.clone();
    let at_str    = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO accounts (subject_id, email, password_hash, email_confirmed, created_at)
           VALUES (?1, ?2, ?3, 0, ?4)",
          rusqlite::params![id_str, email_str, hash, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(subject)
  }

  async fn sign_in(&self, email: &str, password: &str) -> Result<Subject> {
    let email_owned = email.to_owned();
    let row: Option<(RawAccount, String)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT subject_id, email, email_confirmed, password_hash
               FROM accounts WHERE email = ?1",
              rusqlite::params![email_owned],
              |row| {
                Ok((
                  RawAccount {
                    subject_id:      row.get(0)?,
                    email:           row.get(1)?,
                    email_confirmed: row.get(2)?,
                  },
                  row.get::<_, String>(3)?,
                ))
              },
            )
            .optional()?,
        )
      })
      .await?;

    let (raw, hash) = row.ok_or(Error::InvalidCredentials)?;

    let parsed = PasswordHash::new(&hash)
      .map_err(|e| Error::PasswordHash(e.to_string()))?;
    Argon2::default()
      .verify_password(password.as_bytes(), &parsed)
      .map_err(|_| Error::InvalidCredentials)?;

    raw.into_subject()
  }

  async fn send_confirmation_challenge(&self, subject_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(subject_id);
    let at_str = encode_dt(Utc::now());
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE accounts SET challenge_sent_at = ?2 WHERE subject_id = ?1",
          rusqlite::params![id_str, at_str],
        )?)
      })
      .await?;
    if updated == 0 {
      return Err(Error::SubjectNotFound(subject_id));
    }
    Ok(())
  }

  async fn reload_subject(&self, subject_id: Uuid) -> Result<Subject> {
    self
      .load_account(subject_id)
      .await?
      .ok_or(Error::SubjectNotFound(subject_id))?
      .into_subject()
  }
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteBackend {
  type Error = Error;

  async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>> {
    let path_str = path.as_str().to_owned();
    let fields_json: Option<String> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT fields FROM documents WHERE path = ?1",
              rusqlite::params![path_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    fields_json
      .map(|s| serde_json::from_str::<Document>(&s).map_err(Error::from))
      .transpose()
  }

  async fn set_document(&self, path: &DocumentPath, fields: Document) -> Result<()> {
    let path_str    = path.as_str().to_owned();
    let fields_json = serde_json::to_string(&fields)?;
    let at_str      = encode_dt(Utc::now());

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (path, fields, updated_at) VALUES (?1, ?2, ?3)
           ON CONFLICT(path) DO UPDATE
             SET fields = excluded.fields, updated_at = excluded.updated_at",
          rusqlite::params![path_str, fields_json, at_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn update_document(&self, path: &DocumentPath, fields: Document) -> Result<()> {
    // Read-merge-write in two round trips. The workflow assumes at most one
    // active mutating operation per subject; the backend does not arbitrate
    // a lost update between two.
    let mut current = self
      .get_document(path)
      .await?
      .ok_or_else(|| Error::DocumentNotFound(path.as_str().to_owned()))?;

    for (key, value) in fields {
      current.insert(key, value);
    }

    self.set_document(path, current).await
  }

  async fn delete_document(&self, path: &DocumentPath) -> Result<()> {
    let path_str = path.as_str().to_owned();
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "DELETE FROM documents WHERE path = ?1",
          rusqlite::params![path_str],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
