//! Error type for `techpup-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("password hash error: {0}")]
  PasswordHash(String),

  /// Sign-up with an email that already has an account.
  #[error("email {0:?} is already registered")]
  EmailTaken(String),

  /// Unknown email or wrong password. One variant for both so sign-in does
  /// not leak which emails are registered.
  #[error("invalid email or password")]
  InvalidCredentials,

  #[error("subject not found: {0}")]
  SubjectNotFound(uuid::Uuid),

  /// Partial update against a document that does not exist.
  #[error("document not found: {0}")]
  DocumentNotFound(String),
}

/// Map store failures onto the workflow taxonomy: credential problems become
/// auth errors, a missing update target becomes `NotFound`, everything else
/// is transient.
impl From<Error> for techpup_core::Error {
  fn from(err: Error) -> Self {
    match err {
      Error::EmailTaken(_) | Error::InvalidCredentials => {
        techpup_core::Error::Auth(err.to_string())
      }
      Error::SubjectNotFound(id) => {
        techpup_core::Error::Auth(format!("subject {id} no longer exists"))
      }
      Error::DocumentNotFound(path) => techpup_core::Error::NotFound(path),
      other => techpup_core::Error::backend(other),
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
