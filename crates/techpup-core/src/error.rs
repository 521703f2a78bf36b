//! Error types for `techpup-core`.

use std::time::Duration;

use thiserror::Error;

/// Form-level failures, detected locally before any backend call.
///
/// The message texts are user-facing; callers show them verbatim next to the
/// offending field and keep the submitted values so the user can correct and
/// resubmit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
  #[error("Invalid email format")]
  InvalidEmail,

  #[error("Password should be at least 6 characters long")]
  PasswordTooShort,

  #[error("Passwords do not match")]
  PasswordMismatch,

  #[error("Dog name must not be empty")]
  MissingDogName,
}

#[derive(Debug, Error)]
pub enum Error {
  /// An operation that requires a live subject ran without one.
  #[error("not authenticated")]
  NotAuthenticated,

  /// The identity service rejected a credential or sign-up request.
  #[error("auth error: {0}")]
  Auth(String),

  #[error(transparent)]
  Validation(#[from] ValidationError),

  /// A dog with this name already exists under the subject's profile.
  /// Existing records are never overwritten.
  #[error("dog profile {0:?} already exists")]
  DuplicateName(String),

  /// A referenced document is absent. The resolver absorbs this internally;
  /// it only escapes from mutating operations.
  #[error("document not found: {0}")]
  NotFound(String),

  /// Transient backend failure. The whole operation is safe to retry; no
  /// partial-write recovery is attempted beyond the documented write order.
  #[error("backend error: {0}")]
  Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// A backend round trip exceeded its bound. Retryable.
  #[error("backend round trip timed out after {0:?}")]
  Timeout(Duration),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

impl Error {
  /// Wrap a backend failure, keeping it as the source.
  pub fn backend<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Backend(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
