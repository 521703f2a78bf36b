//! Backend traits: the identity service and the document store.
//!
//! Implemented by storage backends (e.g. `techpup-store-sqlite`). The
//! workflow and the HTTP facade depend on these abstractions, not on any
//! concrete backend.
//!
//! Both traits carry an associated error convertible into the crate
//! [`Error`](crate::Error) taxonomy, so implementations decide which
//! failures are credential rejections, which are missing documents, and
//! which are transient.

use std::future::Future;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::subject::Subject;

/// A stored document: a flat JSON object. Typed decoding into [`Profile`]
/// and [`Dog`] records happens at the workflow read boundary.
///
/// [`Profile`]: crate::profile::Profile
/// [`Dog`]: crate::profile::Dog
pub type Document = Map<String, Value>;

// ─── Paths ───────────────────────────────────────────────────────────────────

/// A slash-separated document path. Constructed only through the helpers so
/// the path layout lives in one place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentPath(String);

impl DocumentPath {
  /// `users/{subject_id}` — the subject's profile document.
  pub fn profile(subject_id: Uuid) -> Self {
    Self(format!("users/{subject_id}"))
  }

  /// `users/{subject_id}/dogs/{dog_id}` — a dog document nested under its
  /// owning profile.
  pub fn dog(subject_id: Uuid, dog_id: &str) -> Self {
    Self(format!("users/{subject_id}/dogs/{dog_id}"))
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl std::fmt::Display for DocumentPath {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

// ─── Identity ────────────────────────────────────────────────────────────────

/// Abstraction over the external identity service.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes.
pub trait IdentityService: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Create a new, unconfirmed subject. Fails if the email is taken.
  fn sign_up<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + 'a;

  /// Verify credentials and return the subject. A rejected credential is an
  /// error, not an absence.
  fn sign_in<'a>(
    &'a self,
    email: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + 'a;

  /// Ask the service to (re)send the email-confirmation challenge.
  fn send_confirmation_challenge(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Re-read the subject, refreshing the `email_confirmed` flag.
  fn reload_subject(
    &self,
    subject_id: Uuid,
  ) -> impl Future<Output = Result<Subject, Self::Error>> + Send + '_;
}

// ─── Documents ───────────────────────────────────────────────────────────────

/// Abstraction over the path-keyed document store.
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Into<crate::Error> + Send + Sync + 'static;

  /// Fetch a document. Absence is a normal outcome, not an error.
  fn get_document<'a>(
    &'a self,
    path: &'a DocumentPath,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + 'a;

  /// Create or fully overwrite the document at `path`.
  fn set_document<'a>(
    &'a self,
    path: &'a DocumentPath,
    fields: Document,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Merge `fields` into an existing document, field by field. Fails if the
  /// document does not exist.
  fn update_document<'a>(
    &'a self,
    path: &'a DocumentPath,
    fields: Document,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete the document at `path`. Deleting an absent document is a no-op.
  fn delete_document<'a>(
    &'a self,
    path: &'a DocumentPath,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
