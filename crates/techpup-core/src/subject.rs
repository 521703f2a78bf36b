//! Subject and session types.
//!
//! A subject is the identity envelope issued by the external identity
//! service. Everything the workflow knows about a user beyond identity lives
//! in the profile and dog documents.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An authenticated end-user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub subject_id:      Uuid,
  pub email:           String,
  /// Set out of band when the user follows the confirmation challenge;
  /// observed by re-reading the subject.
  pub email_confirmed: bool,
}

/// A freshly registered subject whose email confirmation is still pending.
/// Input to the confirmation poll.
#[derive(Debug, Clone)]
pub struct PendingSubject {
  pub subject: Subject,
}

/// Session state as classified by the identity gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SessionStatus {
  Unauthenticated,
  Authenticated { email_confirmed: bool },
}

/// The explicit session context passed into every workflow call.
///
/// Replaces the ambient "current user" global of a client SDK: the caller
/// owns the session, constructs one per signed-in subject, and drops (or
/// clears) it to sign out. Absence of a subject is a normal state.
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
  current: Option<Subject>,
}

impl SessionContext {
  /// A session with no live subject.
  pub fn anonymous() -> Self {
    Self { current: None }
  }

  /// A session for a signed-in subject.
  pub fn authenticated(subject: Subject) -> Self {
    Self {
      current: Some(subject),
    }
  }

  pub fn subject(&self) -> Option<&Subject> {
    self.current.as_ref()
  }

  /// End the local session. Backend state is untouched.
  pub fn sign_out(&mut self) {
    self.current = None;
  }
}
