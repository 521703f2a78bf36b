//! The identity gate: session classification, no I/O.

use techpup_core::subject::{SessionContext, SessionStatus};

/// Classify the session. Absence of a subject is a normal outcome, not a
/// failure — the gate has no error path.
pub fn check_session(session: &SessionContext) -> SessionStatus {
  match session.subject() {
    None => SessionStatus::Unauthenticated,
    Some(subject) => SessionStatus::Authenticated {
      email_confirmed: subject.email_confirmed,
    },
  }
}
