//! Sign-up validation and registration.
//!
//! Validation runs entirely locally, before any backend call; a rejected
//! form costs no network round trip and keeps its field contents so the
//! caller can correct and resubmit.

use serde::Deserialize;
use techpup_core::{
  Result,
  error::ValidationError,
  store::IdentityService,
  subject::PendingSubject,
};

use crate::Workflow;

/// Minimum accepted password length.
pub const MIN_PASSWORD_LEN: usize = 6;

/// The sign-up form as submitted.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrationForm {
  pub email:            String,
  pub password:         String,
  pub confirm_password: String,
}

impl RegistrationForm {
  /// Local checks, in the order the user reads the form: email shape, then
  /// password length, then confirmation equality.
  pub fn validate(&self) -> Result<(), ValidationError> {
    if !email_shape_ok(&self.email) {
      return Err(ValidationError::InvalidEmail);
    }
    if self.password.chars().count() < MIN_PASSWORD_LEN {
      return Err(ValidationError::PasswordTooShort);
    }
    if self.password != self.confirm_password {
      return Err(ValidationError::PasswordMismatch);
    }
    Ok(())
  }
}

/// `local@domain.tld`: exactly one `@`, no whitespace, a non-empty label on
/// each side of the last dot in the domain.
fn email_shape_ok(email: &str) -> bool {
  if email.chars().any(char::is_whitespace) {
    return false;
  }
  let Some((local, domain)) = email.split_once('@') else {
    return false;
  };
  if local.is_empty() || domain.contains('@') {
    return false;
  }
  match domain.rsplit_once('.') {
    Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
    None => false,
  }
}

impl<B: IdentityService> Workflow<B> {
  /// Validate the form, create the subject, and trigger the confirmation
  /// challenge.
  ///
  /// No Profile document is written here — that happens once the
  /// confirmation poll observes the confirmed flag
  /// (see [`crate::ConfirmationPoll`]).
  pub async fn register_subject(
    &self,
    form: &RegistrationForm,
  ) -> Result<PendingSubject> {
    form.validate()?;

    let subject = self
      .bounded(self.backend.sign_up(&form.email, &form.password))
      .await?;
    self
      .bounded(self.backend.send_confirmation_challenge(subject.subject_id))
      .await?;

    Ok(PendingSubject { subject })
  }
}
