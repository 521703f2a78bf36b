//! The TechPup profile-consistency workflow.
//!
//! Screens (or any presentation layer) call [`check_session`] first, route
//! with [`Workflow::resolve`], and go through the mutating operations for
//! sign-up, avatar creation, and dog unlinking. The workflow owns no state
//! beyond a backend handle: completion state is recomputed from the backend
//! on every check, so a screen regaining focus can re-resolve freely.

pub mod confirmation;
pub mod gate;
pub mod mutator;
pub mod resolver;
pub mod signup;

#[cfg(test)]
mod tests;

use std::{future::Future, sync::Arc, time::Duration};

use techpup_core::{Error, Result};

pub use confirmation::ConfirmationPoll;
pub use gate::check_session;
pub use signup::RegistrationForm;

/// Default bound applied to every backend round trip. Expiry surfaces as
/// [`Error::Timeout`], which is safe to retry wholesale.
pub const DEFAULT_ROUND_TRIP_TIMEOUT: Duration = Duration::from_secs(30);

/// The workflow service: a backend handle plus the round-trip bound.
///
/// Cloning is cheap — the backend is reference-counted.
#[derive(Clone)]
pub struct Workflow<B> {
  backend:            Arc<B>,
  round_trip_timeout: Duration,
}

impl<B> Workflow<B> {
  pub fn new(backend: Arc<B>) -> Self {
    Self {
      backend,
      round_trip_timeout: DEFAULT_ROUND_TRIP_TIMEOUT,
    }
  }

  /// Override the per-round-trip bound.
  pub fn with_round_trip_timeout(mut self, timeout: Duration) -> Self {
    self.round_trip_timeout = timeout;
    self
  }

  pub fn backend(&self) -> &Arc<B> {
    &self.backend
  }

  /// Run one backend round trip under the configured bound.
  pub(crate) async fn bounded<T, E, F>(&self, fut: F) -> Result<T>
  where
    F: Future<Output = Result<T, E>>,
    E: Into<Error>,
  {
    bounded(self.round_trip_timeout, fut).await
  }
}

/// Free-standing variant of [`Workflow::bounded`] for tasks that outlive a
/// workflow handle (the confirmation poll).
pub(crate) async fn bounded<T, E, F>(limit: Duration, fut: F) -> Result<T>
where
  F: Future<Output = Result<T, E>>,
  E: Into<Error>,
{
  match tokio::time::timeout(limit, fut).await {
    Ok(result) => result.map_err(Into::into),
    Err(_) => Err(Error::Timeout(limit)),
  }
}
