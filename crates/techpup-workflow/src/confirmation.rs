//! The email-confirmation poll.
//!
//! Confirmation happens out of band (the user follows an emailed link), so
//! the sign-up flow polls the identity service on an interval until the
//! subject's flag flips, then writes the initial Profile document and stops.
//!
//! The poll is owned by whoever drove the sign-up: the handle cancels the
//! task when dropped, so a torn-down owner can never leak a timer that keeps
//! writing against a stale context.

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{info, warn};

use techpup_core::{
  Result,
  profile::Profile,
  store::{DocumentPath, DocumentStore, IdentityService},
  subject::{PendingSubject, Subject},
};

use crate::{DEFAULT_ROUND_TRIP_TIMEOUT, bounded, resolver::to_document};

/// Default tick interval between confirmation checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);

/// Handle to a running confirmation poll.
pub struct ConfirmationPoll {
  handle: JoinHandle<Result<()>>,
}

impl ConfirmationPoll {
  /// Spawn the poll. Each tick refreshes the subject; once
  /// `email_confirmed` is observed, the initial Profile document
  /// (`avatarCreated: false`, no `dogID`) is written and the task ends.
  pub fn spawn<B>(
    backend: Arc<B>,
    pending: PendingSubject,
    interval: Duration,
  ) -> Self
  where
    B: IdentityService + DocumentStore + 'static,
  {
    let handle = tokio::spawn(run(backend, pending.subject, interval));
    Self { handle }
  }

  /// Cancel the poll. Idempotent; a poll that already wrote the Profile is
  /// unaffected.
  pub fn cancel(&self) {
    self.handle.abort();
  }

  pub fn is_finished(&self) -> bool {
    self.handle.is_finished()
  }

  /// Wait for the poll to finish. Returns `None` if it was cancelled first.
  pub async fn join(mut self) -> Option<Result<()>> {
    match (&mut self.handle).await {
      Ok(result) => Some(result),
      Err(_) => None,
    }
  }
}

impl Drop for ConfirmationPoll {
  fn drop(&mut self) {
    self.handle.abort();
  }
}

async fn run<B>(backend: Arc<B>, subject: Subject, interval: Duration) -> Result<()>
where
  B: IdentityService + DocumentStore,
{
  let mut ticker = tokio::time::interval(interval);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  // The first tick of a tokio interval fires immediately; consume it so the
  // first reload happens one full interval after sign-up.
  ticker.tick().await;

  loop {
    ticker.tick().await;

    let refreshed = match bounded(
      DEFAULT_ROUND_TRIP_TIMEOUT,
      backend.reload_subject(subject.subject_id),
    )
    .await
    {
      Ok(subject) => subject,
      Err(err) => {
        // Transient failure: keep polling.
        warn!(subject_id = %subject.subject_id, %err, "confirmation reload failed");
        continue;
      }
    };

    if !refreshed.email_confirmed {
      continue;
    }

    let profile = Profile {
      email:          refreshed.email,
      created_at:     Utc::now(),
      avatar_created: false,
      dog_id:         None,
    };
    let path = DocumentPath::profile(subject.subject_id);
    bounded(
      DEFAULT_ROUND_TRIP_TIMEOUT,
      backend.set_document(&path, to_document(&profile)?),
    )
    .await?;

    info!(subject_id = %subject.subject_id, "email confirmed, profile created");
    return Ok(());
  }
}
