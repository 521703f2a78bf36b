//! Handlers for the sign-up flow.
//!
//! `POST /register` validates and creates the subject, then spawns the
//! confirmation poll that writes the initial profile document once the user
//! follows the emailed link. `DELETE /register/{subject_id}` is the
//! screen-teardown analogue: it cancels that subject's live poll.

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use techpup_core::{
  Error,
  store::{DocumentStore, IdentityService},
};
use techpup_workflow::{ConfirmationPoll, RegistrationForm};
use uuid::Uuid;

use crate::{AppState, error::ApiError};

/// `POST /register` — body: [`RegistrationForm`]; returns 201 + the pending
/// subject. Validation failures are 400 and never reach the backend.
pub async fn create<B>(
  State(state): State<AppState<B>>,
  Json(form): Json<RegistrationForm>,
) -> Result<impl IntoResponse, ApiError>
where
  B: IdentityService + DocumentStore + Clone + Send + Sync + 'static,
{
  let pending = state.workflow.register_subject(&form).await?;
  let subject = pending.subject.clone();

  let poll = ConfirmationPoll::spawn(
    state.backend.clone(),
    pending,
    state.poll_interval,
  );

  let mut polls = state.polls.lock().expect("poll registry poisoned");
  polls.retain(|_, live| !live.is_finished());
  polls.insert(subject.subject_id, poll);

  Ok((StatusCode::CREATED, Json(subject)))
}

/// `DELETE /register/{subject_id}` — cancel the subject's confirmation poll.
/// 404 when no poll is live for the subject.
pub async fn cancel<B>(
  State(state): State<AppState<B>>,
  Path(subject_id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  B: IdentityService + DocumentStore + Clone + Send + Sync + 'static,
{
  let removed = state
    .polls
    .lock()
    .expect("poll registry poisoned")
    .remove(&subject_id);

  match removed {
    Some(poll) => {
      poll.cancel();
      Ok(StatusCode::NO_CONTENT)
    }
    None => Err(ApiError::Workflow(Error::NotFound(format!(
      "no live confirmation poll for {subject_id}"
    )))),
  }
}
