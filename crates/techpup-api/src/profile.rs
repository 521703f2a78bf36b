//! Handlers for session, resolution, and dog-profile endpoints.
//!
//! | Method   | Path               | Notes |
//! |----------|--------------------|-------|
//! | `GET`    | `/session`         | Gate only; works unauthenticated |
//! | `GET`    | `/profile/resolve` | 401 without credentials |
//! | `POST`   | `/profile/dog`     | Body: [`NewDog`]; 201 + dog id |
//! | `DELETE` | `/profile/dog`     | Unlinks and deletes the linked dog |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use serde_json::json;
use techpup_core::{
  Error,
  profile::{NewDog, Resolution},
  store::{DocumentStore, IdentityService},
  subject::SessionStatus,
};
use techpup_workflow::check_session;

use crate::{AppState, auth::Session, error::ApiError};

// ─── Session ──────────────────────────────────────────────────────────────────

/// `GET /session` — classify the caller's session.
pub async fn session<B>(
  State(_state): State<AppState<B>>,
  Session(ctx): Session,
) -> Json<SessionStatus>
where
  B: IdentityService + DocumentStore + Clone + Send + Sync + 'static,
{
  Json(check_session(&ctx))
}

// ─── Resolve ──────────────────────────────────────────────────────────────────

/// `GET /profile/resolve` — completion state, route target, and the dog
/// payload when complete.
pub async fn resolve<B>(
  State(state): State<AppState<B>>,
  Session(ctx): Session,
) -> Result<Json<Resolution>, ApiError>
where
  B: IdentityService + DocumentStore + Clone + Send + Sync + 'static,
{
  let subject = ctx.subject().ok_or(Error::NotAuthenticated)?;
  let resolution = state.workflow.resolve(subject.subject_id).await?;
  Ok(Json(resolution))
}

// ─── Create dog ───────────────────────────────────────────────────────────────

/// `POST /profile/dog` — returns 201 + the new dog id.
pub async fn create_dog<B>(
  State(state): State<AppState<B>>,
  Session(ctx): Session,
  Json(body): Json<NewDog>,
) -> Result<impl IntoResponse, ApiError>
where
  B: IdentityService + DocumentStore + Clone + Send + Sync + 'static,
{
  let dog_id = state.workflow.create_dog_profile(&ctx, body).await?;
  Ok((StatusCode::CREATED, Json(json!({ "dogID": dog_id }))))
}

// ─── Unlink dog ───────────────────────────────────────────────────────────────

/// `DELETE /profile/dog` — delete the linked dog and blank the link. The
/// confirmation step lives with the caller; reaching this endpoint means it
/// already happened.
pub async fn unlink_dog<B>(
  State(state): State<AppState<B>>,
  Session(ctx): Session,
) -> Result<StatusCode, ApiError>
where
  B: IdentityService + DocumentStore + Clone + Send + Sync + 'static,
{
  state.workflow.unlink_dog_profile(&ctx).await?;
  Ok(StatusCode::NO_CONTENT)
}
