//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use techpup_core::Error as WorkflowError;
use thiserror::Error;

/// An error returned by an API handler. Every failure renders as a single
/// JSON object with one human-readable message.
#[derive(Debug, Error)]
pub enum ApiError {
  /// The Authorization header was present but unusable.
  #[error("unauthorized")]
  Unauthorized,

  #[error(transparent)]
  Workflow(#[from] WorkflowError),
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
      ApiError::Workflow(err) => (status_for(err), err.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

fn status_for(err: &WorkflowError) -> StatusCode {
  match err {
    WorkflowError::NotAuthenticated | WorkflowError::Auth(_) => {
      StatusCode::UNAUTHORIZED
    }
    WorkflowError::Validation(_) => StatusCode::BAD_REQUEST,
    WorkflowError::DuplicateName(_) => StatusCode::CONFLICT,
    WorkflowError::NotFound(_) => StatusCode::NOT_FOUND,
    WorkflowError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
    WorkflowError::Backend(_) => StatusCode::BAD_GATEWAY,
    WorkflowError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
  }
}
