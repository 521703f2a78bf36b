//! Basic-auth session extraction.
//!
//! The facade holds no server-side sessions: each request carries the
//! subject's credentials, and a successful sign-in yields the explicit
//! session context handed to the workflow. A request without an
//! Authorization header gets an anonymous context — the workflow decides per
//! operation whether that is acceptable.

use axum::{
  extract::FromRequestParts,
  http::{HeaderValue, header, request::Parts},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use techpup_core::{
  store::{DocumentStore, IdentityService},
  subject::SessionContext,
};

use crate::{AppState, error::ApiError};

/// Extractor producing the per-request session context.
pub struct Session(pub SessionContext);

impl<B> FromRequestParts<AppState<B>> for Session
where
  B: IdentityService + DocumentStore + Clone + Send + Sync + 'static,
{
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    state: &AppState<B>,
  ) -> Result<Self, Self::Rejection> {
    let Some(value) = parts.headers.get(header::AUTHORIZATION) else {
      return Ok(Session(SessionContext::anonymous()));
    };

    let (email, password) = decode_basic(value).ok_or(ApiError::Unauthorized)?;
    let subject = state
      .backend
      .sign_in(&email, &password)
      .await
      .map_err(|e| ApiError::Workflow(e.into()))?;

    Ok(Session(SessionContext::authenticated(subject)))
  }
}

/// Parse `Basic base64(email:password)`.
fn decode_basic(value: &HeaderValue) -> Option<(String, String)> {
  let encoded = value.to_str().ok()?.strip_prefix("Basic ")?;
  let decoded = B64.decode(encoded).ok()?;
  let creds = String::from_utf8(decoded).ok()?;
  let (email, password) = creds.split_once(':')?;
  Some((email.to_owned(), password.to_owned()))
}
