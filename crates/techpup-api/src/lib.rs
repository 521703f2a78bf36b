//! JSON HTTP facade over the TechPup profile workflow.
//!
//! Each route stands in for one screen action of the mobile client; the
//! handlers translate HTTP to workflow calls and back, nothing more. The
//! facade is stateless between requests apart from the live confirmation
//! polls, which need an owner to cancel them.

pub mod auth;
pub mod error;
pub mod profile;
pub mod register;
pub mod videos;

pub use error::ApiError;


use std::{
  collections::HashMap,
  path::PathBuf,
  sync::{Arc, Mutex},
  time::Duration,
};

use axum::{
  Router,
  routing::{delete, get, post},
};
use serde::Deserialize;
use techpup_core::store::{DocumentStore, IdentityService};
use techpup_workflow::{ConfirmationPoll, Workflow};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml`.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  pub store_path: PathBuf,
  /// Email-confirmation poll interval, in seconds.
  #[serde(default = "default_confirmation_poll_secs")]
  pub confirmation_poll_secs: u64,
}

fn default_confirmation_poll_secs() -> u64 {
  3
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<B> {
  pub workflow: Workflow<B>,
  pub backend:  Arc<B>,
  /// Live confirmation polls keyed by subject, so a caller can cancel one
  /// (the screen-teardown analogue). Finished polls are pruned on insert.
  pub polls:    Arc<Mutex<HashMap<Uuid, ConfirmationPoll>>>,
  pub poll_interval: Duration,
}

impl<B> AppState<B> {
  pub fn new(backend: Arc<B>, poll_interval: Duration) -> Self {
    Self {
      workflow: Workflow::new(backend.clone()),
      backend,
      polls: Arc::new(Mutex::new(HashMap::new())),
      poll_interval,
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the API router for `state`.
pub fn router<B>(state: AppState<B>) -> Router
where
  B: IdentityService + DocumentStore + Clone + Send + Sync + 'static,
{
  Router::new()
    .route("/register", post(register::create::<B>))
    .route("/register/{subject_id}", delete(register::cancel::<B>))
    .route("/session", get(profile::session::<B>))
    .route("/profile/resolve", get(profile::resolve::<B>))
    .route(
      "/profile/dog",
      post(profile::create_dog::<B>).delete(profile::unlink_dog::<B>),
    )
    .route("/videos", get(videos::list))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
