//! Handler for the training-video catalog.
//!
//! The catalog is static reference data for the presentation layer; it does
//! not touch the backend.

use axum::{Json, extract::Query};
use serde::Deserialize;
use techpup_core::catalog::{self, VideoEntry};

#[derive(Debug, Deserialize, Default)]
pub struct ListParams {
  /// Case-insensitive filter over title and category.
  pub q: Option<String>,
}

/// `GET /videos[?q=...]`
pub async fn list(Query(params): Query<ListParams>) -> Json<Vec<VideoEntry>> {
  let entries = match params.q.as_deref() {
    Some(q) => catalog::search(q),
    None => catalog::CATALOG.iter().collect(),
  };
  Json(entries.into_iter().copied().collect())
}
