//! The profile resolver: classifies a subject and picks a route.
//!
//! Read-only. The two-level lookup (Profile, then conditionally Dog) always
//! runs in that order — the dog path depends on the `dogID` value just read.
//! The reads are not atomic against a concurrent writer; a stale or missing
//! nested document is a handled outcome, never a crash.

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::warn;
use uuid::Uuid;

use techpup_core::{
  Error, Result,
  profile::{CompletionState, Dog, Profile, Resolution, RouteTarget},
  store::{Document, DocumentPath, DocumentStore},
  subject::SessionContext,
};

use crate::Workflow;

impl<B: DocumentStore> Workflow<B> {
  /// Classify `subject_id` from its stored Profile and Dog state.
  ///
  /// A missing Profile, an unfinished Profile, a dangling `dogID`, or a
  /// malformed document all classify as [`CompletionState::ProfileIncomplete`]
  /// with target [`RouteTarget::CreateProfile`] — the dangling case is
  /// self-healing: the user is sent back through profile creation instead of
  /// being shown a corrupt-data error.
  pub async fn resolve(&self, subject_id: Uuid) -> Result<Resolution> {
    let profile_path = DocumentPath::profile(subject_id);
    let Some(profile_doc) =
      self.bounded(self.backend.get_document(&profile_path)).await?
    else {
      return Ok(Resolution::incomplete());
    };
    let Some(profile) = decode::<Profile>(&profile_path, profile_doc) else {
      return Ok(Resolution::incomplete());
    };

    if !profile.avatar_created {
      return Ok(Resolution::incomplete());
    }
    let Some(dog_id) = profile.linked_dog() else {
      return Ok(Resolution::incomplete());
    };

    let dog_path = DocumentPath::dog(subject_id, dog_id);
    let Some(dog_doc) =
      self.bounded(self.backend.get_document(&dog_path)).await?
    else {
      warn!(%dog_path, "profile references a missing dog document");
      return Ok(Resolution::incomplete());
    };
    let Some(dog) = decode::<Dog>(&dog_path, dog_doc) else {
      return Ok(Resolution::incomplete());
    };

    Ok(Resolution::complete(dog))
  }

  /// Derive the full completion state for a session: gate first, then the
  /// stored records. Recomputed from scratch on every call.
  pub async fn classify(&self, session: &SessionContext) -> Result<CompletionState> {
    match session.subject() {
      None => Ok(CompletionState::Unauthenticated),
      Some(subject) if !subject.email_confirmed => {
        Ok(CompletionState::EmailUnconfirmed)
      }
      Some(subject) => Ok(self.resolve(subject.subject_id).await?.state),
    }
  }

  /// The navigation check run when a screen gains focus. Unauthenticated and
  /// unconfirmed sessions route back to login; confirmed sessions route by
  /// resolution.
  pub async fn route_for(&self, session: &SessionContext) -> Result<RouteTarget> {
    match session.subject() {
      None => Ok(RouteTarget::Login),
      Some(subject) if !subject.email_confirmed => Ok(RouteTarget::Login),
      Some(subject) => Ok(self.resolve(subject.subject_id).await?.route),
    }
  }
}

// ─── Document codecs ─────────────────────────────────────────────────────────

/// Decode a document into a typed record. A malformed document (a required
/// field missing or of the wrong shape) logs at WARN and reads as absent.
pub(crate) fn decode<T: DeserializeOwned>(
  path: &DocumentPath,
  doc: Document,
) -> Option<T> {
  match serde_json::from_value(Value::Object(doc)) {
    Ok(record) => Some(record),
    Err(err) => {
      warn!(%path, %err, "malformed document");
      None
    }
  }
}

/// Serialise a record into document fields.
pub(crate) fn to_document<T: Serialize>(record: &T) -> Result<Document> {
  match serde_json::to_value(record)? {
    Value::Object(fields) => Ok(fields),
    _ => Err(Error::Serialization(serde::ser::Error::custom(
      "record did not serialise to a JSON object",
    ))),
  }
}
