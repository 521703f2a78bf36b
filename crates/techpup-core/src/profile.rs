//! Profile and dog records, and the completion state derived from them.
//!
//! Both records are fixed schemas decoded from stored documents at the read
//! boundary. Wire field names are camelCase, matching the documents the
//! mobile client reads and writes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Profile ─────────────────────────────────────────────────────────────────

/// The per-subject record tracking profile completion, stored at
/// `users/{subject_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
  pub email:          String,
  pub created_at:     DateTime<Utc>,
  pub avatar_created: bool,
  /// Name of the linked dog. Absent and empty both mean "no dog linked";
  /// unlinking writes the empty string rather than removing the field.
  #[serde(
    default,
    rename = "dogID",
    skip_serializing_if = "Option::is_none"
  )]
  pub dog_id:         Option<String>,
}

impl Profile {
  /// The linked dog id, treating the empty string as unset.
  pub fn linked_dog(&self) -> Option<&str> {
    self.dog_id.as_deref().filter(|id| !id.is_empty())
  }
}

// ─── Dog ─────────────────────────────────────────────────────────────────────

/// A dog id is the owner-chosen name; it doubles as the final path segment
/// of the dog document.
pub type DogId = String;

/// One pet avatar, stored at `users/{subject_id}/dogs/{dog_id}`.
///
/// Creation-time fields are required. The richer display fields default when
/// the document predates them; a document missing a *required* field is
/// malformed and resolves like a dangling reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dog {
  pub name:        String,
  pub breed:       String,
  pub age:         String,
  pub weight:      String,
  pub fur_color:   String,
  pub eye_color:   String,
  pub accessories: String,

  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub gender:      Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub height:      Option<String>,
  /// Ordered list of learned behaviors.
  #[serde(default, skip_serializing_if = "Vec::is_empty")]
  pub behaviors:   Vec<String>,
  /// Reference to a photo; no binary data lives in the document.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub photo:       Option<String>,
  /// Free-text biography.
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub about:       Option<String>,
}

/// Input to `create_dog_profile` — the fields collected by the creation
/// form, all free text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDog {
  pub name:        String,
  pub breed:       String,
  pub age:         String,
  pub weight:      String,
  pub fur_color:   String,
  pub eye_color:   String,
  pub accessories: String,
}

impl NewDog {
  /// Build the stored record. Display fields start empty and are filled in
  /// later through profile editing.
  pub fn into_dog(self) -> Dog {
    Dog {
      name:        self.name,
      breed:       self.breed,
      age:         self.age,
      weight:      self.weight,
      fur_color:   self.fur_color,
      eye_color:   self.eye_color,
      accessories: self.accessories,
      gender:      None,
      height:      None,
      behaviors:   Vec::new(),
      photo:       None,
      about:       None,
    }
  }
}

// ─── Completion state ────────────────────────────────────────────────────────

/// The derived profile-completion state — never stored, recomputed from
/// scratch on every check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionState {
  /// No live subject.
  Unauthenticated,
  /// Subject exists, email not yet confirmed.
  EmailUnconfirmed,
  /// Profile missing, unfinished, or pointing at a missing dog.
  ProfileIncomplete,
  /// Profile present and `dogID` resolves to an existing dog.
  ProfileComplete,
}

/// Where the presentation layer should send the user next.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteTarget {
  Login,
  CreateProfile,
  Home,
}

/// The resolver's verdict for one subject.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolution {
  pub state: CompletionState,
  /// The stored dog payload, present only when the profile is complete.
  pub dog:   Option<Dog>,
  pub route: RouteTarget,
}

impl Resolution {
  pub fn incomplete() -> Self {
    Self {
      state: CompletionState::ProfileIncomplete,
      dog:   None,
      route: RouteTarget::CreateProfile,
    }
  }

  pub fn complete(dog: Dog) -> Self {
    Self {
      state: CompletionState::ProfileComplete,
      dog:   Some(dog),
      route: RouteTarget::Home,
    }
  }
}
