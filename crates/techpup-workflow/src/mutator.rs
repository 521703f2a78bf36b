//! The profile mutator: dog creation and unlinking.
//!
//! Both operations leave the data model in a state the resolver can always
//! classify. Neither is transactional; the write order is chosen so that the
//! only reachable intermediate states are ones the resolver self-heals.

use chrono::Utc;
use serde_json::Value;
use tracing::{info, warn};

use techpup_core::{
  Error, Result,
  error::ValidationError,
  profile::{DogId, NewDog, Profile},
  store::{Document, DocumentPath, DocumentStore},
  subject::SessionContext,
};

use crate::{
  Workflow,
  resolver::{decode, to_document},
};

impl<B: DocumentStore> Workflow<B> {
  /// Create the dog document and mark the profile complete.
  ///
  /// The dog write strictly precedes the profile update: a profile pointing
  /// at a missing dog self-heals on the next resolve, a dog referenced by no
  /// profile would not. An existing dog with the same name is never
  /// overwritten.
  pub async fn create_dog_profile(
    &self,
    session: &SessionContext,
    mut dog: NewDog,
  ) -> Result<DogId> {
    let subject = session.subject().ok_or(Error::NotAuthenticated)?;

    let name = dog.name.trim().to_owned();
    if name.is_empty() {
      return Err(ValidationError::MissingDogName.into());
    }
    dog.name = name.clone();

    let dog_path = DocumentPath::dog(subject.subject_id, &name);
    if self
      .bounded(self.backend.get_document(&dog_path))
      .await?
      .is_some()
    {
      return Err(Error::DuplicateName(name));
    }

    let record = dog.into_dog();
    self
      .bounded(self.backend.set_document(&dog_path, to_document(&record)?))
      .await?;

    let profile_path = DocumentPath::profile(subject.subject_id);
    let mut link = Document::new();
    link.insert("dogID".into(), Value::String(name.clone()));
    link.insert("avatarCreated".into(), Value::Bool(true));

    match self
      .bounded(self.backend.update_document(&profile_path, link))
      .await
    {
      Ok(()) => {}
      Err(Error::NotFound(_)) => {
        // The confirmation write never landed. Create the profile whole
        // rather than leaving the dog unreferenced.
        warn!(%profile_path, "profile missing at link time, creating it");
        let profile = Profile {
          email:          subject.email.clone(),
          created_at:     Utc::now(),
          avatar_created: true,
          dog_id:         Some(name.clone()),
        };
        self
          .bounded(
            self
              .backend
              .set_document(&profile_path, to_document(&profile)?),
          )
          .await?;
      }
      Err(err) => return Err(err),
    }

    info!(subject_id = %subject.subject_id, dog = %name, "dog profile created");
    Ok(name)
  }

  /// Delete the linked dog and clear the link.
  ///
  /// The account-deletion screen funnels here, but nothing beyond the dog is
  /// removed: the profile document and the subject identity survive, `dogID`
  /// is blanked (empty string, the field stays), and the subject resolves as
  /// incomplete afterwards. The caller is expected to have confirmed with
  /// the user before invoking this.
  pub async fn unlink_dog_profile(&self, session: &SessionContext) -> Result<()> {
    let subject = session.subject().ok_or(Error::NotAuthenticated)?;

    let profile_path = DocumentPath::profile(subject.subject_id);
    let linked = self
      .bounded(self.backend.get_document(&profile_path))
      .await?
      .and_then(|doc| decode::<Profile>(&profile_path, doc))
      .and_then(|profile| profile.linked_dog().map(str::to_owned));

    // Dog first, link second: a failure in between leaves a dangling
    // reference, which the resolver treats as incomplete.
    if let Some(dog_id) = &linked {
      let dog_path = DocumentPath::dog(subject.subject_id, dog_id);
      self
        .bounded(self.backend.delete_document(&dog_path))
        .await?;
    }

    let mut clear = Document::new();
    clear.insert("dogID".into(), Value::String(String::new()));
    match self
      .bounded(self.backend.update_document(&profile_path, clear))
      .await
    {
      Ok(()) => {}
      // No profile document means there is no link to clear.
      Err(Error::NotFound(_)) => {}
      Err(err) => return Err(err),
    }

    info!(subject_id = %subject.subject_id, dog = ?linked, "dog profile unlinked");
    Ok(())
  }
}
