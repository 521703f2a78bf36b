//! Workflow tests against the in-memory SQLite backend, plus stub backends
//! for write ordering and timeout behaviour.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex},
  time::Duration,
};

use serde_json::json;
use techpup_core::{
  Error,
  error::ValidationError,
  profile::{CompletionState, NewDog, RouteTarget},
  store::{Document, DocumentPath, DocumentStore, IdentityService},
  subject::{SessionContext, Subject},
};
use techpup_store_sqlite::SqliteBackend;
use uuid::Uuid;

use crate::{ConfirmationPoll, RegistrationForm, Workflow};

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn backend() -> Arc<SqliteBackend> {
  Arc::new(
    SqliteBackend::open_in_memory()
      .await
      .expect("in-memory backend"),
  )
}

fn workflow(backend: &Arc<SqliteBackend>) -> Workflow<SqliteBackend> {
  Workflow::new(backend.clone())
}

fn rex() -> NewDog {
  NewDog {
    name:        "Rex".into(),
    breed:       "Lab".into(),
    age:         "3".into(),
    weight:      "28".into(),
    fur_color:   "black".into(),
    eye_color:   "brown".into(),
    accessories: "collar".into(),
  }
}

/// Sign up and confirm `a@b.com`, returning its session. No Profile
/// document is written.
async fn confirmed_session(backend: &Arc<SqliteBackend>) -> SessionContext {
  let subject = backend.sign_up("a@b.com", "abcdef").await.unwrap();
  backend.confirm_email(subject.subject_id).await.unwrap();
  let subject = backend.reload_subject(subject.subject_id).await.unwrap();
  SessionContext::authenticated(subject)
}

/// Write the initial Profile document the confirmation poll would create.
async fn seed_profile(backend: &Arc<SqliteBackend>, session: &SessionContext) {
  let subject = session.subject().unwrap();
  let path = DocumentPath::profile(subject.subject_id);
  let mut doc = Document::new();
  doc.insert("email".into(), json!(subject.email));
  doc.insert("createdAt".into(), json!(chrono::Utc::now().to_rfc3339()));
  doc.insert("avatarCreated".into(), json!(false));
  backend.set_document(&path, doc).await.unwrap();
}

// ─── Resolver ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn resolve_without_profile_is_incomplete() {
  let b = backend().await;
  let session = confirmed_session(&b).await;
  let wf = workflow(&b);

  let resolution = wf
    .resolve(session.subject().unwrap().subject_id)
    .await
    .unwrap();
  assert_eq!(resolution.state, CompletionState::ProfileIncomplete);
  assert_eq!(resolution.route, RouteTarget::CreateProfile);
  assert!(resolution.dog.is_none());
}

#[tokio::test]
async fn resolve_with_unfinished_profile_is_incomplete() {
  let b = backend().await;
  let session = confirmed_session(&b).await;
  seed_profile(&b, &session).await;
  let wf = workflow(&b);

  let resolution = wf
    .resolve(session.subject().unwrap().subject_id)
    .await
    .unwrap();
  assert_eq!(resolution.state, CompletionState::ProfileIncomplete);
  assert_eq!(resolution.route, RouteTarget::CreateProfile);
}

#[tokio::test]
async fn resolve_with_dangling_dog_reference_is_incomplete() {
  let b = backend().await;
  let session = confirmed_session(&b).await;
  let subject_id = session.subject().unwrap().subject_id;

  // A profile claiming a dog that was never written.
  let path = DocumentPath::profile(subject_id);
  let mut doc = Document::new();
  doc.insert("email".into(), json!("a@b.com"));
  doc.insert("createdAt".into(), json!(chrono::Utc::now().to_rfc3339()));
  doc.insert("avatarCreated".into(), json!(true));
  doc.insert("dogID".into(), json!("Ghost"));
  b.set_document(&path, doc).await.unwrap();

  let resolution = workflow(&b).resolve(subject_id).await.unwrap();
  assert_eq!(resolution.state, CompletionState::ProfileIncomplete);
  assert_eq!(resolution.route, RouteTarget::CreateProfile);
}

#[tokio::test]
async fn resolve_malformed_profile_is_incomplete() {
  let b = backend().await;
  let session = confirmed_session(&b).await;
  let subject_id = session.subject().unwrap().subject_id;

  // Missing every required field except email.
  let path = DocumentPath::profile(subject_id);
  let mut doc = Document::new();
  doc.insert("email".into(), json!("a@b.com"));
  b.set_document(&path, doc).await.unwrap();

  let resolution = workflow(&b).resolve(subject_id).await.unwrap();
  assert_eq!(resolution.state, CompletionState::ProfileIncomplete);
}

#[tokio::test]
async fn resolve_complete_returns_stored_dog() {
  let b = backend().await;
  let session = confirmed_session(&b).await;
  seed_profile(&b, &session).await;
  let wf = workflow(&b);

  let dog_id = wf.create_dog_profile(&session, rex()).await.unwrap();
  assert_eq!(dog_id, "Rex");

  let resolution = wf
    .resolve(session.subject().unwrap().subject_id)
    .await
    .unwrap();
  assert_eq!(resolution.state, CompletionState::ProfileComplete);
  assert_eq!(resolution.route, RouteTarget::Home);

  let dog = resolution.dog.unwrap();
  assert_eq!(dog.name, "Rex");
  assert_eq!(dog.breed, "Lab");
  assert_eq!(dog.fur_color, "black");
  assert!(dog.behaviors.is_empty());
}

// ─── Mutator: create ─────────────────────────────────────────────────────────

#[tokio::test]
async fn create_dog_requires_authentication() {
  let b = backend().await;
  let err = workflow(&b)
    .create_dog_profile(&SessionContext::anonymous(), rex())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotAuthenticated));
}

#[tokio::test]
async fn create_dog_rejects_blank_name() {
  let b = backend().await;
  let session = confirmed_session(&b).await;
  seed_profile(&b, &session).await;

  let mut dog = rex();
  dog.name = "   ".into();
  let err = workflow(&b)
    .create_dog_profile(&session, dog)
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(ValidationError::MissingDogName)
  ));
}

#[tokio::test]
async fn create_dog_twice_yields_duplicate_name() {
  let b = backend().await;
  let session = confirmed_session(&b).await;
  seed_profile(&b, &session).await;
  let wf = workflow(&b);

  wf.create_dog_profile(&session, rex()).await.unwrap();
  let err = wf.create_dog_profile(&session, rex()).await.unwrap_err();
  assert!(matches!(err, Error::DuplicateName(name) if name == "Rex"));

  // Exactly one dog record; the first write survives untouched.
  let subject_id = session.subject().unwrap().subject_id;
  let stored = b
    .get_document(&DocumentPath::dog(subject_id, "Rex"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(stored.get("breed"), Some(&json!("Lab")));
}

#[tokio::test]
async fn create_dog_writes_dog_before_profile_link() {
  let memory = Arc::new(MemoryStore::default());
  let subject = test_subject(true);
  let subject_id = subject.subject_id;

  // Seed the profile so the link takes the update path.
  memory.docs.lock().unwrap().insert(
    DocumentPath::profile(subject_id).as_str().to_owned(),
    Document::new(),
  );

  let wf = Workflow::new(memory.clone());
  wf.create_dog_profile(&SessionContext::authenticated(subject), rex())
    .await
    .unwrap();

  let ops = memory.ops.lock().unwrap().clone();
  let dog_path = DocumentPath::dog(subject_id, "Rex");
  let profile_path = DocumentPath::profile(subject_id);
  assert_eq!(
    ops,
    vec![
      format!("get {dog_path}"),
      format!("set {dog_path}"),
      format!("update {profile_path}"),
    ]
  );
}

#[tokio::test]
async fn create_dog_creates_profile_when_missing() {
  let b = backend().await;
  let session = confirmed_session(&b).await;
  let wf = workflow(&b);

  // No seeded profile: the link falls back to creating the document whole.
  wf.create_dog_profile(&session, rex()).await.unwrap();

  let subject_id = session.subject().unwrap().subject_id;
  let profile = b
    .get_document(&DocumentPath::profile(subject_id))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(profile.get("avatarCreated"), Some(&json!(true)));
  assert_eq!(profile.get("dogID"), Some(&json!("Rex")));

  let resolution = wf.resolve(subject_id).await.unwrap();
  assert_eq!(resolution.state, CompletionState::ProfileComplete);
}

#[tokio::test]
async fn create_dog_trims_the_name() {
  let b = backend().await;
  let session = confirmed_session(&b).await;
  seed_profile(&b, &session).await;

  let mut dog = rex();
  dog.name = "  Rex ".into();
  let dog_id = workflow(&b)
    .create_dog_profile(&session, dog)
    .await
    .unwrap();
  assert_eq!(dog_id, "Rex");
}

// ─── Mutator: unlink ─────────────────────────────────────────────────────────

#[tokio::test]
async fn unlink_removes_dog_and_clears_link() {
  let b = backend().await;
  let session = confirmed_session(&b).await;
  seed_profile(&b, &session).await;
  let wf = workflow(&b);
  let subject_id = session.subject().unwrap().subject_id;

  wf.create_dog_profile(&session, rex()).await.unwrap();
  wf.unlink_dog_profile(&session).await.unwrap();

  assert!(
    b.get_document(&DocumentPath::dog(subject_id, "Rex"))
      .await
      .unwrap()
      .is_none()
  );

  // The link is blanked, not removed; the profile survives.
  let profile = b
    .get_document(&DocumentPath::profile(subject_id))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(profile.get("dogID"), Some(&json!("")));
  assert_eq!(profile.get("email"), Some(&json!("a@b.com")));

  let resolution = wf.resolve(subject_id).await.unwrap();
  assert_eq!(resolution.state, CompletionState::ProfileIncomplete);
  assert_eq!(resolution.route, RouteTarget::CreateProfile);
}

#[tokio::test]
async fn unlink_without_linked_dog_is_a_no_op() {
  let b = backend().await;
  let session = confirmed_session(&b).await;
  seed_profile(&b, &session).await;

  workflow(&b).unlink_dog_profile(&session).await.unwrap();
}

#[tokio::test]
async fn unlink_requires_authentication() {
  let b = backend().await;
  let err = workflow(&b)
    .unlink_dog_profile(&SessionContext::anonymous())
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotAuthenticated));
}

// ─── Registration ────────────────────────────────────────────────────────────

fn registration(email: &str, password: &str, confirm: &str) -> RegistrationForm {
  RegistrationForm {
    email:            email.into(),
    password:         password.into(),
    confirm_password: confirm.into(),
  }
}

#[tokio::test]
async fn register_rejects_short_password_without_backend_calls() {
  // The identity stub panics on any call; validation must fail first.
  let wf = Workflow::new(Arc::new(PanickingIdentity));
  let err = wf
    .register_subject(&registration("a@b.com", "abc", "abc"))
    .await
    .unwrap_err();
  assert!(matches!(
    err,
    Error::Validation(ValidationError::PasswordTooShort)
  ));
}

#[tokio::test]
async fn register_creates_unconfirmed_subject_without_profile() {
  let b = backend().await;
  let wf = workflow(&b);

  let pending = wf
    .register_subject(&registration("a@b.com", "abcdef", "abcdef"))
    .await
    .unwrap();
  assert_eq!(pending.subject.email, "a@b.com");
  assert!(!pending.subject.email_confirmed);

  // Credentials are live immediately; the profile document is not.
  b.sign_in("a@b.com", "abcdef").await.unwrap();
  assert!(
    b.get_document(&DocumentPath::profile(pending.subject.subject_id))
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn register_duplicate_email_is_an_auth_error() {
  let b = backend().await;
  let wf = workflow(&b);

  wf.register_subject(&registration("a@b.com", "abcdef", "abcdef"))
    .await
    .unwrap();
  let err = wf
    .register_subject(&registration("a@b.com", "ghijkl", "ghijkl"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Auth(_)));
}

// ─── Confirmation poll ───────────────────────────────────────────────────────

#[tokio::test]
async fn confirmation_poll_writes_the_initial_profile() {
  let b = backend().await;
  let wf = workflow(&b);

  let pending = wf
    .register_subject(&registration("a@b.com", "abcdef", "abcdef"))
    .await
    .unwrap();
  let subject_id = pending.subject.subject_id;

  let poll =
    ConfirmationPoll::spawn(b.clone(), pending, Duration::from_millis(20));
  b.confirm_email(subject_id).await.unwrap();

  poll.join().await.expect("poll ran to completion").unwrap();

  let profile = b
    .get_document(&DocumentPath::profile(subject_id))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(profile.get("email"), Some(&json!("a@b.com")));
  assert_eq!(profile.get("avatarCreated"), Some(&json!(false)));
  // The initial document has no dogID field at all.
  assert!(profile.get("dogID").is_none());

  // Confirmed but incomplete: next stop is profile creation.
  let resolution = wf.resolve(subject_id).await.unwrap();
  assert_eq!(resolution.route, RouteTarget::CreateProfile);
}

#[tokio::test]
async fn cancelled_poll_never_writes_the_profile() {
  let b = backend().await;
  let wf = workflow(&b);

  let pending = wf
    .register_subject(&registration("a@b.com", "abcdef", "abcdef"))
    .await
    .unwrap();
  let subject_id = pending.subject.subject_id;

  let poll =
    ConfirmationPoll::spawn(b.clone(), pending, Duration::from_millis(20));
  poll.cancel();
  b.confirm_email(subject_id).await.unwrap();

  assert!(poll.join().await.is_none());
  tokio::time::sleep(Duration::from_millis(100)).await;
  assert!(
    b.get_document(&DocumentPath::profile(subject_id))
      .await
      .unwrap()
      .is_none()
  );
}

#[tokio::test]
async fn dropped_poll_is_cancelled() {
  let b = backend().await;
  let wf = workflow(&b);

  let pending = wf
    .register_subject(&registration("a@b.com", "abcdef", "abcdef"))
    .await
    .unwrap();
  let subject_id = pending.subject.subject_id;

  let poll =
    ConfirmationPoll::spawn(b.clone(), pending, Duration::from_millis(20));
  drop(poll);

  b.confirm_email(subject_id).await.unwrap();
  tokio::time::sleep(Duration::from_millis(100)).await;
  assert!(
    b.get_document(&DocumentPath::profile(subject_id))
      .await
      .unwrap()
      .is_none()
  );
}

// ─── Timeouts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn round_trip_timeout_surfaces_as_retryable_error() {
  let wf = Workflow::new(Arc::new(HangingStore))
    .with_round_trip_timeout(Duration::from_millis(50));

  let err = wf.resolve(Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::Timeout(_)));
}

// ─── Routing ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn route_for_anonymous_session_is_login() {
  let b = backend().await;
  let route = workflow(&b)
    .route_for(&SessionContext::anonymous())
    .await
    .unwrap();
  assert_eq!(route, RouteTarget::Login);
}

#[tokio::test]
async fn route_for_unconfirmed_subject_is_login() {
  let b = backend().await;
  let subject = b.sign_up("a@b.com", "abcdef").await.unwrap();
  let route = workflow(&b)
    .route_for(&SessionContext::authenticated(subject))
    .await
    .unwrap();
  assert_eq!(route, RouteTarget::Login);
}

#[tokio::test]
async fn route_for_complete_profile_is_home() {
  let b = backend().await;
  let session = confirmed_session(&b).await;
  seed_profile(&b, &session).await;
  let wf = workflow(&b);

  wf.create_dog_profile(&session, rex()).await.unwrap();
  assert_eq!(wf.route_for(&session).await.unwrap(), RouteTarget::Home);
}

#[tokio::test]
async fn classify_covers_all_four_states() {
  let b = backend().await;
  let wf = workflow(&b);

  assert_eq!(
    wf.classify(&SessionContext::anonymous()).await.unwrap(),
    CompletionState::Unauthenticated
  );

  let subject = b.sign_up("a@b.com", "abcdef").await.unwrap();
  let unconfirmed = SessionContext::authenticated(subject.clone());
  assert_eq!(
    wf.classify(&unconfirmed).await.unwrap(),
    CompletionState::EmailUnconfirmed
  );

  b.confirm_email(subject.subject_id).await.unwrap();
  let session = SessionContext::authenticated(
    b.reload_subject(subject.subject_id).await.unwrap(),
  );
  assert_eq!(
    wf.classify(&session).await.unwrap(),
    CompletionState::ProfileIncomplete
  );

  seed_profile(&b, &session).await;
  wf.create_dog_profile(&session, rex()).await.unwrap();
  assert_eq!(
    wf.classify(&session).await.unwrap(),
    CompletionState::ProfileComplete
  );
}

// ─── Stub backends ───────────────────────────────────────────────────────────

fn test_subject(confirmed: bool) -> Subject {
  Subject {
    subject_id:      Uuid::new_v4(),
    email:           "a@b.com".into(),
    email_confirmed: confirmed,
  }
}

/// In-memory document store that records the order of operations.
#[derive(Default)]
struct MemoryStore {
  docs: Mutex<HashMap<String, Document>>,
  ops:  Mutex<Vec<String>>,
}

impl DocumentStore for MemoryStore {
  type Error = Error;

  async fn get_document(&self, path: &DocumentPath) -> Result<Option<Document>, Error> {
    self.ops.lock().unwrap().push(format!("get {path}"));
    Ok(self.docs.lock().unwrap().get(path.as_str()).cloned())
  }

  async fn set_document(&self, path: &DocumentPath, fields: Document) -> Result<(), Error> {
    self.ops.lock().unwrap().push(format!("set {path}"));
    self
      .docs
      .lock()
      .unwrap()
      .insert(path.as_str().to_owned(), fields);
    Ok(())
  }

  async fn update_document(&self, path: &DocumentPath, fields: Document) -> Result<(), Error> {
    self.ops.lock().unwrap().push(format!("update {path}"));
    let mut docs = self.docs.lock().unwrap();
    let Some(doc) = docs.get_mut(path.as_str()) else {
      return Err(Error::NotFound(path.as_str().to_owned()));
    };
    for (key, value) in fields {
      doc.insert(key, value);
    }
    Ok(())
  }

  async fn delete_document(&self, path: &DocumentPath) -> Result<(), Error> {
    self.ops.lock().unwrap().push(format!("delete {path}"));
    self.docs.lock().unwrap().remove(path.as_str());
    Ok(())
  }
}

/// Identity stub that panics on any call — used to prove validation happens
/// before the first backend round trip.
struct PanickingIdentity;

impl IdentityService for PanickingIdentity {
  type Error = Error;

  async fn sign_up(&self, _: &str, _: &str) -> Result<Subject, Error> {
    unimplemented!("no backend call expected")
  }

  async fn sign_in(&self, _: &str, _: &str) -> Result<Subject, Error> {
    unimplemented!("no backend call expected")
  }

  async fn send_confirmation_challenge(&self, _: Uuid) -> Result<(), Error> {
    unimplemented!("no backend call expected")
  }

  async fn reload_subject(&self, _: Uuid) -> Result<Subject, Error> {
    unimplemented!("no backend call expected")
  }
}

/// Document store whose calls never resolve — used to exercise the
/// round-trip bound.
struct HangingStore;

impl DocumentStore for HangingStore {
  type Error = Error;

  async fn get_document(&self, _: &DocumentPath) -> Result<Option<Document>, Error> {
    std::future::pending().await
  }

  async fn set_document(&self, _: &DocumentPath, _: Document) -> Result<(), Error> {
    std::future::pending().await
  }

  async fn update_document(&self, _: &DocumentPath, _: Document) -> Result<(), Error> {
    std::future::pending().await
  }

  async fn delete_document(&self, _: &DocumentPath) -> Result<(), Error> {
    std::future::pending().await
  }
}
