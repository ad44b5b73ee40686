//! Session state tests against a mock generation service.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use toon_reel::animate::{
    ApiKey, ClientConfig, GenerationClient, NoProgress, SourceError, SourceLimits, Style,
};
use toon_reel::credential::{CredentialError, CredentialGate, EnvCredentialGate};
use toon_reel::session::{Session, SessionError, ViewState};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CREATE_PATH: &str = "/v1beta/models/veo-3.1-fast-generate-preview:predictLongRunning";
const POLL_PATH: &str = "/v1beta/models/veo-3.1-fast-generate-preview/operations/op-9";

/// Gate that hands out a fixed key and counts how it is used.
#[derive(Clone, Default)]
struct RecordingGate {
    key: Option<ApiKey>,
    selected: Option<ApiKey>,
    selections: Arc<Mutex<usize>>,
    forgotten: Arc<Mutex<usize>>,
}

impl RecordingGate {
    fn with_key(key: &str) -> Self {
        Self {
            key: Some(ApiKey::new(key)),
            ..Self::default()
        }
    }

    fn selections(&self) -> usize {
        *self.selections.lock().unwrap()
    }

    fn forgotten(&self) -> usize {
        *self.forgotten.lock().unwrap()
    }
}

impl CredentialGate for RecordingGate {
    fn has_credential(&self) -> bool {
        self.key.is_some()
    }

    fn select_credential(&mut self) -> Result<(), CredentialError> {
        *self.selections.lock().unwrap() += 1;
        match &self.key {
            Some(key) => {
                self.selected = Some(key.clone());
                Ok(())
            }
            None => Err(CredentialError::Empty),
        }
    }

    fn credential(&self) -> Option<ApiKey> {
        self.selected.clone()
    }

    fn forget(&mut self) {
        *self.forgotten.lock().unwrap() += 1;
        self.selected = None;
    }
}

fn write_video(dir: &tempfile::TempDir, name: &str, len: u64) -> PathBuf {
    let path = dir.path().join(name);
    let file = std::fs::File::create(&path).unwrap();
    file.set_len(len).unwrap();
    path
}

fn probe(secs: f64) -> impl Fn(&Path) -> Result<f64, SourceError> {
    move |_: &Path| Ok(secs)
}

fn client_for(server: &MockServer) -> GenerationClient {
    GenerationClient::new(
        ApiKey::new("session-key"),
        ClientConfig {
            base_url: server.uri(),
            poll_interval: Duration::from_millis(1),
            ..ClientConfig::default()
        },
    )
    .unwrap()
}

fn operation(done: bool, server: &MockServer) -> serde_json::Value {
    if done {
        serde_json::json!({
            "name": "models/veo-3.1-fast-generate-preview/operations/op-9",
            "done": true,
            "response": {"generateVideoResponse": {"generatedSamples": [
                {"video": {"uri": format!("{}/files/out.mp4", server.uri())}}
            ]}}
        })
    } else {
        serde_json::json!({
            "name": "models/veo-3.1-fast-generate-preview/operations/op-9"
        })
    }
}

#[test]
fn test_new_session_is_idle_with_default_style() {
    let session = Session::new(RecordingGate::default(), SourceLimits::default());

    assert_eq!(session.state(), &ViewState::Idle);
    assert_eq!(session.style(), Style::ClassicAnime);
    assert!(session.source().is_none());
    assert!(session.result().is_none());
    assert!(!session.credential_selected());
}

#[test]
fn test_ensure_credential_selects_once() {
    let gate = RecordingGate::with_key("abc");
    let mut session = Session::new(gate.clone(), SourceLimits::default());

    assert_eq!(session.ensure_credential().unwrap().expose(), "abc");
    assert_eq!(session.ensure_credential().unwrap().expose(), "abc");
    assert!(session.credential_selected());
    assert_eq!(gate.selections(), 1);
}

#[test]
fn test_ensure_credential_without_key_fails() {
    let mut session = Session::new(RecordingGate::default(), SourceLimits::default());

    assert!(matches!(
        session.ensure_credential(),
        Err(CredentialError::Empty)
    ));
    assert!(!session.credential_selected());
}

/// Gate that accepts selection but never yields a key.
struct EmptyHandedGate;

impl CredentialGate for EmptyHandedGate {
    fn has_credential(&self) -> bool {
        false
    }

    fn select_credential(&mut self) -> Result<(), CredentialError> {
        Ok(())
    }

    fn credential(&self) -> Option<ApiKey> {
        None
    }

    fn forget(&mut self) {}
}

#[test]
fn test_selection_without_key_is_not_selected() {
    let mut session = Session::new(EmptyHandedGate, SourceLimits::default());

    let err = session.ensure_credential().unwrap_err();
    assert!(matches!(err, CredentialError::NotSelected));
    assert_eq!(
        err.to_string(),
        "API key not found. Please select an API key."
    );
}

#[test]
fn test_env_gate_uses_configured_key() {
    let gate = EnvCredentialGate::with_vars(
        Some(ApiKey::new("from-config")),
        vec!["TOON_REEL_TEST_UNSET_VAR".to_string()],
    );
    let mut session = Session::new(gate, SourceLimits::default());

    assert_eq!(session.ensure_credential().unwrap().expose(), "from-config");
}

#[test]
fn test_select_source_accepts_valid_clip() {
    let dir = tempfile::tempdir().unwrap();
    let clip = write_video(&dir, "clip.mp4", 2048);
    let mut session = Session::new(RecordingGate::default(), SourceLimits::default());

    let asset = session.select_source(&clip, &probe(12.0)).unwrap();
    assert_eq!(asset.size(), 2048);
    assert_eq!(asset.mime_type(), "video/mp4");
    assert_eq!(session.state(), &ViewState::Idle);
    assert!(session.source().is_some());
}

#[test]
fn test_select_source_rejects_long_clip_and_drops_previous() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_video(&dir, "good.mp4", 1024);
    let long = write_video(&dir, "long.mp4", 1024);
    let mut session = Session::new(RecordingGate::default(), SourceLimits::default());

    session.select_source(&good, &probe(5.0)).unwrap();
    let err = session.select_source(&long, &probe(20.0)).unwrap_err();

    assert!(matches!(err, SourceError::TooLong { .. }));
    assert!(session.source().is_none());
    assert!(matches!(session.state(), ViewState::Error(_)));
}

#[test]
fn test_oversized_clip_keeps_previous_source() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_video(&dir, "good.mp4", 512);
    let big = write_video(&dir, "big.mp4", 4096);
    let limits = SourceLimits {
        max_file_bytes: 1024,
        ..SourceLimits::default()
    };
    let mut session = Session::new(RecordingGate::default(), limits);

    session.select_source(&good, &probe(5.0)).unwrap();
    let err = session.select_source(&big, &probe(5.0)).unwrap_err();

    assert!(matches!(err, SourceError::TooLarge { .. }));
    assert_eq!(session.source().map(|s| s.path()), Some(good.as_path()));
    assert!(matches!(session.state(), ViewState::Error(_)));
}

#[test]
fn test_unsupported_clip_keeps_previous_source() {
    let dir = tempfile::tempdir().unwrap();
    let good = write_video(&dir, "good.mov", 512);
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "hello").unwrap();
    let mut session = Session::new(RecordingGate::default(), SourceLimits::default());

    session.select_source(&good, &probe(5.0)).unwrap();
    session.select_source(&notes, &probe(1.0)).unwrap_err();

    assert_eq!(session.source().map(|s| s.path()), Some(good.as_path()));
}

#[test]
fn test_select_source_rejects_non_video() {
    let dir = tempfile::tempdir().unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "hello").unwrap();
    let mut session = Session::new(RecordingGate::default(), SourceLimits::default());

    let err = session.select_source(&notes, &probe(1.0)).unwrap_err();
    assert!(matches!(err, SourceError::UnsupportedType(_)));
}

#[tokio::test]
async fn test_submit_without_source_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut session = Session::new(RecordingGate::default(), SourceLimits::default());
    let err = session
        .submit(&client_for(&server), &mut NoProgress)
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::NoSource));
    assert_eq!(
        session.state(),
        &ViewState::Error("Please upload a video and select a style.".to_string())
    );
}

#[tokio::test]
async fn test_submit_success_moves_to_done() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(operation(false, &server)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(operation(true, &server)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/out.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"toon".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let clip = write_video(&dir, "clip.mov", 512);
    let mut session = Session::new(RecordingGate::with_key("k"), SourceLimits::default());
    session.select_source(&clip, &probe(4.0)).unwrap();
    session.select_style(Style::AmericanCartoon);

    let result = session
        .submit(&client_for(&server), &mut NoProgress)
        .await
        .unwrap();
    assert_eq!(result.as_bytes(), b"toon");

    assert_eq!(session.state(), &ViewState::Done);
    assert_eq!(session.result().map(|r| r.len()), Some(4));

    session.reset();
    assert_eq!(session.state(), &ViewState::Idle);
    assert!(session.source().is_none());
    assert!(session.result().is_none());
}

#[tokio::test]
async fn test_auth_failure_clears_credential_selection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(operation(false, &server)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(POLL_PATH))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"code": 404, "message": "Requested entity was not found.", "status": "NOT_FOUND"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let clip = write_video(&dir, "clip.mp4", 512);
    let gate = RecordingGate::with_key("stale");
    let mut session = Session::new(gate.clone(), SourceLimits::default());
    session.ensure_credential().unwrap();
    session.select_source(&clip, &probe(4.0)).unwrap();

    let err = session
        .submit(&client_for(&server), &mut NoProgress)
        .await
        .unwrap_err();

    assert!(err.is_auth());
    assert!(!session.credential_selected());
    assert_eq!(gate.forgotten(), 1);
    assert_eq!(
        session.state(),
        &ViewState::Error("API key may be invalid. Please try selecting it again.".to_string())
    );

    // The next attempt asks the gate again
    session.ensure_credential().unwrap();
    assert_eq!(gate.selections(), 2);
}

#[tokio::test]
async fn test_non_auth_failure_keeps_credential() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(CREATE_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let clip = write_video(&dir, "clip.mp4", 512);
    let gate = RecordingGate::with_key("good");
    let mut session = Session::new(gate.clone(), SourceLimits::default());
    session.ensure_credential().unwrap();
    session.select_source(&clip, &probe(4.0)).unwrap();

    let err = session
        .submit(&client_for(&server), &mut NoProgress)
        .await
        .unwrap_err();

    assert!(!err.is_auth());
    assert!(session.credential_selected());
    assert_eq!(gate.forgotten(), 0);
    assert!(session.source().is_some());
}
