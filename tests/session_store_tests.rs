// SessionStore lifecycle tests: load-or-create, persistence across clients,
// and reset.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};

use counsel_chat::api::{ChatReply, CounselBackend, SpeechAudio};
use counsel_chat::error::{ClientError, ClientResult};
use counsel_chat::session::SessionStore;

#[derive(Default)]
struct SessionOnlyBackend {
    init_calls: AtomicUsize,
    fail: bool,
}

#[async_trait]
impl CounselBackend for SessionOnlyBackend {
    async fn init_session(&self) -> ClientResult<String> {
        let n = self.init_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(ClientError::SessionInit("service unavailable".to_string()));
        }
        Ok(format!("session-{}", n))
    }

    async fn default_message(&self) -> ClientResult<String> {
        unreachable!("session tests only exercise init")
    }

    async fn status(&self) -> ClientResult<bool> {
        unreachable!("session tests only exercise init")
    }

    async fn chat(&self, _session_id: &str, _utterance: &str) -> ClientResult<ChatReply> {
        unreachable!("session tests only exercise init")
    }

    async fn speech_to_text(&self, _wav: Vec<u8>) -> ClientResult<String> {
        unreachable!("session tests only exercise init")
    }

    async fn synthesize(&self, _text: &str) -> ClientResult<SpeechAudio> {
        unreachable!("session tests only exercise init")
    }
}

#[tokio::test]
async fn creates_and_persists_a_new_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    let backend = SessionOnlyBackend::default();

    assert!(store.current().is_none());

    let id = store.get_or_create(&backend).await.unwrap();
    assert_eq!(id, "session-0");
    assert_eq!(store.current().as_deref(), Some("session-0"));
    assert!(dir.path().join("session_id").exists());
}

#[tokio::test]
async fn reuses_the_persisted_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    let backend = SessionOnlyBackend::default();

    let first = store.get_or_create(&backend).await.unwrap();
    let second = store.get_or_create(&backend).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(backend.init_calls.load(Ordering::SeqCst), 1);

    // A separate client over the same state directory also reuses it.
    let other = SessionStore::new(dir.path());
    assert_eq!(other.get_or_create(&backend).await.unwrap(), first);
    assert_eq!(backend.init_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn reset_clears_and_next_create_mints_fresh() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    let backend = SessionOnlyBackend::default();

    let first = store.get_or_create(&backend).await.unwrap();
    store.reset().unwrap();

    assert!(store.current().is_none());
    assert!(!dir.path().join("session_id").exists());

    let second = store.get_or_create(&backend).await.unwrap();
    assert_ne!(first, second);
    assert_eq!(backend.init_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn reset_without_a_session_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());

    store.reset().unwrap();
    store.reset().unwrap();
}

#[tokio::test]
async fn failed_creation_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = SessionStore::new(dir.path());
    let backend = SessionOnlyBackend {
        fail: true,
        ..Default::default()
    };

    let err = store.get_or_create(&backend).await.unwrap_err();
    assert!(matches!(err, ClientError::SessionInit(_)));
    assert!(store.current().is_none());
    assert!(!dir.path().join("session_id").exists());
}
