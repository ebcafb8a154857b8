pub mod http;

pub use http::HttpBackend;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::ClientResult;

/// One dialogue exchange as returned by the service
#[derive(Debug, Clone, Deserialize)]
pub struct ChatReply {
    /// The bot's utterance for this turn
    pub system_utterance: String,
    /// True when the service has ended the conversation
    pub end_signal: bool,
}

/// Synthesized speech for one utterance
#[derive(Debug, Clone)]
pub struct SpeechAudio {
    pub bytes: Vec<u8>,
    /// Mime type reported by the service (e.g. audio/mpeg)
    pub mime: String,
}

/// The counseling service contracts consumed by the client.
///
/// One implementation talks HTTP ([`HttpBackend`]); tests inject scripted
/// implementations to drive the controller headless.
#[async_trait]
pub trait CounselBackend: Send + Sync {
    /// Mint a new session identifier (POST /init-session).
    async fn init_session(&self) -> ClientResult<String>;

    /// Localized prefill text for the input field (GET /default-message).
    async fn default_message(&self) -> ClientResult<String>;

    /// Whether the dialogue engine is ready (GET /status).
    async fn status(&self) -> ClientResult<bool>;

    /// Send one user utterance for the given session (POST /chat).
    /// Never retried automatically; a single attempt per user-initiated turn.
    async fn chat(&self, session_id: &str, utterance: &str) -> ClientResult<ChatReply>;

    /// Upload a finished WAV recording, returning best-effort transcript text
    /// (POST /speech-to-text). Empty string when nothing was recognized.
    async fn speech_to_text(&self, wav: Vec<u8>) -> ClientResult<String>;

    /// Fetch synthesized audio for arbitrary text (GET /tts).
    async fn synthesize(&self, text: &str) -> ClientResult<SpeechAudio>;
}
