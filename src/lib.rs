pub mod api;
pub mod audio;
pub mod chat;
pub mod config;
pub mod error;
pub mod session;

pub use api::{ChatReply, CounselBackend, HttpBackend, SpeechAudio};
pub use audio::{
    AudioFrame, CaptureBackend, CaptureConfig, CpalBackend, Playback, Recorder, RecorderToggle,
    RecordingClip, RodioPlayer, TtsCache,
};
pub use chat::{secure_capture_context, ChatController, ChatView, ConsoleView, Role, TranscriptEntry};
pub use config::Config;
pub use error::{ClientError, ClientResult};
pub use session::SessionStore;
