use thiserror::Error;

/// Result type alias for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by the counseling client.
///
/// Every network or device failure is caught at the boundary where it occurs
/// and turned into a local view update; none of these escape the controller.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("session initialization failed: {0}")]
    SessionInit(String),

    #[error("microphone unavailable: {0}")]
    Permission(String),

    #[error("transcription failed: {0}")]
    Transcription(String),

    #[error("dialogue request failed: {0}")]
    Dialogue(String),

    #[error("speech synthesis failed: {0}")]
    SpeechSynthesis(String),

    #[error("audio playback error: {0}")]
    Playback(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<cpal::DevicesError> for ClientError {
    fn from(err: cpal::DevicesError) -> Self {
        ClientError::Permission(err.to_string())
    }
}

impl From<cpal::DefaultStreamConfigError> for ClientError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        ClientError::Permission(err.to_string())
    }
}

impl From<cpal::BuildStreamError> for ClientError {
    fn from(err: cpal::BuildStreamError) -> Self {
        ClientError::Permission(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for ClientError {
    fn from(err: cpal::PlayStreamError) -> Self {
        ClientError::Permission(err.to_string())
    }
}
