use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{ChatReply, CounselBackend, SpeechAudio};
use crate::error::{ClientError, ClientResult};

#[derive(Debug, Deserialize)]
struct InitSessionResponse {
    session_id: String,
}

#[derive(Debug, Deserialize)]
struct DefaultMessageResponse {
    default_message: String,
}

#[derive(Debug, Deserialize)]
struct StatusResponse {
    ready: bool,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    session_id: &'a str,
    user_utterance: &'a str,
}

#[derive(Debug, Deserialize)]
struct TranscriptResponse {
    #[serde(default)]
    transcript: String,
}

/// HTTP implementation of the counseling service contracts.
pub struct HttpBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpBackend {
    /// Build a backend for the given base URL. The client-wide timeout bounds
    /// every request, including an otherwise hung dialogue exchange.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ClientError::Config(e.to_string()))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl CounselBackend for HttpBackend {
    async fn init_session(&self) -> ClientResult<String> {
        let res = self
            .client
            .post(self.url("/init-session"))
            .send()
            .await
            .map_err(|e| ClientError::SessionInit(e.to_string()))?;
        if !res.status().is_success() {
            return Err(ClientError::SessionInit(format!(
                "service returned {}",
                res.status()
            )));
        }
        let body: InitSessionResponse = res
            .json()
            .await
            .map_err(|e| ClientError::SessionInit(e.to_string()))?;
        debug!("minted session {}", body.session_id);
        Ok(body.session_id)
    }

    async fn default_message(&self) -> ClientResult<String> {
        let body: DefaultMessageResponse = self
            .client
            .get(self.url("/default-message"))
            .send()
            .await
            .map_err(|e| ClientError::SessionInit(e.to_string()))?
            .json()
            .await
            .map_err(|e| ClientError::SessionInit(e.to_string()))?;
        Ok(body.default_message)
    }

    async fn status(&self) -> ClientResult<bool> {
        let body: StatusResponse = self
            .client
            .get(self.url("/status"))
            .send()
            .await
            .map_err(|e| ClientError::SessionInit(e.to_string()))?
            .json()
            .await
            .map_err(|e| ClientError::SessionInit(e.to_string()))?;
        Ok(body.ready)
    }

    async fn chat(&self, session_id: &str, utterance: &str) -> ClientResult<ChatReply> {
        let res = self
            .client
            .post(self.url("/chat"))
            .json(&ChatRequest {
                session_id,
                user_utterance: utterance,
            })
            .send()
            .await
            .map_err(|e| ClientError::Dialogue(e.to_string()))?;
        if !res.status().is_success() {
            return Err(ClientError::Dialogue(format!(
                "service returned {}",
                res.status()
            )));
        }
        res.json()
            .await
            .map_err(|e| ClientError::Dialogue(e.to_string()))
    }

    async fn speech_to_text(&self, wav: Vec<u8>) -> ClientResult<String> {
        let part = reqwest::multipart::Part::bytes(wav)
            .file_name("speech.wav")
            .mime_str("audio/wav")
            .map_err(|e| ClientError::Transcription(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("file", part);

        let res = self
            .client
            .post(self.url("/speech-to-text"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| ClientError::Transcription(e.to_string()))?;
        if !res.status().is_success() {
            return Err(ClientError::Transcription(format!(
                "service returned {}",
                res.status()
            )));
        }
        let body: TranscriptResponse = res
            .json()
            .await
            .map_err(|e| ClientError::Transcription(e.to_string()))?;
        Ok(body.transcript)
    }

    async fn synthesize(&self, text: &str) -> ClientResult<SpeechAudio> {
        let res = self
            .client
            .get(self.url("/tts"))
            .query(&[("text", text)])
            .send()
            .await
            .map_err(|e| ClientError::SpeechSynthesis(e.to_string()))?;
        if !res.status().is_success() {
            return Err(ClientError::SpeechSynthesis(format!(
                "service returned {}",
                res.status()
            )));
        }
        let mime = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("audio/mpeg")
            .to_string();
        let bytes = res
            .bytes()
            .await
            .map_err(|e| ClientError::SpeechSynthesis(e.to_string()))?;
        Ok(SpeechAudio {
            bytes: bytes.to_vec(),
            mime,
        })
    }
}
