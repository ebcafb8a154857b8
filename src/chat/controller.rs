use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

use super::transcript::TranscriptEntry;
use super::view::ChatView;
use crate::api::CounselBackend;
use crate::audio::{Playback, Recorder, RecorderToggle, TtsCache};
use crate::config::ChatConfig;
use crate::error::ClientResult;
use crate::session::SessionStore;

/// Whether voice capture may be used against the given backend URL.
///
/// Recorded audio is only uploaded over TLS or to a loopback host; a
/// plaintext remote backend refuses the microphone outright.
pub fn secure_capture_context(base_url: &str) -> bool {
    let url = match reqwest::Url::parse(base_url) {
        Ok(url) => url,
        Err(_) => return false,
    };
    if url.scheme() == "https" {
        return true;
    }
    match url.host_str() {
        Some("localhost") => true,
        Some(host) => host
            .parse::<std::net::IpAddr>()
            .map(|ip| ip.is_loopback())
            .unwrap_or(false),
        None => false,
    }
}

/// Orchestrates one conversation: session bootstrap, the turn protocol,
/// recording toggle, and termination/reset flow.
///
/// Interior state is shared and atomic/mutexed so methods take `&self`; the
/// `waiting` flag is the UI lock: exactly one dialogue round trip may be
/// outstanding, and a second submission attempt while it is set is dropped.
pub struct ChatController {
    api: Arc<dyn CounselBackend>,
    view: Arc<dyn ChatView>,
    playback: Arc<dyn Playback>,
    sessions: SessionStore,
    config: ChatConfig,
    /// Capture allowed against this backend (TLS or loopback)
    capture_allowed: bool,

    recorder: Mutex<Recorder>,
    tts: Mutex<TtsCache>,
    transcript: Mutex<Vec<TranscriptEntry>>,
    session_id: Mutex<Option<String>>,

    /// The UI lock: a dialogue round trip is outstanding
    waiting: AtomicBool,
    /// The conversation has been ended by the service
    ended: AtomicBool,
}

impl ChatController {
    pub fn new(
        api: Arc<dyn CounselBackend>,
        view: Arc<dyn ChatView>,
        playback: Arc<dyn Playback>,
        recorder: Recorder,
        sessions: SessionStore,
        config: ChatConfig,
        capture_allowed: bool,
    ) -> Self {
        Self {
            api,
            view,
            playback,
            sessions,
            config,
            capture_allowed,
            recorder: Mutex::new(recorder),
            tts: Mutex::new(TtsCache::new()),
            transcript: Mutex::new(Vec::new()),
            session_id: Mutex::new(None),
            waiting: AtomicBool::new(false),
            ended: AtomicBool::new(false),
        }
    }

    /// Session bootstrap: obtain or create the session identifier, prefill
    /// the input with the service's default message, and render the local
    /// greeting when the service reports ready.
    ///
    /// The greeting never issues a dialogue turn; whether it is also spoken
    /// is a configuration choice (`chat.speak_greeting`).
    pub async fn init(&self) -> ClientResult<()> {
        let id = self.sessions.get_or_create(self.api.as_ref()).await?;
        info!("session {}", id);
        *self.session_id.lock().await = Some(id);

        let prefill = self.api.default_message().await?;
        self.view.set_input(&prefill);
        self.view.set_placeholder(&self.config.input_placeholder);

        if self.api.status().await? {
            self.push_bot(&self.config.greeting, false).await;
            if self.config.speak_greeting {
                let mut tts = self.tts.lock().await;
                tts.speak(&self.config.greeting, self.api.as_ref(), self.playback.as_ref())
                    .await;
            }
        }

        Ok(())
    }

    /// Submit the current input as one dialogue turn.
    ///
    /// Returns whether a request was actually issued; empty input, a held UI
    /// lock, or an ended conversation make this a no-op. The no-op path is
    /// the reentrancy guard and also absorbs key-repeat resubmissions.
    pub async fn send_turn(&self) -> bool {
        if self.ended.load(Ordering::SeqCst) {
            return false;
        }
        let message = self.view.input_text().trim().to_string();
        if message.is_empty() {
            return false;
        }
        // Acquire the UI lock; a raced second submission loses and is dropped.
        if self.waiting.swap(true, Ordering::SeqCst) {
            return false;
        }

        self.view.set_locked(true);
        self.push_user(&message).await;
        self.view.show_typing();

        // Clear the input without waiting for the response.
        self.view.set_input("");
        self.view.set_placeholder(&self.config.input_placeholder);

        let session_id = self.session_id.lock().await.clone().unwrap_or_default();

        match self.api.chat(&session_id, &message).await {
            Ok(reply) => {
                self.view.clear_typing();
                self.push_bot(&reply.system_utterance, reply.end_signal).await;
                {
                    let mut tts = self.tts.lock().await;
                    tts.speak(
                        &reply.system_utterance,
                        self.api.as_ref(),
                        self.playback.as_ref(),
                    )
                    .await;
                }

                if reply.end_signal {
                    // The lock stays held: controls remain disabled for good.
                    self.ended.store(true, Ordering::SeqCst);
                    self.view.set_placeholder(&self.config.ended_placeholder);
                    self.view.show_restart();
                    info!("conversation ended by the service");
                } else {
                    self.waiting.store(false, Ordering::SeqCst);
                    self.view.set_locked(false);
                    self.view.focus_input();
                }
            }
            Err(e) => {
                warn!("dialogue request failed: {}", e);
                self.view.clear_typing();
                self.push_error().await;
                // Conversation is not terminated; the user may retry.
                self.waiting.store(false, Ordering::SeqCst);
                self.view.set_locked(false);
            }
        }

        true
    }

    /// Toggle voice recording. Starting clears the current input (unless the
    /// controls are disabled mid-turn); stopping uploads the clip and, when a
    /// transcript comes back, fills the input with it. Never auto-submits.
    pub async fn toggle_recording(&self) {
        let mut recorder = self.recorder.lock().await;

        if !recorder.is_recording() && !self.capture_allowed {
            self.view
                .alert("microphone requires a secure backend connection (https or localhost)");
            return;
        }

        if !recorder.is_recording() {
            let locked =
                self.waiting.load(Ordering::SeqCst) || self.ended.load(Ordering::SeqCst);
            if !locked {
                // A fresh transcript must not concatenate with stale text.
                self.view.set_input("");
            }
        }

        match recorder.toggle().await {
            Ok(RecorderToggle::Started) => {
                self.view.set_recording(true);
                self.view.set_placeholder(&self.config.listening_placeholder);
            }
            Ok(RecorderToggle::Stopped(clip)) => {
                self.view.set_recording(false);
                self.view.set_placeholder(&self.config.input_placeholder);
                match self.api.speech_to_text(clip.wav).await {
                    Ok(transcript) if !transcript.is_empty() => {
                        self.view.set_input(&transcript);
                    }
                    Ok(_) => {}
                    Err(e) => {
                        // Input stays untouched on failure.
                        warn!("transcription failed: {}", e);
                    }
                }
            }
            Err(e) => {
                warn!("recording toggle failed: {}", e);
                self.view.set_recording(false);
                self.view.alert(&e.to_string());
            }
        }
    }

    /// Clear the persisted session and rebuild client state from scratch,
    /// the native equivalent of a page reload.
    pub async fn reset(&self) -> ClientResult<()> {
        self.sessions.reset()?;

        {
            let mut recorder = self.recorder.lock().await;
            let _ = recorder.stop().await;
        }
        self.transcript.lock().await.clear();
        *self.session_id.lock().await = None;
        self.waiting.store(false, Ordering::SeqCst);
        self.ended.store(false, Ordering::SeqCst);
        self.view.set_recording(false);
        self.view.set_locked(false);
        self.view.clear();

        self.init().await
    }

    pub fn is_waiting(&self) -> bool {
        self.waiting.load(Ordering::SeqCst)
    }

    pub fn is_ended(&self) -> bool {
        self.ended.load(Ordering::SeqCst)
    }

    pub async fn session_id(&self) -> Option<String> {
        self.session_id.lock().await.clone()
    }

    /// Snapshot of the transcript, oldest entry first.
    pub async fn transcript(&self) -> Vec<TranscriptEntry> {
        self.transcript.lock().await.clone()
    }

    async fn push_user(&self, text: &str) {
        self.transcript
            .lock()
            .await
            .push(TranscriptEntry::user(text));
        self.view.render_user_turn(text);
    }

    async fn push_bot(&self, text: &str, end_of_conversation: bool) {
        self.transcript
            .lock()
            .await
            .push(TranscriptEntry::bot(text, end_of_conversation));
        self.view.render_bot_turn(text);
    }

    async fn push_error(&self) {
        self.transcript.lock().await.push(TranscriptEntry::error());
        self.view.render_turn_error();
    }
}
