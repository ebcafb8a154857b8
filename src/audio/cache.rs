use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use super::playback::Playback;
use crate::api::{CounselBackend, SpeechAudio};

/// Maps synthesized-speech text to replayable audio bytes.
///
/// Keyed by exact utterance text; one entry per distinct string, kept for the
/// process lifetime and never invalidated (the same text always synthesizes
/// to equivalent audio). No eviction: conversations are bounded. There is no
/// single-flight guarantee, since duplicate synthesis is benign.
pub struct TtsCache {
    entries: HashMap<String, Arc<SpeechAudio>>,
}

impl TtsCache {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Play synthesized speech for `text`, reusing the cached audio when
    /// available. Empty/whitespace text is a no-op. Failures are logged and
    /// swallowed: audio is a non-critical enhancement to a turn whose text is
    /// already rendered.
    pub async fn speak(&mut self, text: &str, api: &dyn CounselBackend, out: &dyn Playback) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }

        if let Some(audio) = self.entries.get(text) {
            debug!("tts cache hit ({} bytes)", audio.bytes.len());
            if let Err(e) = out.play(audio) {
                warn!("speech playback failed: {}", e);
            }
            return;
        }

        match api.synthesize(text).await {
            Ok(audio) => {
                let audio = Arc::new(audio);
                self.entries.insert(text.to_string(), Arc::clone(&audio));
                if let Err(e) = out.play(&audio) {
                    warn!("speech playback failed: {}", e);
                }
            }
            Err(e) => {
                warn!("speech synthesis failed: {}", e);
            }
        }
    }
}

impl Default for TtsCache {
    fn default() -> Self {
        Self::new()
    }
}
