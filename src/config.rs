use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub backend: BackendConfig,
    pub audio: AudioConfig,
    pub chat: ChatConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BackendConfig {
    /// Base URL of the counseling service (e.g. http://127.0.0.1:8000)
    pub base_url: String,
    /// Client-wide request timeout; bounds a hung dialogue request so the
    /// turn lock cannot be held forever by a dead transport
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Input device name; empty selects the default device
    pub input_device: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatConfig {
    /// Local bot greeting rendered when the backend reports ready
    pub greeting: String,
    /// Whether the bootstrap greeting is also synthesized and played
    pub speak_greeting: bool,
    pub input_placeholder: String,
    pub listening_placeholder: String,
    /// Placeholder shown once the conversation has ended
    pub ended_placeholder: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory for the persisted session identifier; empty selects the
    /// platform state directory
    pub state_dir: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendConfig {
                base_url: "http://127.0.0.1:8000".to_string(),
                request_timeout_secs: 30,
            },
            audio: AudioConfig {
                sample_rate: 16000,
                channels: 1,
                input_device: String::new(),
            },
            chat: ChatConfig {
                greeting: "Hello, this is panic emergency support. How can I help you?"
                    .to_string(),
                speak_greeting: false,
                input_placeholder: "Type your message...".to_string(),
                listening_placeholder: "Listening...".to_string(),
                ended_placeholder: "The counseling session has ended.".to_string(),
            },
            storage: StorageConfig {
                state_dir: String::new(),
            },
        }
    }
}

impl Config {
    /// Load configuration, layering an optional TOML file over the defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let defaults = Config::default();

        let mut builder = config::Config::builder()
            .set_default("backend.base_url", defaults.backend.base_url)?
            .set_default(
                "backend.request_timeout_secs",
                defaults.backend.request_timeout_secs as i64,
            )?
            .set_default("audio.sample_rate", defaults.audio.sample_rate as i64)?
            .set_default("audio.channels", defaults.audio.channels as i64)?
            .set_default("audio.input_device", defaults.audio.input_device)?
            .set_default("chat.greeting", defaults.chat.greeting)?
            .set_default("chat.speak_greeting", defaults.chat.speak_greeting)?
            .set_default("chat.input_placeholder", defaults.chat.input_placeholder)?
            .set_default(
                "chat.listening_placeholder",
                defaults.chat.listening_placeholder,
            )?
            .set_default("chat.ended_placeholder", defaults.chat.ended_placeholder)?
            .set_default("storage.state_dir", defaults.storage.state_dir)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path));
        }

        Ok(builder.build()?.try_deserialize()?)
    }

    /// Resolved state directory for persisted client state.
    pub fn state_dir(&self) -> PathBuf {
        if !self.storage.state_dir.is_empty() {
            return PathBuf::from(&self.storage.state_dir);
        }
        dirs::state_dir()
            .or_else(dirs::data_local_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("counsel-chat")
    }
}
