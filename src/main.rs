use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use counsel_chat::{
    secure_capture_context, CaptureConfig, ChatController, Config, CpalBackend, HttpBackend,
    Recorder, RodioPlayer, SessionStore,
};
use counsel_chat::chat::{ChatView, ConsoleView};

#[derive(Parser)]
#[command(name = "counsel-chat")]
#[command(about = "Terminal client for the counseling dialogue service")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Override the backend base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Speak the bootstrap greeting as well
    #[arg(long)]
    speak_greeting: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut cfg = Config::load(args.config.as_deref())?;
    if let Some(base_url) = args.base_url {
        cfg.backend.base_url = base_url;
    }
    if args.speak_greeting {
        cfg.chat.speak_greeting = true;
    }

    let api = Arc::new(HttpBackend::new(
        cfg.backend.base_url.clone(),
        Duration::from_secs(cfg.backend.request_timeout_secs),
    )?);

    let view = Arc::new(ConsoleView::new());

    let playback: Arc<dyn counsel_chat::Playback> = match RodioPlayer::new() {
        Ok(player) => Arc::new(player),
        Err(e) => {
            warn!("audio output unavailable, replies will be text-only: {}", e);
            Arc::new(SilentPlayback)
        }
    };

    let capture = CpalBackend::new(CaptureConfig {
        sample_rate: cfg.audio.sample_rate,
        channels: cfg.audio.channels,
        device: if cfg.audio.input_device.is_empty() {
            None
        } else {
            Some(cfg.audio.input_device.clone())
        },
    });
    let recorder = Recorder::new(Box::new(capture), cfg.audio.sample_rate, cfg.audio.channels);

    let sessions = SessionStore::new(cfg.state_dir());
    let capture_allowed = secure_capture_context(&cfg.backend.base_url);

    let controller = ChatController::new(
        api,
        view.clone(),
        playback,
        recorder,
        sessions,
        cfg.chat.clone(),
        capture_allowed,
    );

    controller.init().await?;

    println!("commands: :record toggles the microphone, :reset restarts, :quit exits");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            ":quit" => break,
            ":record" => controller.toggle_recording().await,
            ":reset" => {
                if let Err(e) = controller.reset().await {
                    eprintln!("reset failed: {}", e);
                }
            }
            "" => {
                // Enter on an empty line submits whatever a recording filled in.
                controller.send_turn().await;
            }
            text => {
                view.set_input(text);
                controller.send_turn().await;
            }
        }
    }

    Ok(())
}

/// Fallback when no output device exists; keeps the chat usable text-only.
struct SilentPlayback;

impl counsel_chat::Playback for SilentPlayback {
    fn play(&self, _audio: &counsel_chat::SpeechAudio) -> counsel_chat::ClientResult<()> {
        Ok(())
    }
}
