use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleRate, StreamConfig};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::error::{ClientError, ClientResult};

/// PCM captured from the microphone (16-bit, interleaved)
#[derive(Debug, Clone)]
pub struct AudioFrame {
    pub samples: Vec<i16>,
    pub sample_rate: u32,
    pub channels: u16,
}

/// Configuration for a capture backend
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    pub sample_rate: u32,
    pub channels: u16,
    /// Input device name; `None` selects the default device
    pub device: Option<String>,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            sample_rate: 16000,
            channels: 1,
            device: None,
        }
    }
}

/// Microphone capture backend trait
///
/// The shipped implementation is [`CpalBackend`]; tests inject scripted
/// backends to drive the recorder state machine without a device.
#[async_trait]
pub trait CaptureBackend: Send + Sync {
    /// Start capturing. Returns a receiver of audio frames; the channel
    /// closes once capture has fully stopped.
    async fn start(&mut self) -> ClientResult<mpsc::Receiver<AudioFrame>>;

    /// Stop capturing and release the device handle.
    async fn stop(&mut self) -> ClientResult<()>;

    /// Whether the backend is currently capturing.
    fn is_capturing(&self) -> bool;

    /// Backend name for logging.
    fn name(&self) -> &str;
}

/// cpal microphone backend.
///
/// The stream lives on a dedicated thread (cpal streams are !Send on some
/// platforms) and is dropped when the stop signal arrives.
pub struct CpalBackend {
    config: CaptureConfig,
    stop_tx: Option<std::sync::mpsc::Sender<()>>,
}

impl CpalBackend {
    pub fn new(config: CaptureConfig) -> Self {
        Self {
            config,
            stop_tx: None,
        }
    }

    fn build_stream(
        config: &CaptureConfig,
        frame_tx: mpsc::Sender<AudioFrame>,
    ) -> ClientResult<cpal::Stream> {
        let host = cpal::default_host();

        let device = match &config.device {
            Some(name) => host
                .input_devices()?
                .find(|d| d.name().map(|n| n == *name).unwrap_or(false))
                .ok_or_else(|| {
                    ClientError::Permission(format!("input device '{}' not found", name))
                })?,
            None => host
                .default_input_device()
                .ok_or_else(|| ClientError::Permission("no input device available".to_string()))?,
        };

        info!(
            "capturing from input device: {}",
            device.name().unwrap_or_else(|_| "unknown".to_string())
        );

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let sample_rate = config.sample_rate;
        let channels = config.channels;

        let stream = device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                let samples: Vec<i16> = data
                    .iter()
                    .map(|&s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
                    .collect();
                let frame = AudioFrame {
                    samples,
                    sample_rate,
                    channels,
                };
                if frame_tx.try_send(frame).is_err() {
                    warn!("dropping audio frame: recorder not draining");
                }
            },
            move |err| {
                warn!("audio stream error: {}", err);
            },
            None,
        )?;

        stream.play()?;
        Ok(stream)
    }
}

#[async_trait]
impl CaptureBackend for CpalBackend {
    async fn start(&mut self) -> ClientResult<mpsc::Receiver<AudioFrame>> {
        if self.stop_tx.is_some() {
            return Err(ClientError::Permission(
                "capture already active".to_string(),
            ));
        }

        let (frame_tx, frame_rx) = mpsc::channel(64);
        let (stop_tx, stop_rx) = std::sync::mpsc::channel::<()>();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<ClientResult<()>>();
        let config = self.config.clone();

        // The stream must be created and dropped on the same thread. The
        // frame sender moves into the stream callback, so the channel closes
        // once the stream is dropped.
        std::thread::spawn(move || match Self::build_stream(&config, frame_tx) {
            Ok(stream) => {
                let _ = ready_tx.send(Ok(()));
                // Blocks until stop() sends or the backend is dropped.
                let _ = stop_rx.recv();
                drop(stream);
            }
            Err(e) => {
                let _ = ready_tx.send(Err(e));
            }
        });

        let ready = tokio::task::spawn_blocking(move || ready_rx.recv())
            .await
            .map_err(|e| ClientError::Permission(e.to_string()))?
            .map_err(|_| ClientError::Permission("capture thread exited".to_string()))?;
        ready?;

        self.stop_tx = Some(stop_tx);
        Ok(frame_rx)
    }

    async fn stop(&mut self) -> ClientResult<()> {
        if let Some(stop_tx) = self.stop_tx.take() {
            // Ignore a send failure: the capture thread is already gone.
            let _ = stop_tx.send(());
        }
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.stop_tx.is_some()
    }

    fn name(&self) -> &str {
        "cpal"
    }
}
