use rodio::{OutputStream, Sink, Source};
use std::io::Cursor;

use crate::api::SpeechAudio;
use crate::error::{ClientError, ClientResult};

/// Audio output seam. The shipped implementation is [`RodioPlayer`]; tests
/// substitute a counting fake.
pub trait Playback: Send + Sync {
    /// Queue the given audio for playback. Returns once queued, not once
    /// audible; playback proceeds in the background.
    fn play(&self, audio: &SpeechAudio) -> ClientResult<()>;
}

/// Plays synthesized speech through the default output device.
///
/// The output stream lives on a dedicated thread (rodio's `OutputStream` is
/// !Send) and is dropped when the player is dropped; the sink itself is
/// Send + Sync and lives here.
pub struct RodioPlayer {
    sink: Sink,
    _stop_tx: std::sync::mpsc::Sender<()>,
}

impl RodioPlayer {
    pub fn new() -> ClientResult<Self> {
        let (ready_tx, ready_rx) = std::sync::mpsc::channel::<ClientResult<Sink>>();
        let (stop_tx, stop_rx) = std::sync::mpsc::channel::<()>();

        // The stream must be created and dropped on the same thread.
        std::thread::spawn(move || {
            let built = OutputStream::try_default()
                .map_err(|e| ClientError::Playback(e.to_string()))
                .and_then(|(stream, stream_handle)| {
                    Sink::try_new(&stream_handle)
                        .map(|sink| (stream, stream_handle, sink))
                        .map_err(|e| ClientError::Playback(e.to_string()))
                });
            match built {
                Ok((stream, stream_handle, sink)) => {
                    let _ = ready_tx.send(Ok(sink));
                    // Blocks until the player is dropped, keeping the stream
                    // alive while queued audio plays in the background.
                    let _ = stop_rx.recv();
                    drop((stream, stream_handle));
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            }
        });

        let sink = ready_rx
            .recv()
            .map_err(|_| ClientError::Playback("playback thread exited".to_string()))??;
        Ok(Self {
            sink,
            _stop_tx: stop_tx,
        })
    }

    /// Whether the sink currently has queued samples.
    pub fn is_playing(&self) -> bool {
        !self.sink.empty()
    }
}

impl Playback for RodioPlayer {
    fn play(&self, audio: &SpeechAudio) -> ClientResult<()> {
        if audio.bytes.is_empty() {
            return Ok(());
        }
        // The decoder sniffs the container itself; the reported mime is only
        // for diagnostics.
        let cursor = Cursor::new(audio.bytes.clone());
        let source = rodio::Decoder::new(cursor)
            .map_err(|e| ClientError::Playback(format!("decode failed ({}): {}", audio.mime, e)))?;
        self.sink.append(source.convert_samples::<f32>());
        Ok(())
    }
}
