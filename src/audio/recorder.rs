use std::io::Cursor;
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::capture::{AudioFrame, CaptureBackend};
use crate::error::ClientResult;

/// A finished recording, encoded as 16-bit PCM WAV for upload.
#[derive(Debug, Clone)]
pub struct RecordingClip {
    pub wav: Vec<u8>,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_ms: u64,
}

/// Outcome of a [`Recorder::toggle`] call.
#[derive(Debug)]
pub enum RecorderToggle {
    /// Capture has started
    Started,
    /// Capture has stopped, yielding the finished clip
    Stopped(RecordingClip),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RecorderState {
    Idle,
    Recording,
}

/// Wraps a capture backend into a start/stop state machine producing a
/// finished WAV clip.
///
/// `idle --start--> recording --stop--> idle`; stop drains buffered frames
/// into one clip before returning to idle. Invalid transitions are no-ops,
/// not errors, so a stale key press can never wedge the machine.
pub struct Recorder {
    backend: Box<dyn CaptureBackend>,
    state: RecorderState,
    frames: Option<mpsc::Receiver<AudioFrame>>,
    sample_rate: u32,
    channels: u16,
}

impl Recorder {
    pub fn new(backend: Box<dyn CaptureBackend>, sample_rate: u32, channels: u16) -> Self {
        Self {
            backend,
            state: RecorderState::Idle,
            frames: None,
            sample_rate,
            channels,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.state == RecorderState::Recording
    }

    /// Start capturing. No-op when already recording. Clears any stale
    /// buffered frames from a previous recording before the fresh start.
    pub async fn start(&mut self) -> ClientResult<()> {
        if self.state == RecorderState::Recording {
            warn!("recording already active");
            return Ok(());
        }

        self.frames = None;
        let rx = self.backend.start().await?;
        self.frames = Some(rx);
        self.state = RecorderState::Recording;
        info!("recording started ({})", self.backend.name());
        Ok(())
    }

    /// Stop capturing and finalize the clip. Returns `None` (no clip emitted)
    /// when called while idle.
    pub async fn stop(&mut self) -> ClientResult<Option<RecordingClip>> {
        if self.state == RecorderState::Idle {
            return Ok(None);
        }

        self.backend.stop().await?;
        self.state = RecorderState::Idle;

        let mut samples: Vec<i16> = Vec::new();
        let mut sample_rate = self.sample_rate;
        let mut channels = self.channels;

        if let Some(mut rx) = self.frames.take() {
            // The channel closes once the capture handle is released, so this
            // drains every frame that was in flight at stop time.
            while let Some(frame) = rx.recv().await {
                sample_rate = frame.sample_rate;
                channels = frame.channels;
                samples.extend_from_slice(&frame.samples);
            }
        }

        let clip = encode_wav(&samples, sample_rate, channels)?;
        info!(
            "recording stopped: {} samples (~{}ms)",
            samples.len(),
            clip.duration_ms
        );
        Ok(Some(clip))
    }

    /// The single externally driven entry point: idle starts a recording,
    /// recording stops one.
    pub async fn toggle(&mut self) -> ClientResult<RecorderToggle> {
        match self.state {
            RecorderState::Idle => {
                self.start().await?;
                Ok(RecorderToggle::Started)
            }
            RecorderState::Recording => match self.stop().await? {
                Some(clip) => Ok(RecorderToggle::Stopped(clip)),
                // stop() from the recording state always yields a clip.
                None => Err(crate::error::ClientError::Permission(
                    "recorder stopped without a clip".to_string(),
                )),
            },
        }
    }
}

fn encode_wav(samples: &[i16], sample_rate: u32, channels: u16) -> ClientResult<RecordingClip> {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let wav_err =
        |e: hound::Error| crate::error::ClientError::Io(std::io::Error::other(e.to_string()));

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(wav_err)?;
        for &sample in samples {
            writer.write_sample(sample).map_err(wav_err)?;
        }
        writer.finalize().map_err(wav_err)?;
    }

    let frames = samples.len() as u64 / channels.max(1) as u64;
    Ok(RecordingClip {
        wav: cursor.into_inner(),
        sample_rate,
        channels,
        duration_ms: frames * 1000 / sample_rate.max(1) as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_wav_produces_valid_header() {
        let samples: Vec<i16> = vec![0; 1600];
        let clip = encode_wav(&samples, 16000, 1).unwrap();

        let reader = hound::WavReader::new(Cursor::new(clip.wav.clone())).unwrap();
        assert_eq!(reader.spec().sample_rate, 16000);
        assert_eq!(reader.spec().channels, 1);
        assert_eq!(reader.len(), 1600);
        assert_eq!(clip.duration_ms, 100);
    }

    #[test]
    fn empty_clip_is_still_valid_wav() {
        let clip = encode_wav(&[], 16000, 1).unwrap();
        let reader = hound::WavReader::new(Cursor::new(clip.wav)).unwrap();
        assert_eq!(reader.len(), 0);
    }
}
