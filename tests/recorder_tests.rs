// Recorder state machine tests: idle/recording transitions, no-op stops,
// and WAV finalization of the captured frames.

use async_trait::async_trait;
use std::io::Cursor;

use counsel_chat::audio::{AudioFrame, CaptureBackend, Recorder, RecorderToggle};
use counsel_chat::error::{ClientError, ClientResult};

struct FakeCapture {
    frames_per_start: Vec<AudioFrame>,
    capturing: bool,
    starts: usize,
}

impl FakeCapture {
    fn new(frames_per_start: Vec<AudioFrame>) -> Self {
        Self {
            frames_per_start,
            capturing: false,
            starts: 0,
        }
    }
}

#[async_trait]
impl CaptureBackend for FakeCapture {
    async fn start(&mut self) -> ClientResult<tokio::sync::mpsc::Receiver<AudioFrame>> {
        let (tx, rx) = tokio::sync::mpsc::channel(64);
        for frame in &self.frames_per_start {
            tx.try_send(frame.clone()).unwrap();
        }
        self.capturing = true;
        self.starts += 1;
        Ok(rx)
    }

    async fn stop(&mut self) -> ClientResult<()> {
        self.capturing = false;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing
    }

    fn name(&self) -> &str {
        "fake"
    }
}

struct DeniedCapture;

#[async_trait]
impl CaptureBackend for DeniedCapture {
    async fn start(&mut self) -> ClientResult<tokio::sync::mpsc::Receiver<AudioFrame>> {
        Err(ClientError::Permission("no input device available".to_string()))
    }

    async fn stop(&mut self) -> ClientResult<()> {
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "denied"
    }
}

fn tone_frames() -> Vec<AudioFrame> {
    vec![
        AudioFrame {
            samples: vec![100; 800],
            sample_rate: 16000,
            channels: 1,
        },
        AudioFrame {
            samples: vec![-100; 800],
            sample_rate: 16000,
            channels: 1,
        },
    ]
}

// stop() in the idle state is a no-op and emits no clip.
#[tokio::test]
async fn stop_while_idle_emits_nothing() {
    let mut recorder = Recorder::new(Box::new(FakeCapture::new(tone_frames())), 16000, 1);

    assert!(!recorder.is_recording());
    let clip = recorder.stop().await.unwrap();
    assert!(clip.is_none());
    assert!(!recorder.is_recording());
}

#[tokio::test]
async fn toggle_cycles_idle_recording_idle() {
    let mut recorder = Recorder::new(Box::new(FakeCapture::new(tone_frames())), 16000, 1);

    match recorder.toggle().await.unwrap() {
        RecorderToggle::Started => {}
        other => panic!("expected start, got {:?}", other),
    }
    assert!(recorder.is_recording());

    match recorder.toggle().await.unwrap() {
        RecorderToggle::Stopped(clip) => {
            assert!(!clip.wav.is_empty());
            assert_eq!(clip.sample_rate, 16000);
            assert_eq!(clip.channels, 1);
            // 1600 samples at 16kHz mono.
            assert_eq!(clip.duration_ms, 100);
        }
        other => panic!("expected stop, got {:?}", other),
    }
    assert!(!recorder.is_recording());
}

#[tokio::test]
async fn finished_clip_decodes_to_captured_samples() {
    let mut recorder = Recorder::new(Box::new(FakeCapture::new(tone_frames())), 16000, 1);

    recorder.start().await.unwrap();
    let clip = recorder.stop().await.unwrap().expect("clip from active recording");

    let mut reader = hound::WavReader::new(Cursor::new(clip.wav)).unwrap();
    let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
    assert_eq!(samples.len(), 1600);
    assert_eq!(samples[0], 100);
    assert_eq!(samples[1599], -100);
}

#[tokio::test]
async fn restart_after_stop_produces_a_fresh_clip() {
    let mut recorder = Recorder::new(Box::new(FakeCapture::new(tone_frames())), 16000, 1);

    recorder.start().await.unwrap();
    let first = recorder.stop().await.unwrap().unwrap();

    // Immediately toggling again must not panic and yields a fresh recording.
    recorder.start().await.unwrap();
    let second = recorder.stop().await.unwrap().unwrap();

    assert_eq!(first.duration_ms, second.duration_ms);
    assert_eq!(first.wav, second.wav);
}

#[tokio::test]
async fn double_start_is_a_noop() {
    let mut recorder = Recorder::new(Box::new(FakeCapture::new(tone_frames())), 16000, 1);

    recorder.start().await.unwrap();
    recorder.start().await.unwrap();
    assert!(recorder.is_recording());

    let clip = recorder.stop().await.unwrap().unwrap();
    // Frames were delivered once; the second start did not restart capture.
    assert_eq!(clip.duration_ms, 100);
}

#[tokio::test]
async fn denied_capture_surfaces_permission_error() {
    let mut recorder = Recorder::new(Box::new(DeniedCapture), 16000, 1);

    let err = recorder.start().await.unwrap_err();
    assert!(matches!(err, ClientError::Permission(_)));
    assert!(!recorder.is_recording());
}

#[tokio::test]
async fn stop_with_no_frames_yields_empty_valid_wav() {
    let mut recorder = Recorder::new(Box::new(FakeCapture::new(Vec::new())), 16000, 1);

    recorder.start().await.unwrap();
    let clip = recorder.stop().await.unwrap().unwrap();

    let reader = hound::WavReader::new(Cursor::new(clip.wav)).unwrap();
    assert_eq!(reader.len(), 0);
    assert_eq!(clip.duration_ms, 0);
}
