pub mod cache;
pub mod capture;
pub mod playback;
pub mod recorder;

pub use cache::TtsCache;
pub use capture::{AudioFrame, CaptureBackend, CaptureConfig, CpalBackend};
pub use playback::{Playback, RodioPlayer};
pub use recorder::{Recorder, RecorderToggle, RecordingClip};
