pub mod controller;
pub mod transcript;
pub mod view;

pub use controller::{secure_capture_context, ChatController};
pub use transcript::{Role, TranscriptEntry};
pub use view::{ChatView, ConsoleView};
