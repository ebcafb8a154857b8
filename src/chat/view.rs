use std::sync::Mutex;

/// Presentation seam for the chat controller.
///
/// The controller drives all rendering and input state through this trait,
/// which keeps the turn protocol headless-testable. The binary ships
/// [`ConsoleView`]; tests use a recording implementation.
pub trait ChatView: Send + Sync {
    fn render_user_turn(&self, text: &str);
    fn render_bot_turn(&self, text: &str);

    /// Show the transient "bot is composing" placeholder.
    fn show_typing(&self);
    /// Remove the composing placeholder (reply or error has arrived).
    fn clear_typing(&self);
    /// Replace the composing placeholder with a visible error marker.
    fn render_turn_error(&self);

    /// Disable or re-enable the input and submit controls.
    fn set_locked(&self, locked: bool);
    /// Recording-state visual indicator.
    fn set_recording(&self, recording: bool);

    fn set_input(&self, text: &str);
    fn input_text(&self) -> String;
    fn set_placeholder(&self, text: &str);
    fn focus_input(&self);

    /// Reveal the restart affordance after conversation end.
    fn show_restart(&self);
    /// Blocking notice the user cannot miss (e.g. microphone unavailable).
    fn alert(&self, message: &str);
    /// Wipe all rendered state; used by reset.
    fn clear(&self);
}

/// Terminal rendering of the chat.
///
/// The "input field" is a line buffer the main loop fills from stdin before
/// invoking the controller, mirroring how the controller would read a text
/// box in a graphical surface.
pub struct ConsoleView {
    input: Mutex<String>,
    placeholder: Mutex<String>,
}

impl ConsoleView {
    pub fn new() -> Self {
        Self {
            input: Mutex::new(String::new()),
            placeholder: Mutex::new(String::new()),
        }
    }

    pub fn placeholder(&self) -> String {
        self.placeholder.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl Default for ConsoleView {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatView for ConsoleView {
    fn render_user_turn(&self, text: &str) {
        println!("You: {}", text);
    }

    fn render_bot_turn(&self, text: &str) {
        println!("Bot: {}", text);
    }

    fn show_typing(&self) {
        println!("Bot is typing...");
    }

    fn clear_typing(&self) {}

    fn render_turn_error(&self) {
        println!("[error] the message could not be delivered; please try again");
    }

    fn set_locked(&self, _locked: bool) {}

    fn set_recording(&self, recording: bool) {
        if recording {
            println!("[recording] microphone is live; toggle again to stop");
        } else {
            println!("[recording] stopped");
        }
    }

    fn set_input(&self, text: &str) {
        if let Ok(mut input) = self.input.lock() {
            *input = text.to_string();
        }
        if !text.is_empty() {
            println!("> {}", text);
        }
    }

    fn input_text(&self) -> String {
        self.input.lock().map(|i| i.clone()).unwrap_or_default()
    }

    fn set_placeholder(&self, text: &str) {
        if let Ok(mut placeholder) = self.placeholder.lock() {
            *placeholder = text.to_string();
        }
    }

    fn focus_input(&self) {}

    fn show_restart(&self) {
        println!("(conversation ended; type :reset to start over)");
    }

    fn alert(&self, message: &str) {
        eprintln!("!! {}", message);
    }

    fn clear(&self) {
        println!("----------------------------------------");
    }
}
