use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a transcript turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    User,
    Bot,
}

/// One rendered transcript line.
///
/// Entries are append-only: created when a turn is submitted or resolved and
/// never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TranscriptEntry {
    Turn {
        role: Role,
        text: String,
        timestamp: DateTime<Utc>,
        /// True on the bot turn that ended the conversation
        end_of_conversation: bool,
    },
    /// Marker left in place of a bot reply when the dialogue request failed
    Error { timestamp: DateTime<Utc> },
}

impl TranscriptEntry {
    pub fn user(text: impl Into<String>) -> Self {
        Self::Turn {
            role: Role::User,
            text: text.into(),
            timestamp: Utc::now(),
            end_of_conversation: false,
        }
    }

    pub fn bot(text: impl Into<String>, end_of_conversation: bool) -> Self {
        Self::Turn {
            role: Role::Bot,
            text: text.into(),
            timestamp: Utc::now(),
            end_of_conversation,
        }
    }

    pub fn error() -> Self {
        Self::Error {
            timestamp: Utc::now(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    pub fn role(&self) -> Option<Role> {
        match self {
            Self::Turn { role, .. } => Some(*role),
            Self::Error { .. } => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Turn { text, .. } => Some(text),
            Self::Error { .. } => None,
        }
    }
}
