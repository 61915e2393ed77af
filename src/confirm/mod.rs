//! Confirmation channel - how pending intents and their outcomes reach the user.
//!
//! A channel receives a [`ConfirmationPrompt`] when an intent is armed. The
//! prompt exposes exactly two actions, Undo and Confirm, which resolve the
//! underlying [`PendingHandle`]. Doing nothing is the third outcome: the
//! scheduler's window runs out and the intent commits.
//!
//! After resolution the flow reports the outcome through
//! [`ConfirmationChannel::notify`] - one notice per intent.
//!
//! Channels hold no domain state. Implementations provided:
//!
//! - [`RecordingChannel`] - keeps prompts and notices in memory (tests, headless use)
//! - [`TracingChannel`] - logs through `tracing`; prompts are left to time out
//! - [`EmitterChannel`] - fans out to `event-emitter-rs` listeners (feature `emitter`)

#[cfg(feature = "emitter")]
mod emitter;
mod recording;
mod tracing_channel;

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::intent::{IntentId, IntentKind};
use crate::scheduler::{PendingHandle, Resolution};

#[cfg(feature = "emitter")]
pub use emitter::{EmitterChannel, PromptView, NOTICE_EVENT, PROMPT_EVENT};
pub use recording::RecordingChannel;
pub use tracing_channel::TracingChannel;

/// Surface for pending intents and their outcomes.
pub trait ConfirmationChannel: Send + Sync + 'static {
    /// Show Undo / Confirm for a freshly armed intent.
    fn present(&self, prompt: ConfirmationPrompt);

    /// Report an outcome (cancelled, done, or failed).
    fn notify(&self, notice: Notice);
}

/// A pending intent as shown to the user.
#[derive(Debug, Clone)]
pub struct ConfirmationPrompt {
    handle: PendingHandle,
    message: String,
    window: Duration,
}

impl ConfirmationPrompt {
    pub fn new(handle: PendingHandle, message: impl Into<String>, window: Duration) -> Self {
        Self {
            handle,
            message: message.into(),
            window,
        }
    }

    pub fn intent_id(&self) -> IntentId {
        self.handle.id()
    }

    pub fn kind(&self) -> IntentKind {
        self.handle.kind()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// How long the prompt stays up before the intent commits on its own.
    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn handle(&self) -> &PendingHandle {
        &self.handle
    }

    /// The "Undo" button.
    pub fn undo(&self) -> Resolution {
        self.handle.undo()
    }

    /// The "Confirm" button.
    pub fn confirm(&self) -> Resolution {
        self.handle.confirm()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

/// Outcome message for a resolved intent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub intent: Option<IntentId>,
    pub level: NoticeLevel,
    pub message: String,
    /// `None` leaves dismissal to the channel's default.
    pub auto_close: Option<Duration>,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            intent: None,
            level,
            message: message.into(),
            auto_close: None,
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }

    pub fn for_intent(mut self, intent: IntentId) -> Self {
        self.intent = Some(intent);
        self
    }

    pub fn auto_close(mut self, after: Duration) -> Self {
        self.auto_close = Some(after);
        self
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}
