use tracing::{error, info};

use super::{ConfirmationChannel, ConfirmationPrompt, Notice, NoticeLevel};

/// Logs prompts and notices. Nobody clicks, so every intent commits when
/// its window runs out.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingChannel;

impl TracingChannel {
    pub fn new() -> Self {
        TracingChannel
    }
}

impl ConfirmationChannel for TracingChannel {
    fn present(&self, prompt: ConfirmationPrompt) {
        info!(
            intent = %prompt.intent_id(),
            kind = %prompt.kind(),
            window_ms = prompt.window().as_millis() as u64,
            "{}",
            prompt.message()
        );
    }

    fn notify(&self, notice: Notice) {
        let intent = notice.intent.map(|id| id.to_string()).unwrap_or_default();
        match notice.level {
            NoticeLevel::Info | NoticeLevel::Success => {
                info!(intent = %intent, level = ?notice.level, "{}", notice.message)
            }
            NoticeLevel::Error => error!(intent = %intent, "{}", notice.message),
        }
    }
}
