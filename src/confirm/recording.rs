use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use super::{ConfirmationChannel, ConfirmationPrompt, Notice};

/// A channel that keeps everything it is shown in memory.
///
/// Clone-friendly; clones share the same buffers, so a test can hand one
/// clone to a flow and inspect another.
#[derive(Clone, Default)]
pub struct RecordingChannel {
    prompts: Arc<Mutex<Vec<ConfirmationPrompt>>>,
    notices: Arc<Mutex<Vec<Notice>>>,
}

fn lock<T>(buffer: &Mutex<T>) -> MutexGuard<'_, T> {
    buffer.lock().unwrap_or_else(PoisonError::into_inner)
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every prompt presented so far, oldest first.
    pub fn prompts(&self) -> Vec<ConfirmationPrompt> {
        lock(&self.prompts).clone()
    }

    pub fn last_prompt(&self) -> Option<ConfirmationPrompt> {
        lock(&self.prompts).last().cloned()
    }

    /// Every notice so far, oldest first.
    pub fn notices(&self) -> Vec<Notice> {
        lock(&self.notices).clone()
    }

    pub fn errors(&self) -> Vec<Notice> {
        lock(&self.notices)
            .iter()
            .filter(|n| n.is_error())
            .cloned()
            .collect()
    }

    pub fn clear(&self) {
        lock(&self.prompts).clear();
        lock(&self.notices).clear();
    }
}

impl ConfirmationChannel for RecordingChannel {
    fn present(&self, prompt: ConfirmationPrompt) {
        lock(&self.prompts).push(prompt);
    }

    fn notify(&self, notice: Notice) {
        lock(&self.notices).push(notice);
    }
}
