use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use event_emitter_rs::EventEmitter;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{ConfirmationChannel, ConfirmationPrompt, Notice};
use crate::intent::{IntentId, IntentKind};
use crate::scheduler::{PendingHandle, Resolution};

/// Serializable view of a prompt, emitted as the `"prompt"` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptView {
    pub intent: IntentId,
    pub kind: IntentKind,
    pub message: String,
    pub window_ms: u64,
}

/// A channel that forwards prompts and notices to in-process listeners.
///
/// Listeners receive JSON; they answer a prompt by calling [`undo`](Self::undo)
/// or [`confirm`](Self::confirm) with the intent id from the payload.
///
/// ## Example
///
/// ```ignore
/// let channel = EmitterChannel::new();
/// channel.on_prompt(|prompt| println!("{} (undo within {}ms)", prompt.message, prompt.window_ms));
/// channel.on_notice(|notice| println!("{}", notice.message));
/// ```
pub struct EmitterChannel {
    emitter: Mutex<EventEmitter>,
    open: Mutex<HashMap<IntentId, PendingHandle>>,
}

pub const PROMPT_EVENT: &str = "prompt";
pub const NOTICE_EVENT: &str = "notice";

fn lock<T>(value: &Mutex<T>) -> MutexGuard<'_, T> {
    value.lock().unwrap_or_else(PoisonError::into_inner)
}

impl Default for EmitterChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl EmitterChannel {
    pub fn new() -> Self {
        Self {
            emitter: Mutex::new(EventEmitter::new()),
            open: Mutex::new(HashMap::new()),
        }
    }

    /// Register a listener for presented prompts.
    pub fn on_prompt<F>(&self, listener: F)
    where
        F: Fn(PromptView) + Send + Sync + 'static,
    {
        lock(&self.emitter).on(PROMPT_EVENT, move |payload: String| {
            match serde_json::from_str::<PromptView>(&payload) {
                Ok(prompt) => listener(prompt),
                Err(err) => warn!(error = %err, "undecodable prompt payload"),
            }
        });
    }

    /// Register a listener for outcome notices.
    pub fn on_notice<F>(&self, listener: F)
    where
        F: Fn(Notice) + Send + Sync + 'static,
    {
        lock(&self.emitter).on(NOTICE_EVENT, move |payload: String| {
            match serde_json::from_str::<Notice>(&payload) {
                Ok(notice) => listener(notice),
                Err(err) => warn!(error = %err, "undecodable notice payload"),
            }
        });
    }

    /// Undo the prompt for `intent`. `None` if it is not open.
    pub fn undo(&self, intent: IntentId) -> Option<Resolution> {
        self.take_open(intent).map(|handle| handle.undo())
    }

    /// Confirm the prompt for `intent`. `None` if it is not open.
    pub fn confirm(&self, intent: IntentId) -> Option<Resolution> {
        self.take_open(intent).map(|handle| handle.confirm())
    }

    /// Number of prompts whose intent has not been reported on yet.
    pub fn open_prompts(&self) -> usize {
        lock(&self.open).len()
    }

    fn take_open(&self, intent: IntentId) -> Option<PendingHandle> {
        lock(&self.open).remove(&intent)
    }

    fn emit<T: Serialize>(&self, event: &str, value: &T) {
        match serde_json::to_string(value) {
            Ok(payload) => {
                lock(&self.emitter).emit(event, payload);
            }
            Err(err) => warn!(event, error = %err, "could not encode event payload"),
        }
    }
}

impl ConfirmationChannel for EmitterChannel {
    fn present(&self, prompt: ConfirmationPrompt) {
        let view = PromptView {
            intent: prompt.intent_id(),
            kind: prompt.kind(),
            message: prompt.message().to_string(),
            window_ms: prompt.window().as_millis() as u64,
        };
        lock(&self.open).insert(view.intent, prompt.handle().clone());
        self.emit(PROMPT_EVENT, &view);
    }

    fn notify(&self, notice: Notice) {
        if let Some(intent) = notice.intent {
            lock(&self.open).remove(&intent);
        }
        self.emit(NOTICE_EVENT, &notice);
    }
}
