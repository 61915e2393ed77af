use crate::model::{Booking, Comment, Entity};

/// User-facing texts for one collection's prompts and notices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMessages {
    /// Shown with the Undo / Confirm prompt.
    pub prompt: String,
    pub delete_cancelled: String,
    pub deleted: String,
    /// Used when the backend gives no reason of its own.
    pub delete_failed: String,
    pub create_cancelled: String,
    pub created: String,
    /// Used when the backend gives no reason of its own.
    pub create_failed: String,
    pub updated: String,
    /// Used when the backend gives no reason of its own.
    pub update_failed: String,
}

impl FlowMessages {
    /// Messages for entities called `label` ("tour" gives "Tour was deleted!").
    pub fn for_label(label: &str) -> Self {
        let title = capitalize(label);
        Self {
            prompt: "Processing...".into(),
            delete_cancelled: "Cancelled!".into(),
            deleted: format!("{} was deleted!", title),
            delete_failed: format!("Could not delete {}!", label),
            create_cancelled: format!("{} creation cancelled", title),
            created: format!("{} created successfully!", title),
            create_failed: format!("Failed to create {}.", label),
            updated: format!("{} updated successfully!", title),
            update_failed: format!("Failed to update {}", label),
        }
    }

    /// Messages for `E`, with the wording comments and bookings use.
    pub fn for_entity<E: Entity>() -> Self {
        let mut messages = Self::for_label(E::LABEL);
        if E::COLLECTION == Comment::COLLECTION {
            messages.deleted = "Comment is deleted!".into();
            messages.create_failed = "Please log in to add a comment!".into();
        } else if E::COLLECTION == Booking::COLLECTION {
            messages.deleted = "Booking cancelled!".into();
            messages.delete_failed = "Cancel failed".into();
            messages.create_failed = "Unauthorized".into();
        }
        messages
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_deleted(mut self, deleted: impl Into<String>) -> Self {
        self.deleted = deleted.into();
        self
    }
}

fn capitalize(label: &str) -> String {
    let mut chars = label.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
