use serde::{Deserialize, Serialize};

use super::{Draft, Entity, EntityId, ValidationErrors};

/// A review left on a tour, as served by `GET /comments/{tourId}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: EntityId,
    pub tour_id: EntityId,
    pub content: String,
    pub username: String,
}

impl Entity for Comment {
    const COLLECTION: &'static str = "comments";
    const LABEL: &'static str = "comment";
    type Draft = CommentDraft;

    fn id(&self) -> EntityId {
        self.id
    }
}

/// Body of `POST /comments`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDraft {
    pub tour_id: EntityId,
    pub content: String,
    pub username: String,
}

impl CommentDraft {
    pub fn new(tour_id: EntityId, username: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tour_id,
            content: content.into(),
            username: username.into(),
        }
    }
}

impl Draft for CommentDraft {
    type Entity = Comment;

    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        errors.require("content", &self.content, "Comment cannot be empty");
        errors.require("username", &self.username, "Please log in to add a comment!");
        errors.into_result()
    }

    fn into_entity(self, id: EntityId) -> Comment {
        Comment {
            id,
            tour_id: self.tour_id,
            content: self.content,
            username: self.username,
        }
    }
}
