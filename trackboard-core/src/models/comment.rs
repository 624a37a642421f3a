use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author recorded when a comment is posted without one.
pub const DEFAULT_AUTHOR: &str = "Team Member";

/// A free-text note on a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub task_id: Uuid,
    pub content: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCommentInput {
    pub content: String,
    pub task_id: Uuid,
    /// Defaults to [`DEFAULT_AUTHOR`] if not specified.
    #[serde(default)]
    pub author_name: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateCommentInput {
    #[serde(default)]
    pub content: Option<String>,
}
