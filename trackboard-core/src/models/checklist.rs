use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named list of check items attached to a task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checklist {
    pub id: Uuid,
    pub task_id: Uuid,
    pub title: String,
    pub position: i32,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub items: Vec<ChecklistItem>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistItem {
    pub id: Uuid,
    pub checklist_id: Uuid,
    pub content: String,
    pub completed: bool,
    pub position: i32,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a checklist. It is appended after the task's existing checklists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChecklistInput {
    pub title: String,
    pub task_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateChecklistInput {
    #[serde(default)]
    pub title: Option<String>,
}

/// Input for creating a checklist item. It is appended after the list's existing items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChecklistItemInput {
    pub content: String,
    pub checklist_id: Uuid,
    #[serde(default)]
    pub completed: bool,
}

/// Input for updating a checklist item. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateChecklistItemInput {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}
