use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::checklist::Checklist;
use super::comment::Comment;

/// A card on the board.
///
/// `column_id` always names the column that holds the task and `position` is
/// its rank within that column. Inside a project tree, `comments` is left
/// empty and only `comments_count` is filled; fetching the task on its own
/// returns the comment bodies as well.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    pub column_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub position: i32,
    pub priority: Priority,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub checklists: Vec<Checklist>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub comments_count: usize,
}

impl Task {
    /// Completed and total checklist items across all of the task's checklists.
    pub fn checklist_progress(&self) -> (usize, usize) {
        self.checklists
            .iter()
            .flat_map(|c| c.items.iter())
            .fold((0, 0), |(done, total), item| {
                (done + usize::from(item.completed), total + 1)
            })
    }
}

/// How urgent a task is.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }
}

/// Input for creating a task. The server appends it to the end of the column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    pub column_id: Uuid,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to `Medium` if not specified.
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// Input for updating a single task. All fields are optional for partial updates.
///
/// Setting `column_id`/`position` here moves one task without renumbering its
/// neighbours; board moves go through [`ReorderTasksInput`] instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskInput {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub column_id: Option<Uuid>,
    #[serde(default)]
    pub position: Option<i32>,
}

/// Where one task sits after a board move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPlacement {
    pub id: Uuid,
    pub column_id: Uuid,
    pub position: i32,
}

/// Body of the batched reorder request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReorderTasksInput {
    pub tasks: Vec<TaskPlacement>,
}
