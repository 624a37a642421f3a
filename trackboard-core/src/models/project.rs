use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::task::Task;

/// Columns every new project starts with, in board order.
pub const DEFAULT_COLUMNS: [&str; 5] = ["Backlog", "To Do", "In Progress", "Review", "Done"];

/// A project and its full board.
///
/// Projects are fetched whole: columns ordered by `position`, each column's
/// tasks ordered by `position`. Columns are shared behind [`Arc`] so a board
/// move can swap out the affected columns and leave the others pointer-equal,
/// which lets a renderer skip columns that did not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: ProjectType,
    #[serde(default)]
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub columns: Vec<Arc<Column>>,
}

impl Project {
    /// Look up a column by id.
    pub fn column(&self, id: Uuid) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id).map(Arc::as_ref)
    }

    /// Look up a column by name, ignoring ASCII case.
    pub fn column_named(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(Arc::as_ref)
    }

    /// Total number of tasks across all columns.
    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}

/// The kind of work a project tracks.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectType {
    #[default]
    General,
    Client,
    Internal,
    FeatureRequest,
}

impl ProjectType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Client => "client",
            Self::Internal => "internal",
            Self::FeatureRequest => "feature_request",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "general" => Some(Self::General),
            "client" => Some(Self::Client),
            "internal" => Some(Self::Internal),
            "feature_request" => Some(Self::FeatureRequest),
            _ => None,
        }
    }

    /// Human-readable label used by the dashboard.
    pub fn label(&self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Client => "Client Project",
            Self::Internal => "Internal",
            Self::FeatureRequest => "Feature Request",
        }
    }
}

/// A kanban lane within a project.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: Uuid,
    pub project_id: Uuid,
    pub name: String,
    /// Rank among the project's columns.
    pub position: i32,
    pub created_at: DateTime<Utc>,
    /// Cards in on-screen order. `tasks[i].position == i` on a consistent board.
    #[serde(default)]
    pub tasks: Vec<Task>,
}

/// A project as shown in the project list: no board, but a task count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectSummary {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: ProjectType,
    pub archived: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub task_count: usize,
}

/// Input for creating a new project.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateProjectInput {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to `General` if not specified.
    #[serde(rename = "type", default)]
    pub kind: Option<ProjectType>,
}

/// Input for updating an existing project. All fields are optional for partial updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProjectInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<ProjectType>,
    /// Archived projects drop out of the project list.
    #[serde(default)]
    pub archived: Option<bool>,
}
