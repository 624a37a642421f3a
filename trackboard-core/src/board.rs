//! Pure board layout rules.
//!
//! [`apply_move`] turns a drag-and-drop gesture into a new project tree plus the
//! update-set that has to be persisted. It never mutates its input: the column
//! list is copied, the one or two affected columns are rebuilt, and every other
//! column is carried over as the same [`Arc`].

use std::collections::HashSet;
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::models::{Column, Project, Task, TaskPlacement};

/// A card slot on the board: a column and an index into its task list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Locator {
    pub column_id: Uuid,
    pub index: usize,
}

impl Locator {
    pub fn new(column_id: Uuid, index: usize) -> Self {
        Self { column_id, index }
    }
}

/// The result of applying a move locally.
#[derive(Debug, Clone, PartialEq)]
pub struct MovePlan {
    /// The new tree, positions already renumbered.
    pub project: Project,
    /// One entry per task in the affected column(s), in board order.
    pub placements: Vec<TaskPlacement>,
    /// Id of the task that was moved.
    pub task_id: Uuid,
}

/// Apply a drag-and-drop move to `project`.
///
/// Returns `None` when there is nothing to do: identical locators, a source or
/// destination column that is not on the board, a source index past the end of
/// its column, or a same-column move that lands the card where it started.
/// A destination index past the end appends.
///
/// Within a single column the card is removed first and then inserted at
/// `destination.index` of the shortened list, so moving index 0 to index 2 of
/// `[a, b, c]` yields `[b, c, a]`.
pub fn apply_move(project: &Project, source: Locator, destination: Locator) -> Option<MovePlan> {
    if source == destination {
        return None;
    }

    let src = project
        .columns
        .iter()
        .position(|c| c.id == source.column_id)?;
    let dst = project
        .columns
        .iter()
        .position(|c| c.id == destination.column_id)?;

    if source.index >= project.columns[src].tasks.len() {
        return None;
    }

    let mut columns = project.columns.clone();
    let mut src_tasks = columns[src].tasks.clone();
    let mut moved = src_tasks.remove(source.index);
    let task_id = moved.id;
    moved.column_id = destination.column_id;

    if src == dst {
        let at = destination.index.min(src_tasks.len());
        if at == source.index {
            return None;
        }
        src_tasks.insert(at, moved);
        renumber(&mut src_tasks);
        columns[src] = with_tasks(&columns[src], src_tasks);
    } else {
        let mut dst_tasks = columns[dst].tasks.clone();
        let at = destination.index.min(dst_tasks.len());
        dst_tasks.insert(at, moved);
        renumber(&mut src_tasks);
        renumber(&mut dst_tasks);
        columns[src] = with_tasks(&columns[src], src_tasks);
        columns[dst] = with_tasks(&columns[dst], dst_tasks);
    }

    let affected: &[usize] = if src == dst { &[src] } else { &[src, dst] };
    let placements = affected
        .iter()
        .flat_map(|&i| placements(&columns[i]))
        .collect();

    Some(MovePlan {
        project: Project {
            id: project.id,
            name: project.name.clone(),
            description: project.description.clone(),
            kind: project.kind,
            archived: project.archived,
            created_at: project.created_at,
            updated_at: project.updated_at,
            columns,
        },
        placements,
        task_id,
    })
}

/// The update-set entries for every task in `column`, positions taken from array order.
pub fn placements(column: &Column) -> Vec<TaskPlacement> {
    column
        .tasks
        .iter()
        .enumerate()
        .map(|(i, t)| TaskPlacement {
            id: t.id,
            column_id: column.id,
            position: i as i32,
        })
        .collect()
}

/// A broken board layout, reported by [`check_layout`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutViolation {
    #[error("task {task} in column {column} has position {found}, expected {expected}")]
    Position {
        column: Uuid,
        task: Uuid,
        expected: i32,
        found: i32,
    },
    #[error("task {task} sits in column {column} but points at column {claimed}")]
    WrongColumn {
        column: Uuid,
        task: Uuid,
        claimed: Uuid,
    },
    #[error("task {task} appears more than once on the board")]
    Duplicate { task: Uuid },
}

/// Verify that every column's positions are dense, 0-based and in array order,
/// and that every task appears once, in the column its `column_id` names.
pub fn check_layout(project: &Project) -> Result<(), LayoutViolation> {
    let mut seen = HashSet::new();
    for column in &project.columns {
        for (i, task) in column.tasks.iter().enumerate() {
            if !seen.insert(task.id) {
                return Err(LayoutViolation::Duplicate { task: task.id });
            }
            if task.column_id != column.id {
                return Err(LayoutViolation::WrongColumn {
                    column: column.id,
                    task: task.id,
                    claimed: task.column_id,
                });
            }
            if task.position != i as i32 {
                return Err(LayoutViolation::Position {
                    column: column.id,
                    task: task.id,
                    expected: i as i32,
                    found: task.position,
                });
            }
        }
    }
    Ok(())
}

fn renumber(tasks: &mut [Task]) {
    for (i, task) in tasks.iter_mut().enumerate() {
        task.position = i as i32;
    }
}

fn with_tasks(column: &Column, tasks: Vec<Task>) -> Arc<Column> {
    Arc::new(Column {
        id: column.id,
        project_id: column.project_id,
        name: column.name.clone(),
        position: column.position,
        created_at: column.created_at,
        tasks,
    })
}
