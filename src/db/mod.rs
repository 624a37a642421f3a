mod schema;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::models::*;

const TASK_SELECT: &str = "SELECT t.id, t.column_id, t.title, t.description, t.position, t.priority,
        t.due_date, t.created_at, t.updated_at,
        (SELECT COUNT(*) FROM comments cm WHERE cm.task_id = t.id)
     FROM tasks t";

const CHECKLIST_SELECT: &str =
    "SELECT cl.id, cl.task_id, cl.title, cl.position, cl.created_at FROM checklists cl";

const ITEM_SELECT: &str = "SELECT i.id, i.checklist_id, i.content, i.completed, i.position, i.created_at
     FROM checklist_items i";

const COMMENT_SELECT: &str =
    "SELECT id, task_id, content, author_name, created_at, updated_at FROM comments";

/// SQLite-backed store for projects, boards, checklists and comments.
///
/// Cheap to clone: clones share one connection behind a mutex. Every public
/// method takes the lock once, so a multi-row write like [`Database::reorder_tasks`]
/// is never interleaved with another request's reads.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Database path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_default() -> Result<Self> {
        Self::open(default_path()?)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("database lock poisoned");
        schema::run_migrations(&conn)
    }

    // ============================================================
    // Project operations
    // ============================================================

    /// Non-archived projects, newest first, each with its task count.
    pub fn get_project_summaries(&self) -> Result<Vec<ProjectSummary>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let mut stmt = conn.prepare(
            "SELECT p.id, p.name, p.description, p.kind, p.archived, p.created_at,
                (SELECT COUNT(*) FROM tasks t
                 JOIN board_columns c ON t.column_id = c.id
                 WHERE c.project_id = p.id)
             FROM projects p
             WHERE p.archived = 0
             ORDER BY p.created_at DESC, p.rowid DESC",
        )?;

        let projects = stmt
            .query_map([], |row| {
                Ok(ProjectSummary {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    description: row.get(2)?,
                    kind: ProjectType::from_str(&row.get::<_, String>(3)?).unwrap_or_default(),
                    archived: row.get(4)?,
                    created_at: parse_datetime(row.get::<_, String>(5)?),
                    task_count: row.get::<_, i64>(6)? as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(projects)
    }

    /// The full project tree: columns, tasks, checklists and items, all in position order.
    pub fn get_project(&self, id: Uuid) -> Result<Option<Project>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        load_project(&conn, id)
    }

    /// Create a project together with its default columns.
    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project> {
        if input.name.trim().is_empty() {
            anyhow::bail!("Project name is required");
        }

        let mut conn = self.conn.lock().expect("database lock poisoned");
        let id = Uuid::new_v4();
        let now = Utc::now();
        let kind = input.kind.unwrap_or_default();

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO projects (id, name, description, kind, archived, created_at)
             VALUES (?, ?, ?, ?, 0, ?)",
            (
                id.to_string(),
                &input.name,
                &input.description,
                kind.as_str(),
                timestamp(now),
            ),
        )?;

        for (position, name) in DEFAULT_COLUMNS.iter().enumerate() {
            tx.execute(
                "INSERT INTO board_columns (id, project_id, name, position, created_at)
                 VALUES (?, ?, ?, ?, ?)",
                (
                    Uuid::new_v4().to_string(),
                    id.to_string(),
                    name,
                    position as i32,
                    timestamp(now),
                ),
            )?;
        }
        tx.commit()?;

        tracing::debug!(project_id = %id, "Created project");
        load_project(&conn, id)?.ok_or_else(|| anyhow::anyhow!("Project not found after insert"))
    }

    pub fn update_project(&self, id: Uuid, input: UpdateProjectInput) -> Result<Option<Project>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let Some(existing) = load_project_row(&conn, id)? else {
            return Ok(None);
        };

        let name = input.name.unwrap_or(existing.name);
        let description = input.description.or(existing.description);
        let kind = input.kind.unwrap_or(existing.kind);
        let archived = input.archived.unwrap_or(existing.archived);

        conn.execute(
            "UPDATE projects SET name = ?, description = ?, kind = ?, archived = ?, updated_at = ?
             WHERE id = ?",
            (
                &name,
                &description,
                kind.as_str(),
                archived,
                timestamp(Utc::now()),
                id.to_string(),
            ),
        )?;

        load_project(&conn, id)
    }

    pub fn delete_project(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM projects WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Task operations
    // ============================================================

    /// Create a task at the end of its column.
    pub fn create_task(&self, input: CreateTaskInput) -> Result<Task> {
        let title = input.title.trim();
        if title.is_empty() {
            anyhow::bail!("Task title is required");
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        if !column_exists(&conn, input.column_id)? {
            anyhow::bail!("Column not found");
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let priority = input.priority.unwrap_or_default();
        let position: i32 = conn.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM tasks WHERE column_id = ?",
            [input.column_id.to_string()],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO tasks (id, column_id, title, description, position, priority, due_date, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                input.column_id.to_string(),
                title,
                &input.description,
                position,
                priority.as_str(),
                input.due_date.map(timestamp),
                timestamp(now),
            ),
        )?;

        tracing::debug!(task_id = %id, column_id = %input.column_id, position, "Created task");

        Ok(Task {
            id,
            column_id: input.column_id,
            title: title.to_string(),
            description: input.description,
            position,
            priority,
            due_date: input.due_date,
            created_at: now,
            updated_at: None,
            checklists: Vec::new(),
            comments: Vec::new(),
            comments_count: 0,
        })
    }

    /// A task with its checklists and comments (newest first).
    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        load_task(&conn, id)
    }

    pub fn update_task(&self, id: Uuid, input: UpdateTaskInput) -> Result<Option<Task>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let Some(existing) = load_task(&conn, id)? else {
            return Ok(None);
        };

        if let Some(column_id) = input.column_id {
            if !column_exists(&conn, column_id)? {
                anyhow::bail!("Column not found");
            }
        }

        let title = input.title.unwrap_or(existing.title);
        let description = input.description.or(existing.description);
        let priority = input.priority.unwrap_or(existing.priority);
        let due_date = input.due_date.or(existing.due_date);
        let column_id = input.column_id.unwrap_or(existing.column_id);
        let position = input.position.unwrap_or(existing.position);

        conn.execute(
            "UPDATE tasks SET title = ?, description = ?, priority = ?, due_date = ?,
                column_id = ?, position = ?, updated_at = ?
             WHERE id = ?",
            (
                &title,
                &description,
                priority.as_str(),
                due_date.map(timestamp),
                column_id.to_string(),
                position,
                timestamp(Utc::now()),
                id.to_string(),
            ),
        )?;

        load_task(&conn, id)
    }

    /// Delete a task and close the gap it leaves in its column.
    pub fn delete_task(&self, id: Uuid) -> Result<bool> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let column_id: Option<String> = conn
            .query_row(
                "SELECT column_id FROM tasks WHERE id = ?",
                [id.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        let Some(column_id) = column_id else {
            return Ok(false);
        };

        let tx = conn.transaction()?;
        tx.execute("DELETE FROM tasks WHERE id = ?", [id.to_string()])?;
        reindex_column(&tx, &column_id)?;
        tx.commit()?;
        Ok(true)
    }

    /// Apply a batched reorder in one transaction. Unknown task ids are skipped.
    ///
    /// Returns the number of tasks updated.
    pub fn reorder_tasks(&self, input: &ReorderTasksInput) -> Result<usize> {
        let mut conn = self.conn.lock().expect("database lock poisoned");
        let now = timestamp(Utc::now());

        let tx = conn.transaction()?;
        let mut updated = 0;
        for placement in &input.tasks {
            updated += tx.execute(
                "UPDATE tasks SET column_id = ?, position = ?, updated_at = ? WHERE id = ?",
                (
                    placement.column_id.to_string(),
                    placement.position,
                    &now,
                    placement.id.to_string(),
                ),
            )?;
        }
        tx.commit()?;

        tracing::debug!(
            requested = input.tasks.len(),
            updated,
            "Reordered tasks"
        );
        Ok(updated)
    }

    // ============================================================
    // Checklist operations
    // ============================================================

    pub fn create_checklist(&self, input: CreateChecklistInput) -> Result<Checklist> {
        let conn = self.conn.lock().expect("database lock poisoned");
        if !row_exists(&conn, "tasks", input.task_id)? {
            anyhow::bail!("Task not found");
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let position: i32 = conn.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM checklists WHERE task_id = ?",
            [input.task_id.to_string()],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO checklists (id, task_id, title, position, created_at) VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                input.task_id.to_string(),
                &input.title,
                position,
                timestamp(now),
            ),
        )?;

        Ok(Checklist {
            id,
            task_id: input.task_id,
            title: input.title,
            position,
            created_at: now,
            items: Vec::new(),
        })
    }

    pub fn update_checklist(
        &self,
        id: Uuid,
        input: UpdateChecklistInput,
    ) -> Result<Option<Checklist>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        if let Some(title) = input.title {
            conn.execute(
                "UPDATE checklists SET title = ? WHERE id = ?",
                (&title, id.to_string()),
            )?;
        }
        load_checklist(&conn, id)
    }

    pub fn delete_checklist(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM checklists WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    pub fn create_checklist_item(&self, input: CreateChecklistItemInput) -> Result<ChecklistItem> {
        let conn = self.conn.lock().expect("database lock poisoned");
        if !row_exists(&conn, "checklists", input.checklist_id)? {
            anyhow::bail!("Checklist not found");
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let position: i32 = conn.query_row(
            "SELECT COALESCE(MAX(position), -1) + 1 FROM checklist_items WHERE checklist_id = ?",
            [input.checklist_id.to_string()],
            |row| row.get(0),
        )?;

        conn.execute(
            "INSERT INTO checklist_items (id, checklist_id, content, completed, position, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
            (
                id.to_string(),
                input.checklist_id.to_string(),
                &input.content,
                input.completed,
                position,
                timestamp(now),
            ),
        )?;

        Ok(ChecklistItem {
            id,
            checklist_id: input.checklist_id,
            content: input.content,
            completed: input.completed,
            position,
            created_at: now,
        })
    }

    pub fn update_checklist_item(
        &self,
        id: Uuid,
        input: UpdateChecklistItemInput,
    ) -> Result<Option<ChecklistItem>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let sql = format!("{} WHERE i.id = ?", ITEM_SELECT);
        let Some(existing) = conn
            .query_row(&sql, [id.to_string()], item_from_row)
            .optional()?
        else {
            return Ok(None);
        };

        let content = input.content.unwrap_or(existing.content);
        let completed = input.completed.unwrap_or(existing.completed);

        conn.execute(
            "UPDATE checklist_items SET content = ?, completed = ? WHERE id = ?",
            (&content, completed, id.to_string()),
        )?;

        Ok(Some(ChecklistItem {
            content,
            completed,
            ..existing
        }))
    }

    pub fn delete_checklist_item(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM checklist_items WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }

    // ============================================================
    // Comment operations
    // ============================================================

    pub fn create_comment(&self, input: CreateCommentInput) -> Result<Comment> {
        if input.content.trim().is_empty() {
            anyhow::bail!("Comment content is required");
        }

        let conn = self.conn.lock().expect("database lock poisoned");
        if !row_exists(&conn, "tasks", input.task_id)? {
            anyhow::bail!("Task not found");
        }

        let id = Uuid::new_v4();
        let now = Utc::now();
        let author_name = input
            .author_name
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_AUTHOR.to_string());

        conn.execute(
            "INSERT INTO comments (id, task_id, content, author_name, created_at) VALUES (?, ?, ?, ?, ?)",
            (
                id.to_string(),
                input.task_id.to_string(),
                &input.content,
                &author_name,
                timestamp(now),
            ),
        )?;

        Ok(Comment {
            id,
            task_id: input.task_id,
            content: input.content,
            author_name,
            created_at: now,
            updated_at: None,
        })
    }

    pub fn update_comment(&self, id: Uuid, input: UpdateCommentInput) -> Result<Option<Comment>> {
        let conn = self.conn.lock().expect("database lock poisoned");
        if let Some(content) = input.content {
            conn.execute(
                "UPDATE comments SET content = ?, updated_at = ? WHERE id = ?",
                (&content, timestamp(Utc::now()), id.to_string()),
            )?;
        }

        let sql = format!("{} WHERE id = ?", COMMENT_SELECT);
        Ok(conn
            .query_row(&sql, [id.to_string()], comment_from_row)
            .optional()?)
    }

    pub fn delete_comment(&self, id: Uuid) -> Result<bool> {
        let conn = self.conn.lock().expect("database lock poisoned");
        let rows = conn.execute("DELETE FROM comments WHERE id = ?", [id.to_string()])?;
        Ok(rows > 0)
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// `<data dir>/trackboard.db`, per platform conventions.
pub fn default_path() -> Result<PathBuf> {
    let dirs = directories::ProjectDirs::from("", "", "trackboard")
        .ok_or_else(|| anyhow::anyhow!("Could not determine data directory"))?;
    Ok(dirs.data_dir().join("trackboard.db"))
}

// ============================================================
// Tree loading
// ============================================================

fn load_project_row(conn: &Connection, id: Uuid) -> Result<Option<Project>> {
    let project = conn
        .query_row(
            "SELECT id, name, description, kind, archived, created_at, updated_at
             FROM projects WHERE id = ?",
            [id.to_string()],
            |row| {
                Ok(Project {
                    id: parse_uuid(row.get::<_, String>(0)?),
                    name: row.get(1)?,
                    description: row.get(2)?,
                    kind: ProjectType::from_str(&row.get::<_, String>(3)?).unwrap_or_default(),
                    archived: row.get(4)?,
                    created_at: parse_datetime(row.get::<_, String>(5)?),
                    updated_at: row.get::<_, Option<String>>(6)?.map(parse_datetime),
                    columns: Vec::new(),
                })
            },
        )
        .optional()?;
    Ok(project)
}

fn load_project(conn: &Connection, id: Uuid) -> Result<Option<Project>> {
    let Some(mut project) = load_project_row(conn, id)? else {
        return Ok(None);
    };

    let project_key = id.to_string();

    let mut stmt = conn.prepare(
        "SELECT id, project_id, name, position, created_at
         FROM board_columns WHERE project_id = ? ORDER BY position, created_at",
    )?;
    let mut columns = stmt
        .query_map([&project_key], |row| {
            Ok(Column {
                id: parse_uuid(row.get::<_, String>(0)?),
                project_id: parse_uuid(row.get::<_, String>(1)?),
                name: row.get(2)?,
                position: row.get(3)?,
                created_at: parse_datetime(row.get::<_, String>(4)?),
                tasks: Vec::new(),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;

    let sql = format!(
        "{} JOIN checklists cl2 ON i.checklist_id = cl2.id
         JOIN tasks t ON cl2.task_id = t.id
         JOIN board_columns c ON t.column_id = c.id
         WHERE c.project_id = ? ORDER BY i.position, i.created_at",
        ITEM_SELECT
    );
    let items = conn
        .prepare(&sql)?
        .query_map([&project_key], item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let sql = format!(
        "{} JOIN tasks t ON cl.task_id = t.id
         JOIN board_columns c ON t.column_id = c.id
         WHERE c.project_id = ? ORDER BY cl.position, cl.created_at",
        CHECKLIST_SELECT
    );
    let checklists = conn
        .prepare(&sql)?
        .query_map([&project_key], checklist_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let sql = format!(
        "{} JOIN board_columns c ON t.column_id = c.id
         WHERE c.project_id = ? ORDER BY t.position, t.created_at",
        TASK_SELECT
    );
    let tasks = conn
        .prepare(&sql)?
        .query_map([&project_key], task_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let mut checklists_by_task = attach_items(checklists, items);
    let mut tasks_by_column: HashMap<Uuid, Vec<Task>> = HashMap::new();
    for mut task in tasks {
        task.checklists = checklists_by_task.remove(&task.id).unwrap_or_default();
        tasks_by_column.entry(task.column_id).or_default().push(task);
    }

    for column in &mut columns {
        column.tasks = tasks_by_column.remove(&column.id).unwrap_or_default();
    }

    project.columns = columns.into_iter().map(Arc::new).collect();
    Ok(Some(project))
}

fn load_task(conn: &Connection, id: Uuid) -> Result<Option<Task>> {
    let sql = format!("{} WHERE t.id = ?", TASK_SELECT);
    let Some(mut task) = conn
        .query_row(&sql, [id.to_string()], task_from_row)
        .optional()?
    else {
        return Ok(None);
    };

    let task_key = id.to_string();

    let sql = format!(
        "{} JOIN checklists cl2 ON i.checklist_id = cl2.id
         WHERE cl2.task_id = ? ORDER BY i.position, i.created_at",
        ITEM_SELECT
    );
    let items = conn
        .prepare(&sql)?
        .query_map([&task_key], item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let sql = format!(
        "{} WHERE cl.task_id = ? ORDER BY cl.position, cl.created_at",
        CHECKLIST_SELECT
    );
    let checklists = conn
        .prepare(&sql)?
        .query_map([&task_key], checklist_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    let sql = format!(
        "{} WHERE task_id = ? ORDER BY created_at DESC, rowid DESC",
        COMMENT_SELECT
    );
    let comments = conn
        .prepare(&sql)?
        .query_map([&task_key], comment_from_row)?
        .collect::<Result<Vec<_>, _>>()?;

    task.checklists = attach_items(checklists, items)
        .remove(&id)
        .unwrap_or_default();
    task.comments_count = comments.len();
    task.comments = comments;
    Ok(Some(task))
}

fn load_checklist(conn: &Connection, id: Uuid) -> Result<Option<Checklist>> {
    let sql = format!("{} WHERE cl.id = ?", CHECKLIST_SELECT);
    let Some(mut checklist) = conn
        .query_row(&sql, [id.to_string()], checklist_from_row)
        .optional()?
    else {
        return Ok(None);
    };

    let sql = format!(
        "{} WHERE i.checklist_id = ? ORDER BY i.position, i.created_at",
        ITEM_SELECT
    );
    checklist.items = conn
        .prepare(&sql)?
        .query_map([id.to_string()], item_from_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(checklist))
}

/// Distribute items into their checklists, then group the checklists by task.
/// Input order is preserved within each group.
fn attach_items(
    checklists: Vec<Checklist>,
    items: Vec<ChecklistItem>,
) -> HashMap<Uuid, Vec<Checklist>> {
    let mut items_by_checklist: HashMap<Uuid, Vec<ChecklistItem>> = HashMap::new();
    for item in items {
        items_by_checklist
            .entry(item.checklist_id)
            .or_default()
            .push(item);
    }

    let mut by_task: HashMap<Uuid, Vec<Checklist>> = HashMap::new();
    for mut checklist in checklists {
        checklist.items = items_by_checklist
            .remove(&checklist.id)
            .unwrap_or_default();
        by_task.entry(checklist.task_id).or_default().push(checklist);
    }
    by_task
}

/// Renumber a column's tasks to 0, 1, 2, ... keeping their current order.
fn reindex_column(conn: &Connection, column_id: &str) -> Result<()> {
    let ids = conn
        .prepare("SELECT id FROM tasks WHERE column_id = ? ORDER BY position, created_at")?
        .query_map([column_id], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;

    for (position, id) in ids.iter().enumerate() {
        conn.execute(
            "UPDATE tasks SET position = ? WHERE id = ?",
            (position as i32, id),
        )?;
    }
    Ok(())
}

fn column_exists(conn: &Connection, id: Uuid) -> Result<bool> {
    row_exists(conn, "board_columns", id)
}

fn row_exists(conn: &Connection, table: &str, id: Uuid) -> Result<bool> {
    let count: i32 = conn.query_row(
        &format!("SELECT COUNT(*) FROM {} WHERE id = ?", table),
        [id.to_string()],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

// ============================================================
// Row mapping
// ============================================================

fn task_from_row(row: &Row) -> rusqlite::Result<Task> {
    Ok(Task {
        id: parse_uuid(row.get::<_, String>(0)?),
        column_id: parse_uuid(row.get::<_, String>(1)?),
        title: row.get(2)?,
        description: row.get(3)?,
        position: row.get(4)?,
        priority: Priority::from_str(&row.get::<_, String>(5)?).unwrap_or_default(),
        due_date: row.get::<_, Option<String>>(6)?.map(parse_datetime),
        created_at: parse_datetime(row.get::<_, String>(7)?),
        updated_at: row.get::<_, Option<String>>(8)?.map(parse_datetime),
        checklists: Vec::new(),
        comments: Vec::new(),
        comments_count: row.get::<_, i64>(9)? as usize,
    })
}

fn checklist_from_row(row: &Row) -> rusqlite::Result<Checklist> {
    Ok(Checklist {
        id: parse_uuid(row.get::<_, String>(0)?),
        task_id: parse_uuid(row.get::<_, String>(1)?),
        title: row.get(2)?,
        position: row.get(3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
        items: Vec::new(),
    })
}

fn item_from_row(row: &Row) -> rusqlite::Result<ChecklistItem> {
    Ok(ChecklistItem {
        id: parse_uuid(row.get::<_, String>(0)?),
        checklist_id: parse_uuid(row.get::<_, String>(1)?),
        content: row.get(2)?,
        completed: row.get(3)?,
        position: row.get(4)?,
        created_at: parse_datetime(row.get::<_, String>(5)?),
    })
}

fn comment_from_row(row: &Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: parse_uuid(row.get::<_, String>(0)?),
        task_id: parse_uuid(row.get::<_, String>(1)?),
        content: row.get(2)?,
        author_name: row.get(3)?,
        created_at: parse_datetime(row.get::<_, String>(4)?),
        updated_at: row.get::<_, Option<String>>(5)?.map(parse_datetime),
    })
}

/// Fixed-width RFC 3339 so that text ordering matches time ordering.
fn timestamp(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

fn parse_uuid(s: String) -> Uuid {
    Uuid::parse_str(&s).unwrap_or_else(|_| Uuid::nil())
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
