use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::db::Database;
use crate::models::*;

type ApiError = (StatusCode, String);

// ============================================================
// Error Handling
// ============================================================

/// Log an internal error and return a sanitized response to the client.
///
/// Validation failures raised by the store ("Column not found", "Task title is
/// required") are safe to show and come back as BAD_REQUEST. Anything else is
/// logged in full and reported as a generic 500.
fn internal_error(e: impl std::fmt::Display) -> ApiError {
    let msg = e.to_string();

    if msg.contains("not found") || msg.contains("required") {
        tracing::warn!("Validation error: {}", msg);
        return (StatusCode::BAD_REQUEST, msg);
    }

    tracing::error!("Internal error: {}", msg);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "Internal server error".to_string(),
    )
}

fn not_found(what: &str) -> ApiError {
    (StatusCode::NOT_FOUND, format!("{} not found", what))
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "healthy" }))
}

// ============================================================
// Projects
// ============================================================

pub async fn list_projects(
    State(db): State<Database>,
) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    db.get_project_summaries().map(Json).map_err(internal_error)
}

pub async fn get_project(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, ApiError> {
    db.get_project(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Project"))
}

pub async fn create_project(
    State(db): State<Database>,
    Json(input): Json<CreateProjectInput>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    db.create_project(input)
        .map(|p| (StatusCode::CREATED, Json(p)))
        .map_err(internal_error)
}

pub async fn update_project(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProjectInput>,
) -> Result<Json<Project>, ApiError> {
    db.update_project(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Project"))
}

pub async fn delete_project(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if db.delete_project(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Project"))
    }
}

// ============================================================
// Tasks
// ============================================================

pub async fn create_task(
    State(db): State<Database>,
    Json(input): Json<CreateTaskInput>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    db.create_task(input)
        .map(|t| (StatusCode::CREATED, Json(t)))
        .map_err(internal_error)
}

/// Batched reorder: every placement in the body is applied in one transaction.
pub async fn reorder_tasks(
    State(db): State<Database>,
    Json(input): Json<ReorderTasksInput>,
) -> Result<StatusCode, ApiError> {
    db.reorder_tasks(&input).map_err(internal_error)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_task(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Task>, ApiError> {
    db.get_task(id)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Task"))
}

pub async fn update_task(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTaskInput>,
) -> Result<Json<Task>, ApiError> {
    db.update_task(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Task"))
}

pub async fn delete_task(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if db.delete_task(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Task"))
    }
}

// ============================================================
// Checklists
// ============================================================

pub async fn create_checklist(
    State(db): State<Database>,
    Json(input): Json<CreateChecklistInput>,
) -> Result<(StatusCode, Json<Checklist>), ApiError> {
    db.create_checklist(input)
        .map(|c| (StatusCode::CREATED, Json(c)))
        .map_err(internal_error)
}

pub async fn update_checklist(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateChecklistInput>,
) -> Result<Json<Checklist>, ApiError> {
    db.update_checklist(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Checklist"))
}

pub async fn delete_checklist(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if db.delete_checklist(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Checklist"))
    }
}

pub async fn create_checklist_item(
    State(db): State<Database>,
    Json(input): Json<CreateChecklistItemInput>,
) -> Result<(StatusCode, Json<ChecklistItem>), ApiError> {
    db.create_checklist_item(input)
        .map(|i| (StatusCode::CREATED, Json(i)))
        .map_err(internal_error)
}

pub async fn update_checklist_item(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateChecklistItemInput>,
) -> Result<Json<ChecklistItem>, ApiError> {
    db.update_checklist_item(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Checklist item"))
}

pub async fn delete_checklist_item(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if db.delete_checklist_item(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Checklist item"))
    }
}

// ============================================================
// Comments
// ============================================================

pub async fn create_comment(
    State(db): State<Database>,
    Json(input): Json<CreateCommentInput>,
) -> Result<(StatusCode, Json<Comment>), ApiError> {
    db.create_comment(input)
        .map(|c| (StatusCode::CREATED, Json(c)))
        .map_err(internal_error)
}

pub async fn update_comment(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateCommentInput>,
) -> Result<Json<Comment>, ApiError> {
    db.update_comment(id, input)
        .map_err(internal_error)?
        .map(Json)
        .ok_or_else(|| not_found("Comment"))
}

pub async fn delete_comment(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if db.delete_comment(id).map_err(internal_error)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found("Comment"))
    }
}
