//! HTTP client for the trackboard API.
//!
//! Every request carries a JSON body where it has one. Any non-2xx response
//! becomes [`ClientError::Status`]; the client does not try to tell error
//! kinds apart beyond that.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::board::BoardApi;
use crate::config::{CliConfig, DEFAULT_API_URL};
use crate::models::*;

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Status { status: StatusCode, body: String },
}

/// HTTP client for the trackboard API.
#[derive(Debug, Clone)]
pub struct TrackerClient {
    base_url: String,
    client: Client,
}

impl TrackerClient {
    /// Create a client for `base_url` (e.g. `http://localhost:8000/api`).
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    /// Create a client whose requests fail after `timeout`.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_config(config: &CliConfig) -> Result<Self, ClientError> {
        Self::with_timeout(&config.api_url, config.request_timeout())
    }

    /// Create a client pointing at the local default server.
    pub fn localhost() -> Self {
        Self::new(DEFAULT_API_URL)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request(&self, method: Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client.request(method, &url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::Status { status, body })
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let response = self.request(Method::GET, path).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    async fn send_json<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let response = self.request(method, path).json(body).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// Send a request whose response body is ignored.
    async fn send_empty<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<(), ClientError> {
        let mut req = self.request(method, path);
        if let Some(body) = body {
            req = req.json(body);
        }
        Self::check(req.send().await?).await?;
        Ok(())
    }

    pub async fn health(&self) -> Result<serde_json::Value, ClientError> {
        self.get_json("/health").await
    }

    // ============================================================
    // Project Operations
    // ============================================================

    /// Non-archived projects with task counts, newest first.
    pub async fn list_projects(&self) -> Result<Vec<ProjectSummary>, ClientError> {
        self.get_json("/projects").await
    }

    /// The full board of a project.
    pub async fn get_project(&self, id: Uuid) -> Result<Project, ClientError> {
        self.get_json(&format!("/projects/{}", id)).await
    }

    pub async fn create_project(&self, input: &CreateProjectInput) -> Result<Project, ClientError> {
        self.send_json(Method::POST, "/projects", input).await
    }

    pub async fn update_project(
        &self,
        id: Uuid,
        input: &UpdateProjectInput,
    ) -> Result<Project, ClientError> {
        self.send_json(Method::PUT, &format!("/projects/{}", id), input)
            .await
    }

    pub async fn delete_project(&self, id: Uuid) -> Result<(), ClientError> {
        self.send_empty::<()>(Method::DELETE, &format!("/projects/{}", id), None)
            .await
    }

    // ============================================================
    // Task Operations
    // ============================================================

    pub async fn create_task(&self, input: &CreateTaskInput) -> Result<Task, ClientError> {
        self.send_json(Method::POST, "/tasks", input).await
    }

    /// Persist a batch of task placements in one request.
    pub async fn reorder_tasks(&self, placements: &[TaskPlacement]) -> Result<(), ClientError> {
        let body = ReorderTasksInput {
            tasks: placements.to_vec(),
        };
        self.send_empty(Method::PUT, "/tasks", Some(&body)).await
    }

    /// A task with its checklists and comments.
    pub async fn get_task(&self, id: Uuid) -> Result<Task, ClientError> {
        self.get_json(&format!("/tasks/{}", id)).await
    }

    pub async fn update_task(&self, id: Uuid, input: &UpdateTaskInput) -> Result<Task, ClientError> {
        self.send_json(Method::PUT, &format!("/tasks/{}", id), input)
            .await
    }

    pub async fn delete_task(&self, id: Uuid) -> Result<(), ClientError> {
        self.send_empty::<()>(Method::DELETE, &format!("/tasks/{}", id), None)
            .await
    }

    // ============================================================
    // Checklist Operations
    // ============================================================

    pub async fn create_checklist(
        &self,
        input: &CreateChecklistInput,
    ) -> Result<Checklist, ClientError> {
        self.send_json(Method::POST, "/checklists", input).await
    }

    pub async fn update_checklist(
        &self,
        id: Uuid,
        input: &UpdateChecklistInput,
    ) -> Result<Checklist, ClientError> {
        self.send_json(Method::PUT, &format!("/checklists/{}", id), input)
            .await
    }

    pub async fn delete_checklist(&self, id: Uuid) -> Result<(), ClientError> {
        self.send_empty::<()>(Method::DELETE, &format!("/checklists/{}", id), None)
            .await
    }

    pub async fn create_checklist_item(
        &self,
        input: &CreateChecklistItemInput,
    ) -> Result<ChecklistItem, ClientError> {
        self.send_json(Method::POST, "/checklists/items", input)
            .await
    }

    pub async fn update_checklist_item(
        &self,
        id: Uuid,
        input: &UpdateChecklistItemInput,
    ) -> Result<ChecklistItem, ClientError> {
        self.send_json(Method::PUT, &format!("/checklists/items/{}", id), input)
            .await
    }

    pub async fn delete_checklist_item(&self, id: Uuid) -> Result<(), ClientError> {
        self.send_empty::<()>(Method::DELETE, &format!("/checklists/items/{}", id), None)
            .await
    }

    // ============================================================
    // Comment Operations
    // ============================================================

    pub async fn create_comment(&self, input: &CreateCommentInput) -> Result<Comment, ClientError> {
        self.send_json(Method::POST, "/comments", input).await
    }

    pub async fn update_comment(
        &self,
        id: Uuid,
        input: &UpdateCommentInput,
    ) -> Result<Comment, ClientError> {
        self.send_json(Method::PUT, &format!("/comments/{}", id), input)
            .await
    }

    pub async fn delete_comment(&self, id: Uuid) -> Result<(), ClientError> {
        self.send_empty::<()>(Method::DELETE, &format!("/comments/{}", id), None)
            .await
    }
}

#[async_trait]
impl BoardApi for TrackerClient {
    type Error = ClientError;

    async fn fetch_project(&self, id: Uuid) -> Result<Project, ClientError> {
        self.get_project(id).await
    }

    async fn reorder(&self, placements: &[TaskPlacement]) -> Result<(), ClientError> {
        self.reorder_tasks(placements).await
    }

    async fn create_task(&self, input: &CreateTaskInput) -> Result<Task, ClientError> {
        TrackerClient::create_task(self, input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_trimmed() {
        let client = TrackerClient::new("http://example.test/api/");
        assert_eq!(client.base_url(), "http://example.test/api");
    }

    #[test]
    fn test_from_config_uses_api_url() {
        let config = CliConfig {
            api_url: "http://tracker.internal:9000/api".to_string(),
            ..CliConfig::default()
        };
        let client = TrackerClient::from_config(&config).unwrap();
        assert_eq!(client.base_url(), "http://tracker.internal:9000/api");
    }
}
