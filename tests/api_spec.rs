use axum::http::StatusCode;
use axum_test::TestServer;
use trackboard::api::create_router;
use trackboard::db::Database;
use trackboard::models::*;
use uuid::Uuid;

fn setup() -> TestServer {
    let db = Database::open_memory().expect("Failed to create database");
    db.migrate().expect("Failed to migrate");
    let app = create_router(db);
    TestServer::new(app).expect("Failed to create test server")
}

async fn create_test_project(server: &TestServer) -> Project {
    server
        .post("/api/projects")
        .json(&CreateProjectInput {
            name: "Test Project".to_string(),
            description: None,
            kind: None,
        })
        .await
        .json::<Project>()
}

async fn create_test_task(server: &TestServer, column_id: Uuid, title: &str) -> Task {
    server
        .post("/api/tasks")
        .json(&CreateTaskInput {
            title: title.to_string(),
            column_id,
            ..Default::default()
        })
        .await
        .json::<Task>()
}

async fn fetch_project(server: &TestServer, id: Uuid) -> Project {
    server
        .get(&format!("/api/projects/{}", id))
        .await
        .json::<Project>()
}

mod health {
    use super::*;

    #[tokio::test]
    async fn reports_healthy() {
        let server = setup();
        let response = server.get("/api/health").await;

        response.assert_status_ok();
        response.assert_json(&serde_json::json!({ "status": "healthy" }));
    }
}

mod projects {
    use super::*;

    #[tokio::test]
    async fn creates_project_with_default_columns() {
        let server = setup();
        let response = server
            .post("/api/projects")
            .json(&serde_json::json!({ "name": "Launch", "type": "internal" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let project: Project = response.json();
        assert_eq!(project.kind, ProjectType::Internal);
        assert_eq!(project.columns.len(), DEFAULT_COLUMNS.len());
    }

    #[tokio::test]
    async fn rejects_blank_name() {
        let server = setup();
        let response = server
            .post("/api/projects")
            .json(&serde_json::json!({ "name": "" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn lists_summaries_with_task_counts() {
        let server = setup();
        let project = create_test_project(&server).await;
        create_test_task(&server, project.columns[0].id, "One").await;

        let response = server.get("/api/projects").await;

        response.assert_status_ok();
        let projects: Vec<ProjectSummary> = response.json();
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].task_count, 1);
    }

    #[tokio::test]
    async fn returns_404_for_unknown_project() {
        let server = setup();
        let response = server
            .get(&format!("/api/projects/{}", Uuid::new_v4()))
            .await;

        response.assert_status_not_found();
    }

    #[tokio::test]
    async fn updates_and_archives() {
        let server = setup();
        let project = create_test_project(&server).await;

        let response = server
            .put(&format!("/api/projects/{}", project.id))
            .json(&UpdateProjectInput {
                archived: Some(true),
                ..Default::default()
            })
            .await;

        response.assert_status_ok();
        assert!(response.json::<Project>().archived);
        let projects: Vec<ProjectSummary> = server.get("/api/projects").await.json();
        assert!(projects.is_empty());
    }

    #[tokio::test]
    async fn deletes_project() {
        let server = setup();
        let project = create_test_project(&server).await;

        server
            .delete(&format!("/api/projects/{}", project.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/projects/{}", project.id))
            .await
            .assert_status_not_found();
    }
}

mod tasks {
    use super::*;

    #[tokio::test]
    async fn creates_task_at_end_of_column() {
        let server = setup();
        let project = create_test_project(&server).await;
        let column_id = project.columns[1].id;

        create_test_task(&server, column_id, "First").await;
        let response = server
            .post("/api/tasks")
            .json(&CreateTaskInput {
                title: "Second".to_string(),
                column_id,
                priority: Some(Priority::High),
                ..Default::default()
            })
            .await;

        response.assert_status(StatusCode::CREATED);
        let task: Task = response.json();
        assert_eq!(task.position, 1);
        assert_eq!(task.priority, Priority::High);
    }

    #[tokio::test]
    async fn rejects_unknown_column() {
        let server = setup();
        let response = server
            .post("/api/tasks")
            .json(&CreateTaskInput {
                title: "Lost".to_string(),
                column_id: Uuid::new_v4(),
                ..Default::default()
            })
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn reorders_in_one_batch() {
        let server = setup();
        let project = create_test_project(&server).await;
        let backlog = project.columns[0].id;
        let done = project.columns[4].id;
        let a = create_test_task(&server, backlog, "A").await;
        let b = create_test_task(&server, backlog, "B").await;

        let response = server
            .put("/api/tasks")
            .json(&ReorderTasksInput {
                tasks: vec![
                    TaskPlacement {
                        id: b.id,
                        column_id: backlog,
                        position: 0,
                    },
                    TaskPlacement {
                        id: a.id,
                        column_id: done,
                        position: 0,
                    },
                ],
            })
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
        let board = fetch_project(&server, project.id).await;
        assert_eq!(board.columns[0].tasks[0].id, b.id);
        assert_eq!(board.columns[4].tasks[0].id, a.id);
    }

    #[tokio::test]
    async fn reorder_body_uses_tasks_key() {
        let server = setup();
        let project = create_test_project(&server).await;
        let task = create_test_task(&server, project.columns[0].id, "A").await;

        let response = server
            .put("/api/tasks")
            .json(&serde_json::json!({
                "tasks": [
                    { "id": task.id, "column_id": project.columns[2].id, "position": 0 }
                ]
            }))
            .await;

        response.assert_status(StatusCode::NO_CONTENT);
        let moved: Task = server.get(&format!("/api/tasks/{}", task.id)).await.json();
        assert_eq!(moved.column_id, project.columns[2].id);
    }

    #[tokio::test]
    async fn gets_task_with_detail() {
        let server = setup();
        let project = create_test_project(&server).await;
        let task = create_test_task(&server, project.columns[0].id, "A").await;
        server
            .post("/api/comments")
            .json(&CreateCommentInput {
                content: "Note".to_string(),
                task_id: task.id,
                author_name: None,
            })
            .await
            .assert_status(StatusCode::CREATED);

        let response = server.get(&format!("/api/tasks/{}", task.id)).await;

        response.assert_status_ok();
        let found: Task = response.json();
        assert_eq!(found.comments.len(), 1);
        assert_eq!(found.comments[0].author_name, DEFAULT_AUTHOR);
        assert_eq!(found.comments_count, 1);
    }

    #[tokio::test]
    async fn updates_task() {
        let server = setup();
        let project = create_test_project(&server).await;
        let task = create_test_task(&server, project.columns[0].id, "A").await;

        let response = server
            .put(&format!("/api/tasks/{}", task.id))
            .json(&UpdateTaskInput {
                title: Some("Renamed".to_string()),
                ..Default::default()
            })
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Task>().title, "Renamed");
    }

    #[tokio::test]
    async fn deletes_task() {
        let server = setup();
        let project = create_test_project(&server).await;
        let task = create_test_task(&server, project.columns[0].id, "A").await;

        server
            .delete(&format!("/api/tasks/{}", task.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get(&format!("/api/tasks/{}", task.id))
            .await
            .assert_status_not_found();
    }
}

mod checklists {
    use super::*;

    #[tokio::test]
    async fn builds_checklist_and_toggles_item() {
        let server = setup();
        let project = create_test_project(&server).await;
        let task = create_test_task(&server, project.columns[0].id, "A").await;

        let checklist: Checklist = server
            .post("/api/checklists")
            .json(&CreateChecklistInput {
                title: "Steps".to_string(),
                task_id: task.id,
            })
            .await
            .json();
        let item: ChecklistItem = server
            .post("/api/checklists/items")
            .json(&CreateChecklistItemInput {
                content: "Draft".to_string(),
                checklist_id: checklist.id,
                completed: false,
            })
            .await
            .json();

        let response = server
            .put(&format!("/api/checklists/items/{}", item.id))
            .json(&UpdateChecklistItemInput {
                completed: Some(true),
                ..Default::default()
            })
            .await;
        response.assert_status_ok();

        let board = fetch_project(&server, project.id).await;
        assert_eq!(board.columns[0].tasks[0].checklist_progress(), (1, 1));
    }

    #[tokio::test]
    async fn returns_404_for_unknown_item() {
        let server = setup();
        server
            .put(&format!("/api/checklists/items/{}", Uuid::new_v4()))
            .json(&UpdateChecklistItemInput::default())
            .await
            .assert_status_not_found();
        server
            .delete(&format!("/api/checklists/{}", Uuid::new_v4()))
            .await
            .assert_status_not_found();
    }
}

mod comments {
    use super::*;

    #[tokio::test]
    async fn rejects_comment_on_unknown_task() {
        let server = setup();
        let response = server
            .post("/api/comments")
            .json(&CreateCommentInput {
                content: "Hello".to_string(),
                task_id: Uuid::new_v4(),
                author_name: None,
            })
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn edits_and_deletes_comment() {
        let server = setup();
        let project = create_test_project(&server).await;
        let task = create_test_task(&server, project.columns[0].id, "A").await;
        let comment: Comment = server
            .post("/api/comments")
            .json(&CreateCommentInput {
                content: "Typo".to_string(),
                task_id: task.id,
                author_name: Some("Dana".to_string()),
            })
            .await
            .json();

        let updated: Comment = server
            .put(&format!("/api/comments/{}", comment.id))
            .json(&UpdateCommentInput {
                content: Some("Fixed".to_string()),
            })
            .await
            .json();
        assert_eq!(updated.content, "Fixed");
        assert_eq!(updated.author_name, "Dana");

        server
            .delete(&format!("/api/comments/{}", comment.id))
            .await
            .assert_status(StatusCode::NO_CONTENT);
    }
}
