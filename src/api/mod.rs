mod handlers;

use axum::{
    http::HeaderValue,
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::db::Database;

/// Router with the default CORS origins.
pub fn create_router(db: Database) -> Router {
    create_router_with_config(db, &ServerConfig::default())
}

pub fn create_router_with_config(db: Database, config: &ServerConfig) -> Router {
    let api = Router::new()
        // Projects
        .route(
            "/projects",
            get(handlers::list_projects).post(handlers::create_project),
        )
        .route(
            "/projects/{id}",
            get(handlers::get_project)
                .put(handlers::update_project)
                .delete(handlers::delete_project),
        )
        // Tasks
        .route(
            "/tasks",
            post(handlers::create_task).put(handlers::reorder_tasks),
        )
        .route(
            "/tasks/{id}",
            get(handlers::get_task)
                .put(handlers::update_task)
                .delete(handlers::delete_task),
        )
        // Checklists
        .route("/checklists", post(handlers::create_checklist))
        .route(
            "/checklists/{id}",
            put(handlers::update_checklist).delete(handlers::delete_checklist),
        )
        .route("/checklists/items", post(handlers::create_checklist_item))
        .route(
            "/checklists/items/{id}",
            put(handlers::update_checklist_item).delete(handlers::delete_checklist_item),
        )
        // Comments
        .route("/comments", post(handlers::create_comment))
        .route(
            "/comments/{id}",
            put(handlers::update_comment).delete(handlers::delete_comment),
        )
        // Health
        .route("/health", get(handlers::health));

    Router::new()
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .with_state(db)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    if config.cors_permissive() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
