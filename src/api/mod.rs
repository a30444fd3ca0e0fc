//! HTTP API: REST resource endpoints with JSON bodies, plus the derived
//! views (filtered/sorted listing, by-person aggregation, Gantt layout,
//! CSV export).

mod error;
mod persons;
mod projects;
mod settings;
mod tasks;

pub use error::ApiError;

use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use taskline_core::db::Database;

pub fn create_router(db: Database) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/projects", get(projects::list).post(projects::create))
        .route(
            "/projects/{id}",
            get(projects::get)
                .put(projects::update)
                .delete(projects::remove),
        )
        .route("/projects/{id}/tasks", get(projects::tasks))
        .route("/tasks", get(tasks::list).post(tasks::create))
        .route("/tasks/by-person", get(tasks::by_person))
        .route("/tasks/gantt", get(tasks::gantt))
        .route("/tasks/export", get(tasks::export))
        .route(
            "/tasks/{id}",
            get(tasks::get).put(tasks::update).delete(tasks::remove),
        )
        .route("/persons", get(persons::list).post(persons::create))
        .route(
            "/persons/{id}",
            axum::routing::put(persons::update).delete(persons::remove),
        )
        .route(
            "/settings/types",
            get(settings::list_types).put(settings::replace_types),
        )
        .route(
            "/settings/statuses",
            get(settings::list_statuses).put(settings::replace_statuses),
        )
        .route(
            "/settings/persons",
            get(settings::list_persons).put(settings::replace_persons),
        )
        .with_state(db)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn health() -> &'static str {
    "ok"
}
