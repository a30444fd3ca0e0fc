use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use taskline_core::db::Database;
use taskline_core::models::{CreateProjectInput, Project, Task, UpdateProjectInput};

use super::error::ApiError;
use super::tasks::sort_for_display;

pub async fn list(State(db): State<Database>) -> Result<Json<Vec<Project>>, ApiError> {
    Ok(Json(db.list_projects()?))
}

pub async fn create(
    State(db): State<Database>,
    Json(input): Json<CreateProjectInput>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
    if input.name.trim().is_empty() {
        return Err(ApiError::invalid("project name cannot be empty"));
    }
    Ok((StatusCode::CREATED, Json(db.create_project(input)?)))
}

pub async fn get(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Project>, ApiError> {
    db.get_project(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("project {id}")))
}

pub async fn update(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateProjectInput>,
) -> Result<Json<Project>, ApiError> {
    if !db.update_project(id, input)? {
        return Err(ApiError::not_found(format!("project {id}")));
    }
    db.get_project(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("project {id}")))
}

pub async fn remove(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if db.delete_project(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("project {id}")))
    }
}

/// Tasks associated with the project (primary or secondary), in display
/// order.
pub async fn tasks(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Task>>, ApiError> {
    if db.get_project(id)?.is_none() {
        return Err(ApiError::not_found(format!("project {id}")));
    }
    let tasks = sort_for_display(&db, db.tasks_for_project(id)?)?;
    Ok(Json(tasks))
}
