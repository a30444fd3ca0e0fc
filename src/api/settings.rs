//! Settings surface: the configurable enumerations, saved as full lists.
//! Replacement is an id-preserving diff in the store, so resubmitted ids
//! keep their identity across renames and reorders.

use axum::extract::State;
use axum::Json;

use taskline_core::db::Database;
use taskline_core::models::{EnumItemInput, Person, TaskStatus, TaskType};

use super::error::ApiError;

pub async fn list_types(State(db): State<Database>) -> Result<Json<Vec<TaskType>>, ApiError> {
    Ok(Json(db.list_task_types()?))
}

pub async fn replace_types(
    State(db): State<Database>,
    Json(items): Json<Vec<EnumItemInput>>,
) -> Result<Json<Vec<TaskType>>, ApiError> {
    Ok(Json(db.replace_task_types(&items)?))
}

pub async fn list_statuses(State(db): State<Database>) -> Result<Json<Vec<TaskStatus>>, ApiError> {
    Ok(Json(db.list_task_statuses()?))
}

pub async fn replace_statuses(
    State(db): State<Database>,
    Json(items): Json<Vec<EnumItemInput>>,
) -> Result<Json<Vec<TaskStatus>>, ApiError> {
    Ok(Json(db.replace_task_statuses(&items)?))
}

pub async fn list_persons(State(db): State<Database>) -> Result<Json<Vec<Person>>, ApiError> {
    Ok(Json(db.list_persons()?))
}

pub async fn replace_persons(
    State(db): State<Database>,
    Json(items): Json<Vec<EnumItemInput>>,
) -> Result<Json<Vec<Person>>, ApiError> {
    Ok(Json(db.replace_persons(&items)?))
}
