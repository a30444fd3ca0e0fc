use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use uuid::Uuid;

use taskline_core::db::Database;
use taskline_core::models::{CreatePersonInput, Person, UpdatePersonInput};

use super::error::ApiError;

pub async fn list(State(db): State<Database>) -> Result<Json<Vec<Person>>, ApiError> {
    Ok(Json(db.list_persons()?))
}

pub async fn create(
    State(db): State<Database>,
    Json(input): Json<CreatePersonInput>,
) -> Result<(StatusCode, Json<Person>), ApiError> {
    if input.name.trim().is_empty() {
        return Err(ApiError::invalid("person name cannot be empty"));
    }
    Ok((StatusCode::CREATED, Json(db.create_person(input)?)))
}

pub async fn update(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdatePersonInput>,
) -> Result<Json<Person>, ApiError> {
    if !db.update_person(id, input)? {
        return Err(ApiError::not_found(format!("person {id}")));
    }
    db.get_person(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("person {id}")))
}

pub async fn remove(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if db.delete_person(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("person {id}")))
    }
}
