use std::collections::HashSet;

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;

use taskline_core::db::Database;
use taskline_core::models::{CreateTaskInput, Task, UpdateTaskInput};
use taskline_core::views::gantt::{self, GanttChart, GanttConfig};
use taskline_core::views::groups::{self, PersonTasks};
use taskline_core::views::sort::{filter_tasks, sort_tasks, SortConfig, TaskFilter};
use taskline_core::{dates, export};

use super::error::ApiError;

/// Multi-select params arrive as comma-separated lists, e.g.
/// `?type=Urgent,Regular&person=<id>,<id>`.
#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub task_type: Option<String>,
    pub status: Option<String>,
    pub project: Option<String>,
    pub person: Option<String>,
    /// Context label for CSV export rows.
    pub context: Option<String>,
}

fn csv_strings(raw: &Option<String>) -> Vec<String> {
    raw.as_deref()
        .map(|s| {
            s.split(',')
                .map(str::trim)
                .filter(|x| !x.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}

fn csv_uuids(raw: &Option<String>) -> Result<Vec<Uuid>, ApiError> {
    csv_strings(raw)
        .into_iter()
        .map(|s| Uuid::parse_str(&s).map_err(|_| ApiError::invalid(format!("invalid id: {s}"))))
        .collect()
}

fn build_filter(query: &TaskQuery) -> Result<TaskFilter, ApiError> {
    Ok(TaskFilter {
        search: query.search.clone(),
        types: csv_strings(&query.task_type),
        statuses: csv_strings(&query.status),
        project_ids: csv_uuids(&query.project)?,
        person_ids: csv_uuids(&query.person)?,
    })
}

/// Apply the configured total order (type/status bands, Done last).
pub fn sort_for_display(db: &Database, mut tasks: Vec<Task>) -> Result<Vec<Task>, ApiError> {
    let config = SortConfig::new(
        &db.list_task_types()?,
        &db.list_task_statuses()?,
        db.done_label()?,
    );
    sort_tasks(&mut tasks, &config, dates::today());
    Ok(tasks)
}

pub async fn list(
    State(db): State<Database>,
    Query(query): Query<TaskQuery>,
) -> Result<Json<Vec<Task>>, ApiError> {
    let filter = build_filter(&query)?;
    let tasks = sort_for_display(&db, filter_tasks(db.list_tasks()?, &filter))?;
    Ok(Json(tasks))
}

pub async fn create(
    State(db): State<Database>,
    Json(input): Json<CreateTaskInput>,
) -> Result<(StatusCode, Json<Task>), ApiError> {
    if input.name.trim().is_empty() {
        return Err(ApiError::invalid("task name cannot be empty"));
    }
    Ok((StatusCode::CREATED, Json(db.create_task(input)?)))
}

pub async fn get(State(db): State<Database>, Path(id): Path<Uuid>) -> Result<Json<Task>, ApiError> {
    db.get_task(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("task {id}")))
}

pub async fn update(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
    Json(input): Json<UpdateTaskInput>,
) -> Result<Json<Task>, ApiError> {
    if !db.update_task(id, input)? {
        return Err(ApiError::not_found(format!("task {id}")));
    }
    db.get_task(id)?
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("task {id}")))
}

pub async fn remove(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    if db.delete_task(id)? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found(format!("task {id}")))
    }
}

/// Tasks bucketed by assignee, in person display order, with a trailing
/// unassigned bucket.
pub async fn by_person(
    State(db): State<Database>,
) -> Result<Json<Vec<PersonTasks>>, ApiError> {
    let tasks = sort_for_display(&db, db.list_tasks()?)?;
    let persons = db.list_persons()?;
    Ok(Json(groups::group_by_person(&tasks, &persons)))
}

#[derive(Debug, Deserialize)]
pub struct GanttQuery {
    /// Window start, `YYYY-MM-DD`. Defaults to today.
    pub start: Option<String>,
    pub weeks: Option<u32>,
    pub px_per_day: Option<f64>,
    /// Comma-separated project ids; absent = all projects.
    pub project: Option<String>,
}

pub async fn gantt(
    State(db): State<Database>,
    Query(query): Query<GanttQuery>,
) -> Result<Json<GanttChart>, ApiError> {
    let today = dates::today();
    let chart_start = match query.start.as_deref() {
        None => today,
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .map_err(|_| ApiError::invalid(format!("invalid start date: {raw}")))?,
    };
    let project_ids = csv_uuids(&query.project)?;
    let scope: Option<HashSet<Uuid>> = if project_ids.is_empty() {
        None
    } else {
        Some(project_ids.into_iter().collect())
    };

    let config = GanttConfig {
        chart_start,
        range_weeks: query.weeks.unwrap_or(8),
        px_per_day: query.px_per_day.unwrap_or(20.0),
        scope,
    };
    let chart = gantt::layout(&db.list_tasks()?, &db.list_projects()?, &config, today);
    Ok(Json(chart))
}

pub async fn export(
    State(db): State<Database>,
    Query(query): Query<TaskQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = build_filter(&query)?;
    let tasks = sort_for_display(&db, filter_tasks(db.list_tasks()?, &filter))?;
    let csv = export::tasks_to_csv(
        &tasks,
        &db.list_projects()?,
        &db.list_persons()?,
        query.context.as_deref().unwrap_or("All tasks"),
        dates::today(),
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"tasks.csv\"",
            ),
        ],
        csv,
    ))
}
