use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A task as loaded from the store, with both join sets resolved.
///
/// `task_type` and `status` are free-form tags validated only against the
/// configured enumerations, not a closed enum: users can add, rename and
/// reorder them at any time. `start_date`/`due_date` are display strings
/// (`5/Mar`, `today`, `2026-03-05`, ...); parsing happens in the view
/// engines and an unparseable value simply means "no date".
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: Uuid,
    /// Primary project. Always present in `project_ids` as well.
    pub project_id: Uuid,
    pub name: String,
    pub task_type: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub notes: Option<String>,
    /// Non-null iff `status` equals the configured Done label.
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub project_ids: Vec<Uuid>,
    #[serde(default)]
    pub person_ids: Vec<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskInput {
    pub project_id: Uuid,
    pub name: String,
    pub task_type: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub notes: Option<String>,
    /// Additional project associations beyond the primary one.
    #[serde(default)]
    pub project_ids: Vec<Uuid>,
    #[serde(default)]
    pub person_ids: Vec<Uuid>,
}

/// Partial update. Fields left as `None` are kept; an empty string clears
/// an optional text field. The join sets are replaced wholesale when
/// present.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTaskInput {
    pub project_id: Option<Uuid>,
    pub name: Option<String>,
    pub task_type: Option<String>,
    pub status: Option<String>,
    pub start_date: Option<String>,
    pub due_date: Option<String>,
    pub notes: Option<String>,
    pub project_ids: Option<Vec<Uuid>>,
    pub person_ids: Option<Vec<Uuid>>,
}
