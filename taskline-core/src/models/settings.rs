use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User-configurable task type. `ord` defines the sort priority band.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskType {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub ord: i64,
}

/// User-configurable task status. The status whose name matches the
/// configured Done label drives `completed_at` semantics and
/// bottom-of-list sorting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    pub ord: i64,
}

/// One entry of a settings save. Entries carrying an `id` update the
/// existing row in place so foreign-key references survive a rename or
/// reorder; entries without an `id` are inserted. Display order follows
/// the submitted list order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnumItemInput {
    pub id: Option<Uuid>,
    pub name: String,
    pub color: Option<String>,
}
