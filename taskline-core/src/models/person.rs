use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
    pub id: Uuid,
    pub name: String,
    pub color: Option<String>,
    /// Display rank; lower sorts first.
    pub ord: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePersonInput {
    pub name: String,
    pub color: Option<String>,
    pub ord: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePersonInput {
    pub name: Option<String>,
    pub color: Option<String>,
    pub ord: Option<i64>,
}
