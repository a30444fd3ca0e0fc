//! Settings persistence: the user-configurable enumerations and the
//! Done label.
//!
//! A settings save submits the full list for one enumeration. Instead of
//! the delete-all-then-recreate the UI could get away with, the replace
//! operations diff against the existing rows by id: rows whose id is
//! resubmitted are updated in place, rows without an id are inserted,
//! rows missing from the submission are deleted. Join rows referencing a
//! kept person therefore survive a rename or reorder.

use std::collections::HashSet;

use rusqlite::{params, Connection, Row};
use uuid::Uuid;

use crate::db::{parse_uuid, Database};
use crate::error::StoreError;
use crate::models::{EnumItemInput, Person, TaskStatus, TaskType};

fn row_to_type(row: &Row) -> rusqlite::Result<TaskType> {
    Ok(TaskType {
        id: parse_uuid(0, row.get(0)?)?,
        name: row.get(1)?,
        color: row.get(2)?,
        ord: row.get(3)?,
    })
}

fn row_to_status(row: &Row) -> rusqlite::Result<TaskStatus> {
    Ok(TaskStatus {
        id: parse_uuid(0, row.get(0)?)?,
        name: row.get(1)?,
        color: row.get(2)?,
        ord: row.get(3)?,
    })
}

/// Id-preserving replace of one enumeration table. Display order follows
/// the submitted list order.
fn replace_enum_table(
    conn: &mut Connection,
    table: &str,
    items: &[EnumItemInput],
) -> Result<(), StoreError> {
    let tx = conn.transaction()?;

    let mut kept: HashSet<String> = HashSet::new();
    for (ord, item) in items.iter().enumerate() {
        let id = item.id.unwrap_or_else(Uuid::new_v4).to_string();
        tx.execute(
            &format!(
                "INSERT INTO {table} (id, name, color, ord) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET name = ?2, color = ?3, ord = ?4"
            ),
            params![id, item.name, item.color, ord as i64],
        )?;
        kept.insert(id);
    }

    let existing: Vec<String> = {
        let mut stmt = tx.prepare(&format!("SELECT id FROM {table}"))?;
        let ids = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        ids
    };
    for id in existing {
        if !kept.contains(&id) {
            tx.execute(&format!("DELETE FROM {table} WHERE id = ?1"), [id])?;
        }
    }

    tx.commit()?;
    Ok(())
}

impl Database {
    pub fn list_task_types(&self) -> Result<Vec<TaskType>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, color, ord FROM task_types ORDER BY ord, name")?;
            let types = stmt
                .query_map([], row_to_type)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(types)
        })
    }

    pub fn replace_task_types(
        &self,
        items: &[EnumItemInput],
    ) -> Result<Vec<TaskType>, StoreError> {
        self.with_conn(|conn| replace_enum_table(conn, "task_types", items))?;
        tracing::debug!(count = items.len(), "task types replaced");
        self.list_task_types()
    }

    pub fn list_task_statuses(&self) -> Result<Vec<TaskStatus>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, color, ord FROM task_statuses ORDER BY ord, name")?;
            let statuses = stmt
                .query_map([], row_to_status)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(statuses)
        })
    }

    pub fn replace_task_statuses(
        &self,
        items: &[EnumItemInput],
    ) -> Result<Vec<TaskStatus>, StoreError> {
        self.with_conn(|conn| replace_enum_table(conn, "task_statuses", items))?;
        tracing::debug!(count = items.len(), "task statuses replaced");
        self.list_task_statuses()
    }

    /// Id-preserving replace of the people list; task assignments of kept
    /// ids survive.
    pub fn replace_persons(&self, items: &[EnumItemInput]) -> Result<Vec<Person>, StoreError> {
        self.with_conn(|conn| replace_enum_table(conn, "persons", items))?;
        tracing::debug!(count = items.len(), "persons replaced");
        self.list_persons()
    }

    /// The status name currently recognized as "completed".
    pub fn done_label(&self) -> Result<String, StoreError> {
        self.with_conn(|conn| {
            let label: String = conn.query_row(
                "SELECT value FROM config WHERE key = 'done_label'",
                [],
                |row| row.get(0),
            )?;
            Ok(label)
        })
    }

    pub fn set_done_label(&self, label: &str) -> Result<(), StoreError> {
        if label.is_empty() {
            return Err(StoreError::invalid("done label cannot be empty"));
        }
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO config (key, value) VALUES ('done_label', ?1)
                 ON CONFLICT(key) DO UPDATE SET value = ?1",
                [label],
            )?;
            Ok(())
        })
    }
}
