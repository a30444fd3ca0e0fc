use chrono::Utc;
use rusqlite::{params, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{parse_datetime, parse_uuid, Database};
use crate::error::StoreError;
use crate::models::{CreateProjectInput, Project, Task, UpdateProjectInput};

fn row_to_project(row: &Row) -> rusqlite::Result<Project> {
    Ok(Project {
        id: parse_uuid(0, row.get(0)?)?,
        name: row.get(1)?,
        notes: row.get(2)?,
        created_at: parse_datetime(3, row.get(3)?)?,
        updated_at: parse_datetime(4, row.get(4)?)?,
    })
}

const PROJECT_COLS: &str = "id, name, notes, created_at, updated_at";

impl Database {
    pub fn create_project(&self, input: CreateProjectInput) -> Result<Project, StoreError> {
        let project = Project {
            id: Uuid::new_v4(),
            name: input.name,
            notes: input.notes,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO projects (id, name, notes, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    project.id.to_string(),
                    project.name,
                    project.notes,
                    project.created_at.to_rfc3339(),
                    project.updated_at.to_rfc3339(),
                ],
            )?;
            Ok(())
        })?;

        tracing::debug!(project_id = %project.id, "project created");
        Ok(project)
    }

    pub fn get_project(&self, id: Uuid) -> Result<Option<Project>, StoreError> {
        self.with_conn(|conn| {
            let project = conn
                .query_row(
                    &format!("SELECT {PROJECT_COLS} FROM projects WHERE id = ?1"),
                    [id.to_string()],
                    row_to_project,
                )
                .optional()?;
            Ok(project)
        })
    }

    pub fn list_projects(&self) -> Result<Vec<Project>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {PROJECT_COLS} FROM projects ORDER BY name COLLATE NOCASE"
            ))?;
            let projects = stmt
                .query_map([], row_to_project)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(projects)
        })
    }

    pub fn update_project(&self, id: Uuid, input: UpdateProjectInput) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE projects SET
                     name = COALESCE(?2, name),
                     notes = COALESCE(?3, notes),
                     updated_at = ?4
                 WHERE id = ?1",
                params![
                    id.to_string(),
                    input.name,
                    input.notes,
                    Utc::now().to_rfc3339(),
                ],
            )?;
            Ok(updated > 0)
        })
    }

    /// Delete a project, cascading to its primary tasks and all join
    /// rows. Deleting the last remaining project is rejected: the tracker
    /// must always have at least one project.
    pub fn delete_project(&self, id: Uuid) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let exists: bool = conn
                .query_row(
                    "SELECT 1 FROM projects WHERE id = ?1",
                    [id.to_string()],
                    |_| Ok(true),
                )
                .optional()?
                .unwrap_or(false);
            if !exists {
                return Ok(false);
            }

            let total: i64 = conn.query_row("SELECT COUNT(*) FROM projects", [], |row| row.get(0))?;
            if total <= 1 {
                return Err(StoreError::invalid("cannot delete the last project"));
            }

            conn.execute("DELETE FROM projects WHERE id = ?1", [id.to_string()])?;
            tracing::debug!(project_id = %id, "project deleted");
            Ok(true)
        })
    }

    /// Tasks associated with a project, primary or secondary, via the
    /// join table.
    pub fn tasks_for_project(&self, id: Uuid) -> Result<Vec<Task>, StoreError> {
        let tasks = self.list_tasks()?;
        Ok(tasks
            .into_iter()
            .filter(|t| t.project_ids.contains(&id))
            .collect())
    }
}
