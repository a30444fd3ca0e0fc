use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use uuid::Uuid;

use crate::db::{parse_datetime, parse_uuid, Database};
use crate::error::StoreError;
use crate::models::{CreateTaskInput, Task, UpdateTaskInput};

const TASK_COLS: &str = "id, project_id, name, task_type, status, start_date, due_date, notes, \
                         completed_at, created_at, updated_at";

fn row_to_task(row: &Row) -> rusqlite::Result<Task> {
    let completed_at: Option<String> = row.get(8)?;
    Ok(Task {
        id: parse_uuid(0, row.get(0)?)?,
        project_id: parse_uuid(1, row.get(1)?)?,
        name: row.get(2)?,
        task_type: row.get(3)?,
        status: row.get(4)?,
        start_date: row.get(5)?,
        due_date: row.get(6)?,
        notes: row.get(7)?,
        completed_at: completed_at.map(|s| parse_datetime(8, s)).transpose()?,
        created_at: parse_datetime(9, row.get(9)?)?,
        updated_at: parse_datetime(10, row.get(10)?)?,
        project_ids: Vec::new(),
        person_ids: Vec::new(),
    })
}

/// An empty string clears an optional text field; `None` keeps it.
fn apply_text(current: Option<String>, new: Option<String>) -> Option<String> {
    match new {
        None => current,
        Some(s) if s.is_empty() => None,
        Some(s) => Some(s),
    }
}

fn project_exists(conn: &Connection, id: Uuid) -> Result<bool, StoreError> {
    let found = conn
        .query_row("SELECT 1 FROM projects WHERE id = ?1", [id.to_string()], |_| Ok(true))
        .optional()?;
    Ok(found.unwrap_or(false))
}

fn replace_task_projects(
    conn: &Connection,
    task_id: Uuid,
    primary: Uuid,
    extra: &[Uuid],
) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM task_projects WHERE task_id = ?1",
        [task_id.to_string()],
    )?;
    let mut ids = vec![primary];
    for id in extra {
        if !ids.contains(id) {
            ids.push(*id);
        }
    }
    for id in ids {
        conn.execute(
            "INSERT INTO task_projects (task_id, project_id) VALUES (?1, ?2)",
            params![task_id.to_string(), id.to_string()],
        )?;
    }
    Ok(())
}

fn replace_task_persons(
    conn: &Connection,
    task_id: Uuid,
    persons: &[Uuid],
) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM task_persons WHERE task_id = ?1",
        [task_id.to_string()],
    )?;
    for id in persons {
        conn.execute(
            "INSERT OR IGNORE INTO task_persons (task_id, person_id) VALUES (?1, ?2)",
            params![task_id.to_string(), id.to_string()],
        )?;
    }
    Ok(())
}

fn load_joins(conn: &Connection, task: &mut Task) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "SELECT project_id FROM task_projects WHERE task_id = ?1 ORDER BY project_id",
    )?;
    task.project_ids = stmt
        .query_map([task.id.to_string()], |row| parse_uuid(0, row.get(0)?))?
        .collect::<Result<_, _>>()?;

    let mut stmt =
        conn.prepare("SELECT person_id FROM task_persons WHERE task_id = ?1 ORDER BY person_id")?;
    task.person_ids = stmt
        .query_map([task.id.to_string()], |row| parse_uuid(0, row.get(0)?))?
        .collect::<Result<_, _>>()?;
    Ok(())
}

impl Database {
    pub fn create_task(&self, input: CreateTaskInput) -> Result<Task, StoreError> {
        let done_label = self.done_label()?;
        let now = Utc::now();

        // Status set to the Done label at creation counts as completed.
        let completed_at: Option<DateTime<Utc>> = input
            .status
            .as_deref()
            .filter(|s| *s == done_label)
            .map(|_| now);

        let mut task = Task {
            id: Uuid::new_v4(),
            project_id: input.project_id,
            name: input.name,
            task_type: input.task_type.filter(|s| !s.is_empty()),
            status: input.status.filter(|s| !s.is_empty()),
            start_date: input.start_date.filter(|s| !s.is_empty()),
            due_date: input.due_date.filter(|s| !s.is_empty()),
            notes: input.notes.filter(|s| !s.is_empty()),
            completed_at,
            created_at: now,
            updated_at: now,
            project_ids: Vec::new(),
            person_ids: Vec::new(),
        };

        self.with_conn(|conn| {
            if !project_exists(conn, task.project_id)? {
                return Err(StoreError::invalid(format!(
                    "project {} does not exist",
                    task.project_id
                )));
            }

            let tx = conn.transaction()?;
            tx.execute(
                &format!(
                    "INSERT INTO tasks ({TASK_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)"
                ),
                params![
                    task.id.to_string(),
                    task.project_id.to_string(),
                    task.name,
                    task.task_type,
                    task.status,
                    task.start_date,
                    task.due_date,
                    task.notes,
                    task.completed_at.map(|t| t.to_rfc3339()),
                    task.created_at.to_rfc3339(),
                    task.updated_at.to_rfc3339(),
                ],
            )?;
            replace_task_projects(&tx, task.id, task.project_id, &input.project_ids)?;
            replace_task_persons(&tx, task.id, &input.person_ids)?;
            tx.commit()?;

            load_joins(conn, &mut task)?;
            Ok(())
        })?;

        tracing::debug!(task_id = %task.id, "task created");
        Ok(task)
    }

    pub fn get_task(&self, id: Uuid) -> Result<Option<Task>, StoreError> {
        self.with_conn(|conn| {
            let task = conn
                .query_row(
                    &format!("SELECT {TASK_COLS} FROM tasks WHERE id = ?1"),
                    [id.to_string()],
                    row_to_task,
                )
                .optional()?;
            match task {
                Some(mut task) => {
                    load_joins(conn, &mut task)?;
                    Ok(Some(task))
                }
                None => Ok(None),
            }
        })
    }

    /// All tasks with both join sets resolved, in creation order.
    pub fn list_tasks(&self) -> Result<Vec<Task>, StoreError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare(&format!("SELECT {TASK_COLS} FROM tasks ORDER BY created_at"))?;
            let mut tasks = stmt
                .query_map([], row_to_task)?
                .collect::<Result<Vec<_>, _>>()?;

            let mut projects: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
            let mut stmt =
                conn.prepare("SELECT task_id, project_id FROM task_projects ORDER BY project_id")?;
            let rows = stmt.query_map([], |row| {
                Ok((parse_uuid(0, row.get(0)?)?, parse_uuid(1, row.get(1)?)?))
            })?;
            for row in rows {
                let (task_id, project_id) = row?;
                projects.entry(task_id).or_default().push(project_id);
            }

            let mut persons: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
            let mut stmt =
                conn.prepare("SELECT task_id, person_id FROM task_persons ORDER BY person_id")?;
            let rows = stmt.query_map([], |row| {
                Ok((parse_uuid(0, row.get(0)?)?, parse_uuid(1, row.get(1)?)?))
            })?;
            for row in rows {
                let (task_id, person_id) = row?;
                persons.entry(task_id).or_default().push(person_id);
            }

            for task in &mut tasks {
                task.project_ids = projects.remove(&task.id).unwrap_or_default();
                task.person_ids = persons.remove(&task.id).unwrap_or_default();
            }
            Ok(tasks)
        })
    }

    /// Partial update. Setting the status to the configured Done label
    /// stamps `completed_at`; moving off it clears the stamp. Join sets
    /// are replaced wholesale when present in the input.
    pub fn update_task(&self, id: Uuid, input: UpdateTaskInput) -> Result<bool, StoreError> {
        let done_label = self.done_label()?;

        self.with_conn(|conn| {
            let current = conn
                .query_row(
                    &format!("SELECT {TASK_COLS} FROM tasks WHERE id = ?1"),
                    [id.to_string()],
                    row_to_task,
                )
                .optional()?;
            let Some(current) = current else {
                return Ok(false);
            };

            let primary = input.project_id.unwrap_or(current.project_id);
            if !project_exists(conn, primary)? {
                return Err(StoreError::invalid(format!("project {primary} does not exist")));
            }

            let was_done = current.status.as_deref() == Some(done_label.as_str());
            let status = apply_text(current.status, input.status);
            let is_done = status.as_deref() == Some(done_label.as_str());
            let completed_at = match (was_done, is_done) {
                (false, true) => Some(Utc::now()),
                (true, false) => None,
                _ => current.completed_at,
            };

            let name = input.name.unwrap_or(current.name);
            let task_type = apply_text(current.task_type, input.task_type);
            let start_date = apply_text(current.start_date, input.start_date);
            let due_date = apply_text(current.due_date, input.due_date);
            let notes = apply_text(current.notes, input.notes);

            let tx = conn.transaction()?;
            tx.execute(
                "UPDATE tasks SET
                     project_id = ?2, name = ?3, task_type = ?4, status = ?5,
                     start_date = ?6, due_date = ?7, notes = ?8,
                     completed_at = ?9, updated_at = ?10
                 WHERE id = ?1",
                params![
                    id.to_string(),
                    primary.to_string(),
                    name,
                    task_type,
                    status,
                    start_date,
                    due_date,
                    notes,
                    completed_at.map(|t| t.to_rfc3339()),
                    Utc::now().to_rfc3339(),
                ],
            )?;

            match input.project_ids {
                Some(extra) => replace_task_projects(&tx, id, primary, &extra)?,
                None if input.project_id.is_some() => {
                    // Primary changed without an explicit join list: make
                    // sure the new primary is in the join set.
                    tx.execute(
                        "INSERT OR IGNORE INTO task_projects (task_id, project_id) VALUES (?1, ?2)",
                        params![id.to_string(), primary.to_string()],
                    )?;
                }
                None => {}
            }
            if let Some(persons) = input.person_ids {
                replace_task_persons(&tx, id, &persons)?;
            }
            tx.commit()?;
            Ok(true)
        })
    }

    pub fn delete_task(&self, id: Uuid) -> Result<bool, StoreError> {
        self.with_conn(|conn| {
            let deleted = conn.execute("DELETE FROM tasks WHERE id = ?1", [id.to_string()])?;
            Ok(deleted > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CreatePersonInput, CreateProjectInput};

    fn db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn project(db: &Database, name: &str) -> Uuid {
        db.create_project(CreateProjectInput {
            name: name.into(),
            notes: None,
        })
        .unwrap()
        .id
    }

    fn task_input(project_id: Uuid, name: &str) -> CreateTaskInput {
        CreateTaskInput {
            project_id,
            name: name.into(),
            task_type: None,
            status: None,
            start_date: None,
            due_date: None,
            notes: None,
            project_ids: Vec::new(),
            person_ids: Vec::new(),
        }
    }

    #[test]
    fn create_writes_primary_join_row() {
        let db = db();
        let p = project(&db, "Apollo");
        let task = db.create_task(task_input(p, "write brief")).unwrap();
        assert_eq!(task.project_ids, vec![p]);
    }

    #[test]
    fn create_rejects_unknown_project() {
        let db = db();
        project(&db, "Apollo");
        let err = db.create_task(task_input(Uuid::new_v4(), "orphan")).unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[test]
    fn status_to_done_sets_completed_at() {
        let db = db();
        let p = project(&db, "Apollo");
        let task = db.create_task(task_input(p, "ship it")).unwrap();
        assert!(task.completed_at.is_none());

        db.update_task(
            task.id,
            UpdateTaskInput {
                status: Some("Done".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let task = db.get_task(task.id).unwrap().unwrap();
        assert_eq!(task.status.as_deref(), Some("Done"));
        assert!(task.completed_at.is_some());

        db.update_task(
            task.id,
            UpdateTaskInput {
                status: Some("Must do".into()),
                ..Default::default()
            },
        )
        .unwrap();
        let task = db.get_task(task.id).unwrap().unwrap();
        assert!(task.completed_at.is_none());
    }

    #[test]
    fn create_with_done_status_is_completed() {
        let db = db();
        let p = project(&db, "Apollo");
        let mut input = task_input(p, "already done");
        input.status = Some("Done".into());
        let task = db.create_task(input).unwrap();
        assert!(task.completed_at.is_some());
    }

    #[test]
    fn empty_string_clears_due_date() {
        let db = db();
        let p = project(&db, "Apollo");
        let mut input = task_input(p, "dated");
        input.due_date = Some("5/Mar".into());
        let task = db.create_task(input).unwrap();

        db.update_task(
            task.id,
            UpdateTaskInput {
                due_date: Some(String::new()),
                ..Default::default()
            },
        )
        .unwrap();
        let task = db.get_task(task.id).unwrap().unwrap();
        assert!(task.due_date.is_none());
    }

    #[test]
    fn join_sets_replaced_wholesale() {
        let db = db();
        let p1 = project(&db, "Apollo");
        let p2 = project(&db, "Artemis");
        let person = db
            .create_person(CreatePersonInput {
                name: "Ada".into(),
                color: None,
                ord: None,
            })
            .unwrap();

        let mut input = task_input(p1, "shared");
        input.project_ids = vec![p2];
        input.person_ids = vec![person.id];
        let task = db.create_task(input).unwrap();
        assert_eq!(task.project_ids.len(), 2);
        assert_eq!(task.person_ids, vec![person.id]);

        db.update_task(
            task.id,
            UpdateTaskInput {
                project_ids: Some(Vec::new()),
                person_ids: Some(Vec::new()),
                ..Default::default()
            },
        )
        .unwrap();
        let task = db.get_task(task.id).unwrap().unwrap();
        // The primary project always survives a join replace.
        assert_eq!(task.project_ids, vec![p1]);
        assert!(task.person_ids.is_empty());
    }

    #[test]
    fn deleting_project_cascades_its_tasks() {
        let db = db();
        let p1 = project(&db, "Apollo");
        let p2 = project(&db, "Artemis");
        let task = db.create_task(task_input(p2, "doomed")).unwrap();

        db.delete_project(p2).unwrap();
        assert!(db.get_task(task.id).unwrap().is_none());
        assert!(db.get_project(p1).unwrap().is_some());
    }

    #[test]
    fn deleting_secondary_project_keeps_task() {
        let db = db();
        let p1 = project(&db, "Apollo");
        let p2 = project(&db, "Artemis");
        let mut input = task_input(p1, "survivor");
        input.project_ids = vec![p2];
        let task = db.create_task(input).unwrap();

        db.delete_project(p2).unwrap();
        let task = db.get_task(task.id).unwrap().unwrap();
        assert_eq!(task.project_ids, vec![p1]);
    }

    #[test]
    fn deleting_person_keeps_task() {
        let db = db();
        let p = project(&db, "Apollo");
        let person = db
            .create_person(CreatePersonInput {
                name: "Ada".into(),
                color: None,
                ord: None,
            })
            .unwrap();
        let mut input = task_input(p, "assigned");
        input.person_ids = vec![person.id];
        let task = db.create_task(input).unwrap();

        db.delete_person(person.id).unwrap();
        let task = db.get_task(task.id).unwrap().unwrap();
        assert!(task.person_ids.is_empty());
    }

    #[test]
    fn scoped_listing_includes_secondary_membership() {
        let db = db();
        let p1 = project(&db, "Apollo");
        let p2 = project(&db, "Artemis");
        db.create_task(task_input(p1, "only apollo")).unwrap();
        let mut input = task_input(p1, "both");
        input.project_ids = vec![p2];
        db.create_task(input).unwrap();

        let scoped = db.tasks_for_project(p2).unwrap();
        let names: Vec<_> = scoped.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["both"]);
    }
}
