//! CSV export: flattens a task list to a fixed column set with
//! RFC-4180-style quoting.

use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::dates;
use crate::models::{Person, Project, Task};

const HEADER: &[&str] = &[
    "Context",
    "Task ID",
    "Name",
    "Type",
    "Status",
    "Start Date",
    "Due Date",
    "Working Days Remaining",
    "Project IDs",
    "Project Names",
    "Person IDs",
    "Person Names",
    "Notes",
    "Created At",
    "Updated At",
];

/// Flatten `tasks` into CSV. `context` labels every row (typically the
/// view the export was taken from); id/name lists are joined by `;`.
pub fn tasks_to_csv(
    tasks: &[Task],
    projects: &[Project],
    persons: &[Person],
    context: &str,
    today: NaiveDate,
) -> String {
    let project_names: HashMap<Uuid, &str> =
        projects.iter().map(|p| (p.id, p.name.as_str())).collect();
    let person_names: HashMap<Uuid, &str> =
        persons.iter().map(|p| (p.id, p.name.as_str())).collect();

    let mut out = String::new();
    write_row(&mut out, HEADER.iter().map(|s| s.to_string()));

    for task in tasks {
        let remaining = task
            .due_date
            .as_deref()
            .and_then(|s| dates::working_days_until_due(s, today))
            .map(|n| n.to_string())
            .unwrap_or_default();

        let fields = [
            context.to_string(),
            task.id.to_string(),
            task.name.clone(),
            task.task_type.clone().unwrap_or_default(),
            task.status.clone().unwrap_or_default(),
            task.start_date.clone().unwrap_or_default(),
            task.due_date.clone().unwrap_or_default(),
            remaining,
            join_ids(&task.project_ids),
            join_names(&task.project_ids, &project_names),
            join_ids(&task.person_ids),
            join_names(&task.person_ids, &person_names),
            task.notes.clone().unwrap_or_default(),
            task.created_at.to_rfc3339(),
            task.updated_at.to_rfc3339(),
        ];
        write_row(&mut out, fields.into_iter());
    }
    out
}

fn join_ids(ids: &[Uuid]) -> String {
    ids.iter()
        .map(Uuid::to_string)
        .collect::<Vec<_>>()
        .join(";")
}

fn join_names(ids: &[Uuid], names: &HashMap<Uuid, &str>) -> String {
    ids.iter()
        .map(|id| names.get(id).copied().unwrap_or(""))
        .collect::<Vec<_>>()
        .join(";")
}

fn write_row(out: &mut String, fields: impl Iterator<Item = String>) {
    let mut first = true;
    for field in fields {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(&escape(&field));
    }
    out.push_str("\r\n");
}

/// Quote a field when it contains a comma, quote or line break; embedded
/// quotes are doubled.
fn escape(field: &str) -> String {
    if field.contains(['"', ',', '\r', '\n']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
