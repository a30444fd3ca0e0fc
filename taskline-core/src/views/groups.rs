//! Person/project aggregation views: bucket tasks by assignee or by
//! project membership for display.

use serde::Serialize;

use crate::models::{Person, Project, Task};

/// Tasks bucketed under one person. `person` is `None` for the trailing
/// unassigned bucket.
#[derive(Debug, Clone, Serialize)]
pub struct PersonTasks {
    pub person: Option<Person>,
    pub tasks: Vec<Task>,
}

/// Tasks bucketed under one project (membership via the join set, not
/// just the primary project).
#[derive(Debug, Clone, Serialize)]
pub struct ProjectTasks {
    pub project: Project,
    pub tasks: Vec<Task>,
}

/// One bucket per person in display order; a task assigned to several
/// people appears in each of their buckets. Tasks with no assignee land
/// in a final unassigned bucket, which is omitted when empty.
pub fn group_by_person(tasks: &[Task], persons: &[Person]) -> Vec<PersonTasks> {
    let mut ordered: Vec<&Person> = persons.iter().collect();
    ordered.sort_by(|a, b| a.ord.cmp(&b.ord).then_with(|| a.name.cmp(&b.name)));

    let mut groups: Vec<PersonTasks> = ordered
        .into_iter()
        .map(|person| PersonTasks {
            person: Some(person.clone()),
            tasks: tasks
                .iter()
                .filter(|t| t.person_ids.contains(&person.id))
                .cloned()
                .collect(),
        })
        .collect();

    let unassigned: Vec<Task> = tasks
        .iter()
        .filter(|t| t.person_ids.is_empty())
        .cloned()
        .collect();
    if !unassigned.is_empty() {
        groups.push(PersonTasks {
            person: None,
            tasks: unassigned,
        });
    }
    groups
}

/// One bucket per project, in the given project order; a task appears in
/// the bucket of every project it is associated with.
pub fn group_by_project(tasks: &[Task], projects: &[Project]) -> Vec<ProjectTasks> {
    projects
        .iter()
        .map(|project| ProjectTasks {
            project: project.clone(),
            tasks: tasks
                .iter()
                .filter(|t| t.project_ids.contains(&project.id))
                .cloned()
                .collect(),
        })
        .collect()
}
