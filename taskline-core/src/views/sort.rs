//! Task filtering and the configurable total order.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::dates;
use crate::models::{Task, TaskStatus, TaskType};

/// Multi-criteria task filter. Criteria are AND-combined; each
/// multi-select is OR-combined internally; an empty criterion applies no
/// constraint, so the default filter passes everything.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Case-insensitive substring match on the task name.
    pub search: Option<String>,
    pub types: Vec<String>,
    pub statuses: Vec<String>,
    pub project_ids: Vec<Uuid>,
    pub person_ids: Vec<Uuid>,
}

impl TaskFilter {
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(query) = &self.search {
            let query = query.to_lowercase();
            if !query.is_empty() && !task.name.to_lowercase().contains(&query) {
                return false;
            }
        }
        if !self.types.is_empty() {
            let hit = task
                .task_type
                .as_deref()
                .is_some_and(|t| self.types.iter().any(|x| x == t));
            if !hit {
                return false;
            }
        }
        if !self.statuses.is_empty() {
            let hit = task
                .status
                .as_deref()
                .is_some_and(|s| self.statuses.iter().any(|x| x == s));
            if !hit {
                return false;
            }
        }
        if !self.project_ids.is_empty()
            && !task.project_ids.iter().any(|p| self.project_ids.contains(p))
        {
            return false;
        }
        if !self.person_ids.is_empty()
            && !task.person_ids.iter().any(|p| self.person_ids.contains(p))
        {
            return false;
        }
        true
    }
}

/// Keep the tasks matching `filter`, preserving input order.
pub fn filter_tasks(tasks: Vec<Task>, filter: &TaskFilter) -> Vec<Task> {
    tasks.into_iter().filter(|t| filter.matches(t)).collect()
}

/// Sort configuration derived from the user's settings: the type/status
/// priority bands and the Done label.
#[derive(Debug, Clone)]
pub struct SortConfig {
    type_rank: HashMap<String, usize>,
    status_rank: HashMap<String, usize>,
    done_label: String,
}

impl SortConfig {
    pub fn new(types: &[TaskType], statuses: &[TaskStatus], done_label: impl Into<String>) -> Self {
        Self {
            type_rank: types
                .iter()
                .enumerate()
                .map(|(i, t)| (t.name.clone(), i))
                .collect(),
            status_rank: statuses
                .iter()
                .enumerate()
                .map(|(i, s)| (s.name.clone(), i))
                .collect(),
            done_label: done_label.into(),
        }
    }

    fn is_done(&self, task: &Task) -> bool {
        task.status.as_deref() == Some(self.done_label.as_str())
    }

    /// Unknown or missing tags sort after every configured band.
    fn type_rank(&self, task: &Task) -> usize {
        task.task_type
            .as_deref()
            .and_then(|t| self.type_rank.get(t))
            .copied()
            .unwrap_or(usize::MAX)
    }

    fn status_rank(&self, task: &Task) -> usize {
        task.status
            .as_deref()
            .and_then(|s| self.status_rank.get(s))
            .copied()
            .unwrap_or(usize::MAX)
    }
}

/// Stable total order:
/// Done tasks after all others, most recently completed first (a missing
/// `completed_at` sorts as the epoch); non-Done tasks by type band, then
/// status band, then dated before undated.
pub fn sort_tasks(tasks: &mut [Task], config: &SortConfig, today: NaiveDate) {
    tasks.sort_by(|a, b| {
        match (config.is_done(a), config.is_done(b)) {
            (false, true) => Ordering::Less,
            (true, false) => Ordering::Greater,
            (true, true) => {
                let a_done = a.completed_at.map_or(0, |t| t.timestamp());
                let b_done = b.completed_at.map_or(0, |t| t.timestamp());
                b_done.cmp(&a_done)
            }
            (false, false) => config
                .type_rank(a)
                .cmp(&config.type_rank(b))
                .then_with(|| config.status_rank(a).cmp(&config.status_rank(b)))
                .then_with(|| {
                    let a_dated = has_due(a, today);
                    let b_dated = has_due(b, today);
                    b_dated.cmp(&a_dated)
                }),
        }
    });
}

fn has_due(task: &Task, today: NaiveDate) -> bool {
    task.due_date
        .as_deref()
        .and_then(|s| dates::parse_due_date(s, today))
        .is_some()
}
