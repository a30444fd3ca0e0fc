//! Gantt timeline layout.
//!
//! Maps tasks with (optional start, due) dates onto pixel x-coordinates
//! in a window of `range_weeks` starting at `chart_start`. Tasks outside
//! the window still get coordinates (possibly negative or past the right
//! edge); clipping is the renderer's concern. Only the today marker is
//! bounds-checked.

use std::collections::{HashMap, HashSet};

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::dates;
use crate::models::{Project, Task};

/// Zero-width bars are widened to stay visible.
pub const MIN_BAR_WIDTH: f64 = 4.0;

#[derive(Debug, Clone)]
pub struct GanttConfig {
    pub chart_start: NaiveDate,
    pub range_weeks: u32,
    pub px_per_day: f64,
    /// `None` = all projects; otherwise the explicit id set in scope.
    pub scope: Option<HashSet<Uuid>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GanttMark {
    /// A due date without a start date: a point marker.
    Milestone { x: f64 },
    /// A span from `min(start, due)` to `due`. An inverted range
    /// (due before start) collapses to the due point; that is a
    /// tolerated input, not a validation error.
    Bar { x: f64, width: f64 },
}

#[derive(Debug, Clone, Serialize)]
pub struct GanttItem {
    pub task_id: Uuid,
    pub name: String,
    pub due: NaiveDate,
    pub mark: GanttMark,
}

/// One row group. `project` is set when the chart spans several projects
/// and the group renders under a project-name header row.
#[derive(Debug, Clone, Serialize)]
pub struct GanttGroup {
    pub project_id: Option<Uuid>,
    pub project_name: Option<String>,
    pub items: Vec<GanttItem>,
}

/// A task that cannot be positioned: no parseable due date.
#[derive(Debug, Clone, Serialize)]
pub struct UndatedItem {
    pub task_id: Uuid,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GanttChart {
    /// Total window width in pixels.
    pub width: f64,
    /// Present iff today falls inside the window.
    pub today_x: Option<f64>,
    pub groups: Vec<GanttGroup>,
    pub no_date: Vec<UndatedItem>,
}

pub fn layout(
    tasks: &[Task],
    projects: &[Project],
    config: &GanttConfig,
    today: NaiveDate,
) -> GanttChart {
    let range_days = i64::from(config.range_weeks) * 7;
    let x = |d: NaiveDate| (d - config.chart_start).num_days() as f64 * config.px_per_day;

    let in_scope = |task: &Task| {
        config
            .scope
            .as_ref()
            .is_none_or(|scope| task.project_ids.iter().any(|p| scope.contains(p)))
    };

    let mut no_date = Vec::new();
    let mut dated: Vec<(Uuid, GanttItem)> = Vec::new();

    for task in tasks.iter().filter(|t| in_scope(t)) {
        let due = task
            .due_date
            .as_deref()
            .and_then(|s| dates::parse_due_date(s, today));
        let Some(due) = due else {
            no_date.push(UndatedItem {
                task_id: task.id,
                name: task.name.clone(),
            });
            continue;
        };

        let start = task
            .start_date
            .as_deref()
            .and_then(|s| dates::parse_due_date(s, today));
        let mark = match start {
            None => GanttMark::Milestone { x: x(due) },
            Some(start) => {
                let left = start.min(due);
                let width = (x(due) - x(left)).max(MIN_BAR_WIDTH);
                GanttMark::Bar { x: x(left), width }
            }
        };

        dated.push((
            group_key(task, config),
            GanttItem {
                task_id: task.id,
                name: task.name.clone(),
                due,
                mark,
            },
        ));
    }

    let scope_size = config.scope.as_ref().map_or(projects.len(), HashSet::len);
    let groups = if scope_size > 1 {
        grouped_by_project(dated, projects)
    } else {
        let mut items: Vec<GanttItem> = dated.into_iter().map(|(_, item)| item).collect();
        items.sort_by_key(|i| i.due);
        vec![GanttGroup {
            project_id: None,
            project_name: None,
            items,
        }]
    };

    let today_x = (today >= config.chart_start
        && today <= config.chart_start + Duration::days(range_days))
    .then(|| x(today));

    GanttChart {
        width: range_days as f64 * config.px_per_day,
        today_x,
        groups,
        no_date,
    }
}

/// The project a task renders under: its primary project, unless that is
/// out of scope, in which case the first in-scope associated project.
fn group_key(task: &Task, config: &GanttConfig) -> Uuid {
    match &config.scope {
        None => task.project_id,
        Some(scope) => {
            if scope.contains(&task.project_id) {
                task.project_id
            } else {
                task.project_ids
                    .iter()
                    .find(|p| scope.contains(p))
                    .copied()
                    .unwrap_or(task.project_id)
            }
        }
    }
}

fn grouped_by_project(dated: Vec<(Uuid, GanttItem)>, projects: &[Project]) -> Vec<GanttGroup> {
    let mut by_project: HashMap<Uuid, Vec<GanttItem>> = HashMap::new();
    for (project_id, item) in dated {
        by_project.entry(project_id).or_default().push(item);
    }

    let mut groups = Vec::new();
    for project in projects {
        let Some(mut items) = by_project.remove(&project.id) else {
            continue;
        };
        items.sort_by_key(|i| i.due);
        groups.push(GanttGroup {
            project_id: Some(project.id),
            project_name: Some(project.name.clone()),
            items,
        });
    }
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn d(m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, m, day).unwrap()
    }

    fn project(name: &str) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: name.into(),
            notes: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn task(project: &Project, name: &str, start: Option<&str>, due: Option<&str>) -> Task {
        Task {
            id: Uuid::new_v4(),
            project_id: project.id,
            name: name.into(),
            task_type: None,
            status: None,
            start_date: start.map(String::from),
            due_date: due.map(String::from),
            notes: None,
            completed_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            project_ids: vec![project.id],
            person_ids: Vec::new(),
        }
    }

    fn config(chart_start: NaiveDate) -> GanttConfig {
        GanttConfig {
            chart_start,
            range_weeks: 4,
            px_per_day: 10.0,
            scope: None,
        }
    }

    #[test]
    fn bar_spans_start_to_due() {
        let p = project("Apollo");
        let tasks = vec![task(&p, "spanned", Some("5/Mar"), Some("10/Mar"))];
        let chart = layout(&tasks, &[p.clone()], &config(d(3, 1)), d(3, 1));

        let item = &chart.groups[0].items[0];
        assert_eq!(
            item.mark,
            GanttMark::Bar {
                x: 40.0,
                width: 50.0
            }
        );
    }

    #[test]
    fn due_only_is_a_milestone() {
        let p = project("Apollo");
        let tasks = vec![task(&p, "point", None, Some("10/Mar"))];
        let chart = layout(&tasks, &[p.clone()], &config(d(3, 1)), d(3, 1));

        let item = &chart.groups[0].items[0];
        assert_eq!(item.mark, GanttMark::Milestone { x: 90.0 });
    }

    #[test]
    fn zero_width_bar_gets_minimum_width() {
        let p = project("Apollo");
        let tasks = vec![task(&p, "instant", Some("10/Mar"), Some("10/Mar"))];
        let chart = layout(&tasks, &[p.clone()], &config(d(3, 1)), d(3, 1));

        let item = &chart.groups[0].items[0];
        assert_eq!(
            item.mark,
            GanttMark::Bar {
                x: 90.0,
                width: MIN_BAR_WIDTH
            }
        );
    }

    #[test]
    fn inverted_range_collapses_to_due_point() {
        let p = project("Apollo");
        let tasks = vec![task(&p, "backwards", Some("20/Mar"), Some("10/Mar"))];
        let chart = layout(&tasks, &[p.clone()], &config(d(3, 1)), d(3, 1));

        let item = &chart.groups[0].items[0];
        assert_eq!(
            item.mark,
            GanttMark::Bar {
                x: 90.0,
                width: MIN_BAR_WIDTH
            }
        );
    }

    #[test]
    fn undated_tasks_go_to_no_date_section() {
        let p = project("Apollo");
        let tasks = vec![
            task(&p, "undated", None, None),
            task(&p, "garbled", None, Some("whenever")),
            task(&p, "dated", None, Some("10/Mar")),
        ];
        let chart = layout(&tasks, &[p.clone()], &config(d(3, 1)), d(3, 1));

        let names: Vec<_> = chart.no_date.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["undated", "garbled"]);
        assert_eq!(chart.groups[0].items.len(), 1);
    }

    #[test]
    fn single_project_scope_is_flat() {
        let p1 = project("Apollo");
        let p2 = project("Artemis");
        let tasks = vec![
            task(&p1, "in scope", None, Some("10/Mar")),
            task(&p2, "out of scope", None, Some("12/Mar")),
        ];
        let mut cfg = config(d(3, 1));
        cfg.scope = Some([p1.id].into_iter().collect());
        let chart = layout(&tasks, &[p1.clone(), p2.clone()], &cfg, d(3, 1));

        assert_eq!(chart.groups.len(), 1);
        assert!(chart.groups[0].project_name.is_none());
        let names: Vec<_> = chart.groups[0].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["in scope"]);
    }

    #[test]
    fn multi_project_scope_groups_under_headers() {
        let p1 = project("Apollo");
        let p2 = project("Artemis");
        let tasks = vec![
            task(&p2, "later", None, Some("20/Mar")),
            task(&p2, "sooner", None, Some("10/Mar")),
            task(&p1, "solo", None, Some("15/Mar")),
        ];
        let chart = layout(&tasks, &[p1.clone(), p2.clone()], &config(d(3, 1)), d(3, 1));

        assert_eq!(chart.groups.len(), 2);
        assert_eq!(chart.groups[0].project_name.as_deref(), Some("Apollo"));
        assert_eq!(chart.groups[1].project_name.as_deref(), Some("Artemis"));
        // Within a group, ascending due date
        let names: Vec<_> = chart.groups[1].items.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, ["sooner", "later"]);
    }

    #[test]
    fn today_marker_only_inside_window() {
        let p = project("Apollo");
        let tasks: Vec<Task> = Vec::new();

        let chart = layout(&tasks, &[p.clone()], &config(d(3, 1)), d(3, 15));
        assert_eq!(chart.today_x, Some(140.0));

        let chart = layout(&tasks, &[p.clone()], &config(d(3, 1)), d(5, 1));
        assert!(chart.today_x.is_none());

        let chart = layout(&tasks, &[p], &config(d(3, 1)), d(2, 20));
        assert!(chart.today_x.is_none());
    }

    #[test]
    fn window_width() {
        let p = project("Apollo");
        let chart = layout(&[], &[p], &config(d(3, 1)), d(3, 1));
        assert_eq!(chart.width, 280.0);
    }
}
