//! Predicate engine over fetched tasks.

use crate::date_window::DateWindow;
use crate::model::{Priority, ProjectRef, Task};
use crate::text_matcher::TextMatcher;

/// Filter criteria for a single query. Every present criterion must match (logical AND).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFilter {
    /// Exact task id; when present every other criterion is ignored.
    pub task_id: Option<String>,
    /// Owning project; the inbox matches any inbox id.
    pub project: Option<ProjectRef>,
    /// Exact priority level.
    pub priority: Option<Priority>,
    /// Resolved due-date window. Undated tasks never match.
    pub due: Option<DateWindow>,
    /// Case-insensitive needle over title and content.
    pub text: Option<TextMatcher>,
}

impl TaskFilter {
    /// True when no criterion is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.task_id.is_none()
            && self.project.is_none()
            && self.priority.is_none()
            && self.due.is_none()
            && self.text.is_none()
    }

    /// Evaluate one task against the criteria.
    #[must_use]
    pub fn matches(&self, task: &Task) -> bool {
        if let Some(task_id) = &self.task_id {
            return task.id == *task_id;
        }
        if let Some(project) = &self.project
            && !project.matches(&task.project_id)
        {
            return false;
        }
        if let Some(priority) = self.priority
            && task.priority != priority
        {
            return false;
        }
        if let Some(window) = &self.due
            && !task.due_date.is_some_and(|due| window.contains(due))
        {
            return false;
        }
        self.text.as_ref().is_none_or(|matcher| matcher.matches(task))
    }

    /// Lazily yield matching tasks in their original order.
    ///
    /// The input is only borrowed, so the same fetched set can be filtered again
    /// with different criteria.
    pub fn apply<'a>(&'a self, tasks: &'a [Task]) -> impl Iterator<Item = &'a Task> + 'a {
        let limit = if self.task_id.is_some() { 1 } else { usize::MAX };
        tasks.iter().filter(move |task| self.matches(task)).take(limit)
    }
}

/// Collect the tasks matching `filter`, preserving order.
#[must_use]
pub fn filter_tasks(tasks: &[Task], filter: &TaskFilter) -> Vec<Task> {
    filter.apply(tasks).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date_window::DateFilter;
    use chrono_tz::Tz;
    use time::OffsetDateTime;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2025-03-10 09:00 UTC);

    fn task(id: &str, project: &str, priority: Priority, due: Option<OffsetDateTime>) -> Task {
        Task {
            id: id.into(),
            project_id: project.into(),
            title: format!("task {id}"),
            priority,
            due_date: due,
            ..Task::default()
        }
    }

    fn window(filter: DateFilter) -> DateWindow {
        filter
            .resolve(NOW, Tz::UTC)
            .unwrap_or_else(|err| panic!("window: {err}"))
    }

    fn ids(tasks: &[Task]) -> Vec<&str> {
        tasks.iter().map(|task| task.id.as_str()).collect()
    }

    #[test]
    fn empty_filter_is_identity() {
        let tasks = vec![
            task("a", "work", Priority::High, None),
            task("b", "inbox1", Priority::None, Some(NOW)),
        ];
        let filter = TaskFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter_tasks(&tasks, &filter), tasks);
    }

    #[test]
    fn priority_filter_is_exact_for_every_level() {
        for wanted in Priority::ALL {
            for actual in Priority::ALL {
                let tasks = vec![task("a", "work", actual, None)];
                let filter = TaskFilter {
                    priority: Some(wanted),
                    ..TaskFilter::default()
                };
                assert_eq!(filter_tasks(&tasks, &filter).len() == 1, wanted == actual);
            }
        }
    }

    #[test]
    fn task_id_short_circuits_other_criteria() {
        let tasks = vec![
            task("a", "work", Priority::Low, None),
            task("a", "home", Priority::Low, None),
        ];
        let filter = TaskFilter {
            task_id: Some("a".into()),
            priority: Some(Priority::High),
            project: Some(ProjectRef::Id("elsewhere".into())),
            ..TaskFilter::default()
        };
        let found = filter_tasks(&tasks, &filter);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].project_id, "work");
    }

    #[test]
    fn inbox_filter_matches_provider_inbox_ids() {
        let tasks = vec![
            task("a", "inbox118000001", Priority::None, None),
            task("b", "work", Priority::None, None),
        ];
        let filter = TaskFilter {
            project: Some(ProjectRef::Inbox),
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter_tasks(&tasks, &filter)), vec!["a"]);
    }

    #[test]
    fn overdue_never_matches_undated_tasks() {
        let tasks = vec![
            task("undated", "work", Priority::None, None),
            task("late", "work", Priority::None, Some(datetime!(2025-03-01 12:00 UTC))),
            task("today", "work", Priority::None, Some(datetime!(2025-03-10 18:00 UTC))),
        ];
        let filter = TaskFilter {
            due: Some(window(DateFilter::Overdue)),
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter_tasks(&tasks, &filter)), vec!["late"]);
    }

    #[test]
    fn due_dates_compare_in_absolute_time() {
        // 08:00 in Tokyo on the 11th is 23:00 UTC on the 10th: due today in UTC.
        let authored_in_tokyo = task(
            "tokyo",
            "work",
            Priority::None,
            Some(datetime!(2025-03-11 08:00 +09:00)),
        );
        let filter = TaskFilter {
            due: Some(window(DateFilter::Today)),
            ..TaskFilter::default()
        };
        assert!(filter.matches(&authored_in_tokyo));
    }

    #[test]
    fn criteria_combine_with_and() {
        let tasks = vec![
            task("1", "work", Priority::High, Some(datetime!(2025-03-10 17:00 UTC))),
            task("2", "work", Priority::High, Some(datetime!(2025-03-11 17:00 UTC))),
            task("3", "work", Priority::Low, Some(datetime!(2025-03-10 10:00 UTC))),
            task("4", "home", Priority::Medium, None),
            task("5", "home", Priority::None, Some(datetime!(2025-03-10 11:00 UTC))),
        ];
        let filter = TaskFilter {
            priority: Some(Priority::High),
            due: Some(window(DateFilter::Today)),
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter_tasks(&tasks, &filter)), vec!["1"]);
    }

    #[test]
    fn search_falls_back_to_content_and_preserves_order() {
        let mut first = task("1", "work", Priority::None, None);
        first.content = Some("call the Plumber".into());
        let mut second = task("2", "work", Priority::None, None);
        second.title = "Plumber invoice".into();
        let third = task("3", "work", Priority::None, None);
        let tasks = vec![first, second, third];

        let filter = TaskFilter {
            text: TextMatcher::new("plumber"),
            ..TaskFilter::default()
        };
        assert_eq!(ids(&filter_tasks(&tasks, &filter)), vec!["1", "2"]);
    }

    #[test]
    fn apply_is_restartable_over_the_same_set() {
        let tasks = vec![
            task("a", "work", Priority::High, None),
            task("b", "home", Priority::Low, None),
        ];
        let high = TaskFilter {
            priority: Some(Priority::High),
            ..TaskFilter::default()
        };
        let home = TaskFilter {
            project: Some(ProjectRef::Id("home".into())),
            ..TaskFilter::default()
        };
        assert_eq!(high.apply(&tasks).count(), 1);
        assert_eq!(home.apply(&tasks).map(|t| t.id.as_str()).collect::<Vec<_>>(), vec!["b"]);
        assert_eq!(high.apply(&tasks).count(), 1);
        assert_eq!(tasks.len(), 2);
    }

    #[test]
    fn empty_result_is_not_an_error() {
        let tasks = vec![task("a", "work", Priority::Low, None)];
        let filter = TaskFilter {
            priority: Some(Priority::High),
            ..TaskFilter::default()
        };
        assert!(filter_tasks(&tasks, &filter).is_empty());
    }
}
