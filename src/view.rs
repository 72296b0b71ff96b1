use serde::Serialize;

use crate::expiration::expiring_soon;
use crate::models::{FilterMode, SortDirection, Task, Timestamp};

/// Derives the ordered subset of tasks shown for a filter and sort direction.
///
/// Archived tasks only ever appear under [`FilterMode::Archived`]. Under
/// [`FilterMode::All`] incomplete tasks come before completed ones; every other
/// filter orders purely by id.
pub fn select_view(tasks: &[Task], filter: FilterMode, direction: SortDirection) -> Vec<&Task> {
    let mut view: Vec<&Task> = tasks
        .iter()
        .filter(|task| match filter {
            FilterMode::All => !task.archived,
            FilterMode::Active => task.is_active(),
            FilterMode::Completed => !task.archived && task.completed,
            FilterMode::Archived => task.archived,
        })
        .collect();

    let partition_completed = filter == FilterMode::All;
    view.sort_by(|a, b| {
        let by_state = if partition_completed {
            a.completed.cmp(&b.completed)
        } else {
            std::cmp::Ordering::Equal
        };
        let by_id = match direction {
            SortDirection::Asc => a.id.cmp(&b.id),
            SortDirection::Desc => b.id.cmp(&a.id),
        };
        by_state.then(by_id)
    });
    view
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub struct TaskCounts {
    pub archived: usize,
    pub expiring: usize,
    /// Non-archived tasks, completed or not.
    pub active: usize,
    pub completed: usize,
}

pub fn count_tasks(tasks: &[Task], now: Timestamp) -> TaskCounts {
    TaskCounts {
        archived: tasks.iter().filter(|task| task.archived).count(),
        expiring: expiring_soon(tasks, now).len(),
        active: tasks.iter().filter(|task| !task.archived).count(),
        completed: tasks
            .iter()
            .filter(|task| !task.archived && task.completed)
            .count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiration::ONE_DAY_MS;
    use crate::tasks::{archive, create_task, toggle_complete};

    fn make_task(id: i64) -> Task {
        create_task(&format!("task-{id}"), id).unwrap()
    }

    fn ids(view: &[&Task]) -> Vec<i64> {
        view.iter().map(|task| task.id).collect()
    }

    #[test]
    fn completed_task_stays_in_all_view() {
        let tasks = toggle_complete(vec![make_task(1)], 1);
        assert!(tasks[0].completed);
        let view = select_view(&tasks, FilterMode::All, SortDirection::Desc);
        assert_eq!(ids(&view), vec![1]);
    }

    #[test]
    fn archived_task_only_visible_in_archived_view() {
        let tasks = archive(vec![make_task(1)], 1, 100);
        assert!(select_view(&tasks, FilterMode::All, SortDirection::Desc).is_empty());
        assert!(select_view(&tasks, FilterMode::Active, SortDirection::Desc).is_empty());
        assert!(select_view(&tasks, FilterMode::Completed, SortDirection::Desc).is_empty());
        assert_eq!(
            ids(&select_view(&tasks, FilterMode::Archived, SortDirection::Desc)),
            vec![1]
        );
    }

    #[test]
    fn sort_direction_orders_by_creation_id() {
        let tasks = vec![make_task(10), make_task(11)];
        assert_eq!(
            ids(&select_view(&tasks, FilterMode::All, SortDirection::Desc)),
            vec![11, 10]
        );
        assert_eq!(
            ids(&select_view(&tasks, FilterMode::All, SortDirection::Asc)),
            vec![10, 11]
        );
    }

    #[test]
    fn all_view_puts_incomplete_before_completed() {
        let tasks = vec![make_task(1), make_task(2), make_task(3), make_task(4)];
        let tasks = toggle_complete(tasks, 4);
        let tasks = toggle_complete(tasks, 2);

        assert_eq!(
            ids(&select_view(&tasks, FilterMode::All, SortDirection::Desc)),
            vec![3, 1, 4, 2]
        );
        assert_eq!(
            ids(&select_view(&tasks, FilterMode::All, SortDirection::Asc)),
            vec![1, 3, 2, 4]
        );
    }

    #[test]
    fn completed_and_archived_views_sort_by_id_only() {
        let tasks = vec![make_task(1), make_task(2), make_task(3)];
        let tasks = toggle_complete(tasks, 1);
        let tasks = toggle_complete(tasks, 3);
        assert_eq!(
            ids(&select_view(&tasks, FilterMode::Completed, SortDirection::Desc)),
            vec![3, 1]
        );

        let tasks = archive(tasks, 1, 50);
        let tasks = archive(tasks, 2, 50);
        assert_eq!(
            ids(&select_view(&tasks, FilterMode::Archived, SortDirection::Asc)),
            vec![1, 2]
        );
        assert_eq!(
            ids(&select_view(&tasks, FilterMode::Active, SortDirection::Asc)),
            Vec::<i64>::new()
        );
    }

    #[test]
    fn select_view_is_restartable() {
        let tasks = vec![make_task(1), make_task(2)];
        let first = ids(&select_view(&tasks, FilterMode::All, SortDirection::Desc));
        let second = ids(&select_view(&tasks, FilterMode::All, SortDirection::Desc));
        assert_eq!(first, second);
    }

    #[test]
    fn count_tasks_reports_each_bucket() {
        let now = 100 * ONE_DAY_MS;
        let tasks = vec![make_task(1), make_task(2), make_task(3), make_task(4)];
        let tasks = toggle_complete(tasks, 2);
        let tasks = archive(tasks, 3, now);
        let tasks = archive(tasks, 4, now - 25 * ONE_DAY_MS);

        let counts = count_tasks(&tasks, now);
        assert_eq!(counts.archived, 2);
        assert_eq!(counts.expiring, 1);
        assert_eq!(counts.active, 2);
        assert_eq!(counts.completed, 1);
    }
}
