use serde::Serialize;

use crate::models::{Task, Timestamp};

/// Days an archived task is kept before it is purged.
pub const ARCHIVE_DURATION_DAYS: i64 = 30;
/// Archived tasks with this many days left or fewer are reported as expiring.
pub const EXPIRATION_WARNING_DAYS: u32 = 7;
pub const ONE_DAY_MS: i64 = 24 * 60 * 60 * 1000;

const ARCHIVE_DURATION_MS: i64 = ARCHIVE_DURATION_DAYS * ONE_DAY_MS;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ExpiringTask {
    pub task: Task,
    pub days_left: u32,
}

/// Whole days left in the retention window. Never negative; an `archived_at` in
/// the future counts as archived just now.
pub fn days_until_deletion(archived_at: Timestamp, now: Timestamp) -> u32 {
    let elapsed_days = now.saturating_sub(archived_at).max(0) / ONE_DAY_MS;
    (ARCHIVE_DURATION_DAYS - elapsed_days).max(0) as u32
}

/// Archived tasks with 1..=7 days left, soonest first. Day 0 is purge territory
/// and is left out.
pub fn expiring_soon(tasks: &[Task], now: Timestamp) -> Vec<ExpiringTask> {
    let mut expiring: Vec<ExpiringTask> = tasks
        .iter()
        .filter(|task| task.archived)
        .filter_map(|task| {
            let archived_at = task.archived_at?;
            let days_left = days_until_deletion(archived_at, now);
            (days_left > 0 && days_left <= EXPIRATION_WARNING_DAYS).then(|| ExpiringTask {
                task: task.clone(),
                days_left,
            })
        })
        .collect();
    expiring.sort_by_key(|entry| (entry.days_left, entry.task.id));
    expiring
}

fn is_expired(task: &Task, now: Timestamp) -> bool {
    match (task.archived, task.archived_at) {
        (true, Some(archived_at)) => now.saturating_sub(archived_at) > ARCHIVE_DURATION_MS,
        _ => false,
    }
}

/// Drops archived tasks whose retention window has fully elapsed. A task sitting
/// exactly on the boundary survives until the next check.
pub fn purge_expired(mut tasks: Vec<Task>, now: Timestamp) -> Vec<Task> {
    let before = tasks.len();
    tasks.retain(|task| !is_expired(task, now));
    let purged = before - tasks.len();
    if purged > 0 {
        log::info!("expiration: purged archived tasks count={purged}");
    }
    tasks
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{archive, create_task};

    const NOW: Timestamp = 1_700_000_000_000;

    fn archived_task(id: i64, archived_at: Timestamp) -> Task {
        archive(vec![create_task("old", id).unwrap()], id, archived_at).remove(0)
    }

    #[test]
    fn days_until_deletion_counts_down_from_thirty() {
        assert_eq!(days_until_deletion(NOW, NOW), 30);
        assert_eq!(days_until_deletion(NOW - ONE_DAY_MS + 1, NOW), 30);
        assert_eq!(days_until_deletion(NOW - ONE_DAY_MS, NOW), 29);
        assert_eq!(days_until_deletion(NOW - 23 * ONE_DAY_MS, NOW), 7);
        assert_eq!(days_until_deletion(NOW - 30 * ONE_DAY_MS, NOW), 0);
        assert_eq!(days_until_deletion(NOW - 31 * ONE_DAY_MS, NOW), 0);
    }

    #[test]
    fn days_until_deletion_clamps_future_archive_times() {
        assert_eq!(days_until_deletion(NOW + 5 * ONE_DAY_MS, NOW), 30);
    }

    #[test]
    fn extreme_archive_times_do_not_overflow() {
        assert_eq!(days_until_deletion(i64::MIN, NOW), 0);
        assert_eq!(days_until_deletion(i64::MAX, NOW), 30);
        assert_eq!(days_until_deletion(i64::MIN, i64::MAX), 0);

        let tasks = vec![archived_task(1, i64::MIN), archived_task(2, i64::MAX)];
        let kept = purge_expired(tasks, NOW);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 2);
    }

    #[test]
    fn expiring_soon_reports_one_to_seven_days_in_ascending_order() {
        let tasks = vec![
            archived_task(1, NOW - 23 * ONE_DAY_MS), // 7 days left
            archived_task(2, NOW - 29 * ONE_DAY_MS), // 1 day left
            archived_task(3, NOW - 22 * ONE_DAY_MS), // 8 days left
            archived_task(4, NOW - 30 * ONE_DAY_MS), // 0 days left
            create_task("live", 5).unwrap(),
        ];

        let expiring = expiring_soon(&tasks, NOW);
        let summary: Vec<(i64, u32)> = expiring
            .iter()
            .map(|entry| (entry.task.id, entry.days_left))
            .collect();
        assert_eq!(summary, vec![(2, 1), (1, 7)]);
    }

    #[test]
    fn expiring_soon_never_includes_day_zero() {
        let tasks = vec![
            archived_task(1, NOW - 30 * ONE_DAY_MS),
            archived_task(2, NOW - 45 * ONE_DAY_MS),
        ];
        assert!(expiring_soon(&tasks, NOW).is_empty());
    }

    #[test]
    fn purge_boundary_is_strict() {
        let tasks = vec![
            archived_task(1, NOW - 30 * ONE_DAY_MS),
            archived_task(2, NOW - 30 * ONE_DAY_MS - 1),
        ];
        let kept = purge_expired(tasks, NOW);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 1);
    }

    #[test]
    fn purge_keeps_every_non_archived_task() {
        let mut completed = create_task("done", 2).unwrap();
        completed.completed = true;
        let tasks = vec![create_task("live", 1).unwrap(), completed];
        let kept = purge_expired(tasks.clone(), NOW + 365 * ONE_DAY_MS);
        assert_eq!(kept, tasks);
    }

    #[test]
    fn purge_is_idempotent() {
        let tasks = vec![
            archived_task(1, NOW - 40 * ONE_DAY_MS),
            archived_task(2, NOW - 3 * ONE_DAY_MS),
            create_task("live", 3).unwrap(),
        ];
        let once = purge_expired(tasks, NOW);
        let twice = purge_expired(once.clone(), NOW);
        assert_eq!(once, twice);
        assert_eq!(once.len(), 2);
    }
}
