use crate::models::{Task, TaskId, Timestamp};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskError {
    EmptyText,
    IdsExhausted,
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskError::EmptyText => write!(f, "task text must not be empty"),
            TaskError::IdsExhausted => write!(f, "no task id left after the newest stored one"),
        }
    }
}

impl std::error::Error for TaskError {}

/// Picks an id for a new task: the clock reading, bumped past the newest existing id
/// when two tasks are created within the same millisecond. `None` once the newest
/// id is `TaskId::MAX`.
pub fn next_task_id(tasks: &[Task], now: Timestamp) -> Option<TaskId> {
    match tasks.iter().map(|task| task.id).max() {
        Some(newest) if newest >= now => newest.checked_add(1),
        _ => Some(now),
    }
}

pub fn create_task(text: &str, id: TaskId) -> Result<Task, TaskError> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TaskError::EmptyText);
    }
    Ok(Task {
        id,
        text: text.to_string(),
        completed: false,
        archived: false,
        archived_at: None,
    })
}

fn update_where(mut tasks: Vec<Task>, id: TaskId, apply: impl FnOnce(&mut Task)) -> Vec<Task> {
    if let Some(task) = tasks.iter_mut().find(|task| task.id == id) {
        apply(task);
    }
    tasks
}

pub fn toggle_complete(tasks: Vec<Task>, id: TaskId) -> Vec<Task> {
    update_where(tasks, id, |task| task.completed = !task.completed)
}

/// Blank replacement text is rejected and the collection comes back untouched.
pub fn edit_text(tasks: Vec<Task>, id: TaskId, text: &str) -> Vec<Task> {
    let text = text.trim();
    if text.is_empty() {
        return tasks;
    }
    update_where(tasks, id, |task| task.text = text.to_string())
}

/// Re-archiving an archived task restarts its retention window.
pub fn archive(tasks: Vec<Task>, id: TaskId, now: Timestamp) -> Vec<Task> {
    update_where(tasks, id, |task| {
        task.archived = true;
        task.archived_at = Some(now);
    })
}

pub fn restore(tasks: Vec<Task>, id: TaskId) -> Vec<Task> {
    update_where(tasks, id, |task| {
        task.archived = false;
        task.archived_at = None;
    })
}

pub fn permanently_delete(mut tasks: Vec<Task>, id: TaskId) -> Vec<Task> {
    tasks.retain(|task| task.id != id);
    tasks
}

/// Repairs a collection read back from storage: blank tasks and repeated ids are
/// dropped, and `archived_at` is made to agree with `archived`. An archived task
/// without a timestamp starts its retention window at `now`.
pub fn normalize_loaded(tasks: Vec<Task>, now: Timestamp) -> Vec<Task> {
    let mut seen = std::collections::HashSet::new();
    tasks
        .into_iter()
        .filter_map(|mut task| {
            if task.text.trim().is_empty() {
                log::warn!("tasks: dropping blank task id={}", task.id);
                return None;
            }
            if !seen.insert(task.id) {
                log::warn!("tasks: dropping duplicate task id={}", task.id);
                return None;
            }
            match (task.archived, task.archived_at) {
                (true, None) => task.archived_at = Some(now),
                (false, Some(_)) => task.archived_at = None,
                _ => {}
            }
            Some(task)
        })
        .collect()
}
