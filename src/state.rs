use crate::clock::Clock;
use crate::events::{StatePayload, ViewEntry};
use crate::expiration::{days_until_deletion, expiring_soon, purge_expired, ExpiringTask};
use crate::models::{FilterMode, IconLibrary, Settings, SortDirection, Task, TaskId, Theme};
use crate::storage::TaskStorage;
use crate::tasks::{self, TaskError};
use crate::view::{count_tasks, select_view, TaskCounts};

/// Owns the canonical task collection. Every mutation runs the engine function,
/// purges expired archives, then writes the collection back.
pub struct AppState {
    tasks: Vec<Task>,
    settings: Settings,
    filter: FilterMode,
    sort_direction: SortDirection,
    storage: TaskStorage,
    storage_available: bool,
    clock: Box<dyn Clock>,
}

impl AppState {
    pub fn load(storage: TaskStorage, clock: Box<dyn Clock>) -> Self {
        let storage_available = storage.is_available();
        if !storage_available {
            log::warn!("state: storage unavailable, running in memory only");
        }
        let now = clock.now();
        let stored = storage.load_tasks(Vec::new());
        let tasks = purge_expired(tasks::normalize_loaded(stored.clone(), now), now);
        let settings = storage.load_settings();
        log::info!(
            "state: loaded tasks count={} storage_available={storage_available}",
            tasks.len()
        );

        let changed = tasks != stored;
        let mut state = Self {
            tasks,
            settings,
            filter: FilterMode::default(),
            sort_direction: SortDirection::default(),
            storage,
            storage_available,
            clock,
        };
        if changed {
            state.persist();
        }
        state
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn filter(&self) -> FilterMode {
        self.filter
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    pub fn storage_available(&self) -> bool {
        self.storage_available
    }

    fn contains(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|task| task.id == id)
    }

    fn commit(&mut self, next: Vec<Task>) {
        self.tasks = purge_expired(next, self.clock.now());
        self.persist();
    }

    fn persist(&mut self) {
        let saved = self.storage.save_tasks(&self.tasks);
        self.record_save(saved);
    }

    fn persist_settings(&mut self) {
        let saved = self.storage.save_settings(&self.settings);
        self.record_save(saved);
    }

    fn record_save(&mut self, saved: bool) {
        if saved != self.storage_available {
            log::warn!("state: storage availability changed available={saved}");
        }
        self.storage_available = saved;
    }

    pub fn add_task(&mut self, text: &str) -> Result<Task, TaskError> {
        let id = tasks::next_task_id(&self.tasks, self.clock.now()).ok_or_else(|| {
            log::warn!("state: refusing create, task ids exhausted");
            TaskError::IdsExhausted
        })?;
        let task = tasks::create_task(text, id)?;
        let mut next = std::mem::take(&mut self.tasks);
        next.push(task.clone());
        self.commit(next);
        log::debug!("state: added task id={}", task.id);
        Ok(task)
    }

    /// Returns whether the task existed. Unknown ids leave the collection as is.
    pub fn toggle_task(&mut self, id: TaskId) -> bool {
        let found = self.contains(id);
        let next = tasks::toggle_complete(std::mem::take(&mut self.tasks), id);
        self.commit(next);
        found
    }

    /// Returns whether the text was applied.
    pub fn edit_task(&mut self, id: TaskId, text: &str) -> bool {
        let applied = self.contains(id) && !text.trim().is_empty();
        let next = tasks::edit_text(std::mem::take(&mut self.tasks), id, text);
        self.commit(next);
        applied
    }

    pub fn archive_task(&mut self, id: TaskId) -> bool {
        let found = self.contains(id);
        let now = self.clock.now();
        let next = tasks::archive(std::mem::take(&mut self.tasks), id, now);
        self.commit(next);
        found
    }

    pub fn restore_task(&mut self, id: TaskId) -> bool {
        let found = self.contains(id);
        let next = tasks::restore(std::mem::take(&mut self.tasks), id);
        self.commit(next);
        found
    }

    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let found = self.contains(id);
        let next = tasks::permanently_delete(std::mem::take(&mut self.tasks), id);
        self.commit(next);
        found
    }

    /// Periodic expiration check. Writes only when something was removed.
    pub fn purge_expired(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks = purge_expired(std::mem::take(&mut self.tasks), self.clock.now());
        let purged = before - self.tasks.len();
        if purged > 0 {
            self.persist();
        }
        purged
    }

    pub fn set_filter(&mut self, filter: FilterMode) {
        self.filter = filter;
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        self.sort_direction = direction;
    }

    pub fn toggle_sort_direction(&mut self) -> SortDirection {
        self.sort_direction = self.sort_direction.toggled();
        self.sort_direction
    }

    pub fn toggle_theme(&mut self) -> Theme {
        self.settings.theme = self.settings.theme.toggled();
        self.persist_settings();
        self.settings.theme
    }

    pub fn toggle_icon_library(&mut self) -> IconLibrary {
        self.settings.icon_library = self.settings.icon_library.toggled();
        self.persist_settings();
        self.settings.icon_library
    }

    pub fn view(&self) -> Vec<&Task> {
        select_view(&self.tasks, self.filter, self.sort_direction)
    }

    pub fn counts(&self) -> TaskCounts {
        count_tasks(&self.tasks, self.clock.now())
    }

    pub fn expiring(&self) -> Vec<ExpiringTask> {
        expiring_soon(&self.tasks, self.clock.now())
    }

    pub fn snapshot(&self) -> StatePayload {
        let now = self.clock.now();
        let view = self
            .view()
            .into_iter()
            .map(|task| ViewEntry {
                task: task.clone(),
                days_left: task
                    .archived_at
                    .filter(|_| task.archived)
                    .map(|archived_at| days_until_deletion(archived_at, now)),
            })
            .collect();
        StatePayload {
            view,
            filter: self.filter,
            sort_direction: self.sort_direction,
            counts: self.counts(),
            expiring: self.expiring(),
            storage_available: self.storage_available,
            settings: self.settings.clone(),
        }
    }
}
