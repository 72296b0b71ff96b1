use crate::expiration::ExpiringTask;
use crate::models::{FilterMode, Settings, SortDirection, Task};
use crate::view::TaskCounts;

#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ViewEntry {
    pub task: Task,
    /// Only set for archived tasks.
    pub days_left: Option<u32>,
}

/// Everything the presentation layer needs to draw one frame.
#[derive(Debug, Clone, serde::Serialize)]
pub struct StatePayload {
    pub view: Vec<ViewEntry>,
    pub filter: FilterMode,
    pub sort_direction: SortDirection,
    pub counts: TaskCounts,
    pub expiring: Vec<ExpiringTask>,
    pub storage_available: bool,
    pub settings: Settings,
}
