use crate::board::{ColumnId, TaskId};
use crate::tea::{Cursor, Mode, Notification};
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone)]
pub struct TaskView {
    pub id: TaskId,
    pub content: String,
    pub description: Option<String>,
    pub completed: bool,
    pub due_date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    /// `(done, total)` subtasks.
    pub subtasks: (usize, usize),
    /// Picked up in drag mode.
    pub held: bool,
}

#[derive(Debug, Clone)]
pub struct ColumnView {
    pub id: ColumnId,
    pub title: String,
    pub description: Option<String>,
    pub tasks: Vec<TaskView>,
    pub held: bool,
}

static VERSION_COUNTER: AtomicU64 = AtomicU64::new(0);

pub fn next_version() -> u64 {
    VERSION_COUNTER.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub struct RenderState {
    pub version: u64,
    pub title: String,
    pub columns: Vec<ColumnView>,
    pub cursor: Cursor,
    pub mode: Mode,
    pub input_buffer: String,
    /// What Enter will delete while a delete confirmation is open.
    pub pending_delete: Option<String>,
    pub notification: Option<Notification>,
    /// Whether the keymap legend is expanded (toggled by '?')
    pub show_keymap: bool,
    pub task_count: usize,
    pub completed_count: usize,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            version: 0,
            title: String::new(),
            columns: Vec::new(),
            cursor: Cursor::default(),
            mode: Mode::Browse,
            input_buffer: String::new(),
            pending_delete: None,
            notification: None,
            show_keymap: false,
            task_count: 0,
            completed_count: 0,
        }
    }
}

impl RenderState {
    pub fn selected_column(&self) -> Option<&ColumnView> {
        self.columns.get(self.cursor.column)
    }

    pub fn selected_task(&self) -> Option<&TaskView> {
        self.selected_column()
            .and_then(|c| c.tasks.get(self.cursor.task))
    }
}
