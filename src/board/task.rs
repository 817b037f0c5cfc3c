//! Task and subtask records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{SubtaskId, TaskId};

/// Content given to tasks created from the board.
pub const DEFAULT_TASK_CONTENT: &str = "New task";

/// A checklist item nested inside a task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub id: SubtaskId,
    pub content: String,
    #[serde(default)]
    pub done: bool,
}

/// A single work item.
///
/// Timestamps are stored as epoch milliseconds on the wire. Optional fields
/// are omitted when empty so saved documents stay close to what older
/// versions wrote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "chrono::serde::ts_milliseconds_option"
    )]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn new(id: TaskId, content: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            content: content.into(),
            description: None,
            completed: false,
            created_at,
            completed_at: None,
            due_date: None,
            tags: Vec::new(),
            subtasks: Vec::new(),
        }
    }

    /// Returns `(done, total)` subtask counts.
    pub fn subtask_progress(&self) -> (usize, usize) {
        let done = self.subtasks.iter().filter(|s| s.done).count();
        (done, self.subtasks.len())
    }
}
