//! One-way migration from the nested legacy document.
//!
//! Older boards stored each column as an object with its tasks embedded:
//!
//! ```json
//! { "id": "board-1", "title": "...", "columns": [
//!     { "id": "col-1", "title": "To Do", "tasks": [ { "id": "task-1", ... } ] } ] }
//! ```
//!
//! The current document keeps tasks in an id-indexed map and carries an
//! explicit `columnOrder`. Documents are told apart by the shape of
//! `columns`: an array is legacy, an object is current.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::board::{Board, BoardId, Column, ColumnId, Subtask, Task, TaskId};
use crate::{qlog, qlog_debug, Error, Result};

/// Which schema a stored document follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// Id-indexed maps with an explicit column order.
    Normalized,
    /// Columns as an array with embedded task lists.
    Legacy,
}

/// What a legacy migration did, for logging and CLI output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub columns: usize,
    pub tasks: usize,
    /// Tasks that had no creation time and were stamped with the migration time.
    pub stamped: usize,
    /// Column or task entries dropped because their id was already taken.
    pub dropped_duplicates: usize,
}

impl MigrationReport {
    pub fn describe(&self) -> String {
        format!(
            "migrated legacy document: {} columns, {} tasks, {} creation times stamped, {} duplicates dropped",
            self.columns, self.tasks, self.stamped, self.dropped_duplicates
        )
    }
}

fn default_board_id() -> BoardId {
    BoardId::from("board-1")
}

fn default_board_title() -> String {
    "My Board".to_string()
}

#[derive(Debug, Deserialize)]
pub struct LegacyBoard {
    #[serde(default = "default_board_id")]
    pub id: BoardId,
    #[serde(default = "default_board_title")]
    pub title: String,
    #[serde(default)]
    pub columns: Vec<LegacyColumn>,
}

#[derive(Debug, Deserialize)]
pub struct LegacyColumn {
    pub id: ColumnId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub tasks: Vec<LegacyTask>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyTask {
    pub id: TaskId,
    pub content: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub completed_at: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

/// Classify a parsed document by the shape of its `columns` field.
pub fn detect_format(value: &Value) -> Result<DocumentFormat> {
    let Some(object) = value.as_object() else {
        return Err(Error::UnsupportedDocument(
            "expected a JSON object at the top level".to_string(),
        ));
    };
    match object.get("columns") {
        Some(Value::Array(_)) => Ok(DocumentFormat::Legacy),
        Some(Value::Object(_)) | None => Ok(DocumentFormat::Normalized),
        Some(_) => Err(Error::UnsupportedDocument(
            "`columns` must be an object or an array".to_string(),
        )),
    }
}

/// Convert a legacy board. Column order follows array order, the first
/// occurrence of a duplicated id wins, and missing creation times are set
/// to `now`.
pub fn migrate_legacy(legacy: LegacyBoard, now: DateTime<Utc>) -> (Board, MigrationReport) {
    let mut board = Board::new(legacy.id, legacy.title);
    let mut report = MigrationReport::default();
    let mut seen_tasks: HashSet<TaskId> = HashSet::new();

    for legacy_column in legacy.columns {
        if board.columns.contains_key(&legacy_column.id) {
            report.dropped_duplicates += 1 + legacy_column.tasks.len();
            continue;
        }

        let mut column = Column::new(legacy_column.id, legacy_column.title);
        column.description = legacy_column.description;

        for legacy_task in legacy_column.tasks {
            if !seen_tasks.insert(legacy_task.id.clone()) {
                report.dropped_duplicates += 1;
                continue;
            }
            let created_at = legacy_task.created_at.unwrap_or_else(|| {
                report.stamped += 1;
                now
            });
            let task = Task {
                id: legacy_task.id,
                content: legacy_task.content,
                description: legacy_task.description,
                completed: legacy_task.completed,
                created_at,
                completed_at: legacy_task.completed_at,
                due_date: legacy_task.due_date,
                tags: legacy_task.tags,
                subtasks: legacy_task.subtasks,
            };
            column.task_ids.push(task.id.clone());
            board.tasks.insert(task.id.clone(), task);
            report.tasks += 1;
        }

        board.column_order.push(column.id.clone());
        board.columns.insert(column.id.clone(), column);
        report.columns += 1;
    }

    (board, report)
}

/// Parse a stored document in either format into a normalized board.
///
/// The report is present only for legacy documents. The result is not yet
/// validated; see [`super::decode_imported`].
pub fn parse_document(
    contents: &str,
    now: DateTime<Utc>,
) -> Result<(Board, Option<MigrationReport>)> {
    let value: Value = serde_json::from_str(contents)?;
    let format = detect_format(&value)?;
    qlog_debug!("parse_document format={:?}", format);

    match format {
        DocumentFormat::Normalized => Ok((serde_json::from_value(value)?, None)),
        DocumentFormat::Legacy => {
            let legacy: LegacyBoard = serde_json::from_value(value)?;
            let (board, report) = migrate_legacy(legacy, now);
            qlog!(
                "Migrated legacy board: columns={} tasks={} stamped={} dropped={}",
                report.columns,
                report.tasks,
                report.stamped,
                report.dropped_duplicates
            );
            Ok((board, Some(report)))
        }
    }
}
