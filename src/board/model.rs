//! The normalized board document.
//!
//! Tasks and columns live in id-indexed maps; `column_order` carries the
//! left-to-right order and each column carries the top-to-bottom order of its
//! tasks.
//!
//! # Invariants
//! - Every task id referenced by a column exists in `tasks`, exactly once
//!   across all columns.
//! - Every task in `tasks` is referenced by some column.
//! - `column_order` is a permutation of the keys of `columns`.
//! - Map keys equal the `id` field of the entity they index.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::column::Column;
use super::id::{BoardId, ColumnId, TaskId};
use super::task::Task;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub id: BoardId,
    pub title: String,
    #[serde(default)]
    pub tasks: BTreeMap<TaskId, Task>,
    #[serde(default)]
    pub columns: BTreeMap<ColumnId, Column>,
    #[serde(default)]
    pub column_order: Vec<ColumnId>,
}

/// A single violation reported by [`Board::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// A column references a task id that is not in the task map.
    MissingTask { column: ColumnId, task: TaskId },
    /// A task id is referenced more than once.
    DuplicateTaskRef { task: TaskId },
    /// A task in the map is not referenced by any column.
    OrphanTask { task: TaskId },
    /// `column_order` names a column that does not exist.
    UnknownColumn { column: ColumnId },
    /// `column_order` names a column twice.
    DuplicateColumn { column: ColumnId },
    /// A column exists but is missing from `column_order`.
    UnorderedColumn { column: ColumnId },
    /// A map key differs from the entity's own id.
    KeyMismatch { key: String, id: String },
}

impl std::fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IntegrityIssue::MissingTask { column, task } => {
                write!(f, "column {} references missing task {}", column, task)
            }
            IntegrityIssue::DuplicateTaskRef { task } => {
                write!(f, "task {} is referenced more than once", task)
            }
            IntegrityIssue::OrphanTask { task } => {
                write!(f, "task {} belongs to no column", task)
            }
            IntegrityIssue::UnknownColumn { column } => {
                write!(f, "column order names unknown column {}", column)
            }
            IntegrityIssue::DuplicateColumn { column } => {
                write!(f, "column order names {} twice", column)
            }
            IntegrityIssue::UnorderedColumn { column } => {
                write!(f, "column {} is missing from the column order", column)
            }
            IntegrityIssue::KeyMismatch { key, id } => {
                write!(f, "entry keyed {} carries id {}", key, id)
            }
        }
    }
}

impl Board {
    pub fn new(id: BoardId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            tasks: BTreeMap::new(),
            columns: BTreeMap::new(),
            column_order: Vec::new(),
        }
    }

    /// The board shown on first launch.
    pub fn default_board(now: DateTime<Utc>) -> Self {
        let mut board = Self::new(BoardId::from("board-1"), "My Board");
        let columns = [
            (
                "col-1",
                "To Do",
                "Tasks to be done",
                vec![
                    ("task-1", "Learn the keybindings"),
                    ("task-2", "Create your first column"),
                ],
            ),
            (
                "col-2",
                "In Progress",
                "Tasks in progress",
                vec![("task-3", "Lay out the board")],
            ),
            ("col-3", "Done", "Finished tasks", vec![]),
        ];

        for (column_id, title, description, tasks) in columns {
            let mut column = Column::new(ColumnId::from(column_id), title).with_description(description);
            for (task_id, content) in tasks {
                let task = Task::new(TaskId::from(task_id), content, now);
                column.task_ids.push(task.id.clone());
                board.tasks.insert(task.id.clone(), task);
            }
            board.column_order.push(column.id.clone());
            board.columns.insert(column.id.clone(), column);
        }

        board
    }

    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.get(id)
    }

    pub fn task(&self, id: &TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    /// Columns in display order. Ids in the order without a column are skipped.
    pub fn ordered_columns(&self) -> impl Iterator<Item = &Column> + '_ {
        self.column_order
            .iter()
            .filter_map(move |id| self.columns.get(id))
    }

    /// Tasks of a column in display order.
    pub fn column_tasks<'a>(&'a self, column: &'a Column) -> impl Iterator<Item = &'a Task> + 'a {
        column.task_ids.iter().filter_map(move |id| self.tasks.get(id))
    }

    /// The column currently holding `task_id`.
    pub fn column_of(&self, task_id: &TaskId) -> Option<&ColumnId> {
        self.columns
            .values()
            .find(|column| column.contains(task_id))
            .map(|column| &column.id)
    }

    pub fn column_index(&self, id: &ColumnId) -> Option<usize> {
        self.column_order.iter().position(|c| c == id)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.values().filter(|t| t.completed).count()
    }

    /// Collects every invariant violation. An empty result means the board is
    /// consistent.
    pub fn validate(&self) -> Vec<IntegrityIssue> {
        let mut issues = Vec::new();

        for (key, task) in &self.tasks {
            if key != &task.id {
                issues.push(IntegrityIssue::KeyMismatch {
                    key: key.to_string(),
                    id: task.id.to_string(),
                });
            }
        }

        let mut referenced: HashSet<&TaskId> = HashSet::new();
        for (key, column) in &self.columns {
            if key != &column.id {
                issues.push(IntegrityIssue::KeyMismatch {
                    key: key.to_string(),
                    id: column.id.to_string(),
                });
            }
            for task_id in &column.task_ids {
                if !self.tasks.contains_key(task_id) {
                    issues.push(IntegrityIssue::MissingTask {
                        column: column.id.clone(),
                        task: task_id.clone(),
                    });
                }
                if !referenced.insert(task_id) {
                    issues.push(IntegrityIssue::DuplicateTaskRef {
                        task: task_id.clone(),
                    });
                }
            }
        }

        for task_id in self.tasks.keys() {
            if !referenced.contains(task_id) {
                issues.push(IntegrityIssue::OrphanTask {
                    task: task_id.clone(),
                });
            }
        }

        let mut ordered: HashSet<&ColumnId> = HashSet::new();
        for column_id in &self.column_order {
            if !self.columns.contains_key(column_id) {
                issues.push(IntegrityIssue::UnknownColumn {
                    column: column_id.clone(),
                });
            }
            if !ordered.insert(column_id) {
                issues.push(IntegrityIssue::DuplicateColumn {
                    column: column_id.clone(),
                });
            }
        }
        for column_id in self.columns.keys() {
            if !ordered.contains(column_id) {
                issues.push(IntegrityIssue::UnorderedColumn {
                    column: column_id.clone(),
                });
            }
        }

        issues
    }

    /// Like [`Board::validate`] but folds violations into an error.
    pub fn check_integrity(&self) -> Result<()> {
        let issues = self.validate();
        if issues.is_empty() {
            return Ok(());
        }
        let summary = issues
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(Error::Integrity(summary))
    }
}
