//! User-triggered mutation requests and their dispatcher.

use chrono::{DateTime, Utc};

use super::engine::{self, DropTarget};
use super::id::{ColumnId, SubtaskId, TaskId};
use super::model::Board;

/// A request to mutate the board.
///
/// Variants that create entities carry the id to create so that the caller
/// can select the new entity afterwards; use the constructors to generate it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ReorderColumns {
        active: ColumnId,
        over: ColumnId,
    },
    MoveTaskWithinColumn {
        column: ColumnId,
        active: TaskId,
        over: TaskId,
    },
    MoveTaskAcrossColumns {
        active: TaskId,
        source: ColumnId,
        dest: ColumnId,
        over: Option<TaskId>,
    },
    MoveTask {
        active: TaskId,
        target: DropTarget,
    },
    AddTask {
        column: ColumnId,
        task: TaskId,
    },
    DeleteTask {
        task: TaskId,
    },
    AddColumn {
        column: ColumnId,
    },
    DeleteColumn {
        column: ColumnId,
    },
    RenameBoard {
        title: String,
    },
    RenameColumn {
        column: ColumnId,
        title: String,
    },
    EditColumnDescription {
        column: ColumnId,
        description: String,
    },
    EditTaskContent {
        task: TaskId,
        content: String,
    },
    EditTaskDescription {
        task: TaskId,
        description: String,
    },
    ToggleTaskCompleted {
        task: TaskId,
    },
    SetTaskDueDate {
        task: TaskId,
        due_date: Option<DateTime<Utc>>,
    },
    AddTaskTag {
        task: TaskId,
        tag: String,
    },
    RemoveTaskTag {
        task: TaskId,
        tag: String,
    },
    AddSubtask {
        task: TaskId,
        subtask: SubtaskId,
        content: String,
    },
    ToggleSubtask {
        task: TaskId,
        subtask: SubtaskId,
    },
    DeleteSubtask {
        task: TaskId,
        subtask: SubtaskId,
    },
}

impl Intent {
    /// Add a task with a freshly generated id.
    pub fn add_task(column: ColumnId) -> Self {
        Intent::AddTask {
            column,
            task: TaskId::generate(),
        }
    }

    /// Add a column with a freshly generated id.
    pub fn add_column() -> Self {
        Intent::AddColumn {
            column: ColumnId::generate(),
        }
    }

    /// Add a subtask with a freshly generated id.
    pub fn add_subtask(task: TaskId, content: impl Into<String>) -> Self {
        Intent::AddSubtask {
            task,
            subtask: SubtaskId::generate(),
            content: content.into(),
        }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Intent::ReorderColumns { .. } => "reorder_columns",
            Intent::MoveTaskWithinColumn { .. } => "move_task_within_column",
            Intent::MoveTaskAcrossColumns { .. } => "move_task_across_columns",
            Intent::MoveTask { .. } => "move_task",
            Intent::AddTask { .. } => "add_task",
            Intent::DeleteTask { .. } => "delete_task",
            Intent::AddColumn { .. } => "add_column",
            Intent::DeleteColumn { .. } => "delete_column",
            Intent::RenameBoard { .. } => "rename_board",
            Intent::RenameColumn { .. } => "rename_column",
            Intent::EditColumnDescription { .. } => "edit_column_description",
            Intent::EditTaskContent { .. } => "edit_task_content",
            Intent::EditTaskDescription { .. } => "edit_task_description",
            Intent::ToggleTaskCompleted { .. } => "toggle_task_completed",
            Intent::SetTaskDueDate { .. } => "set_task_due_date",
            Intent::AddTaskTag { .. } => "add_task_tag",
            Intent::RemoveTaskTag { .. } => "remove_task_tag",
            Intent::AddSubtask { .. } => "add_subtask",
            Intent::ToggleSubtask { .. } => "toggle_subtask",
            Intent::DeleteSubtask { .. } => "delete_subtask",
        }
    }
}

/// Compute the board that results from `intent`. `now` stamps creation and
/// completion times.
pub fn apply(board: &Board, intent: &Intent, now: DateTime<Utc>) -> Board {
    match intent {
        Intent::ReorderColumns { active, over } => engine::reorder_columns(board, active, over),
        Intent::MoveTaskWithinColumn {
            column,
            active,
            over,
        } => engine::move_task_within_column(board, column, active, over),
        Intent::MoveTaskAcrossColumns {
            active,
            source,
            dest,
            over,
        } => engine::move_task_across_columns(board, active, source, dest, over.as_ref()),
        Intent::MoveTask { active, target } => engine::move_task(board, active, target),
        Intent::AddTask { column, task } => {
            engine::add_task_with_id(board, column, task.clone(), now)
        }
        Intent::DeleteTask { task } => engine::delete_task(board, task),
        Intent::AddColumn { column } => engine::add_column_with_id(board, column.clone()),
        Intent::DeleteColumn { column } => engine::delete_column(board, column),
        Intent::RenameBoard { title } => engine::rename_board(board, title),
        Intent::RenameColumn { column, title } => engine::rename_column(board, column, title),
        Intent::EditColumnDescription {
            column,
            description,
        } => engine::edit_column_description(board, column, description),
        Intent::EditTaskContent { task, content } => {
            engine::edit_task_content(board, task, content)
        }
        Intent::EditTaskDescription { task, description } => {
            engine::edit_task_description(board, task, description)
        }
        Intent::ToggleTaskCompleted { task } => engine::toggle_task_completed(board, task, now),
        Intent::SetTaskDueDate { task, due_date } => {
            engine::set_task_due_date(board, task, *due_date)
        }
        Intent::AddTaskTag { task, tag } => engine::add_task_tag(board, task, tag),
        Intent::RemoveTaskTag { task, tag } => engine::remove_task_tag(board, task, tag),
        Intent::AddSubtask {
            task,
            subtask,
            content,
        } => engine::add_subtask_with_id(board, task, subtask.clone(), content),
        Intent::ToggleSubtask { task, subtask } => engine::toggle_subtask(board, task, subtask),
        Intent::DeleteSubtask { task, subtask } => engine::delete_subtask(board, task, subtask),
    }
}
