//! Pure board transitions.
//!
//! Every operation borrows the current board and returns the next one; the
//! input is never mutated. Unknown or inconsistent identifiers produce an
//! unchanged copy of the input instead of an error.

use chrono::{DateTime, Utc};

use super::column::{Column, DEFAULT_COLUMN_TITLE};
use super::id::{ColumnId, SubtaskId, TaskId};
use super::model::Board;
use super::task::{Subtask, Task, DEFAULT_TASK_CONTENT};

/// Where a dragged task was released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// Over another task; the dragged task takes its position.
    Task(TaskId),
    /// Over a column body; the dragged task is appended.
    Column(ColumnId),
}

/// Remove the item at `from` and reinsert it at `to`.
fn array_move<T>(items: &mut Vec<T>, from: usize, to: usize) {
    let item = items.remove(from);
    items.insert(to.min(items.len()), item);
}

fn normalize_optional(text: &str) -> Option<String> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

/// Applies `edit` to a copy of the task. `edit` returns `false` to signal
/// that nothing applied, in which case the original board is returned.
fn update_task(board: &Board, task_id: &TaskId, edit: impl FnOnce(&mut Task) -> bool) -> Board {
    let mut next = board.clone();
    let applied = next.tasks.get_mut(task_id).map(edit).unwrap_or(false);
    if applied {
        next
    } else {
        board.clone()
    }
}

fn update_column(
    board: &Board,
    column_id: &ColumnId,
    edit: impl FnOnce(&mut Column) -> bool,
) -> Board {
    let mut next = board.clone();
    let applied = next.columns.get_mut(column_id).map(edit).unwrap_or(false);
    if applied {
        next
    } else {
        board.clone()
    }
}

// ---------------------------------------------------------------------------
// Ordering
// ---------------------------------------------------------------------------

/// Move the column `active` to the position currently held by `over`.
pub fn reorder_columns(board: &Board, active: &ColumnId, over: &ColumnId) -> Board {
    if active == over {
        return board.clone();
    }
    let (Some(from), Some(to)) = (board.column_index(active), board.column_index(over)) else {
        return board.clone();
    };

    let mut next = board.clone();
    array_move(&mut next.column_order, from, to);
    next
}

/// Move `active` to the position of `over` inside one column.
pub fn move_task_within_column(
    board: &Board,
    column_id: &ColumnId,
    active: &TaskId,
    over: &TaskId,
) -> Board {
    if active == over {
        return board.clone();
    }
    update_column(board, column_id, |column| {
        match (column.position_of(active), column.position_of(over)) {
            (Some(from), Some(to)) => {
                array_move(&mut column.task_ids, from, to);
                true
            }
            _ => false,
        }
    })
}

/// Move `active` out of `source` and into `dest`.
///
/// The task is inserted at the position of `over` when that task is in the
/// destination column, otherwise it is appended.
pub fn move_task_across_columns(
    board: &Board,
    active: &TaskId,
    source: &ColumnId,
    dest: &ColumnId,
    over: Option<&TaskId>,
) -> Board {
    if source == dest || !board.columns.contains_key(dest) {
        return board.clone();
    }
    let Some(from) = board.column(source).and_then(|c| c.position_of(active)) else {
        return board.clone();
    };

    let mut next = board.clone();
    if let Some(column) = next.columns.get_mut(source) {
        column.task_ids.remove(from);
    }
    if let Some(column) = next.columns.get_mut(dest) {
        let at = over.and_then(|id| column.position_of(id));
        match at {
            Some(index) => column.task_ids.insert(index, active.clone()),
            None => column.task_ids.push(active.clone()),
        }
    }
    next
}

/// Resolve a drop target the way a drag-over handler would and dispatch to
/// the within-column or across-column move.
pub fn move_task(board: &Board, active: &TaskId, target: &DropTarget) -> Board {
    let Some(source) = board.column_of(active).cloned() else {
        return board.clone();
    };

    match target {
        DropTarget::Task(over) => {
            let Some(dest) = board.column_of(over).cloned() else {
                return board.clone();
            };
            if dest == source {
                move_task_within_column(board, &source, active, over)
            } else {
                move_task_across_columns(board, active, &source, &dest, Some(over))
            }
        }
        DropTarget::Column(dest) => move_task_across_columns(board, active, &source, dest, None),
    }
}

// ---------------------------------------------------------------------------
// Creation and deletion
// ---------------------------------------------------------------------------

/// Append a new task with a generated id to `column_id`.
pub fn add_task(board: &Board, column_id: &ColumnId, now: DateTime<Utc>) -> Board {
    add_task_with_id(board, column_id, TaskId::generate(), now)
}

/// Append a new task with a caller-chosen id. An id that is already taken
/// leaves the board unchanged.
pub fn add_task_with_id(
    board: &Board,
    column_id: &ColumnId,
    task_id: TaskId,
    now: DateTime<Utc>,
) -> Board {
    if !board.columns.contains_key(column_id) || board.tasks.contains_key(&task_id) {
        return board.clone();
    }

    let mut next = board.clone();
    if let Some(column) = next.columns.get_mut(column_id) {
        column.task_ids.push(task_id.clone());
    }
    next.tasks.insert(
        task_id.clone(),
        Task::new(task_id, DEFAULT_TASK_CONTENT, now),
    );
    next
}

/// Remove a task from its owning column and from the task collection.
pub fn delete_task(board: &Board, task_id: &TaskId) -> Board {
    let Some(owner) = board.column_of(task_id).cloned() else {
        return board.clone();
    };

    let mut next = board.clone();
    next.tasks.remove(task_id);
    if let Some(column) = next.columns.get_mut(&owner) {
        column.task_ids.retain(|id| id != task_id);
    }
    next
}

/// Append a new, empty column with a generated id.
pub fn add_column(board: &Board) -> Board {
    add_column_with_id(board, ColumnId::generate())
}

pub fn add_column_with_id(board: &Board, column_id: ColumnId) -> Board {
    if board.columns.contains_key(&column_id) {
        return board.clone();
    }

    let mut next = board.clone();
    next.column_order.push(column_id.clone());
    next.columns.insert(
        column_id.clone(),
        Column::new(column_id, DEFAULT_COLUMN_TITLE),
    );
    next
}

/// Remove a column and every task it owned.
pub fn delete_column(board: &Board, column_id: &ColumnId) -> Board {
    let mut next = board.clone();
    let Some(column) = next.columns.remove(column_id) else {
        return board.clone();
    };
    next.column_order.retain(|id| id != column_id);
    for task_id in &column.task_ids {
        next.tasks.remove(task_id);
    }
    next
}

// ---------------------------------------------------------------------------
// Field edits
// ---------------------------------------------------------------------------

pub fn rename_board(board: &Board, title: &str) -> Board {
    let mut next = board.clone();
    next.title = title.to_string();
    next
}

pub fn rename_column(board: &Board, column_id: &ColumnId, title: &str) -> Board {
    update_column(board, column_id, |column| {
        column.title = title.to_string();
        true
    })
}

/// Blank descriptions are stored as absent.
pub fn edit_column_description(board: &Board, column_id: &ColumnId, description: &str) -> Board {
    update_column(board, column_id, |column| {
        column.description = normalize_optional(description);
        true
    })
}

pub fn edit_task_content(board: &Board, task_id: &TaskId, content: &str) -> Board {
    update_task(board, task_id, |task| {
        task.content = content.to_string();
        true
    })
}

/// Blank descriptions are stored as absent.
pub fn edit_task_description(board: &Board, task_id: &TaskId, description: &str) -> Board {
    update_task(board, task_id, |task| {
        task.description = normalize_optional(description);
        true
    })
}

/// Flip completion; becoming completed stamps `completed_at`, becoming open
/// clears it.
pub fn toggle_task_completed(board: &Board, task_id: &TaskId, now: DateTime<Utc>) -> Board {
    update_task(board, task_id, |task| {
        task.completed = !task.completed;
        task.completed_at = task.completed.then_some(now);
        true
    })
}

pub fn set_task_due_date(
    board: &Board,
    task_id: &TaskId,
    due_date: Option<DateTime<Utc>>,
) -> Board {
    update_task(board, task_id, |task| {
        task.due_date = due_date;
        true
    })
}

/// Tags are trimmed; blank or already present tags are ignored.
pub fn add_task_tag(board: &Board, task_id: &TaskId, tag: &str) -> Board {
    let tag = tag.trim();
    if tag.is_empty() {
        return board.clone();
    }
    update_task(board, task_id, |task| {
        if task.tags.iter().any(|t| t == tag) {
            return false;
        }
        task.tags.push(tag.to_string());
        true
    })
}

pub fn remove_task_tag(board: &Board, task_id: &TaskId, tag: &str) -> Board {
    update_task(board, task_id, |task| {
        let before = task.tags.len();
        task.tags.retain(|t| t != tag);
        task.tags.len() != before
    })
}

pub fn add_subtask(board: &Board, task_id: &TaskId, content: &str) -> Board {
    add_subtask_with_id(board, task_id, SubtaskId::generate(), content)
}

pub fn add_subtask_with_id(
    board: &Board,
    task_id: &TaskId,
    subtask_id: SubtaskId,
    content: &str,
) -> Board {
    update_task(board, task_id, |task| {
        if task.subtasks.iter().any(|s| s.id == subtask_id) {
            return false;
        }
        task.subtasks.push(Subtask {
            id: subtask_id,
            content: content.to_string(),
            done: false,
        });
        true
    })
}

pub fn toggle_subtask(board: &Board, task_id: &TaskId, subtask_id: &SubtaskId) -> Board {
    update_task(board, task_id, |task| {
        match task.subtasks.iter_mut().find(|s| &s.id == subtask_id) {
            Some(subtask) => {
                subtask.done = !subtask.done;
                true
            }
            None => false,
        }
    })
}

pub fn delete_subtask(board: &Board, task_id: &TaskId, subtask_id: &SubtaskId) -> Board {
    update_task(board, task_id, |task| {
        let before = task.subtasks.len();
        task.subtasks.retain(|s| &s.id != subtask_id);
        task.subtasks.len() != before
    })
}
