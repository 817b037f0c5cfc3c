//! Pure update function for the TEA (The Elm Architecture) pattern.
//!
//! The update function takes a model and a message, mutates the model,
//! and returns a list of commands to execute. Board changes only happen
//! through [`Intent`]s applied to the model's document.

use chrono::{DateTime, NaiveDate, Utc};
use crossterm::event::{KeyCode, KeyEvent};

use crate::board::{ColumnId, DropTarget, Intent, TaskId};
use crate::config::expand_tilde;
use crate::{qlog, qlog_debug, qlog_warn};

use super::command::Command;
use super::message::Message;
use super::model::{Held, InputKind, Mode, Model, Notification, NotificationLevel, Target};

fn set_error(model: &mut Model, message: String) {
    qlog_warn!("UI Error: {}", message);
    model.notification = Some(Notification {
        level: NotificationLevel::Error,
        message,
    });
    model.dirty = true;
}

fn set_info(model: &mut Model, message: String) {
    model.notification = Some(Notification {
        level: NotificationLevel::Info,
        message,
    });
    model.dirty = true;
}

/// Apply an intent and request a save when the board changed.
fn commit(model: &mut Model, intent: Intent, cmds: &mut Vec<Command>) -> bool {
    let changed = model.apply(&intent);
    if changed {
        cmds.push(Command::SaveBoard);
    }
    changed
}

/// Pure update function: Model + Message → Commands
pub fn update(model: &mut Model, msg: Message) -> Vec<Command> {
    let mut cmds = Vec::new();

    match msg {
        Message::Key(key) => {
            model.notification = None;
            model.dirty = true;
            match model.mode.clone() {
                Mode::Browse => update_browse_mode(model, key, &mut cmds),
                Mode::Input(kind) => update_input_mode(model, key, kind, &mut cmds),
                Mode::Drag(held) => update_drag_mode(model, key, held, &mut cmds),
            }
        }

        Message::Resize(_, _) => {
            model.dirty = true;
        }

        Message::BoardSaved => {
            qlog_debug!("Message::BoardSaved");
        }

        Message::BoardSaveFailed(err) => {
            qlog_warn!("Message::BoardSaveFailed err={}", err);
            set_error(model, format!("Failed to save board: {}", err));
        }

        Message::BoardExported(path) => {
            qlog!("Message::BoardExported path={}", path.display());
            set_info(model, format!("Exported to {}", path.display()));
        }

        Message::ExportFailed(err) => {
            qlog_warn!("Message::ExportFailed err={}", err);
            set_error(model, format!("Export failed: {}", err));
        }

        Message::BoardImported(imported) => {
            qlog!(
                "Message::BoardImported columns={} tasks={} migrated={}",
                imported.board.column_order.len(),
                imported.board.task_count(),
                imported.migration.is_some()
            );
            let summary = imported.summary();
            model.replace_board(imported.board);
            set_info(model, summary);
            cmds.push(Command::SaveBoard);
        }

        Message::ImportFailed(err) => {
            qlog_warn!("Message::ImportFailed err={}", err);
            set_error(model, format!("Import failed: {}", err));
        }
    }

    cmds
}

fn update_browse_mode(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Char('h') | KeyCode::Left => {
            model.cursor.column = model.cursor.column.saturating_sub(1);
            model.clamp_cursor();
        }

        KeyCode::Char('l') | KeyCode::Right => {
            model.cursor.column += 1;
            model.clamp_cursor();
        }

        KeyCode::Char('j') | KeyCode::Down => {
            let tasks = model.selected_column().map_or(0, |c| c.task_ids.len());
            if tasks > 0 {
                model.cursor.task = (model.cursor.task + 1) % tasks;
            }
        }

        KeyCode::Char('k') | KeyCode::Up => {
            let tasks = model.selected_column().map_or(0, |c| c.task_ids.len());
            if tasks > 0 {
                model.cursor.task = model.cursor.task.checked_sub(1).unwrap_or(tasks - 1);
            }
        }

        KeyCode::Char('a') => {
            if let Some(column) = model.selected_column_id() {
                let intent = Intent::add_task(column);
                let Intent::AddTask { task, .. } = &intent else {
                    return;
                };
                let task = task.clone();
                if commit(model, intent, cmds) {
                    model.focus_task(&task);
                    begin_input(model, InputKind::TaskContent, Target::Task(task));
                }
            }
        }

        KeyCode::Char('A') => {
            let intent = Intent::add_column();
            let Intent::AddColumn { column } = &intent else {
                return;
            };
            let column = column.clone();
            if commit(model, intent, cmds) {
                model.focus_column(&column);
                begin_input(model, InputKind::ColumnTitle, Target::Column(column));
            }
        }

        KeyCode::Char('e') | KeyCode::Enter => {
            if let Some(task) = model.selected_task_id() {
                begin_input(model, InputKind::TaskContent, Target::Task(task));
            }
        }

        KeyCode::Char('E') => {
            if let Some(task) = model.selected_task_id() {
                begin_input(model, InputKind::TaskDescription, Target::Task(task));
            }
        }

        KeyCode::Char('r') => {
            if let Some(column) = model.selected_column_id() {
                begin_input(model, InputKind::ColumnTitle, Target::Column(column));
            }
        }

        KeyCode::Char('c') => {
            if let Some(column) = model.selected_column_id() {
                begin_input(model, InputKind::ColumnDescription, Target::Column(column));
            }
        }

        KeyCode::Char('t') => {
            begin_input(model, InputKind::BoardTitle, Target::Board);
        }

        KeyCode::Char('+') => {
            if let Some(task) = model.selected_task_id() {
                begin_input(model, InputKind::Tag, Target::Task(task));
            }
        }

        KeyCode::Char('-') => {
            let Some(task) = model.selected_task_id() else {
                return;
            };
            let last_tag = model.board().task(&task).and_then(|t| t.tags.last().cloned());
            if let Some(tag) = last_tag {
                commit(model, Intent::RemoveTaskTag { task, tag }, cmds);
            }
        }

        KeyCode::Char('s') => {
            if let Some(task) = model.selected_task_id() {
                begin_input(model, InputKind::Subtask, Target::Task(task));
            }
        }

        KeyCode::Char('S') => {
            let Some(task) = model.selected_task_id() else {
                return;
            };
            let first_open = model
                .board()
                .task(&task)
                .and_then(|t| t.subtasks.iter().find(|s| !s.done))
                .map(|s| s.id.clone());
            if let Some(subtask) = first_open {
                commit(model, Intent::ToggleSubtask { task, subtask }, cmds);
            }
        }

        KeyCode::Char('X') => {
            let Some(task) = model.selected_task_id() else {
                return;
            };
            let last = model
                .board()
                .task(&task)
                .and_then(|t| t.subtasks.last())
                .map(|s| s.id.clone());
            if let Some(subtask) = last {
                commit(model, Intent::DeleteSubtask { task, subtask }, cmds);
            }
        }

        KeyCode::Char('u') => {
            if let Some(task) = model.selected_task_id() {
                begin_input(model, InputKind::DueDate, Target::Task(task));
            }
        }

        KeyCode::Char(' ') | KeyCode::Char('x') => {
            if let Some(task) = model.selected_task_id() {
                commit(model, Intent::ToggleTaskCompleted { task }, cmds);
            }
        }

        KeyCode::Char('m') => {
            if let Some(task) = model.selected_task_id() {
                qlog_debug!("Drag start task={}", task.short());
                model.mode = Mode::Drag(Held::Task(task));
            }
        }

        KeyCode::Char('M') => {
            if let Some(column) = model.selected_column_id() {
                qlog_debug!("Drag start column={}", column.short());
                model.mode = Mode::Drag(Held::Column(column));
            }
        }

        KeyCode::Char('d') => {
            if let Some(task) = model.selected_task_id() {
                request_delete(model, Target::Task(task), cmds);
            }
        }

        KeyCode::Char('D') => {
            if let Some(column) = model.selected_column_id() {
                request_delete(model, Target::Column(column), cmds);
            }
        }

        KeyCode::Char('o') => {
            cmds.push(Command::ExportBoard);
        }

        KeyCode::Char('i') => {
            model.input_buffer.clear();
            model.input_target = None;
            model.mode = Mode::Input(InputKind::ImportPath);
        }

        KeyCode::Char('q') | KeyCode::Esc => {
            cmds.push(Command::Quit);
        }

        KeyCode::Char('?') => {
            model.show_keymap = !model.show_keymap;
        }

        _ => {}
    }
}

/// Open an input prompt prefilled with the current value of the field.
fn begin_input(model: &mut Model, kind: InputKind, target: Target) {
    model.input_buffer = current_value(model, kind, &target);
    model.input_target = Some(target);
    model.mode = Mode::Input(kind);
}

fn current_value(model: &Model, kind: InputKind, target: &Target) -> String {
    let board = model.board();
    match (kind, target) {
        (InputKind::BoardTitle, Target::Board) => board.title.clone(),
        (InputKind::ColumnTitle, Target::Column(id)) => {
            board.column(id).map(|c| c.title.clone()).unwrap_or_default()
        }
        (InputKind::ColumnDescription, Target::Column(id)) => board
            .column(id)
            .and_then(|c| c.description.clone())
            .unwrap_or_default(),
        (InputKind::TaskContent, Target::Task(id)) => {
            board.task(id).map(|t| t.content.clone()).unwrap_or_default()
        }
        (InputKind::TaskDescription, Target::Task(id)) => board
            .task(id)
            .and_then(|t| t.description.clone())
            .unwrap_or_default(),
        (InputKind::DueDate, Target::Task(id)) => board
            .task(id)
            .and_then(|t| t.due_date)
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_default(),
        _ => String::new(),
    }
}

fn request_delete(model: &mut Model, target: Target, cmds: &mut Vec<Command>) {
    if model.config.confirm_delete {
        model.pending_delete = Some(target);
        model.input_buffer.clear();
        model.mode = Mode::Input(InputKind::Confirm);
    } else {
        commit_delete(model, target, cmds);
    }
}

fn commit_delete(model: &mut Model, target: Target, cmds: &mut Vec<Command>) {
    let intent = match target {
        Target::Task(task) => Intent::DeleteTask { task },
        Target::Column(column) => Intent::DeleteColumn { column },
        Target::Board => return,
    };
    commit(model, intent, cmds);
}

/// Parse `YYYY-MM-DD` as midnight UTC. Blank input clears the date.
pub fn parse_due_date(input: &str) -> Result<Option<DateTime<Utc>>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    let date = NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{}', expected YYYY-MM-DD", input))?;
    Ok(date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc()))
}

fn cancel_input(model: &mut Model) {
    model.input_buffer.clear();
    model.input_target = None;
    model.pending_delete = None;
    model.mode = Mode::Browse;
}

/// Only `y` or Enter deletes; `n` or Esc cancels; other keys are ignored.
fn update_confirm_mode(model: &mut Model, key: KeyEvent, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
            model.mode = Mode::Browse;
            model.input_buffer.clear();
            if let Some(target) = model.pending_delete.take() {
                commit_delete(model, target, cmds);
            }
        }
        KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => cancel_input(model),
        _ => {}
    }
}

fn update_input_mode(model: &mut Model, key: KeyEvent, kind: InputKind, cmds: &mut Vec<Command>) {
    if kind == InputKind::Confirm {
        update_confirm_mode(model, key, cmds);
        return;
    }

    match key.code {
        KeyCode::Enter => {
            let value = std::mem::take(&mut model.input_buffer);
            let target = model.input_target.take();
            model.mode = Mode::Browse;
            submit_input(model, kind, target, value, cmds);
        }

        KeyCode::Esc => cancel_input(model),

        KeyCode::Backspace => {
            model.input_buffer.pop();
        }

        KeyCode::Char(c) => {
            model.input_buffer.push(c);
        }

        _ => {}
    }
}

fn submit_input(
    model: &mut Model,
    kind: InputKind,
    target: Option<Target>,
    value: String,
    cmds: &mut Vec<Command>,
) {
    match (kind, target) {
        (InputKind::ImportPath, _) => {
            let path = value.trim();
            if !path.is_empty() {
                cmds.push(Command::ImportBoard {
                    path: expand_tilde(path),
                });
            }
        }

        (InputKind::BoardTitle, Some(Target::Board)) => {
            commit(model, Intent::RenameBoard { title: value }, cmds);
        }

        (InputKind::ColumnTitle, Some(Target::Column(column))) => {
            commit(model, Intent::RenameColumn { column, title: value }, cmds);
        }

        (InputKind::ColumnDescription, Some(Target::Column(column))) => {
            commit(
                model,
                Intent::EditColumnDescription {
                    column,
                    description: value,
                },
                cmds,
            );
        }

        (InputKind::TaskContent, Some(Target::Task(task))) => {
            commit(model, Intent::EditTaskContent { task, content: value }, cmds);
        }

        (InputKind::TaskDescription, Some(Target::Task(task))) => {
            commit(
                model,
                Intent::EditTaskDescription {
                    task,
                    description: value,
                },
                cmds,
            );
        }

        (InputKind::Tag, Some(Target::Task(task))) => {
            commit(model, Intent::AddTaskTag { task, tag: value }, cmds);
        }

        (InputKind::Subtask, Some(Target::Task(task))) => {
            let content = value.trim();
            if !content.is_empty() {
                commit(model, Intent::add_subtask(task, content), cmds);
            }
        }

        (InputKind::DueDate, Some(Target::Task(task))) => match parse_due_date(&value) {
            Ok(due_date) => {
                commit(model, Intent::SetTaskDueDate { task, due_date }, cmds);
            }
            Err(err) => set_error(model, err),
        },

        (kind, target) => {
            qlog_warn!("Input {:?} submitted without a matching target {:?}", kind, target);
        }
    }
}

fn update_drag_mode(model: &mut Model, key: KeyEvent, held: Held, cmds: &mut Vec<Command>) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ') | KeyCode::Char('m')
        | KeyCode::Char('M') => {
            qlog_debug!("Drag end {:?}", held);
            model.mode = Mode::Browse;
        }

        code => match held {
            Held::Task(task) => drag_task(model, code, task, cmds),
            Held::Column(column) => drag_column(model, code, column, cmds),
        },
    }
}

fn drag_task(model: &mut Model, code: KeyCode, task: TaskId, cmds: &mut Vec<Command>) {
    let board = model.board();
    let Some(source) = board.column_of(&task).cloned() else {
        model.mode = Mode::Browse;
        return;
    };
    let Some(column_index) = board.column_index(&source) else {
        return;
    };
    let Some(position) = board.column(&source).and_then(|c| c.position_of(&task)) else {
        return;
    };

    let intent = match code {
        KeyCode::Char('j') | KeyCode::Down => board
            .column(&source)
            .and_then(|c| c.task_ids.get(position + 1))
            .map(|over| Intent::MoveTaskWithinColumn {
                column: source.clone(),
                active: task.clone(),
                over: over.clone(),
            }),

        KeyCode::Char('k') | KeyCode::Up => position
            .checked_sub(1)
            .and_then(|above| board.column(&source).and_then(|c| c.task_ids.get(above)))
            .map(|over| Intent::MoveTaskWithinColumn {
                column: source.clone(),
                active: task.clone(),
                over: over.clone(),
            }),

        KeyCode::Char('h') | KeyCode::Left | KeyCode::Char('l') | KeyCode::Right => {
            let dest_index = if matches!(code, KeyCode::Char('h') | KeyCode::Left) {
                column_index.checked_sub(1)
            } else {
                Some(column_index + 1)
            };
            dest_index
                .and_then(|i| board.column_order.get(i))
                .and_then(|dest| board.column(dest))
                .map(|dest| {
                    // Land on the same row when the destination has one.
                    let target = match dest.task_ids.get(position) {
                        Some(over) => DropTarget::Task(over.clone()),
                        None => DropTarget::Column(dest.id.clone()),
                    };
                    Intent::MoveTask {
                        active: task.clone(),
                        target,
                    }
                })
        }

        _ => None,
    };

    if let Some(intent) = intent {
        if commit(model, intent, cmds) {
            model.focus_task(&task);
        }
    }
}

fn drag_column(model: &mut Model, code: KeyCode, column: ColumnId, cmds: &mut Vec<Command>) {
    let board = model.board();
    let Some(index) = board.column_index(&column) else {
        model.mode = Mode::Browse;
        return;
    };

    let over_index = match code {
        KeyCode::Char('h') | KeyCode::Left => index.checked_sub(1),
        KeyCode::Char('l') | KeyCode::Right => Some(index + 1),
        _ => None,
    };
    let Some(over) = over_index.and_then(|i| board.column_order.get(i)).cloned() else {
        return;
    };

    let intent = Intent::ReorderColumns {
        active: column.clone(),
        over,
    };
    if commit(model, intent, cmds) {
        model.focus_column(&column);
    }
}
