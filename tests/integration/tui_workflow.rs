//! Keyboard sessions driven through `tea::update` without a terminal.

use chrono::{TimeZone, Utc};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use quadro::board::{Board, ColumnId, TaskId};
use quadro::config::Config;
use quadro::storage;
use quadro::tea::{update, Command, InputKind, Message, Mode, Model};

use crate::fixtures::{column_tasks, TestData};

fn model() -> Model {
    let board = Board::default_board(Utc.timestamp_millis_opt(0).unwrap());
    Model::new(board, Config::default())
}

fn press(model: &mut Model, code: KeyCode) -> Vec<Command> {
    update(model, Message::Key(KeyEvent::new(code, KeyModifiers::empty())))
}

fn press_all(model: &mut Model, codes: &[KeyCode]) -> Vec<Command> {
    codes.iter().flat_map(|code| press(model, *code)).collect()
}

fn replace_input(model: &mut Model, text: &str) {
    while !model.input_buffer.is_empty() {
        press(model, KeyCode::Backspace);
    }
    for c in text.chars() {
        press(model, KeyCode::Char(c));
    }
}

/// Test: Carry a task from To Do to Done with the keyboard
/// Given the default board with the cursor on the first task
/// When the task is picked up and moved right twice
/// Then it lands at the bottom of Done and every step requests a save
#[test]
fn test_drag_task_to_done() {
    let mut model = model();

    press(&mut model, KeyCode::Char('m'));
    assert!(matches!(model.mode, Mode::Drag(_)));

    let cmds = press_all(&mut model, &[KeyCode::Char('l'), KeyCode::Char('l')]);
    assert_eq!(cmds, vec![Command::SaveBoard, Command::SaveBoard]);
    press(&mut model, KeyCode::Enter);

    assert_eq!(model.mode, Mode::Browse);
    let board = model.board();
    assert_eq!(column_tasks(board, "col-1"), vec!["task-2"]);
    assert_eq!(column_tasks(board, "col-2"), vec!["task-3"]);
    assert_eq!(column_tasks(board, "col-3"), vec!["task-1"]);
    assert_eq!(model.cursor.column, 2);
    assert_eq!(model.selected_task_id(), Some(TaskId::from("task-1")));
    assert!(board.validate().is_empty());
}

#[test]
fn test_drag_past_last_column_changes_nothing() {
    let mut model = model();
    press_all(&mut model, &[KeyCode::Char('l'), KeyCode::Char('l')]);
    let before = model.board().clone();

    // Done is empty, so pick up a column instead
    press(&mut model, KeyCode::Char('M'));
    let cmds = press(&mut model, KeyCode::Char('l'));

    assert!(cmds.is_empty());
    assert_eq!(model.board(), &before);
}

#[test]
fn test_reorder_columns_by_dragging() {
    let mut model = model();
    let cmds = press_all(
        &mut model,
        &[KeyCode::Char('M'), KeyCode::Char('l'), KeyCode::Char('l'), KeyCode::Esc],
    );

    assert_eq!(cmds, vec![Command::SaveBoard, Command::SaveBoard]);
    assert_eq!(
        model.board().column_order,
        vec![ColumnId::from("col-2"), ColumnId::from("col-3"), ColumnId::from("col-1")]
    );
    assert_eq!(model.cursor.column, 2);
}

/// Test: Add a task and name it
#[test]
fn test_add_and_name_task() {
    let mut model = model();

    let cmds = press(&mut model, KeyCode::Char('a'));
    assert_eq!(cmds, vec![Command::SaveBoard]);
    assert_eq!(model.mode, Mode::Input(InputKind::TaskContent));

    replace_input(&mut model, "Write docs");
    let cmds = press(&mut model, KeyCode::Enter);
    assert_eq!(cmds, vec![Command::SaveBoard]);

    let id = model.selected_task_id().unwrap();
    assert_eq!(model.board().task(&id).unwrap().content, "Write docs");
    assert_eq!(column_tasks(model.board(), "col-1").last(), Some(&id.to_string()));
    assert_eq!(model.board().task_count(), 4);
}

#[test]
fn test_delete_column_after_confirmation() {
    let mut model = model();

    assert!(press(&mut model, KeyCode::Char('D')).is_empty());
    assert_eq!(model.mode, Mode::Input(InputKind::Confirm));
    assert_eq!(model.board().task_count(), 3);

    let cmds = press(&mut model, KeyCode::Enter);
    assert_eq!(cmds, vec![Command::SaveBoard]);
    assert_eq!(model.board().column_order.len(), 2);
    assert_eq!(model.board().task_count(), 1);
    assert!(model.board().task(&TaskId::from("task-1")).is_none());
    assert!(model.board().validate().is_empty());
}

#[test]
fn test_cancelled_delete_keeps_task() {
    let mut model = model();
    press_all(&mut model, &[KeyCode::Char('d'), KeyCode::Esc]);

    assert_eq!(model.mode, Mode::Browse);
    assert!(model.pending_delete.is_none());
    assert_eq!(model.board().task_count(), 3);
    assert_eq!(model.document.revision(), 0);
}

#[test]
fn test_invalid_due_date_reports_error_and_keeps_board() {
    let mut model = model();
    press(&mut model, KeyCode::Char('u'));
    replace_input(&mut model, "next week");
    let cmds = press(&mut model, KeyCode::Enter);

    assert!(cmds.is_empty());
    assert!(model.notification.is_some());
    assert!(model
        .board()
        .task(&TaskId::from("task-1"))
        .unwrap()
        .due_date
        .is_none());
}

/// Test: Import through the prompt replaces the board
/// Given an exported board on disk
/// When the import path is typed and the command result is fed back
/// Then the model holds the imported board and a save is requested
#[test]
fn test_import_round_trip_through_update() {
    let data = TestData::new();
    let path = data.path("shared.json");

    let mut source = model();
    press_all(&mut source, &[KeyCode::Char('x'), KeyCode::Char('M'), KeyCode::Char('l')]);
    storage::export_to(source.board(), &path).unwrap();

    let mut model = model();
    press(&mut model, KeyCode::Char('i'));
    replace_input(&mut model, &path.display().to_string());
    let cmds = press(&mut model, KeyCode::Enter);
    assert_eq!(cmds, vec![Command::ImportBoard { path: path.clone() }]);

    let imported = storage::import_from(&path).unwrap();
    let cmds = update(&mut model, Message::BoardImported(imported.clone()));

    assert_eq!(cmds, vec![Command::SaveBoard]);
    assert_eq!(model.board(), &imported.board);
    assert_eq!(model.board().column_order, source.board().column_order);
    assert!(model.board().task(&TaskId::from("task-1")).unwrap().completed);
    assert_eq!(model.mode, Mode::Browse);
}

#[test]
fn test_failed_import_keeps_board() {
    let mut model = model();
    let before = model.board().clone();

    let cmds = update(&mut model, Message::ImportFailed("bad file".to_string()));

    assert!(cmds.is_empty());
    assert_eq!(model.board(), &before);
    assert!(model.notification.is_some());
}

#[test]
fn test_session_survives_store_round_trip() {
    let data = TestData::new();
    let store = data.store();
    let mut model = model();

    press(&mut model, KeyCode::Char('+'));
    replace_input(&mut model, "urgent");
    press(&mut model, KeyCode::Enter);
    press(&mut model, KeyCode::Char('s'));
    replace_input(&mut model, "outline");
    press(&mut model, KeyCode::Enter);
    press_all(&mut model, &[KeyCode::Char('S'), KeyCode::Char('j'), KeyCode::Char(' ')]);

    store.save_sync(model.board()).unwrap();
    let reloaded = store.load_sync().unwrap();

    assert_eq!(reloaded.column_order, model.board().column_order);
    assert_eq!(reloaded.columns, model.board().columns);
    let first = reloaded.task(&TaskId::from("task-1")).unwrap();
    assert_eq!(first.tags, vec!["urgent"]);
    assert_eq!(first.subtask_progress(), (1, 1));
    assert!(reloaded.task(&TaskId::from("task-2")).unwrap().completed);
}

#[test]
fn test_quit_and_export_commands() {
    let mut model = model();
    assert_eq!(press(&mut model, KeyCode::Char('o')), vec![Command::ExportBoard]);
    assert_eq!(press(&mut model, KeyCode::Char('q')), vec![Command::Quit]);
}
