//! Store, export and import against real files.

use std::fs;

use proptest::prelude::*;
use quadro::board::{engine, Board, ColumnId, SubtaskId, TaskId};
use quadro::storage::{self, BoardStore};
use quadro::Error;

use crate::fixtures::{arb_board, at, board_with, column_tasks, TestData};

fn rich_board() -> Board {
    let board = board_with(&[("todo", &["t1", "t2"]), ("done", &["t3"])]);
    let t1 = TaskId::from("t1");
    let board = engine::toggle_task_completed(&board, &TaskId::from("t3"), at(1_700_000_000_000));
    let board = engine::add_task_tag(&board, &t1, "urgent");
    let board = engine::set_task_due_date(&board, &t1, Some(at(1_800_000_000_000)));
    let board = engine::add_subtask_with_id(&board, &t1, SubtaskId::from("s1"), "draft");
    engine::edit_column_description(&board, &ColumnId::from("done"), "Finished")
}

#[test]
fn test_export_then_import_is_identity() {
    let data = TestData::new();
    let board = rich_board();
    let path = data.path("exported.json");

    storage::export_to(&board, &path).unwrap();
    let imported = storage::import_from(&path).unwrap().board;

    assert_eq!(imported, board);
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_exported_json_decodes_to_same_board(board in arb_board()) {
        let json = storage::to_json_pretty(&board).unwrap();
        let decoded = storage::decode_document(&json, at(0)).unwrap();
        prop_assert_eq!(decoded, board);
    }

    #[test]
    fn prop_export_file_imports_without_migration(board in arb_board()) {
        let data = TestData::new();
        let path = data.path("exported.json");

        storage::export_to(&board, &path).unwrap();
        let imported = storage::import_from(&path).unwrap();

        prop_assert!(imported.migration.is_none());
        prop_assert_eq!(imported.board, board);
    }
}

#[test]
fn test_export_overwrites_without_backup() {
    let data = TestData::new();
    let path = data.path("exported.json");

    storage::export_to(&board_with(&[("a", &[])]), &path).unwrap();
    storage::export_to(&rich_board(), &path).unwrap();

    assert!(!data.path("exported.json.bak").exists());
    assert!(!data.path("exported.json.tmp").exists());
    assert_eq!(storage::import_from(&path).unwrap().board, rich_board());
}

#[test]
fn test_export_uses_camel_case_and_epoch_millis() {
    let data = TestData::new();
    let path = data.path("exported.json");
    storage::export_to(&rich_board(), &path).unwrap();

    let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(value["columnOrder"], serde_json::json!(["todo", "done"]));
    assert_eq!(value["tasks"]["t3"]["completedAt"], 1_700_000_000_000i64);
    assert_eq!(value["tasks"]["t1"]["tags"], serde_json::json!(["urgent"]));
    assert!(value["tasks"]["t2"].get("dueDate").is_none());
}

#[test]
fn test_store_save_keeps_previous_as_backup() {
    let data = TestData::new();
    let store = data.store();
    let first = board_with(&[("a", &["t1"])]);
    let second = engine::delete_task(&first, &TaskId::from("t1"));

    store.save_sync(&first).unwrap();
    assert!(!data.path("board.json.bak").exists());
    store.save_sync(&second).unwrap();

    assert_eq!(store.load_sync().unwrap(), second);
    let backup = BoardStore::new(data.path("board.json.bak"));
    assert_eq!(backup.load_sync().unwrap(), first);
}

#[test]
fn test_missing_store_loads_default_board() {
    let data = TestData::new();
    let board = data.store().load_sync().unwrap();

    assert_eq!(board.column_order.len(), 3);
    assert_eq!(board.task_count(), 3);
    assert!(board.validate().is_empty());
}

#[test]
fn test_import_legacy_nested_document() {
    let data = TestData::new();
    let path = data.path("legacy.json");
    fs::write(
        &path,
        r#"{
            "id": "board-1",
            "title": "Old",
            "columns": [
                {"id": "col-a", "title": "A", "tasks": [
                    {"id": "task-1", "content": "one", "createdAt": 1000},
                    {"id": "task-2", "content": "two", "completed": true}
                ]},
                {"id": "col-b", "title": "B", "description": "later", "tasks": []}
            ]
        }"#,
    )
    .unwrap();

    let board = storage::import_from(&path).unwrap().board;

    assert!(board.validate().is_empty());
    assert_eq!(board.title, "Old");
    assert_eq!(board.column_order, vec![ColumnId::from("col-a"), ColumnId::from("col-b")]);
    assert_eq!(column_tasks(&board, "col-a"), vec!["task-1", "task-2"]);
    assert_eq!(board.task(&TaskId::from("task-1")).unwrap().created_at, at(1000));
    assert!(board.task(&TaskId::from("task-2")).unwrap().completed);
    assert_eq!(
        board.column(&ColumnId::from("col-b")).unwrap().description.as_deref(),
        Some("later")
    );
}

#[test]
fn test_legacy_duplicate_task_keeps_first() {
    let data = TestData::new();
    let path = data.path("legacy.json");
    fs::write(
        &path,
        r#"{"columns": [
            {"id": "a", "title": "A", "tasks": [{"id": "t", "content": "first"}]},
            {"id": "b", "title": "B", "tasks": [{"id": "t", "content": "second"}]}
        ]}"#,
    )
    .unwrap();

    let board = storage::import_from(&path).unwrap().board;

    assert!(board.validate().is_empty());
    assert_eq!(board.task(&TaskId::from("t")).unwrap().content, "first");
    assert!(column_tasks(&board, "b").is_empty());
}

#[test]
fn test_import_malformed_json_is_json_error() {
    let data = TestData::new();
    let path = data.path("broken.json");
    fs::write(&path, "{ \"id\": ").unwrap();

    let err = storage::import_from(&path).unwrap_err();
    assert!(matches!(err, Error::Json(_)), "got {:?}", err);
}

#[test]
fn test_import_rejects_dangling_task_reference() {
    let data = TestData::new();
    let path = data.path("dangling.json");
    fs::write(
        &path,
        r#"{
            "id": "b", "title": "T",
            "tasks": {},
            "columns": {"c": {"id": "c", "title": "C", "taskIds": ["ghost"]}},
            "columnOrder": ["c"]
        }"#,
    )
    .unwrap();

    let err = storage::import_from(&path).unwrap_err();
    assert!(matches!(err, Error::Integrity(_)), "got {:?}", err);
}

#[test]
fn test_import_rejects_scalar_top_level() {
    let data = TestData::new();
    let path = data.path("scalar.json");
    fs::write(&path, "[1, 2, 3]").unwrap();

    let err = storage::import_from(&path).unwrap_err();
    assert!(matches!(err, Error::UnsupportedDocument(_)), "got {:?}", err);
}

#[test]
fn test_import_missing_file_is_io_error() {
    let data = TestData::new();
    let err = storage::import_from(&data.path("nope.json")).unwrap_err();
    assert!(matches!(err, Error::Io(_)), "got {:?}", err);
}

#[test]
fn test_corrupt_store_does_not_load() {
    let data = TestData::new();
    fs::write(data.path("board.json"), "not json").unwrap();
    assert!(data.store().load_sync().is_err());
}

#[tokio::test]
async fn test_async_save_and_load() {
    let data = TestData::new();
    let store = data.store();
    let board = rich_board();

    store.save(board.clone()).await.unwrap();
    assert_eq!(store.load().await.unwrap(), board);
}

#[tokio::test]
async fn test_async_export_returns_path() {
    let data = TestData::new();
    let path = data.path("nested/dir/out.json");

    let written = storage::export_to_async(rich_board(), path.clone()).await.unwrap();
    assert_eq!(written, path);

    let imported = storage::import_from_async(path).await.unwrap().board;
    assert_eq!(imported, rich_board());
}
