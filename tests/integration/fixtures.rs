//! Test fixtures for integration tests.
//!
//! Provides helpers for:
//! - Building boards with known layouts
//! - Generating boards and intents for property tests
//! - Temporary data directories

use std::collections::HashSet;
use std::path::PathBuf;

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;
use tempfile::TempDir;

use quadro::board::{
    Board, BoardId, Column, ColumnId, DropTarget, Intent, Subtask, SubtaskId, Task, TaskId,
};
use quadro::BoardStore;

pub fn at(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).unwrap()
}

/// Build a board from `(column, [task])` pairs, in order.
pub fn board_with(columns: &[(&str, &[&str])]) -> Board {
    let mut board = Board::new(BoardId::from("board-test"), "Test");
    for (column_id, tasks) in columns {
        let mut column = Column::new(ColumnId::from(*column_id), column_id.to_uppercase());
        for task_id in *tasks {
            let task = Task::new(TaskId::from(*task_id), format!("task {}", task_id), at(0));
            column.task_ids.push(task.id.clone());
            board.tasks.insert(task.id.clone(), task);
        }
        board.column_order.push(column.id.clone());
        board.columns.insert(column.id.clone(), column);
    }
    board
}

/// Ids of the tasks in `column`, in order.
pub fn column_tasks(board: &Board, column: &str) -> Vec<String> {
    board.columns[&ColumnId::from(column)]
        .task_ids
        .iter()
        .map(|t| t.to_string())
        .collect()
}

/// The set of task ids referenced by any column.
pub fn referenced_tasks(board: &Board) -> HashSet<TaskId> {
    board
        .columns
        .values()
        .flat_map(|c| c.task_ids.iter().cloned())
        .collect()
}

const COLUMN_POOL: &[&str] = &["a", "b", "c", "new", "ghost"];
const TASK_POOL: &[&str] = &[
    "t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7", "n0", "n1", "n2", "n3", "ghost",
];
const SUBTASK_POOL: &[&str] = &["s0", "s1", "s2", "ghost"];
const TAG_POOL: &[&str] = &["urgent", "bug", "later", ""];

fn arb_timestamp() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..4_000_000_000_000).prop_map(at)
}

fn arb_task(id: TaskId) -> impl Strategy<Value = Task> {
    (
        "\\PC{0,16}",
        proptest::option::of("\\PC{0,16}"),
        any::<bool>(),
        arb_timestamp(),
        proptest::option::of(arb_timestamp()),
        prop::collection::vec("[a-z]{1,6}", 0..3),
        prop::collection::vec(("\\PC{1,8}", any::<bool>()), 0..3),
    )
        .prop_map(
            move |(content, description, completed, created_at, due_date, tags, subtasks)| {
                let mut task = Task::new(id.clone(), content, created_at);
                task.description = description;
                task.completed = completed;
                task.completed_at = completed.then_some(created_at);
                task.due_date = due_date;
                task.tags = tags;
                task.subtasks = subtasks
                    .into_iter()
                    .enumerate()
                    .map(|(i, (content, done))| Subtask {
                        id: SubtaskId::from(format!("s{}", i)),
                        content,
                        done,
                    })
                    .collect();
                task
            },
        )
}

/// A valid board with one to three columns (`a`, `b`, `c`) holding up to
/// eight tasks `t0..t7` spread across them.
pub fn arb_board() -> impl Strategy<Value = Board> {
    (1usize..=3, 0usize..=8)
        .prop_flat_map(|(columns, tasks)| {
            let placed = (0..tasks)
                .map(|i| (arb_task(TaskId::from(format!("t{}", i))), 0..columns))
                .collect::<Vec<_>>();
            (Just(columns), "\\PC{0,12}", placed)
        })
        .prop_map(|(columns, title, placed)| {
            let mut board = Board::new(BoardId::from("board-test"), title);
            for id in &COLUMN_POOL[..columns] {
                let column = Column::new(ColumnId::from(*id), id.to_uppercase());
                board.column_order.push(column.id.clone());
                board.columns.insert(column.id.clone(), column);
            }
            for (task, column) in placed {
                let column_id = board.column_order[column].clone();
                if let Some(column) = board.columns.get_mut(&column_id) {
                    column.task_ids.push(task.id.clone());
                }
                board.tasks.insert(task.id.clone(), task);
            }
            board
        })
}

fn arb_column_id() -> impl Strategy<Value = ColumnId> {
    prop::sample::select(COLUMN_POOL).prop_map(ColumnId::from)
}

fn arb_task_id() -> impl Strategy<Value = TaskId> {
    prop::sample::select(TASK_POOL).prop_map(TaskId::from)
}

fn arb_subtask_id() -> impl Strategy<Value = SubtaskId> {
    prop::sample::select(SUBTASK_POOL).prop_map(SubtaskId::from)
}

fn arb_text() -> impl Strategy<Value = String> {
    "\\PC{0,12}"
}

fn arb_structural_intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        (arb_column_id(), arb_column_id())
            .prop_map(|(active, over)| Intent::ReorderColumns { active, over }),
        (arb_column_id(), arb_task_id(), arb_task_id()).prop_map(|(column, active, over)| {
            Intent::MoveTaskWithinColumn { column, active, over }
        }),
        (
            arb_task_id(),
            arb_column_id(),
            arb_column_id(),
            proptest::option::of(arb_task_id())
        )
            .prop_map(|(active, source, dest, over)| Intent::MoveTaskAcrossColumns {
                active,
                source,
                dest,
                over,
            }),
        (arb_task_id(), arb_task_id()).prop_map(|(active, over)| Intent::MoveTask {
            active,
            target: DropTarget::Task(over),
        }),
        (arb_task_id(), arb_column_id()).prop_map(|(active, column)| Intent::MoveTask {
            active,
            target: DropTarget::Column(column),
        }),
        (arb_column_id(), arb_task_id()).prop_map(|(column, task)| Intent::AddTask { column, task }),
        arb_task_id().prop_map(|task| Intent::DeleteTask { task }),
        arb_column_id().prop_map(|column| Intent::AddColumn { column }),
        arb_column_id().prop_map(|column| Intent::DeleteColumn { column }),
    ]
}

fn arb_edit_intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        arb_text().prop_map(|title| Intent::RenameBoard { title }),
        (arb_column_id(), arb_text())
            .prop_map(|(column, title)| Intent::RenameColumn { column, title }),
        (arb_column_id(), arb_text()).prop_map(|(column, description)| {
            Intent::EditColumnDescription { column, description }
        }),
        (arb_task_id(), arb_text())
            .prop_map(|(task, content)| Intent::EditTaskContent { task, content }),
        (arb_task_id(), arb_text()).prop_map(|(task, description)| {
            Intent::EditTaskDescription { task, description }
        }),
        arb_task_id().prop_map(|task| Intent::ToggleTaskCompleted { task }),
        (arb_task_id(), proptest::option::of(arb_timestamp()))
            .prop_map(|(task, due_date)| Intent::SetTaskDueDate { task, due_date }),
    ]
}

fn arb_detail_intent() -> impl Strategy<Value = Intent> {
    let tag = prop::sample::select(TAG_POOL).prop_map(String::from);
    prop_oneof![
        (arb_task_id(), tag.clone()).prop_map(|(task, tag)| Intent::AddTaskTag { task, tag }),
        (arb_task_id(), tag).prop_map(|(task, tag)| Intent::RemoveTaskTag { task, tag }),
        (arb_task_id(), arb_subtask_id(), arb_text()).prop_map(|(task, subtask, content)| {
            Intent::AddSubtask { task, subtask, content }
        }),
        (arb_task_id(), arb_subtask_id())
            .prop_map(|(task, subtask)| Intent::ToggleSubtask { task, subtask }),
        (arb_task_id(), arb_subtask_id())
            .prop_map(|(task, subtask)| Intent::DeleteSubtask { task, subtask }),
    ]
}

/// Any intent over a fixed id pool that overlaps [`arb_board`]'s ids and
/// also names ids that never exist.
pub fn arb_intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        3 => arb_structural_intent(),
        2 => arb_edit_intent(),
        2 => arb_detail_intent(),
    ]
}

/// A temporary data directory with a store inside it.
pub struct TestData {
    pub temp_dir: TempDir,
}

impl TestData {
    pub fn new() -> Self {
        Self {
            temp_dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn store(&self) -> BoardStore {
        BoardStore::new(self.path("board.json"))
    }
}
