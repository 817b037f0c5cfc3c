//! Invariants of the mutation engine across long intent sequences.

use std::collections::HashSet;

use proptest::prelude::*;
use proptest::sample::Index;

use quadro::board::{apply, engine, ColumnId, Intent, TaskId};
use quadro::Document;

use crate::fixtures::{arb_board, arb_intent, at, board_with, column_tasks, referenced_tasks};

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    /// Test: Referenced tasks equal the task collection
    /// Given any board and any sequence of intents, including ones naming missing ids
    /// When each is applied in turn
    /// Then every intermediate board passes validation
    #[test]
    fn prop_intent_sequences_preserve_integrity(
        board in arb_board(),
        intents in prop::collection::vec(arb_intent(), 0..60),
    ) {
        let mut board = board;
        for (step, intent) in intents.iter().enumerate() {
            board = apply(&board, intent, at(step as i64));

            let keys: HashSet<TaskId> = board.tasks.keys().cloned().collect();
            prop_assert_eq!(referenced_tasks(&board), keys, "step {} after {:?}", step, intent);
            prop_assert!(board.validate().is_empty(), "step {}: {:?}", step, board.validate());
        }
    }

    #[test]
    fn prop_apply_never_mutates_its_input(board in arb_board(), intent in arb_intent()) {
        let snapshot = board.clone();
        let _ = apply(&board, &intent, at(7));
        prop_assert_eq!(board, snapshot);
    }

    #[test]
    fn prop_reorder_column_onto_itself_is_noop(board in arb_board(), pick in any::<Index>()) {
        let column = pick.get(&board.column_order).clone();
        prop_assert_eq!(engine::reorder_columns(&board, &column, &column), board);
    }

    /// Test: Move then move back restores the original layout
    /// Given a task and a different destination column
    /// When it is moved across and then back in front of its old successor
    /// Then the board equals the original
    #[test]
    fn prop_move_across_and_back_restores_board(
        board in arb_board(),
        task_pick in any::<Index>(),
        dest_pick in any::<Index>(),
        over_pick in proptest::option::of(any::<Index>()),
    ) {
        prop_assume!(!board.tasks.is_empty() && board.column_order.len() >= 2);

        let task_ids: Vec<TaskId> = board.tasks.keys().cloned().collect();
        let active = task_pick.get(&task_ids).clone();
        let source = board.column_of(&active).cloned().unwrap();
        let others: Vec<ColumnId> = board
            .column_order
            .iter()
            .filter(|c| **c != source)
            .cloned()
            .collect();
        let dest = dest_pick.get(&others).clone();

        let dest_tasks = &board.columns[&dest].task_ids;
        let over = over_pick
            .filter(|_| !dest_tasks.is_empty())
            .map(|i| i.get(dest_tasks).clone());
        let source_tasks = &board.columns[&source].task_ids;
        let position = source_tasks.iter().position(|t| *t == active).unwrap();
        let successor = source_tasks.get(position + 1).cloned();

        let moved = engine::move_task_across_columns(&board, &active, &source, &dest, over.as_ref());
        prop_assert!(moved.columns[&dest].contains(&active));
        prop_assert!(!moved.columns[&source].contains(&active));

        let back =
            engine::move_task_across_columns(&moved, &active, &dest, &source, successor.as_ref());
        prop_assert_eq!(back, board);
    }

    #[test]
    fn prop_delete_column_removes_exactly_its_tasks(board in arb_board(), pick in any::<Index>()) {
        let column = pick.get(&board.column_order).clone();
        let owned: HashSet<TaskId> = board.columns[&column].task_ids.iter().cloned().collect();

        let next = engine::delete_column(&board, &column);

        let expected: HashSet<TaskId> =
            board.tasks.keys().filter(|t| !owned.contains(*t)).cloned().collect();
        let remaining: HashSet<TaskId> = next.tasks.keys().cloned().collect();
        prop_assert_eq!(remaining, expected);
        prop_assert!(!next.columns.contains_key(&column));
        prop_assert!(!next.column_order.contains(&column));
        for id in &next.column_order {
            prop_assert_eq!(&next.columns[id], &board.columns[id]);
        }
        prop_assert!(next.validate().is_empty());
    }
}

#[test]
fn test_move_across_lands_before_target() {
    let board = board_with(&[("a", &["t1", "t2", "t3"]), ("b", &["t4", "t5"])]);
    let moved = engine::move_task_across_columns(
        &board,
        &TaskId::from("t2"),
        &ColumnId::from("a"),
        &ColumnId::from("b"),
        Some(&TaskId::from("t5")),
    );
    assert_eq!(column_tasks(&moved, "a"), vec!["t1", "t3"]);
    assert_eq!(column_tasks(&moved, "b"), vec!["t4", "t2", "t5"]);
}

#[test]
fn test_move_to_done_example() {
    let board = board_with(&[("to-do", &["t1", "t2"]), ("done", &[])]);
    let next = engine::move_task_across_columns(
        &board,
        &TaskId::from("t1"),
        &ColumnId::from("to-do"),
        &ColumnId::from("done"),
        None,
    );
    assert_eq!(column_tasks(&next, "to-do"), vec!["t2"]);
    assert_eq!(column_tasks(&next, "done"), vec!["t1"]);
}

#[test]
fn test_document_counts_only_effective_changes() {
    let mut doc = Document::new(board_with(&[("a", &["t1"]), ("b", &[])]));
    let intents = [
        Intent::DeleteTask {
            task: TaskId::from("nope"),
        },
        Intent::MoveTaskAcrossColumns {
            active: TaskId::from("t1"),
            source: ColumnId::from("a"),
            dest: ColumnId::from("b"),
            over: None,
        },
        Intent::MoveTaskAcrossColumns {
            active: TaskId::from("t1"),
            source: ColumnId::from("a"),
            dest: ColumnId::from("b"),
            over: None,
        },
        Intent::ToggleTaskCompleted {
            task: TaskId::from("t1"),
        },
    ];

    let changed: Vec<bool> = intents.iter().map(|i| doc.apply_at(i, at(5))).collect();
    assert_eq!(changed, vec![false, true, false, true]);
    assert_eq!(doc.revision(), 2);
    assert_eq!(
        doc.board().task(&TaskId::from("t1")).unwrap().completed_at,
        Some(at(5))
    );
}
