//! The single owned board of a session.

use chrono::{DateTime, Utc};

use crate::board::{self, Board, Intent};
use crate::qlog_debug;

/// Owns the board and counts accepted changes.
///
/// All mutation goes through [`Document::apply`] or [`Document::replace`];
/// callers only ever see the board by shared reference.
#[derive(Debug, Clone)]
pub struct Document {
    board: Board,
    revision: u64,
}

impl Document {
    pub fn new(board: Board) -> Self {
        Self { board, revision: 0 }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Number of changes accepted since the document was opened.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply an intent using the current time. Returns `true` when the board
    /// changed.
    pub fn apply(&mut self, intent: &Intent) -> bool {
        self.apply_at(intent, Utc::now())
    }

    pub fn apply_at(&mut self, intent: &Intent, now: DateTime<Utc>) -> bool {
        let next = board::apply(&self.board, intent, now);
        if next == self.board {
            qlog_debug!("Document::apply intent={} unchanged", intent.name());
            return false;
        }
        self.board = next;
        self.revision += 1;
        qlog_debug!(
            "Document::apply intent={} revision={}",
            intent.name(),
            self.revision
        );
        true
    }

    /// Swap in a whole board, as an import does.
    pub fn replace(&mut self, board: Board) {
        self.board = board;
        self.revision += 1;
        qlog_debug!(
            "Document::replace board={} revision={}",
            self.board.id.short(),
            self.revision
        );
    }
}
