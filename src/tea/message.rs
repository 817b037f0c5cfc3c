//! Messages for the TEA (The Elm Architecture) pattern.
//!
//! Messages are inputs to the update function - they come from keyboard
//! events or from command completion callbacks.

use std::path::PathBuf;

use crossterm::event::KeyEvent;

use crate::storage::Imported;

/// Input messages to the update function.
#[derive(Debug)]
pub enum Message {
    // Keyboard/terminal events
    Key(KeyEvent),
    Resize(u16, u16),

    // Persistence
    BoardSaved,
    BoardSaveFailed(String),

    // Export and import
    BoardExported(PathBuf),
    ExportFailed(String),
    /// A validated board read from an import file.
    BoardImported(Imported),
    ImportFailed(String),
}
