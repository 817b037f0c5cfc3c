//! Commands for the TEA (The Elm Architecture) pattern.
//!
//! Commands are outputs from the update function - they represent side effects
//! to be executed by the runtime.

use std::path::PathBuf;

/// Output commands from the update function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Persist the current board to the local store.
    SaveBoard,

    /// Write the current board to the configured export file.
    ExportBoard,
    /// Read a board from `path` and replace the current one.
    ImportBoard { path: PathBuf },

    // App lifecycle
    Quit,
}
