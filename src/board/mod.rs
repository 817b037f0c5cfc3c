//! Kanban document model and its mutation engine.
//!
//! - `model`: the normalized board and its invariants
//! - `engine`: pure transitions from one board to the next
//! - `intent`: user requests and the dispatcher that applies them

pub mod column;
pub mod engine;
pub mod id;
pub mod intent;
pub mod model;
pub mod task;

pub use column::Column;
pub use engine::DropTarget;
pub use id::{BoardId, ColumnId, SubtaskId, TaskId};
pub use intent::{apply, Intent};
pub use model::{Board, IntegrityIssue};
pub use task::{Subtask, Task};
