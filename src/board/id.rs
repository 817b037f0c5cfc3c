//! Opaque string identifiers for board entities.
//!
//! Identifiers stay plain strings on the wire so documents written by older
//! versions (`task-1`, `col-1700000000000`) load unchanged. Freshly generated
//! ids are `<prefix>-<uuid v4>`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            /// Generate a new unique identifier.
            pub fn generate() -> Self {
                Self(format!("{}-{}", $prefix, Uuid::new_v4()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Return at most the first 13 characters for logs.
            pub fn short(&self) -> String {
                self.0.chars().take(13).collect()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }
    };
}

string_id!(
    /// Identifier of the board document itself.
    BoardId,
    "board"
);
string_id!(
    /// Identifier of a column.
    ColumnId,
    "col"
);
string_id!(
    /// Identifier of a task.
    TaskId,
    "task"
);
string_id!(
    /// Identifier of a subtask, unique within its parent task.
    SubtaskId,
    "sub"
);
