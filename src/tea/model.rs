//! Model for the TEA (The Elm Architecture) pattern.
//!
//! The Model is pure application state: the owned board document plus the
//! cursor, mode and input state of the terminal board.

use crate::board::{Board, Column, ColumnId, Intent, TaskId};
use crate::config::Config;
use crate::document::Document;
use crate::render::{next_version, ColumnView, RenderState, TaskView};
use crate::storage::BoardStore;

/// Level of a notification message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    /// Error notification - displayed in red with "Error:" prefix
    Error,
    /// Informational notification - displayed in green
    Info,
}

/// A notification message to display to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NotificationLevel,
    pub message: String,
}

/// The item picked up in drag mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Held {
    Task(TaskId),
    Column(ColumnId),
}

/// Application UI mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Browse,
    Input(InputKind),
    /// Keyboard drag: arrows move the held item, Enter drops it.
    Drag(Held),
}

/// Types of input prompts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    TaskContent,
    TaskDescription,
    ColumnTitle,
    ColumnDescription,
    BoardTitle,
    Tag,
    Subtask,
    DueDate,
    ImportPath,
    Confirm,
}

impl InputKind {
    pub fn label(&self) -> &'static str {
        match self {
            InputKind::TaskContent => "Task",
            InputKind::TaskDescription => "Description",
            InputKind::ColumnTitle => "Column",
            InputKind::ColumnDescription => "Column description",
            InputKind::BoardTitle => "Board",
            InputKind::Tag => "Tag",
            InputKind::Subtask => "Subtask",
            InputKind::DueDate => "Due (YYYY-MM-DD)",
            InputKind::ImportPath => "Import from",
            InputKind::Confirm => "Delete?",
        }
    }
}

/// What a pending input or delete confirmation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Board,
    Column(ColumnId),
    Task(TaskId),
}

/// Selected column (index into the column order) and task row within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub column: usize,
    pub task: usize,
}

pub struct Model {
    pub document: Document,
    pub cursor: Cursor,
    pub mode: Mode,

    // Input state
    pub input_buffer: String,
    pub input_target: Option<Target>,
    pub pending_delete: Option<Target>,
    pub notification: Option<Notification>,

    /// Whether the keymap legend is expanded (toggled by '?')
    pub show_keymap: bool,

    // Dirty flag - set when state changes and render is needed
    pub dirty: bool,

    pub config: Config,
}

impl Model {
    pub fn new(board: Board, config: Config) -> Self {
        Self {
            document: Document::new(board),
            cursor: Cursor::default(),
            mode: Mode::default(),
            input_buffer: String::new(),
            input_target: None,
            pending_delete: None,
            notification: None,
            show_keymap: false,
            dirty: true,
            config,
        }
    }

    /// Load the model from the local store.
    pub async fn load(config: Config, store: &BoardStore) -> crate::Result<Self> {
        let board = store.load().await?;
        Ok(Self::new(board, config))
    }

    pub fn board(&self) -> &Board {
        self.document.board()
    }

    pub fn selected_column(&self) -> Option<&Column> {
        let board = self.board();
        board
            .column_order
            .get(self.cursor.column)
            .and_then(|id| board.column(id))
    }

    pub fn selected_column_id(&self) -> Option<ColumnId> {
        self.selected_column().map(|c| c.id.clone())
    }

    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.selected_column()
            .and_then(|c| c.task_ids.get(self.cursor.task))
            .cloned()
    }

    /// Keep the cursor inside the board after columns or tasks disappear.
    pub fn clamp_cursor(&mut self) {
        let columns = self.board().column_order.len();
        if columns == 0 {
            self.cursor = Cursor::default();
            return;
        }
        self.cursor.column = self.cursor.column.min(columns - 1);
        let tasks = self.selected_column().map_or(0, |c| c.task_ids.len());
        self.cursor.task = self.cursor.task.min(tasks.saturating_sub(1));
    }

    /// Move the cursor onto `task_id`, wherever it lives now.
    pub fn focus_task(&mut self, task_id: &TaskId) {
        let board = self.document.board();
        let Some(column_id) = board.column_of(task_id) else {
            return;
        };
        let column = board.column_index(column_id);
        let task = board.column(column_id).and_then(|c| c.position_of(task_id));
        if let (Some(column), Some(task)) = (column, task) {
            self.cursor = Cursor { column, task };
        }
    }

    pub fn focus_column(&mut self, column_id: &ColumnId) {
        if let Some(column) = self.board().column_index(column_id) {
            self.cursor = Cursor { column, task: 0 };
            self.clamp_cursor();
        }
    }

    /// Apply an intent to the document. Returns `true` when the board changed.
    pub fn apply(&mut self, intent: &Intent) -> bool {
        let changed = self.document.apply(intent);
        if changed {
            self.clamp_cursor();
            self.dirty = true;
        }
        changed
    }

    /// Replace the whole board, as an import does, and reset the cursor.
    pub fn replace_board(&mut self, board: Board) {
        self.document.replace(board);
        self.cursor = Cursor::default();
        self.clamp_cursor();
        self.dirty = true;
    }

    /// Describe the pending delete by what it removes.
    pub fn pending_delete_label(&self) -> Option<String> {
        let board = self.board();
        match self.pending_delete.as_ref()? {
            Target::Task(id) => board.task(id).map(|t| format!("task '{}'", t.content)),
            Target::Column(id) => board.column(id).map(|c| match c.task_ids.len() {
                0 => format!("column '{}'", c.title),
                1 => format!("column '{}' and its task", c.title),
                n => format!("column '{}' and its {} tasks", c.title, n),
            }),
            Target::Board => None,
        }
    }

    /// Create an immutable snapshot for the render thread.
    pub fn snapshot(&self) -> RenderState {
        let board = self.board();
        let held = match &self.mode {
            Mode::Drag(held) => Some(held),
            _ => None,
        };

        let columns = board
            .ordered_columns()
            .map(|column| ColumnView {
                id: column.id.clone(),
                title: column.title.clone(),
                description: column.description.clone(),
                held: held == Some(&Held::Column(column.id.clone())),
                tasks: board
                    .column_tasks(column)
                    .map(|task| TaskView {
                        id: task.id.clone(),
                        content: task.content.clone(),
                        description: task.description.clone(),
                        completed: task.completed,
                        due_date: task.due_date,
                        tags: task.tags.clone(),
                        subtasks: task.subtask_progress(),
                        held: held == Some(&Held::Task(task.id.clone())),
                    })
                    .collect(),
            })
            .collect();

        RenderState {
            version: next_version(),
            title: board.title.clone(),
            columns,
            cursor: self.cursor,
            mode: self.mode.clone(),
            input_buffer: self.input_buffer.clone(),
            pending_delete: self.pending_delete_label(),
            notification: self.notification.clone(),
            show_keymap: self.show_keymap,
            task_count: board.task_count(),
            completed_count: board.completed_count(),
        }
    }
}
