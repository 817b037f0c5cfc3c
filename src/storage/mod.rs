//! Persistence adapter: the local board store plus JSON export and import.

pub mod migration;

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::task::spawn_blocking;

use crate::board::Board;
use crate::config::Config;
use crate::{qlog, qlog_debug, Error, Result};

pub use migration::{DocumentFormat, MigrationReport};

async fn blocking<F, T>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    spawn_blocking(f)
        .await
        .map_err(|e| Error::TaskJoin(e.to_string()))?
}

/// Render a board in the persisted shape, indented.
pub fn to_json_pretty(board: &Board) -> Result<String> {
    Ok(serde_json::to_string_pretty(board)?)
}

/// A decoded document together with what the legacy migration did, if the
/// document used the older shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Imported {
    pub board: Board,
    pub migration: Option<MigrationReport>,
}

impl Imported {
    /// One-line description for the CLI and the TUI notification.
    pub fn summary(&self) -> String {
        let mut text = format!(
            "Imported '{}' ({} columns, {} tasks)",
            self.board.title,
            self.board.column_order.len(),
            self.board.task_count()
        );
        if let Some(report) = &self.migration {
            text.push_str("; ");
            text.push_str(&report.describe());
        }
        text
    }
}

/// Decode a stored or imported document, migrating the legacy shape, and
/// reject boards that break the integrity invariants.
pub fn decode_imported(contents: &str, now: DateTime<Utc>) -> Result<Imported> {
    let (board, migration) = migration::parse_document(contents, now)?;
    board.check_integrity()?;
    Ok(Imported { board, migration })
}

pub fn decode_document(contents: &str, now: DateTime<Utc>) -> Result<Board> {
    Ok(decode_imported(contents, now)?.board)
}

fn write_atomic(path: &Path, contents: &str, keep_backup: bool) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            qlog_debug!("Creating directory: {}", parent.display());
            fs::create_dir_all(parent)?;
        }
    }

    if keep_backup && path.exists() {
        let backup_path = path.with_extension("json.bak");
        qlog_debug!("Creating board backup: {}", backup_path.display());
        fs::copy(path, &backup_path)?;
    }

    let temp_path = path.with_extension("json.tmp");
    fs::write(&temp_path, contents)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Orders writes to one store file.
///
/// Every save draws a ticket when it is requested. Writes happen one at a
/// time under `written`, and a write whose ticket is older than the last
/// one written is dropped, so the file always ends up holding the most
/// recently requested board.
#[derive(Debug, Default)]
struct WriteOrder {
    issued: AtomicU64,
    written: Mutex<u64>,
}

impl WriteOrder {
    fn ticket(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns `false` when a newer write already landed.
    fn write(&self, ticket: u64, path: &Path, contents: &str) -> Result<bool> {
        let mut written = self.written.lock().unwrap_or_else(|e| e.into_inner());
        if ticket < *written {
            return Ok(false);
        }
        write_atomic(path, contents, true)?;
        *written = ticket;
        Ok(true)
    }
}

/// The local store: one JSON file holding the current board.
///
/// Clones share the write ordering, so saves from spawned tasks and the
/// final synchronous save never overwrite a newer board with an older one.
#[derive(Debug, Clone)]
pub struct BoardStore {
    path: PathBuf,
    order: Arc<WriteOrder>,
}

impl BoardStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            order: Arc::new(WriteOrder::default()),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(config.board_path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub async fn load(&self) -> Result<Board> {
        let store = self.clone();
        blocking(move || store.load_sync()).await
    }

    /// Load the stored board, or the built-in default when nothing is stored.
    pub fn load_sync(&self) -> Result<Board> {
        qlog_debug!("BoardStore::load_sync path={}", self.path.display());

        if !self.path.exists() {
            qlog_debug!("Board file not found, using default board");
            return Ok(Board::default_board(Utc::now()));
        }

        let contents = fs::read_to_string(&self.path)?;
        let board = decode_document(&contents, Utc::now())?;
        qlog_debug!(
            "Board loaded: columns={} tasks={}",
            board.column_order.len(),
            board.task_count()
        );
        Ok(board)
    }

    /// Save on the blocking pool. The save's place in line is fixed when
    /// this is called, not when the returned future first runs.
    pub fn save(&self, board: Board) -> impl Future<Output = Result<()>> + Send + 'static {
        let ticket = self.order.ticket();
        let store = self.clone();
        async move {
            qlog_debug!(
                "BoardStore::save ticket={} tasks={}",
                ticket,
                board.task_count()
            );
            let contents = to_json_pretty(&board)?;
            blocking(move || store.write_ticket(ticket, &contents)).await
        }
    }

    pub fn save_sync(&self, board: &Board) -> Result<()> {
        let ticket = self.order.ticket();
        let contents = to_json_pretty(board)?;
        self.write_ticket(ticket, &contents)
    }

    fn write_ticket(&self, ticket: u64, contents: &str) -> Result<()> {
        if self.order.write(ticket, &self.path, contents)? {
            qlog_debug!("Board saved: {} ticket={}", self.path.display(), ticket);
        } else {
            qlog_debug!("Skipped stale save ticket={}", ticket);
        }
        Ok(())
    }
}

/// Write `board` as indented JSON to `path`, replacing any existing file.
pub fn export_to(board: &Board, path: &Path) -> Result<()> {
    let contents = to_json_pretty(board)?;
    write_atomic(path, &contents, false)?;
    qlog!("Exported board to {}", path.display());
    Ok(())
}

pub async fn export_to_async(board: Board, path: PathBuf) -> Result<PathBuf> {
    blocking(move || {
        export_to(&board, &path)?;
        Ok(path)
    })
    .await
}

/// Read a board from a user-chosen file. Malformed JSON and integrity
/// violations are errors; nothing is returned partially.
pub fn import_from(path: &Path) -> Result<Imported> {
    qlog_debug!("import_from path={}", path.display());
    let contents = fs::read_to_string(path)?;
    let imported = decode_imported(&contents, Utc::now())?;
    qlog!(
        "Imported board from {}: columns={} tasks={} migrated={}",
        path.display(),
        imported.board.column_order.len(),
        imported.board.task_count(),
        imported.migration.is_some()
    );
    Ok(imported)
}

pub async fn import_from_async(path: PathBuf) -> Result<Imported> {
    blocking(move || import_from(&path)).await
}
