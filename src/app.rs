use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::Sender;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use tokio::runtime::Runtime;
use tokio::sync::mpsc;

use crate::config::Config;
use crate::render::RenderState;
use crate::storage::{self, BoardStore};
use crate::tea::{update, Command, Message, Model};
use crate::{qlog_debug, qlog_error, qlog_trace, Result};

const MAX_BG_MESSAGES: usize = 50;

pub struct LogicThread;

impl LogicThread {
    pub fn run(
        config: Config,
        store: BoardStore,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        Runtime::new()?.block_on(Self::run_async(config, store, state_tx, shutdown))
    }

    async fn run_async(
        config: Config,
        store: BoardStore,
        state_tx: Sender<RenderState>,
        shutdown: Arc<AtomicBool>,
    ) -> Result<()> {
        qlog_debug!(
            "LogicThread::run_async store={} confirm_delete={}",
            store.path().display(),
            config.confirm_delete
        );
        let mut model = Model::load(config, &store).await?;
        qlog_debug!(
            "Model loaded: {} columns, {} tasks",
            model.board().column_order.len(),
            model.board().task_count()
        );

        let (msg_tx, mut msg_rx) = mpsc::unbounded_channel::<Message>();

        send_state(&state_tx, &model);
        let mut esc_filter = EscapeSequenceFilter::new();

        loop {
            if shutdown.load(Ordering::Relaxed) {
                break;
            }

            // Keyboard input (priority)
            while event::poll(Duration::ZERO)? {
                match event::read()? {
                    Event::Key(key) if key.kind != KeyEventKind::Release => {
                        qlog_trace!("Key {:?} mode={:?}", key.code, model.mode);
                        if let KeyCode::Char(c) = key.code {
                            if esc_filter.filter(c) {
                                continue;
                            }
                        }

                        for cmd in update(&mut model, Message::Key(key)) {
                            if execute_command(&model, cmd, &store, &msg_tx) {
                                shutdown.store(true, Ordering::Relaxed);
                                save_board_sync(&model, &store);
                                return Ok(());
                            }
                        }
                    }
                    Event::Resize(width, height) => {
                        update(&mut model, Message::Resize(width, height));
                    }
                    _ => {}
                }

                if model.dirty {
                    send_state(&state_tx, &model);
                    model.dirty = false;
                }
            }

            // Command completions (bounded)
            for _ in 0..MAX_BG_MESSAGES {
                let Ok(msg) = msg_rx.try_recv() else { break };
                for cmd in update(&mut model, msg) {
                    if execute_command(&model, cmd, &store, &msg_tx) {
                        shutdown.store(true, Ordering::Relaxed);
                        save_board_sync(&model, &store);
                        return Ok(());
                    }
                }
            }

            if model.dirty {
                send_state(&state_tx, &model);
                model.dirty = false;
            }

            tokio::time::sleep(Duration::from_millis(1)).await;
        }

        save_board_sync(&model, &store);
        Ok(())
    }
}

/// Run a command's side effect. Returns `true` when the app should quit.
///
/// Must be called from within the tokio runtime.
pub fn execute_command(
    model: &Model,
    cmd: Command,
    store: &BoardStore,
    msg_tx: &mpsc::UnboundedSender<Message>,
) -> bool {
    match cmd {
        Command::SaveBoard => {
            qlog_debug!(
                "Command::SaveBoard revision={}",
                model.document.revision()
            );
            let board = model.board().clone();
            let store = store.clone();
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                match store.save(board).await {
                    Ok(()) => {
                        let _ = tx.send(Message::BoardSaved);
                    }
                    Err(e) => {
                        qlog_error!("Board save failed: {}", e);
                        let _ = tx.send(Message::BoardSaveFailed(e.to_string()));
                    }
                }
            });
        }

        Command::ExportBoard => {
            let path = match model.config.export_path() {
                Ok(path) => path,
                Err(e) => {
                    let _ = msg_tx.send(Message::ExportFailed(e.to_string()));
                    return false;
                }
            };
            qlog_debug!("Command::ExportBoard path={}", path.display());
            let board = model.board().clone();
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                match storage::export_to_async(board, path).await {
                    Ok(path) => {
                        let _ = tx.send(Message::BoardExported(path));
                    }
                    Err(e) => {
                        qlog_error!("Board export failed: {}", e);
                        let _ = tx.send(Message::ExportFailed(e.to_string()));
                    }
                }
            });
        }

        Command::ImportBoard { path } => {
            qlog_debug!("Command::ImportBoard path={}", path.display());
            let tx = msg_tx.clone();
            tokio::spawn(async move {
                match storage::import_from_async(path).await {
                    Ok(imported) => {
                        let _ = tx.send(Message::BoardImported(imported));
                    }
                    Err(e) => {
                        qlog_error!("Board import failed: {}", e);
                        let _ = tx.send(Message::ImportFailed(e.to_string()));
                    }
                }
            });
        }

        Command::Quit => {
            qlog_debug!("Command::Quit");
            return true;
        }
    }

    false
}

fn send_state(state_tx: &Sender<RenderState>, model: &Model) {
    let _ = state_tx.try_send(model.snapshot());
}

/// Final synchronous save on exit. A session without changes leaves the
/// store and its backup alone.
fn save_board_sync(model: &Model, store: &BoardStore) {
    if model.document.revision() == 0 {
        return;
    }
    if let Err(e) = store.save_sync(model.board()) {
        qlog_error!("Final board save failed: {}", e);
    }
}

struct EscapeSequenceFilter {
    len: u8,
    active: bool,
}

impl EscapeSequenceFilter {
    fn new() -> Self {
        Self {
            len: 0,
            active: false,
        }
    }

    /// Swallow stray characters of an escape sequence that crossterm failed
    /// to decode. `[` and `O` start a sequence only right after ESC.
    fn filter(&mut self, c: char) -> bool {
        if c == '\x1b' {
            self.active = true;
            self.len = 1;
            return true;
        }
        if self.active {
            self.len += 1;
            if (c.is_ascii_alphabetic() && self.len > 2) || c == '~' || self.len > 10 {
                self.active = false;
            }
            return true;
        }
        false
    }
}
