use std::io::{self, stdout, Stdout};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use crossbeam_channel::{Receiver, TryRecvError};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::{backend::CrosstermBackend, Terminal};

use quadro::app::LogicThread;
use quadro::board::Board;
use quadro::config::Config;
use quadro::render::RenderState;
use quadro::storage::{self, BoardStore};
use quadro::{qlog, ui, Result};

const FRAME_DURATION: Duration = Duration::from_micros(16_666); // 60fps

/// Quadro - a kanban board for the terminal
#[derive(Parser, Debug)]
#[command(name = "quadro")]
#[command(version, about, long_about = None)]
#[command(
    after_help = "ENVIRONMENT:\n    QUADRO_DEBUG=1     Enable debug logging (alternative to --debug)"
)]
pub struct Cli {
    /// Enable debug logging (writes to ~/.quadro/quadro.log)
    #[arg(short = 'd', long)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Print the stored board
    Show,

    /// Write the stored board to a JSON file
    Export {
        /// Output file (defaults to board.json in the export directory)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Replace the stored board with one read from a JSON file
    Import {
        /// File to import; older nested documents are migrated
        path: PathBuf,
    },

    /// Restore the default board
    Reset {
        /// Reset even when the stored board has tasks
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load()?;
    quadro::log::init_with_debug(&config.data_dir()?, cli.debug);
    config.ensure_dirs()?;
    let store = BoardStore::from_config(&config)?;

    match cli.command {
        Some(Command::Show) => return run_show(&store),
        Some(Command::Export { output }) => return run_export(&config, &store, output),
        Some(Command::Import { path }) => return run_import(&store, &path),
        Some(Command::Reset { force }) => return run_reset(&store, force),
        None => {}
    }

    if quadro::log::is_debug() {
        qlog!("Quadro starting (debug mode enabled)");
    } else {
        qlog!("Quadro starting");
    }

    let shutdown = Arc::new(AtomicBool::new(false));
    let (state_tx, state_rx) = crossbeam_channel::bounded::<RenderState>(1);

    let shutdown_clone = shutdown.clone();
    let logic_handle =
        thread::spawn(move || LogicThread::run(config, store, state_tx, shutdown_clone));

    let mut terminal = setup_terminal()?;
    let result = render_loop(&mut terminal, state_rx, &shutdown);

    shutdown.store(true, Ordering::SeqCst);
    let logic_result = logic_handle.join();
    restore_terminal(&mut terminal)?;

    if let Ok(Err(e)) = logic_result {
        eprintln!("Error: {}", e);
        if let Some(path) = quadro::log::log_path() {
            eprintln!("See {} for details", path.display());
        }
        return Err(e);
    }
    result
}

fn run_show(store: &BoardStore) -> Result<()> {
    let board = store.load_sync()?;
    print!("{}", format_board(&board));
    Ok(())
}

fn run_export(config: &Config, store: &BoardStore, output: Option<PathBuf>) -> Result<()> {
    let board = store.load_sync()?;
    let path = match output {
        Some(path) => path,
        None => config.export_path()?,
    };
    storage::export_to(&board, &path)?;
    println!("Exported '{}' to {}", board.title, path.display());
    Ok(())
}

fn run_import(store: &BoardStore, path: &Path) -> Result<()> {
    let imported = storage::import_from(path)?;
    store.save_sync(&imported.board)?;
    println!("{}", imported.summary());
    Ok(())
}

fn run_reset(store: &BoardStore, force: bool) -> Result<()> {
    qlog!("Reset command initiated (force={})", force);

    if store.exists() && !force {
        let current = store.load_sync()?;
        if current.task_count() > 0 {
            println!(
                "The stored board has {} task(s). Use 'quadro reset --force' to replace it.",
                current.task_count()
            );
            return Ok(());
        }
    }

    store.save_sync(&Board::default_board(chrono::Utc::now()))?;
    println!("Reset complete: {}", store.path().display());
    qlog!("Reset command completed");
    Ok(())
}

/// Plain-text rendering of a board for `quadro show`.
fn format_board(board: &Board) -> String {
    let mut out = format!(
        "{}  ({} tasks, {} done)\n",
        board.title,
        board.task_count(),
        board.completed_count()
    );

    for column in board.ordered_columns() {
        out.push('\n');
        match &column.description {
            Some(description) => out.push_str(&format!("{}: {}\n", column.title, description)),
            None => out.push_str(&format!("{}\n", column.title)),
        }
        if column.task_ids.is_empty() {
            out.push_str("  (empty)\n");
        }
        for task in board.column_tasks(column) {
            let mark = if task.completed { "x" } else { " " };
            out.push_str(&format!("  [{}] {}", mark, task.content));
            if let Some(due) = task.due_date {
                out.push_str(&format!("  due {}", due.format("%Y-%m-%d")));
            }
            for tag in &task.tags {
                out.push_str(&format!("  #{}", tag));
            }
            let (done, total) = task.subtask_progress();
            if total > 0 {
                out.push_str(&format!("  {}/{}", done, total));
            }
            out.push('\n');
        }
    }

    out
}

fn render_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    state_rx: Receiver<RenderState>,
    shutdown: &AtomicBool,
) -> Result<()> {
    let mut state = RenderState::default();
    let mut last_version: u64 = 0;
    let mut last_frame = Instant::now();
    let mut dirty = true;

    loop {
        if shutdown.load(Ordering::Relaxed) {
            break;
        }

        match state_rx.try_recv() {
            Ok(s) => {
                dirty = dirty || s.version != last_version;
                state = s;
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => break,
        }

        if last_frame.elapsed() < FRAME_DURATION {
            thread::sleep(Duration::from_micros(500));
            continue;
        }
        last_frame = Instant::now();

        if dirty {
            terminal.draw(|f| ui::draw(f, &state))?;
            last_version = state.version;
            dirty = false;
        }
    }
    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.hide_cursor()?;
    terminal.clear()?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    Ok(disable_raw_mode()?)
}
