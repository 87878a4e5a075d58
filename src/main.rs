use std::fs::File;
use std::io;
use std::panic;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use bonus_snake::config::{
    SimConfig, DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS, DEFAULT_TICK_INTERVAL_MS,
};
use bonus_snake::game::{GameSession, SessionEvent, SessionState};
use bonus_snake::grid::GridSize;
use bonus_snake::input::{poll_input, GameInput};
use bonus_snake::score::{HighScoreStore, JsonScoreStore, MemoryScoreStore};
use bonus_snake::terminal_runtime::{restore_terminal, TerminalSession};
use clap::Parser;
use env_logger::{Env, Target};
use log::{info, warn};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Grid height in cells.
    #[arg(long, default_value_t = DEFAULT_GRID_ROWS)]
    rows: u16,

    /// Grid width in cells.
    #[arg(long, default_value_t = DEFAULT_GRID_COLS)]
    cols: u16,

    /// Milliseconds between simulation ticks.
    #[arg(long = "tick-ms", default_value_t = DEFAULT_TICK_INTERVAL_MS)]
    tick_ms: u64,

    /// Seed for food placement and bonus timing.
    #[arg(long)]
    seed: Option<u64>,

    /// Write log output to this file instead of discarding it.
    #[arg(long = "log-file")]
    log_file: Option<PathBuf>,

    /// Keep the high score in memory only.
    #[arg(long = "no-save")]
    no_save: bool,
}

impl Cli {
    fn sim_config(&self) -> SimConfig {
        SimConfig {
            tick_interval_ms: self.tick_ms,
            ..SimConfig::for_grid(GridSize::new(self.rows, self.cols))
        }
    }
}

fn main() -> io::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_file.as_ref())?;

    let store = open_store(cli.no_save);
    let config = cli.sim_config();
    let session = match cli.seed {
        Some(seed) => GameSession::new_with_seed(config, store, seed),
        None => GameSession::new(config, store),
    }
    .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error))?;

    install_panic_hook();
    run(session)
}

fn init_logging(log_file: Option<&PathBuf>) -> io::Result<()> {
    // stderr belongs to the alternate screen, so logs only go to a file.
    let Some(path) = log_file else {
        env_logger::Builder::from_env(Env::default().default_filter_or("off")).init();
        return Ok(());
    };

    let file = File::create(path)?;
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn open_store(no_save: bool) -> Box<dyn HighScoreStore> {
    if no_save {
        return Box::new(MemoryScoreStore::default());
    }

    match JsonScoreStore::open_default() {
        Ok(store) => {
            info!("high score file: {}", store.path().display());
            Box::new(store)
        }
        Err(error) => {
            eprintln!("Failed to load high score, starting from 0: {error}");
            warn!("failed to load high score: {error}");
            Box::new(MemoryScoreStore::default())
        }
    }
}

fn run(mut session: GameSession<Box<dyn HighScoreStore>>) -> io::Result<()> {
    let mut terminal = TerminalSession::enter()?;
    let mut paused = false;
    let mut last_frame = Instant::now();

    loop {
        terminal.draw(session.snapshot(), paused)?;

        let mut events = Vec::new();
        if let Some(input) = poll_input(FRAME_INTERVAL)? {
            match input {
                GameInput::Quit => break,
                GameInput::Pause => {
                    if session.state() == SessionState::Running {
                        paused = !paused;
                    }
                }
                GameInput::Direction(direction) if !paused => {
                    events.extend(session.on_direction(direction));
                }
                GameInput::Restart if session.state() == SessionState::Over => {
                    session.restart();
                }
                GameInput::Start | GameInput::Restart if !paused => {
                    events.extend(session.on_any_key_start());
                }
                _ => {}
            }
        }

        let now = Instant::now();
        let elapsed = now.duration_since(last_frame);
        last_frame = now;
        if !paused {
            events.extend(session.advance(elapsed));
        }

        if events
            .iter()
            .any(|event| matches!(event, SessionEvent::GameOver { .. }))
        {
            terminal.bell()?;
        }
    }

    Ok(())
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        default_hook(panic_info);
    }));
}
