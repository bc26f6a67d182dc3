//! Binary entrypoint for ROOM : TRACE.
//!
//! Commands:
//! - `play` (default) - run the game in the terminal
//! - `init` - write a starter config file
//! - `check` - load the game data and report inconsistencies
//! - `reset` - delete the saved session
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{info, warn};
use ratatui::{backend::CrosstermBackend, Terminal};

use room_trace::audit::audit;
use room_trace::config::Config;
use room_trace::controller::{Controller, ControllerSettings};
use room_trace::puzzle::load_all_game_data;
use room_trace::session::SessionStore;
use room_trace::store::{FileStore, KeyValueStore};
use room_trace::ui::{self, App, TuiPresenter};

#[derive(Parser)]
#[command(name = "room-trace")]
#[command(about = "A terminal escape-room game")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Configuration file path
    #[arg(short, long, default_value = "room_trace.toml", global = true)]
    config: PathBuf,

    /// Verbose logging (-v, -vv for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Play the game
    Play,
    /// Write a default configuration file
    Init,
    /// Load rooms and puzzles and report problems
    Check,
    /// Delete the saved session
    Reset,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command.unwrap_or(Commands::Play) {
        Commands::Init => {
            init_logging(&Config::default(), cli.verbose, false)?;
            Config::write_default(&cli.config)?;
            println!("Wrote {}", cli.config.display());
        }
        Commands::Check => {
            let config = Config::load_or_default(&cli.config)?;
            init_logging(&config, cli.verbose, false)?;
            check(&config)?;
        }
        Commands::Reset => {
            let config = Config::load_or_default(&cli.config)?;
            init_logging(&config, cli.verbose, false)?;
            let mut store = FileStore::new(&config.storage.save_dir);
            store
                .remove(&config.storage.save_key)
                .context("deleting saved session")?;
            println!("Saved session removed.");
        }
        Commands::Play => {
            let config = Config::load_or_default(&cli.config)?;
            init_logging(&config, cli.verbose, true)?;
            play(&config)?;
        }
    }
    Ok(())
}

fn check(config: &Config) -> Result<()> {
    let data = load_all_game_data(&config.data).context("loading game data")?;
    println!(
        "{} rooms, {} puzzles",
        data.rooms.len(),
        data.puzzles.len()
    );
    let findings = audit(&data.rooms, &data.puzzles, &config.game.start_room);
    if findings.is_empty() {
        println!("No problems found.");
        return Ok(());
    }
    for finding in &findings {
        println!("  - {}", finding);
    }
    bail!("{} problem(s) found", findings.len());
}

fn play(config: &Config) -> Result<()> {
    info!("Starting ROOM : TRACE v{}", env!("CARGO_PKG_VERSION"));

    // Missing or broken data means there is no game to start.
    let data = load_all_game_data(&config.data).context("loading game data")?;
    let store = FileStore::new(&config.storage.save_dir);
    let session = SessionStore::new(
        store,
        config.storage.save_key.clone(),
        config.game.start_room.clone(),
    );
    let settings = ControllerSettings {
        advance_delay: config.game.advance_delay(),
        message_duration: config.game.message_duration(),
    };
    let controller = Controller::start(data, session, TuiPresenter::new(), settings)?;
    let mut app = App::new(controller);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result?;
    info!("Leaving ROOM : TRACE");
    println!("\nThe trace goes cold. Until next time.\n");
    Ok(())
}

/// While the game owns the terminal, log records only go to the log file.
fn init_logging(config: &Config, verbosity: u8, tui: bool) -> Result<()> {
    let mut builder = env_logger::Builder::new();
    let base_level = match verbosity {
        0 => config.logging.level_filter()?,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);
    builder.parse_env("ROOM_TRACE_LOG");

    match (&config.logging.file, tui) {
        (Some(file), _) => {
            let f = open_log(file)?;
            builder.target(env_logger::Target::Pipe(Box::new(f)));
        }
        (None, true) => {
            // No file configured and the screen is taken: drop everything.
            builder.filter_level(log::LevelFilter::Off);
        }
        (None, false) => {}
    }
    builder.format_timestamp_secs();

    if builder.try_init().is_err() {
        warn!("logger already initialized");
    }
    Ok(())
}

fn open_log(path: &Path) -> Result<std::fs::File> {
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("opening log file {}", path.display()))
}
