use std::fs::{self, File};
use std::io::stdout;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::{error, info};
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use folio::event_source::KeyboardEventSource;
use folio::panic_handler::initialize_panic_handler;
use folio::{App, run_app_with_event_source, settings, theme};

/// Terminal PDF viewer
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// PDF file to open
    file: Option<PathBuf>,

    /// Page to start on (1-based)
    #[arg(short, long)]
    page: Option<usize>,

    /// Initial zoom factor, 1.0 fits the page to the window
    #[arg(short, long)]
    zoom: Option<f32>,

    /// Log at debug level
    #[arg(long)]
    debug: bool,
}

fn log_path() -> PathBuf {
    dirs::cache_dir()
        .map(|dir| dir.join("folio"))
        .and_then(|dir| fs::create_dir_all(&dir).ok().map(|_| dir))
        .unwrap_or_else(std::env::temp_dir)
        .join("folio.log")
}

fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let log_file = log_path();
    WriteLogger::init(
        level,
        Config::default(),
        File::create(&log_file).with_context(|| format!("creating {}", log_file.display()))?,
    )?;

    info!("Starting folio");

    initialize_panic_handler();
    settings::load_settings();
    theme::set_theme_by_name(&settings::get_theme_name());

    let mut app = App::new();
    if let Some(path) = &args.file {
        app.open_at(path, args.page, args.zoom);
    }

    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut event_source = KeyboardEventSource;
    let res = run_app_with_event_source(&mut terminal, &mut app, &mut event_source);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!("Application error: {err:?}");
        println!("{err:?}");
    }

    info!("Shutting down folio");
    Ok(())
}
