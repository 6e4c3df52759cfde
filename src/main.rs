mod app;
mod cli;
mod constants;
mod error;
mod state;
mod ui;

use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use crossterm::{
    ExecutableCommand,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use app::App;
use app::startup::Startup;
use cli::Cli;
use constants::{APP_NAME, DEFAULT_LOG_FILTER};
use error::AppError;

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %err, "exiting with error");
            eprintln!("{APP_NAME}: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    init_file_logging(&cli.log_path())?;
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    // Startup errors are fatal and reported before the terminal is taken over.
    let startup = Startup::from_cli(cli)?;
    let mut app = App::new(startup, cli.namespace());

    install_panic_hook();
    enable_raw_mode()?;
    io::stdout().execute(EnterAlternateScreen)?;

    let result = Terminal::new(CrosstermBackend::new(io::stdout())).and_then(|mut terminal| app.run(&mut terminal));

    restore_terminal();
    result?;
    info!("bye");
    Ok(())
}

fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = io::stdout().execute(LeaveAlternateScreen);
}

/// Restore the terminal before the default hook prints, and keep a copy in the log.
fn install_panic_hook() {
    let default_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        restore_terminal();
        let backtrace = std::backtrace::Backtrace::force_capture();
        error!(panic = %info, %backtrace, "panicked");
        default_hook(info);
    }));
}

/// Log to an append-only file; the terminal belongs to the UI.
fn init_file_logging(path: &Path) -> Result<(), AppError> {
    let logging_error = |reason: String| AppError::Logging { path: path.display().to_string(), reason };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| logging_error(e.to_string()))?;
    }

    let file = OpenOptions::new().create(true).append(true).open(path).map_err(|e| logging_error(e.to_string()))?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()))
        .with_ansi(false)
        .with_writer(std::sync::Mutex::new(file))
        .try_init()
        .map_err(|e| logging_error(e.to_string()))
}
