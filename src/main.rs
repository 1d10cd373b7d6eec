//! Riverwatch - Chattahoochee river conditions in the terminal
//!
//! A terminal UI application that displays water temperature, the weather
//! forecast and E. coli risk for the Chattahoochee River near Atlanta.

use std::io;
use std::process;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};

use riverwatch::cli::{Cli, OutputMode, StartupConfig};
use riverwatch::dashboard::Dashboard;
use riverwatch::logging::{self, LogTarget};
use riverwatch::refresh::RefreshConfig;
use riverwatch::{panic_hook, report, ui};

/// Fetches everything once and prints the result
async fn run_once(config: StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = logging::init(&LogTarget::Stderr) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let mut dashboard = Dashboard::connect(
        &config.endpoints,
        config.timeout,
        RefreshConfig::disabled(),
    );
    dashboard.load_all();
    dashboard.settle().await;

    let view = dashboard.view_model();
    dashboard.teardown();

    match config.mode {
        OutputMode::Json => println!("{}", report::render_json(&view)?),
        _ => print!("{}", report::render_text(&view)),
    }

    Ok(())
}

/// Runs the interactive dashboard until the user quits
async fn run_interactive(config: StartupConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to a file; the terminal belongs to the UI
    let log_path = config.log_file.clone().or_else(logging::default_log_path);
    match log_path {
        Some(path) => {
            if let Err(e) = logging::init(&LogTarget::File(path)) {
                eprintln!("Warning: logging disabled: {}", e);
            }
        }
        None => eprintln!("Warning: no log location available, logging disabled"),
    }

    // Restore the terminal if the UI thread panics
    panic_hook::install();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut dashboard = Dashboard::connect(&config.endpoints, config.timeout, config.refresh);
    info!("dashboard started");

    // Every slice starts loading right away; results arrive while the UI runs
    dashboard.load_all();

    // Main event loop
    let result = loop {
        dashboard.pump();
        dashboard.tick(Instant::now());

        // Render UI
        if let Err(e) = terminal.draw(|f| ui::render(f, &dashboard)) {
            break Err(e);
        }

        // Poll for keyboard events with 100ms timeout
        match event::poll(Duration::from_millis(100)) {
            Ok(true) => match event::read() {
                Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                    dashboard.handle_key(key);
                }
                Ok(_) => {}
                Err(e) => break Err(e),
            },
            Ok(false) => {}
            Err(e) => break Err(e),
        }

        // Check if we should quit
        if dashboard.should_quit {
            break Ok(());
        }
    };

    // No fetch result is applied past this point
    dashboard.teardown();

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;

    if let Err(e) = &result {
        warn!(error = %e, "terminal error");
    }
    info!("dashboard closed");
    result.map_err(Into::into)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Invalid options are reported before the terminal is touched
    let config = match StartupConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    };

    match config.mode {
        OutputMode::Interactive => run_interactive(config).await,
        OutputMode::Text | OutputMode::Json => run_once(config).await,
    }
}
