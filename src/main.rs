use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config, LevelFilter, WriteLogger};

use notokrat::engine::DocumentEngine;
use notokrat::event_source::TerminalEventSource;
use notokrat::main_app::{App, run_app_with_event_source};
use notokrat::panic_handler;
use notokrat::settings::Settings;
use notokrat::workflow::UserRole;

#[derive(Parser)]
#[command(name = "notokrat", about = "A terminal review notes panel for PDF change workflows")]
struct Cli {
    /// Review file for the document under review (YAML)
    document: PathBuf,

    /// Reviewer role 1-5 (overrides the configured role)
    #[arg(long)]
    role: Option<u8>,

    /// Select freshly created annotations in the engine
    #[arg(long)]
    select_on_creation: bool,

    /// Compact layout for narrow terminals
    #[arg(long)]
    compact: bool,

    /// Write debug logs to notokrat.log
    #[arg(long)]
    debug: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        let log_file = File::create("notokrat.log").context("Failed to create log file")?;
        WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
            .context("Failed to initialize logger")?;
    }

    panic_handler::initialize_panic_handler();

    let mut settings = Settings::load();
    if cli.select_on_creation {
        settings.select_annotation_on_creation = true;
    }
    if cli.compact {
        settings.compact_layout = true;
    }
    let role_id = cli.role.unwrap_or(settings.role);
    let Some(role) = UserRole::from_id(role_id) else {
        bail!("invalid role {role_id}, expected 1-5");
    };

    let engine = DocumentEngine::from_review_file(&cli.document)?;
    info!(
        "reviewing '{}' as role {}",
        engine.document_name(),
        role.id()
    );

    let mut app = App::new(engine, settings, role)?;

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let mut events = TerminalEventSource;
    let result = run_app_with_event_source(&mut terminal, &mut app, &mut events);

    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture)?;

    result
}
