//! pixeltracker library root.
//! Exposes the CLI parser, the high-level run() function, and the settings,
//! feedback, webhook and calendar modules.

pub mod calendar;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod feedback;
pub mod settings;
pub mod storage;
pub mod ui;
pub mod utils;
pub mod webhook;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use tracing_subscriber::EnvFilter;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Settings { .. } => cli::commands::settings::handle(&cli.command, cfg),
        Commands::Feedback { .. } => cli::commands::feedback::handle(&cli.command, cfg),
        Commands::Webhook { .. } => cli::commands::webhook::handle(&cli.command, cfg),
        Commands::Calendar { .. } => cli::commands::calendar::handle(&cli.command),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
    }
}

/// `RUST_LOG` wins over the configured level.
fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    let cli = Cli::parse();

    let mut cfg = Config::load()?;
    init_tracing(&cfg.log_level);

    if let Some(custom_db) = &cli.db {
        cfg.database = utils::path::expand_tilde(custom_db)
            .to_string_lossy()
            .to_string();
    }

    dispatch(&cli, &cfg)
}
