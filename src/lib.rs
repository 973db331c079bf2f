//! vendortickets library root.
//! Exposes the CLI parser, the high-level run() function, and the page pipeline.

pub mod cli;
pub mod config;
pub mod core;
pub mod errors;
pub mod export;
pub mod models;
pub mod ui;
pub mod utils;
pub mod warehouse;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use utils::path::expand_tilde;

pub const LOG_ENV: &str = "VENDORTICKETS_LOG";

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config, config_path: &Path) -> AppResult<()> {
    match &cli.command {
        Commands::Init { .. } => cli::commands::init::handle(cli, config_path),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg, config_path),
        Commands::Render { .. } => cli::commands::render::handle(&cli.command, cfg),
        Commands::List { .. } => cli::commands::list::handle(&cli.command, cfg),
        Commands::Export { .. } => cli::commands::export::handle(&cli.command, cfg),
        Commands::Sql { .. } => cli::commands::sql::handle(&cli.command, cfg),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (tests calling run twice) is harmless.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    // 1️⃣ parse CLI
    let cli = Cli::parse();
    init_tracing();

    // 2️⃣ load config once
    let config_path: PathBuf = cli
        .config
        .as_deref()
        .map(expand_tilde)
        .unwrap_or_else(Config::config_file);
    let mut cfg = Config::load(&config_path)?;

    // 3️⃣ command-line overrides
    if let Some(fixture) = &cli.fixture {
        cfg.use_fixture(fixture);
    }
    if let Some(auth) = cli.auth {
        cfg.warehouse.auth = auth;
    }

    dispatch(&cli, &cfg, &config_path)
}
