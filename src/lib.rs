//! punchlog library root.
//! Exposes the CLI parser, the high-level run() function and the ledger
//! modules (models, store, core rules).

pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod models;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;

/// Central command dispatcher
pub fn dispatch(cli: &Cli, cfg: &Config) -> AppResult<()> {
    match &cli.command {
        Commands::Init => cli::commands::init::handle(cli, cfg),
        Commands::Config { .. } => cli::commands::config::handle(&cli.command, cfg),
        Commands::Db { .. } => cli::commands::db::handle(&cli.command, cfg),
        Commands::Log { .. } => cli::commands::log::handle(&cli.command, cfg),
        Commands::Punch { .. } => cli::commands::punch::handle(cli, cfg),
        Commands::Day { .. } => cli::commands::day::handle(cli, cfg),
        Commands::Hours => cli::commands::hours::handle(cli, cfg),
        Commands::Report { .. } => cli::commands::report::handle(cli, cfg),
        Commands::History { .. } => cli::commands::history::handle(cli, cfg),
        Commands::Snapshot { .. } => cli::commands::snapshot::handle(cli, cfg),
        Commands::Roster { .. } => cli::commands::roster::handle(cli, cfg),
        Commands::Adjust { .. } => cli::commands::adjust::handle(cli, cfg),
        Commands::Alert { .. } => cli::commands::alert::handle(cli, cfg),
        Commands::Event { .. } => cli::commands::event::handle(cli, cfg),
        Commands::Revalidate { .. } => cli::commands::revalidate::handle(cli, cfg),
    }
}

/// Entry point used by main.rs
pub fn run() -> AppResult<()> {
    // 1) parse CLI
    let cli = Cli::parse();

    // 2) load config once
    let mut cfg = Config::load()?;

    // 3) apply the command-line DB override, if any
    if let Some(custom_db) = &cli.db {
        cfg.database = custom_db.clone();
    }

    // 4) hand everything to the dispatcher
    dispatch(&cli, &cfg)
}
