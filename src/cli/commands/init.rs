use crate::cli::commands::{clock_now, open_pool};
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::log::audit;
use crate::errors::AppResult;
use crate::ui::messages::success;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    Config::init_all(cli.db.clone(), cli.test)?;

    let pool = open_pool(cfg)?;
    let now = clock_now(cli, cfg)?;
    audit(&pool.conn, now, "init", "", "database initialized")?;

    success("Database initialized.");
    Ok(())
}
