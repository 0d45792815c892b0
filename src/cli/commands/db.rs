use crate::cli::parser::Commands;
use crate::config::Config;
use crate::db::migrate::run_pending_migrations;
use crate::db::pool::DbPool;
use crate::db::stats::print_db_info;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};

pub fn handle(cmd: &Commands, cfg: &Config) -> AppResult<()> {
    if let Commands::Db {
        migrate,
        check,
        info,
    } = cmd
    {
        let mut pool = DbPool::new(&cfg.database)?;

        if *migrate {
            run_pending_migrations(&pool.conn)?;
            success("Migrations are up to date.");
        }

        if *check {
            let verdict: String =
                pool.conn
                    .query_row("PRAGMA integrity_check", [], |row| row.get(0))?;
            if verdict == "ok" {
                success("Database integrity: ok.");
            } else {
                warning(format!("Database integrity: {verdict}"));
            }
        }

        if *info {
            run_pending_migrations(&pool.conn)?;
            print_db_info(&mut pool, &cfg.database)?;
        }
    }
    Ok(())
}
