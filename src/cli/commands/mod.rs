pub mod adjust;
pub mod alert;
pub mod config;
pub mod day;
pub mod db;
pub mod event;
pub mod history;
pub mod hours;
pub mod init;
pub mod log;
pub mod punch;
pub mod report;
pub mod revalidate;
pub mod roster;
pub mod snapshot;

use crate::cli::parser::Cli;
use crate::config::Config;
use crate::db::initialize::init_db;
use crate::db::people::find_by_registration;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::person::Person;
use crate::utils::time::parse_datetime;
use chrono::{DateTime, Datelike, NaiveDate, Utc};

/// Open the configured database, guaranteeing the schema is current.
pub fn open_pool(cfg: &Config) -> AppResult<DbPool> {
    let pool = DbPool::new(&cfg.database)?;
    init_db(&pool.conn)?;
    Ok(pool)
}

/// The injected clock: the hidden global `--at` supplies a deterministic
/// local wall time; otherwise the real one is used.
pub fn clock_now(cli: &Cli, cfg: &Config) -> AppResult<DateTime<Utc>> {
    match &cli.at {
        Some(s) => {
            let local = parse_datetime(s).ok_or_else(|| AppError::InvalidTime(s.clone()))?;
            cfg.to_instant(local)
        }
        None => Ok(Utc::now()),
    }
}

/// Resolve the acting person from the global `--actor` registration.
pub fn require_actor(pool: &DbPool, cli: &Cli) -> AppResult<Person> {
    let registration = cli.actor.as_deref().ok_or_else(|| {
        AppError::Unauthorized("--actor <registration> is required for this command".into())
    })?;

    find_by_registration(&pool.conn, registration)?
        .ok_or_else(|| AppError::NotFound(format!("person {registration} not found")))
}

/// The person a read command targets: the actor themselves, or (for
/// coordinators) anyone named with `--person`.
pub fn resolve_target(
    pool: &DbPool,
    actor: &Person,
    person: Option<&str>,
) -> AppResult<Person> {
    match person {
        None => Ok(actor.clone()),
        Some(reg) if reg == actor.registration => Ok(actor.clone()),
        Some(reg) => {
            if !actor.role.is_coordinator() {
                return Err(AppError::Unauthorized(
                    "students may only inspect their own records".into(),
                ));
            }
            find_by_registration(&pool.conn, reg)?
                .ok_or_else(|| AppError::NotFound(format!("person {reg} not found")))
        }
    }
}

pub fn parse_date_arg(s: &str) -> AppResult<NaiveDate> {
    crate::utils::date::parse_date(s).ok_or_else(|| AppError::InvalidDate(s.to_string()))
}

/// Reporting default: from the first of the current local month through
/// today, matching the usual coordinator view.
pub fn default_range(cfg: &Config, now: DateTime<Utc>) -> (NaiveDate, NaiveDate) {
    let today = cfg.localize(now).date();
    let first = today.with_day(1).unwrap_or(today);
    (first, today)
}
