use crate::cli::commands::{clock_now, open_pool, require_actor};
use crate::cli::parser::{Cli, Commands, EventAction};
use crate::config::Config;
use crate::core::manual::ManualLogic;
use crate::errors::{AppError, AppResult};
use crate::models::event_kind::EventKind;
use crate::ui::messages::{info, success};
use crate::utils::time::parse_datetime;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Event { action } = &cli.command {
        let mut pool = open_pool(cfg)?;
        let actor = require_actor(&pool, cli)?;
        let now = clock_now(cli, cfg)?;

        match action {
            EventAction::Add { person, kind, time } => {
                let kind =
                    EventKind::parse(kind).ok_or_else(|| AppError::InvalidKind(kind.clone()))?;
                let instant =
                    parse_datetime(time).ok_or_else(|| AppError::InvalidTime(time.clone()))?;

                let ev = ManualLogic::add(&mut pool, &actor, person, kind, instant, now)?;

                success(format!(
                    "Event {} added: {} {} at {} {}.",
                    ev.id,
                    person,
                    ev.kind.to_db_str(),
                    ev.date_str(),
                    ev.time_str()
                ));
            }

            EventAction::Edit { id, time, kind } => {
                let instant = match time {
                    Some(s) => {
                        Some(parse_datetime(s).ok_or_else(|| AppError::InvalidTime(s.clone()))?)
                    }
                    None => None,
                };
                let kind = match kind {
                    Some(k) => {
                        Some(EventKind::parse(k).ok_or_else(|| AppError::InvalidKind(k.clone()))?)
                    }
                    None => None,
                };

                let ev = ManualLogic::edit(&mut pool, &actor, *id, instant, kind, now)?;

                success(format!(
                    "Event {} is now {} at {} {}.",
                    ev.id,
                    ev.kind.to_db_str(),
                    ev.date_str(),
                    ev.time_str()
                ));
            }

            EventAction::Del { id } => {
                ManualLogic::delete(&mut pool, &actor, *id, now)?;
                info(format!("Deleted event {id}."));
            }
        }
    }
    Ok(())
}
