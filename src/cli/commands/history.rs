use crate::cli::commands::{open_pool, require_actor};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::period::PeriodLogic;
use crate::db::people::find_by_registration;
use crate::db::queries::HistoryFilter;
use crate::errors::{AppError, AppResult};
use crate::models::event_kind::EventKind;
use crate::utils::colors::colorize_kind;
use crate::utils::range::parse_range;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::History {
        range,
        person,
        kind,
        ascending,
    } = &cli.command
    {
        let mut pool = open_pool(cfg)?;
        let actor = require_actor(&pool, cli)?;

        // Students only ever see their own history.
        let person_id = if actor.role.is_coordinator() {
            match person {
                Some(reg) => Some(
                    find_by_registration(&pool.conn, reg)?
                        .ok_or_else(|| AppError::NotFound(format!("person {reg} not found")))?
                        .id,
                ),
                None => None,
            }
        } else {
            Some(actor.id)
        };

        let kind = match kind {
            Some(k) => {
                Some(EventKind::parse(k).ok_or_else(|| AppError::InvalidKind(k.clone()))?)
            }
            None => None,
        };

        let (start, end) = match range {
            Some(r) => {
                let (s, e) = parse_range(r)?;
                (Some(s), Some(e))
            }
            None => (None, None),
        };

        let filter = HistoryFilter {
            person_id,
            kind,
            start,
            end,
            ascending: *ascending,
        };

        let rows = PeriodLogic::history(&mut pool, &filter)?;

        if rows.is_empty() {
            println!("No events found.");
            return Ok(());
        }

        for row in &rows {
            println!(
                "#{:<5} {} {}  {}  {} ({})",
                row.event.id,
                row.event.date_str(),
                row.event.time_str(),
                colorize_kind(row.event.kind.to_db_str(), row.event.kind.is_in()),
                row.person_name,
                row.registration
            );
        }
    }
    Ok(())
}
