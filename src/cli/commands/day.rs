use crate::cli::commands::{clock_now, open_pool, parse_date_arg, require_actor, resolve_target};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::daily::DailyLogic;
use crate::db::queries::load_events_by_day;
use crate::errors::{AppError, AppResult};
use crate::utils::colors::colorize_kind;
use crate::utils::time::format_minutes;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Day { date, person, json } = &cli.command {
        let mut pool = open_pool(cfg)?;
        let actor = require_actor(&pool, cli)?;
        let now = clock_now(cli, cfg)?;
        let target = resolve_target(&pool, &actor, person.as_deref())?;

        let date = match date {
            Some(s) => parse_date_arg(s)?,
            None => cfg.localize(now).date(),
        };

        let record = DailyLogic::for_date(&mut pool, target.id, date)?;
        let events = load_events_by_day(&pool.conn, target.id, date)?;

        if *json {
            let body = serde_json::to_string_pretty(&record)
                .map_err(|e| AppError::Other(e.to_string()))?;
            println!("{body}");
            return Ok(());
        }

        println!("\n=== {} - {} ({}) ===", date, target.name, target.registration);

        if events.is_empty() {
            println!("No events for {date}.");
            return Ok(());
        }

        for ev in &events {
            println!(
                "- #{} {}  {}",
                ev.id,
                ev.time_str(),
                colorize_kind(ev.kind.to_db_str(), ev.kind.is_in())
            );
        }

        let fmt_half = |t: Option<chrono::NaiveTime>| {
            t.map(|t| t.format("%H:%M").to_string())
                .unwrap_or_else(|| "-".to_string())
        };

        println!();
        println!("Entry: {}", fmt_half(record.entry));
        println!("Exit:  {}", fmt_half(record.exit));
        println!("Total: {}", format_minutes(record.duration_minutes));
    }
    Ok(())
}
