use crate::cli::commands::{clock_now, open_pool, parse_date_arg, require_actor};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::period::PeriodLogic;
use crate::errors::{AppError, AppResult};

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Snapshot { date } = &cli.command {
        let mut pool = open_pool(cfg)?;
        let actor = require_actor(&pool, cli)?;

        if !actor.role.is_coordinator() {
            return Err(AppError::Unauthorized(
                "only coordinators may view the presence snapshot".into(),
            ));
        }

        let now = clock_now(cli, cfg)?;
        let date = match date {
            Some(s) => parse_date_arg(s)?,
            None => cfg.localize(now).date(),
        };

        let snap = PeriodLogic::day_snapshot(&mut pool, date)?;

        println!("\n=== Presence on {} ===", snap.date);
        println!(
            "Students: {}  present: {}  absent: {}  ({:.2}%)",
            snap.total_students, snap.present, snap.absent, snap.presence_pct
        );
        println!(
            "Punches: {} morning, {} afternoon, {} evening",
            snap.punches_morning, snap.punches_afternoon, snap.punches_evening
        );

        if snap.rows.is_empty() {
            println!("Nobody has punched in.");
            return Ok(());
        }

        println!("\n{:<12} {:<24} {:>6} {:>6} {:>14}", "registration", "name", "entry", "exit", "last punch");
        for row in &snap.rows {
            let half = |t: Option<chrono::NaiveTime>| {
                t.map(|t| t.format("%H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string())
            };
            println!(
                "{:<12} {:<24} {:>6} {:>6} {:>10} {}",
                row.person.registration,
                row.person.name,
                half(row.entry),
                half(row.exit),
                row.last_time.format("%H:%M").to_string(),
                row.last_kind.to_db_str()
            );
        }
    }
    Ok(())
}
