use crate::cli::commands::{clock_now, default_range, open_pool, require_actor, resolve_target};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::period::PeriodLogic;
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::person::Person;
use crate::utils::range::parse_range;
use crate::utils::time::format_minutes;
use chrono::NaiveDate;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Report {
        range,
        person,
        search,
        json,
    } = &cli.command
    {
        let mut pool = open_pool(cfg)?;
        let actor = require_actor(&pool, cli)?;
        let now = clock_now(cli, cfg)?;

        let (start, end) = match range {
            Some(r) => parse_range(r)?,
            None => default_range(cfg, now),
        };

        // A coordinator with no --person gets the roster view; everyone
        // else reports on a single person (students: themselves).
        if person.is_none() && actor.role.is_coordinator() {
            roster_report(&mut pool, search.as_deref(), start, end, *json)
        } else {
            let target = resolve_target(&pool, &actor, person.as_deref())?;
            person_report(&mut pool, &target, start, end, *json)
        }
    } else {
        Ok(())
    }
}

fn person_report(
    pool: &mut DbPool,
    target: &Person,
    start: NaiveDate,
    end: NaiveDate,
    json: bool,
) -> AppResult<()> {
    let summary = PeriodLogic::summarize(pool, target.id, start, end)?;
    let days = PeriodLogic::daily_records(pool, target.id, start, end)?;

    if json {
        let body = serde_json::json!({ "summary": summary, "days": days });
        println!(
            "{}",
            serde_json::to_string_pretty(&body).map_err(|e| AppError::Other(e.to_string()))?
        );
        return Ok(());
    }

    println!(
        "\n=== Presence {} .. {} - {} ({}) ===",
        start, end, target.name, target.registration
    );
    println!(
        "Days: {} present / {} absent of {}  ({:.2}%)",
        summary.days_present, summary.days_absent, summary.total_days, summary.presence_pct
    );
    println!("Total hours: {}", summary.total_hhmm());
    if let Some(last) = summary.last_event {
        println!("Last record: {}", last.format("%Y-%m-%d %H:%M"));
    }

    if !days.is_empty() {
        println!("\n{:<12} {:>6} {:>6} {:>7}", "date", "entry", "exit", "total");
        for day in &days {
            let half = |t: Option<chrono::NaiveTime>| {
                t.map(|t| t.format("%H:%M").to_string())
                    .unwrap_or_else(|| "-".to_string())
            };
            println!(
                "{:<12} {:>6} {:>6} {:>7}",
                day.date.to_string(),
                half(day.entry),
                half(day.exit),
                day.duration_hhmm()
            );
        }
    }
    Ok(())
}

fn roster_report(
    pool: &mut DbPool,
    search: Option<&str>,
    start: NaiveDate,
    end: NaiveDate,
    json: bool,
) -> AppResult<()> {
    let report = PeriodLogic::roster_report(pool, search, start, end)?;

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).map_err(|e| AppError::Other(e.to_string()))?
        );
        return Ok(());
    }

    println!("\n=== Roster presence {} .. {} ===", start, end);
    println!(
        "Students: {}  present: {}  average presence: {:.2}%  total hours: {}",
        report.total_people,
        report.present_people,
        report.average_presence_pct,
        format_minutes(report.total_minutes)
    );

    if report.people.is_empty() {
        println!("No matching students.");
        return Ok(());
    }

    println!(
        "\n{:<12} {:<24} {:>8} {:>9} {:>8} {:>7}",
        "registration", "name", "status", "presence", "days", "hours"
    );
    for row in &report.people {
        println!(
            "{:<12} {:<24} {:>8} {:>8.2}% {:>8} {:>7}",
            row.person.registration,
            row.person.name,
            row.status(),
            row.summary.presence_pct,
            row.summary.days_present,
            row.summary.total_hhmm()
        );
    }
    Ok(())
}
