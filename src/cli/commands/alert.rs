use crate::cli::commands::{clock_now, open_pool, parse_date_arg, require_actor};
use crate::cli::parser::{AlertAction, Cli, Commands};
use crate::config::Config;
use crate::core::alert::AlertLogic;
use crate::errors::{AppError, AppResult};
use crate::models::request_status::{Decision, RequestStatus};
use crate::ui::messages::success;
use crate::utils::time::parse_optional_time;

fn parse_status(s: &str) -> AppResult<RequestStatus> {
    RequestStatus::from_db_str(&s.to_lowercase()).ok_or_else(|| {
        AppError::Validation(format!(
            "status must be pending, approved or rejected (got {s})"
        ))
    })
}

fn parse_decision(s: &str) -> AppResult<Decision> {
    Decision::parse(s)
        .ok_or_else(|| AppError::Validation(format!("decision must be approve or reject (got {s})")))
}

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Alert { action } = &cli.command {
        let mut pool = open_pool(cfg)?;
        let actor = require_actor(&pool, cli)?;
        let now = clock_now(cli, cfg)?;

        match action {
            AlertAction::Submit {
                date,
                expected_in,
                expected_out,
                justification,
            } => {
                let date = parse_date_arg(date)?;
                let expected_in = parse_optional_time(expected_in.as_ref())?;
                let expected_out = parse_optional_time(expected_out.as_ref())?;

                let alert = AlertLogic::submit(
                    &mut pool,
                    cfg,
                    &actor,
                    date,
                    expected_in,
                    expected_out,
                    justification,
                    now,
                )?;

                success(format!(
                    "Forgotten-punch alert {} submitted for {}.",
                    alert.id, alert.date
                ));
            }

            AlertAction::List { all, status } => {
                let status = match status {
                    Some(s) => Some(parse_status(s)?),
                    None => None,
                };

                let person_id = if *all {
                    if !actor.role.is_coordinator() {
                        return Err(AppError::Unauthorized(
                            "only coordinators may list everyone's alerts".into(),
                        ));
                    }
                    None
                } else {
                    Some(actor.id)
                };

                let alerts = AlertLogic::list(&mut pool, person_id, status)?;
                if alerts.is_empty() {
                    println!("No forgotten-punch alerts.");
                    return Ok(());
                }

                for a in &alerts {
                    let half = |t: Option<chrono::NaiveTime>| {
                        t.map(|t| t.format("%H:%M").to_string())
                            .unwrap_or_else(|| "-".to_string())
                    };
                    println!(
                        "#{:<4} {:<9} {}  in {}  out {}  | {}",
                        a.id,
                        a.status.to_db_str(),
                        a.date,
                        half(a.expected_in),
                        half(a.expected_out),
                        a.justification
                    );
                }
            }

            AlertAction::Resolve { id, decision, note } => {
                let decision = parse_decision(decision)?;
                let alert =
                    AlertLogic::resolve(&mut pool, &actor, *id, decision, note.as_deref(), now)?;

                success(format!("Alert {} {}.", alert.id, alert.status.to_db_str()));
            }
        }
    }
    Ok(())
}
