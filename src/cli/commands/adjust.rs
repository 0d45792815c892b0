use crate::cli::commands::{clock_now, open_pool, require_actor};
use crate::cli::parser::{AdjustAction, Cli, Commands};
use crate::config::Config;
use crate::core::adjust::AdjustLogic;
use crate::db::requests::format_ts;
use crate::errors::{AppError, AppResult};
use crate::models::request_status::{Decision, RequestStatus};
use crate::ui::messages::success;
use crate::utils::time::parse_datetime;

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
    if let Commands::Adjust { action } = &cli.command {
        let mut pool = open_pool(cfg)?;
        let actor = require_actor(&pool, cli)?;
        let now = clock_now(cli, cfg)?;

        match action {
            AdjustAction::Submit {
                event,
                time,
                justification,
            } => {
                let requested =
                    parse_datetime(time).ok_or_else(|| AppError::InvalidTime(time.clone()))?;

                let req = AdjustLogic::submit(
                    &mut pool,
                    cfg,
                    &actor,
                    *event,
                    requested,
                    justification,
                    now,
                )?;

                success(format!(
                    "Adjustment request {} submitted: event {} {} -> {}.",
                    req.id,
                    req.event_id,
                    format_ts(req.original),
                    format_ts(req.requested)
                ));
            }

            AdjustAction::List { all, status } => {
                let status = match status {
                    Some(s) => Some(parse_status(s)?),
                    None => None,
                };

                let person_id = if *all {
                    if !actor.role.is_coordinator() {
                        return Err(AppError::Unauthorized(
                            "only coordinators may list everyone's requests".into(),
                        ));
                    }
                    None
                } else {
                    Some(actor.id)
                };

                let requests = AdjustLogic::list(&mut pool, person_id, status)?;
                if requests.is_empty() {
                    println!("No adjustment requests.");
                    return Ok(());
                }

                for r in &requests {
                    println!(
                        "#{:<4} {:<9} event {:<5} {} -> {}  | {}",
                        r.id,
                        r.status.to_db_str(),
                        r.event_id,
                        format_ts(r.original),
                        format_ts(r.requested),
                        r.justification
                    );
                }
            }

            AdjustAction::Resolve { id, decision, note } => {
                let decision = parse_decision(decision)?;
                let req = AdjustLogic::resolve(
                    &mut pool,
                    &actor,
                    *id,
                    decision,
                    note.as_deref(),
                    now,
                )?;

                success(format!(
                    "Adjustment {} {}.",
                    req.id,
                    req.status.to_db_str()
                ));
            }
        }
    }
    Ok(())
}
