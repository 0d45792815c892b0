use crate::cli::commands::{clock_now, open_pool, require_actor};
use crate::cli::parser::{Cli, Commands, RosterAction};
use crate::config::Config;
use crate::core::roster::RosterLogic;
use crate::db::people::{StatusFilter, find_by_registration};
use crate::errors::{AppError, AppResult};
use crate::models::person::Role;
use crate::ui::messages::success;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Roster { action } = &cli.command {
        let mut pool = open_pool(cfg)?;
        let now = clock_now(cli, cfg)?;

        match action {
            RosterAction::List { search, status } => {
                let actor = require_actor(&pool, cli)?;
                let status = match status {
                    Some(s) => StatusFilter::parse(s).ok_or_else(|| {
                        AppError::Validation(format!(
                            "status must be active, inactive or all (got {s})"
                        ))
                    })?,
                    None => StatusFilter::Active,
                };

                let people = RosterLogic::list(&mut pool, &actor, search.as_deref(), status)?;
                if people.is_empty() {
                    println!("No matching students.");
                    return Ok(());
                }

                for p in &people {
                    println!(
                        "{:<12} {:<24} {}",
                        p.registration,
                        p.name,
                        if p.active { "active" } else { "inactive" }
                    );
                }
            }

            RosterAction::Add {
                name,
                registration,
                coordinator,
            } => {
                // Bootstrap path: the very first person needs no actor.
                let actor = match &cli.actor {
                    Some(reg) => Some(
                        find_by_registration(&pool.conn, reg)?
                            .ok_or_else(|| AppError::NotFound(format!("person {reg} not found")))?,
                    ),
                    None => None,
                };

                let role = if *coordinator {
                    Role::Coordinator
                } else {
                    Role::Student
                };

                let person = RosterLogic::register(
                    &mut pool,
                    actor.as_ref(),
                    name,
                    registration,
                    role,
                    now,
                )?;

                success(format!(
                    "{} registered as {} ({}).",
                    person.name,
                    person.role.to_db_str(),
                    person.registration
                ));
            }

            RosterAction::Status {
                registration,
                active,
            } => {
                let actor = require_actor(&pool, cli)?;
                let person =
                    RosterLogic::set_status(&mut pool, &actor, registration, *active, now)?;

                success(format!(
                    "{} is now {}.",
                    person.registration,
                    if person.active { "active" } else { "inactive" }
                ));
            }
        }
    }
    Ok(())
}
