use crate::cli::commands::{clock_now, default_range, open_pool, require_actor, resolve_target};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::revalidate::RevalidateLogic;
use crate::errors::AppResult;
use crate::ui::messages::{success, warning};
use crate::utils::range::parse_range;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Revalidate { person, range } = &cli.command {
        let mut pool = open_pool(cfg)?;
        let actor = require_actor(&pool, cli)?;
        let now = clock_now(cli, cfg)?;
        let target = resolve_target(&pool, &actor, person.as_deref())?;

        let (start, end) = match range {
            Some(r) => parse_range(r)?,
            None => default_range(cfg, now),
        };

        let issues = RevalidateLogic::check_range(&mut pool, target.id, start, end)?;

        if issues.is_empty() {
            success(format!(
                "Sequence is clean for {} between {} and {}.",
                target.registration, start, end
            ));
            return Ok(());
        }

        warning(format!(
            "{} sequence issue(s) for {}:",
            issues.len(),
            target.registration
        ));
        for issue in &issues {
            println!("- {} event {}: {}", issue.date, issue.event_id, issue.message);
        }
    }
    Ok(())
}
