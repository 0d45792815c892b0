use crate::cli::commands::{clock_now, open_pool, require_actor};
use crate::cli::parser::{Cli, Commands};
use crate::config::Config;
use crate::core::punch::PunchLogic;
use crate::errors::{AppError, AppResult};
use crate::models::event_kind::EventKind;
use crate::ui::messages::success;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    if let Commands::Punch { kind } = &cli.command {
        let kind = EventKind::parse(kind).ok_or_else(|| AppError::InvalidKind(kind.clone()))?;

        let mut pool = open_pool(cfg)?;
        let actor = require_actor(&pool, cli)?;
        let now = clock_now(cli, cfg)?;

        let ev = PunchLogic::apply(&mut pool, cfg, &actor, kind, now)?;

        success(format!(
            "Clocked {} at {} on {}.",
            ev.kind.to_db_str(),
            ev.time_str(),
            ev.date_str()
        ));
    }
    Ok(())
}
