use crate::cli::commands::{clock_now, open_pool, require_actor};
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::core::period::PeriodLogic;
use crate::errors::{AppError, AppResult};
use crate::utils::time::format_minutes;

pub fn handle(cli: &Cli, cfg: &Config) -> AppResult<()> {
    let mut pool = open_pool(cfg)?;
    let actor = require_actor(&pool, cli)?;

    if !actor.role.is_student() {
        return Err(AppError::Unauthorized(
            "the hours view belongs to students".into(),
        ));
    }

    let now = clock_now(cli, cfg)?;
    let (today, week) = PeriodLogic::week_hours(&mut pool, cfg, actor.id, now)?;

    println!("Hours today:     {}", format_minutes(today));
    println!("Hours this week: {}", format_minutes(week));
    Ok(())
}
