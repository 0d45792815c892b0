use crate::db::pool::DbPool;
use crate::db::queries::load_events_in_range;
use crate::errors::AppResult;
use crate::models::event::ClockEvent;
use chrono::NaiveDate;

/// One alternation violation found while re-walking a day.
#[derive(Debug, Clone)]
pub struct SequenceIssue {
    pub date: NaiveDate,
    pub event_id: i64,
    pub message: String,
}

/// Walk one day's events (time-ascending) and report every break of the
/// alternation rule. A trailing open `in` is allowed: the person may
/// simply still be inside.
///
/// Violations are data here, not errors: approved adjustments and manual
/// overrides legitimately leave the ledger out of order, and this pass is
/// how a coordinator inspects the damage before repairing it.
pub fn check_day(events: &[ClockEvent]) -> Vec<SequenceIssue> {
    let mut issues = Vec::new();
    let mut open_in = false;

    for ev in events {
        if ev.kind.is_in() {
            if open_in {
                issues.push(SequenceIssue {
                    date: ev.date,
                    event_id: ev.id,
                    message: format!(
                        "found in at {} but the previous in has no out",
                        ev.time_str()
                    ),
                });
            }
            open_in = true;
        } else {
            if !open_in {
                issues.push(SequenceIssue {
                    date: ev.date,
                    event_id: ev.id,
                    message: format!("found out at {} without a matching in", ev.time_str()),
                });
            }
            open_in = false;
        }
    }

    issues
}

pub struct RevalidateLogic;

impl RevalidateLogic {
    /// Re-check one person's range day by day; empty result means clean.
    pub fn check_range(
        pool: &mut DbPool,
        person_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<SequenceIssue>> {
        let events = load_events_in_range(&pool.conn, person_id, start, end)?;

        let mut issues = Vec::new();
        let mut day: Vec<ClockEvent> = Vec::new();

        for ev in events {
            if let Some(first) = day.first()
                && first.date != ev.date
            {
                issues.extend(check_day(&day));
                day.clear();
            }
            day.push(ev);
        }
        issues.extend(check_day(&day));

        Ok(issues)
    }
}
