use crate::db::pool::DbPool;
use crate::db::queries::load_events_by_day;
use crate::errors::AppResult;
use crate::models::daily_record::DailyRecord;
use crate::models::event::ClockEvent;
use crate::utils::time::minutes_between;
use chrono::NaiveDate;

/// Derive one day's record from its raw events.
///
/// Policy: entry is the earliest `in`-kind event, exit the earliest
/// `out`-kind event (first occurrence of each kind, not last). A missing
/// half leaves the duration at zero; an exit before the entry yields a
/// negative duration which is reported, not clamped.
pub fn aggregate_day(person_id: i64, date: NaiveDate, events: &[ClockEvent]) -> DailyRecord {
    let entry = events
        .iter()
        .filter(|e| e.kind.is_in())
        .map(|e| e.time)
        .min();

    let exit = events
        .iter()
        .filter(|e| e.kind.is_out())
        .map(|e| e.time)
        .min();

    let duration_minutes = match (entry, exit) {
        (Some(i), Some(o)) => minutes_between(i, o),
        _ => 0,
    };

    DailyRecord {
        person_id,
        date,
        entry,
        exit,
        duration_minutes,
    }
}

pub struct DailyLogic;

impl DailyLogic {
    /// Store-backed wrapper: recomputed on demand, never cached.
    pub fn for_date(pool: &mut DbPool, person_id: i64, date: NaiveDate) -> AppResult<DailyRecord> {
        let events = load_events_by_day(&pool.conn, person_id, date)?;
        Ok(aggregate_day(person_id, date, &events))
    }
}
