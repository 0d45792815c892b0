use crate::utils::time::format_minutes;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// Derived entry/exit/duration for one person on one calendar day.
/// Recomputed on demand from the event store; never persisted.
///
/// Entry is the earliest `in` event of the day, exit the earliest `out`.
/// When the entry sits after the exit (dirty data) the duration goes
/// negative and is reported as-is.
#[derive(Debug, Clone, Serialize)]
pub struct DailyRecord {
    pub person_id: i64,
    pub date: NaiveDate,
    pub entry: Option<NaiveTime>,
    pub exit: Option<NaiveTime>,
    pub duration_minutes: i64,
}

impl DailyRecord {
    /// Duration as signed "HH:MM"; "00:00" when either half is missing.
    pub fn duration_hhmm(&self) -> String {
        format_minutes(self.duration_minutes)
    }

    pub fn is_complete(&self) -> bool {
        self.entry.is_some() && self.exit.is_some()
    }
}
