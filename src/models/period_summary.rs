use super::daily_record::DailyRecord;
use super::event_kind::EventKind;
use super::person::Person;
use crate::utils::time::format_minutes;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// Presence and duration statistics for one person over an inclusive
/// date range. Purely computed from daily records.
#[derive(Debug, Clone, Serialize)]
pub struct PeriodSummary {
    pub person_id: i64,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_days: i64,
    pub days_present: i64,
    pub days_absent: i64,
    pub presence_pct: f64,
    pub total_minutes: i64,
    pub first_day: Option<NaiveDate>,
    pub last_day: Option<NaiveDate>,
    pub last_event: Option<NaiveDateTime>,
}

impl PeriodSummary {
    pub fn total_hhmm(&self) -> String {
        format_minutes(self.total_minutes)
    }
}

/// One roster row: the person plus their independently computed summary.
#[derive(Debug, Clone, Serialize)]
pub struct PersonSummary {
    pub person: Person,
    pub summary: PeriodSummary,
    pub days: Vec<DailyRecord>,
}

impl PersonSummary {
    /// "present" when the person shows at least one day with events.
    pub fn status(&self) -> &'static str {
        if self.summary.days_present > 0 {
            "present"
        } else {
            "absent"
        }
    }
}

/// Roster-level report: per-person summaries plus simple means/sums over
/// them. No cross-person correlation.
#[derive(Debug, Clone, Serialize)]
pub struct RosterReport {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub total_people: usize,
    pub present_people: usize,
    pub average_presence_pct: f64,
    pub total_minutes: i64,
    pub people: Vec<PersonSummary>,
}

/// Who is present on a single day, with entry/exit under the
/// first-occurrence policy and the day's last recorded punch.
#[derive(Debug, Clone, Serialize)]
pub struct SnapshotRow {
    pub person: Person,
    pub entry: Option<NaiveTime>,
    pub exit: Option<NaiveTime>,
    pub last_kind: EventKind,
    pub last_time: NaiveTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct DaySnapshot {
    pub date: NaiveDate,
    pub total_students: usize,
    pub present: usize,
    pub absent: usize,
    pub presence_pct: f64,
    /// Punch counts by day part: morning (06–12), afternoon (12–18),
    /// evening (18–24). Punches before 06:00 land in morning.
    pub punches_morning: usize,
    pub punches_afternoon: usize,
    pub punches_evening: usize,
    pub rows: Vec<SnapshotRow>,
}
