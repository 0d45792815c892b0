use super::event_kind::EventKind;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;

/// A single punch in the ledger.
///
/// `date` and `time` hold the instant already normalized to the configured
/// fixed local zone, so calendar-day grouping is a plain equality on `date`.
#[derive(Debug, Clone, Serialize)]
pub struct ClockEvent {
    pub id: i64,
    pub person_id: i64,     // ⇔ events.person_id
    pub date: NaiveDate,    // ⇔ events.date (TEXT "YYYY-MM-DD")
    pub time: NaiveTime,    // ⇔ events.time (TEXT "HH:MM:SS")
    pub kind: EventKind,    // ⇔ events.kind ('in' | 'out')
    pub source: String,     // ⇔ events.source ('punch' | 'manual' | 'adjusted')
    pub created_at: String, // ⇔ events.created_at (TEXT, ISO8601)
}

impl ClockEvent {
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn time_str(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }

    pub fn timestamp(&self) -> NaiveDateTime {
        self.date.and_time(self.time)
    }
}
