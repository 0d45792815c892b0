use crate::config::Config;
use crate::core::daily::aggregate_day;
use crate::db::people::{StatusFilter, list_students};
use crate::db::pool::DbPool;
use crate::db::queries::{HistoryFilter, HistoryRow, load_events_by_day, load_events_in_range, load_history};
use crate::errors::{AppError, AppResult};
use crate::models::daily_record::DailyRecord;
use crate::models::event::ClockEvent;
use crate::models::period_summary::{
    DaySnapshot, PeriodSummary, PersonSummary, RosterReport, SnapshotRow,
};
use chrono::{DateTime, Datelike, Duration, NaiveDate, Timelike, Utc};
use std::collections::BTreeMap;

/// Round to two decimal places, the precision every presence percentage
/// is reported with.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn presence_pct(days_present: i64, total_days: i64) -> f64 {
    if total_days == 0 {
        return 0.0;
    }
    round2(days_present as f64 / total_days as f64 * 100.0)
}

/// Group a range's events by calendar day, preserving day order.
fn group_by_day(events: Vec<ClockEvent>) -> BTreeMap<NaiveDate, Vec<ClockEvent>> {
    let mut by_day: BTreeMap<NaiveDate, Vec<ClockEvent>> = BTreeMap::new();
    for ev in events {
        by_day.entry(ev.date).or_default().push(ev);
    }
    by_day
}

pub struct PeriodLogic;

impl PeriodLogic {
    /// Presence and duration statistics for one person over an inclusive
    /// range. Total days is end − start + 1; a day counts as present when
    /// it has at least one event of any kind.
    pub fn summarize(
        pool: &mut DbPool,
        person_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<PeriodSummary> {
        if end < start {
            return Err(AppError::Validation(format!(
                "range end {end} is before range start {start}"
            )));
        }

        let total_days = crate::utils::date::total_days(start, end);
        let events = load_events_in_range(&pool.conn, person_id, start, end)?;

        let last_event = events.iter().map(|e| e.timestamp()).max();
        let by_day = group_by_day(events);

        let days_present = by_day.len() as i64;
        let total_minutes: i64 = by_day
            .iter()
            .map(|(date, evs)| aggregate_day(person_id, *date, evs).duration_minutes)
            .sum();

        Ok(PeriodSummary {
            person_id,
            start,
            end,
            total_days,
            days_present,
            days_absent: total_days - days_present,
            presence_pct: presence_pct(days_present, total_days),
            total_minutes,
            first_day: by_day.keys().next().copied(),
            last_day: by_day.keys().next_back().copied(),
            last_event,
        })
    }

    /// Daily records for the days that have events, most recent first.
    pub fn daily_records(
        pool: &mut DbPool,
        person_id: i64,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<Vec<DailyRecord>> {
        let events = load_events_in_range(&pool.conn, person_id, start, end)?;
        let by_day = group_by_day(events);

        Ok(by_day
            .iter()
            .rev()
            .map(|(date, evs)| aggregate_day(person_id, *date, evs))
            .collect())
    }

    /// Roster-level report: each matching active student computed
    /// independently, then simple means/sums over the per-person results.
    pub fn roster_report(
        pool: &mut DbPool,
        search: Option<&str>,
        start: NaiveDate,
        end: NaiveDate,
    ) -> AppResult<RosterReport> {
        if end < start {
            return Err(AppError::Validation(format!(
                "range end {end} is before range start {start}"
            )));
        }

        let students = list_students(&pool.conn, search, StatusFilter::Active)?;

        let mut people = Vec::with_capacity(students.len());
        for person in students {
            let summary = Self::summarize(pool, person.id, start, end)?;
            let days = Self::daily_records(pool, person.id, start, end)?;
            people.push(PersonSummary {
                person,
                summary,
                days,
            });
        }

        let total_people = people.len();
        let present_people = people.iter().filter(|p| p.summary.days_present > 0).count();
        let total_minutes: i64 = people.iter().map(|p| p.summary.total_minutes).sum();
        let average_presence_pct = if total_people == 0 {
            0.0
        } else {
            round2(
                people.iter().map(|p| p.summary.presence_pct).sum::<f64>() / total_people as f64,
            )
        };

        Ok(RosterReport {
            start,
            end,
            total_people,
            present_people,
            average_presence_pct,
            total_minutes,
            people,
        })
    }

    /// Chronological event listing; most recent first unless the caller
    /// asks for ascending order.
    pub fn history(pool: &mut DbPool, filter: &HistoryFilter) -> AppResult<Vec<HistoryRow>> {
        load_history(&pool.conn, filter)
    }

    /// Who is present on a single day: active students with at least one
    /// `in` punch, with entry/exit under the first-occurrence policy.
    pub fn day_snapshot(pool: &mut DbPool, date: NaiveDate) -> AppResult<DaySnapshot> {
        let students = list_students(&pool.conn, None, StatusFilter::Active)?;
        let total_students = students.len();

        let mut rows = Vec::new();
        let mut punches_morning = 0;
        let mut punches_afternoon = 0;
        let mut punches_evening = 0;

        for person in students {
            let events = load_events_by_day(&pool.conn, person.id, date)?;

            for ev in &events {
                match ev.time.hour() {
                    12..=17 => punches_afternoon += 1,
                    18..=23 => punches_evening += 1,
                    _ => punches_morning += 1,
                }
            }

            if !events.iter().any(|e| e.kind.is_in()) {
                continue;
            }

            let record = aggregate_day(person.id, date, &events);
            // load_events_by_day is time-ascending, so the last element is
            // the day's latest punch.
            let last = events.last().cloned();
            if let Some(last) = last {
                rows.push(SnapshotRow {
                    person,
                    entry: record.entry,
                    exit: record.exit,
                    last_kind: last.kind,
                    last_time: last.time,
                });
            }
        }

        let present = rows.len();
        Ok(DaySnapshot {
            date,
            total_students,
            present,
            absent: total_students - present,
            presence_pct: presence_pct(present as i64, total_students as i64),
            punches_morning,
            punches_afternoon,
            punches_evening,
            rows,
        })
    }

    /// Quick view for the acting student: total worked minutes today and
    /// over the current week (Monday through Sunday), both under the
    /// canonical daily policy.
    pub fn week_hours(
        pool: &mut DbPool,
        cfg: &Config,
        person_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<(i64, i64)> {
        let today = cfg.localize(now).date();
        let week_start = today - Duration::days(today.weekday().num_days_from_monday() as i64);
        let week_end = week_start + Duration::days(6);

        let today_minutes = Self::summarize(pool, person_id, today, today)?.total_minutes;
        let week_minutes = Self::summarize(pool, person_id, week_start, week_end)?.total_minutes;

        Ok((today_minutes, week_minutes))
    }
}
