use crate::errors::{AppError, AppResult};
use crate::models::event::ClockEvent;
use crate::models::event_kind::EventKind;
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, Result, Row, params};

pub fn map_row(row: &Row) -> Result<ClockEvent> {
    let date_str: String = row.get("date")?;
    let time_str: String = row.get("time")?;

    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidDate(date_str.clone())),
        )
    })?;

    let time = crate::utils::time::parse_time(&time_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidTime(time_str.clone())),
        )
    })?;

    let kind_str: String = row.get("kind")?;
    let kind = EventKind::from_db_str(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidKind(kind_str.clone())),
        )
    })?;

    Ok(ClockEvent {
        id: row.get("id")?,
        person_id: row.get("person_id")?,
        date,
        time,
        kind,
        source: row.get("source")?,
        created_at: row.get("created_at")?,
    })
}

/// Append an event, returning its new id.
pub fn insert_event(conn: &Connection, ev: &ClockEvent) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO events (person_id, date, time, kind, source, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            ev.person_id,
            ev.date_str(),
            ev.time_str(),
            ev.kind.to_db_str(),
            ev.source,
            ev.created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_event(conn: &Connection, id: i64) -> AppResult<Option<ClockEvent>> {
    let mut stmt = conn.prepare("SELECT * FROM events WHERE id = ?1")?;
    let mut rows = stmt.query_map([id], map_row)?;

    match rows.next() {
        Some(r) => Ok(Some(r?)),
        None => Ok(None),
    }
}

/// All events of one person on one calendar day, time ascending.
pub fn load_events_by_day(
    conn: &Connection,
    person_id: i64,
    date: NaiveDate,
) -> AppResult<Vec<ClockEvent>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM events
         WHERE person_id = ?1 AND date = ?2
         ORDER BY time ASC, id ASC",
    )?;

    let date_str = date.format("%Y-%m-%d").to_string();
    let rows = stmt.query_map(params![person_id, date_str], map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// The most recent event of one person on one day, if any.
/// This is the single consultation the punch validator needs.
pub fn last_event_of_day(
    conn: &Connection,
    person_id: i64,
    date: NaiveDate,
) -> AppResult<Option<ClockEvent>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM events
         WHERE person_id = ?1 AND date = ?2
         ORDER BY time DESC, id DESC
         LIMIT 1",
    )?;

    let date_str = date.format("%Y-%m-%d").to_string();
    let mut rows = stmt.query_map(params![person_id, date_str], map_row)?;

    match rows.next() {
        Some(r) => Ok(Some(r?)),
        None => Ok(None),
    }
}

/// All events of one person inside an inclusive date range, ascending.
pub fn load_events_in_range(
    conn: &Connection,
    person_id: i64,
    start: NaiveDate,
    end: NaiveDate,
) -> AppResult<Vec<ClockEvent>> {
    let mut stmt = conn.prepare(
        "SELECT * FROM events
         WHERE person_id = ?1 AND date >= ?2 AND date <= ?3
         ORDER BY date ASC, time ASC, id ASC",
    )?;

    let rows = stmt.query_map(
        params![
            person_id,
            start.format("%Y-%m-%d").to_string(),
            end.format("%Y-%m-%d").to_string(),
        ],
        map_row,
    )?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

/// Move an event to a new instant. Used by adjustment approval and the
/// coordinator edit override; neither re-checks the day's alternation.
pub fn update_event_instant(
    conn: &Connection,
    id: i64,
    instant: NaiveDateTime,
    source: &str,
) -> AppResult<usize> {
    let n = conn.execute(
        "UPDATE events SET date = ?1, time = ?2, source = ?3 WHERE id = ?4",
        params![
            instant.date().format("%Y-%m-%d").to_string(),
            instant.time().format("%H:%M:%S").to_string(),
            source,
            id,
        ],
    )?;
    Ok(n)
}

pub fn update_event_kind(conn: &Connection, id: i64, kind: EventKind) -> AppResult<usize> {
    let n = conn.execute(
        "UPDATE events SET kind = ?1 WHERE id = ?2",
        params![kind.to_db_str(), id],
    )?;
    Ok(n)
}

pub fn delete_event(conn: &Connection, id: i64) -> AppResult<usize> {
    let n = conn.execute("DELETE FROM events WHERE id = ?1", [id])?;
    Ok(n)
}

/// One line of the cross-person chronological listing.
#[derive(Debug, Clone)]
pub struct HistoryRow {
    pub event: ClockEvent,
    pub person_name: String,
    pub registration: String,
}

#[derive(Debug, Default, Clone)]
pub struct HistoryFilter {
    pub person_id: Option<i64>,
    pub kind: Option<EventKind>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    /// Default contract is most-recent-first; callers may ask ascending.
    pub ascending: bool,
}

/// Chronological event listing across people, joined with the roster for
/// display names.
pub fn load_history(conn: &Connection, filter: &HistoryFilter) -> AppResult<Vec<HistoryRow>> {
    let mut sql = String::from(
        "SELECT events.*, people.name AS person_name, people.registration AS registration
         FROM events
         JOIN people ON people.id = events.person_id",
    );

    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<String> = Vec::new();

    if let Some(pid) = filter.person_id {
        clauses.push("events.person_id = ?");
        values.push(pid.to_string());
    }
    if let Some(kind) = filter.kind {
        clauses.push("events.kind = ?");
        values.push(kind.to_db_str().to_string());
    }
    if let Some(start) = filter.start {
        clauses.push("events.date >= ?");
        values.push(start.format("%Y-%m-%d").to_string());
    }
    if let Some(end) = filter.end {
        clauses.push("events.date <= ?");
        values.push(end.format("%Y-%m-%d").to_string());
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }

    if filter.ascending {
        sql.push_str(" ORDER BY events.date ASC, events.time ASC, events.id ASC");
    } else {
        sql.push_str(" ORDER BY events.date DESC, events.time DESC, events.id DESC");
    }

    let mut stmt = conn.prepare(&sql)?;

    let bind: Vec<&dyn rusqlite::ToSql> =
        values.iter().map(|v| v as &dyn rusqlite::ToSql).collect();

    let rows = stmt.query_map(rusqlite::params_from_iter(bind), |row| {
        let event = map_row(row)?;
        let person_name: String = row.get("person_name")?;
        let registration: String = row.get("registration")?;
        Ok(HistoryRow {
            event,
            person_name,
            registration,
        })
    })?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
