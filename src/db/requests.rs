//! Store access for the exception workflow: adjustment requests and
//! forgotten-punch alerts.

use crate::errors::{AppError, AppResult};
use crate::models::adjustment::AdjustmentRequest;
use crate::models::alert::ForgottenAlert;
use crate::models::request_status::RequestStatus;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rusqlite::{Connection, Result, Row, params};

const TS_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_ts(col: &str, s: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TS_FMT).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidTime(format!("{col}: {s}"))),
        )
    })
}

fn parse_status(s: &str) -> Result<RequestStatus> {
    RequestStatus::from_db_str(s).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::Validation(format!("invalid status: {s}"))),
        )
    })
}

pub fn format_ts(ts: NaiveDateTime) -> String {
    ts.format(TS_FMT).to_string()
}

// ---------------------------
// Adjustment requests
// ---------------------------

pub fn map_adjustment_row(row: &Row) -> Result<AdjustmentRequest> {
    let original_str: String = row.get("original_ts")?;
    let requested_str: String = row.get("requested_ts")?;
    let status_str: String = row.get("status")?;

    Ok(AdjustmentRequest {
        id: row.get("id")?,
        event_id: row.get("event_id")?,
        person_id: row.get("person_id")?,
        original: parse_ts("original_ts", &original_str)?,
        requested: parse_ts("requested_ts", &requested_str)?,
        justification: row.get("justification")?,
        status: parse_status(&status_str)?,
        resolver_id: row.get("resolver_id")?,
        resolution_note: row.get("resolution_note")?,
        resolved_at: row.get("resolved_at")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_adjustment(
    conn: &Connection,
    event_id: i64,
    person_id: i64,
    original: NaiveDateTime,
    requested: NaiveDateTime,
    justification: &str,
    created_at: &str,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO adjustments
            (event_id, person_id, original_ts, requested_ts, justification, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6)",
        params![
            event_id,
            person_id,
            format_ts(original),
            format_ts(requested),
            justification,
            created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_adjustment(conn: &Connection, id: i64) -> AppResult<Option<AdjustmentRequest>> {
    let mut stmt = conn.prepare("SELECT * FROM adjustments WHERE id = ?1")?;
    let mut rows = stmt.query_map([id], map_adjustment_row)?;

    match rows.next() {
        Some(r) => Ok(Some(r?)),
        None => Ok(None),
    }
}

/// Stamp a terminal status onto a pending adjustment.
pub fn resolve_adjustment(
    conn: &Connection,
    id: i64,
    status: RequestStatus,
    resolver_id: i64,
    note: Option<&str>,
    resolved_at: &str,
) -> AppResult<usize> {
    let n = conn.execute(
        "UPDATE adjustments
         SET status = ?1, resolver_id = ?2, resolution_note = ?3, resolved_at = ?4
         WHERE id = ?5",
        params![status.to_db_str(), resolver_id, note, resolved_at, id],
    )?;
    Ok(n)
}

pub fn list_adjustments(
    conn: &Connection,
    person_id: Option<i64>,
    status: Option<RequestStatus>,
) -> AppResult<Vec<AdjustmentRequest>> {
    let mut sql = String::from("SELECT * FROM adjustments");
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<String> = Vec::new();

    if let Some(pid) = person_id {
        clauses.push("person_id = ?");
        values.push(pid.to_string());
    }
    if let Some(st) = status {
        clauses.push("status = ?");
        values.push(st.to_db_str().to_string());
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let bind: Vec<&dyn rusqlite::ToSql> =
        values.iter().map(|v| v as &dyn rusqlite::ToSql).collect();

    let rows = stmt.query_map(rusqlite::params_from_iter(bind), map_adjustment_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}

// ---------------------------
// Forgotten-punch alerts
// ---------------------------

pub fn map_alert_row(row: &Row) -> Result<ForgottenAlert> {
    let date_str: String = row.get("date")?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::InvalidDate(date_str.clone())),
        )
    })?;

    let parse_opt_time = |col: &str, v: Option<String>| -> Result<Option<NaiveTime>> {
        match v {
            None => Ok(None),
            Some(s) => crate::utils::time::parse_time(&s).map(Some).ok_or_else(|| {
                rusqlite::Error::FromSqlConversionFailure(
                    0,
                    rusqlite::types::Type::Text,
                    Box::new(AppError::InvalidTime(format!("{col}: {s}"))),
                )
            }),
        }
    };

    let status_str: String = row.get("status")?;

    Ok(ForgottenAlert {
        id: row.get("id")?,
        person_id: row.get("person_id")?,
        date,
        expected_in: parse_opt_time("expected_in", row.get("expected_in")?)?,
        expected_out: parse_opt_time("expected_out", row.get("expected_out")?)?,
        justification: row.get("justification")?,
        status: parse_status(&status_str)?,
        resolver_id: row.get("resolver_id")?,
        resolution_note: row.get("resolution_note")?,
        resolved_at: row.get("resolved_at")?,
        created_at: row.get("created_at")?,
    })
}

pub fn insert_alert(
    conn: &Connection,
    person_id: i64,
    date: NaiveDate,
    expected_in: Option<NaiveTime>,
    expected_out: Option<NaiveTime>,
    justification: &str,
    created_at: &str,
) -> AppResult<i64> {
    conn.execute(
        "INSERT INTO alerts
            (person_id, date, expected_in, expected_out, justification, status, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, 'pending', ?6)",
        params![
            person_id,
            date.format("%Y-%m-%d").to_string(),
            expected_in.map(|t| t.format("%H:%M:%S").to_string()),
            expected_out.map(|t| t.format("%H:%M:%S").to_string()),
            justification,
            created_at,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn find_alert(conn: &Connection, id: i64) -> AppResult<Option<ForgottenAlert>> {
    let mut stmt = conn.prepare("SELECT * FROM alerts WHERE id = ?1")?;
    let mut rows = stmt.query_map([id], map_alert_row)?;

    match rows.next() {
        Some(r) => Ok(Some(r?)),
        None => Ok(None),
    }
}

/// A pending or approved alert blocks another submission for the same
/// (person, date); a rejected one does not.
pub fn has_open_alert(conn: &Connection, person_id: i64, date: NaiveDate) -> AppResult<bool> {
    let mut stmt = conn.prepare(
        "SELECT 1 FROM alerts
         WHERE person_id = ?1 AND date = ?2 AND status != 'rejected'
         LIMIT 1",
    )?;

    let exists = stmt.exists(params![person_id, date.format("%Y-%m-%d").to_string()])?;
    Ok(exists)
}

pub fn resolve_alert(
    conn: &Connection,
    id: i64,
    status: RequestStatus,
    resolver_id: i64,
    note: Option<&str>,
    resolved_at: &str,
) -> AppResult<usize> {
    let n = conn.execute(
        "UPDATE alerts
         SET status = ?1, resolver_id = ?2, resolution_note = ?3, resolved_at = ?4
         WHERE id = ?5",
        params![status.to_db_str(), resolver_id, note, resolved_at, id],
    )?;
    Ok(n)
}

pub fn list_alerts(
    conn: &Connection,
    person_id: Option<i64>,
    status: Option<RequestStatus>,
) -> AppResult<Vec<ForgottenAlert>> {
    let mut sql = String::from("SELECT * FROM alerts");
    let mut clauses: Vec<&str> = Vec::new();
    let mut values: Vec<String> = Vec::new();

    if let Some(pid) = person_id {
        clauses.push("person_id = ?");
        values.push(pid.to_string());
    }
    if let Some(st) = status {
        clauses.push("status = ?");
        values.push(st.to_db_str().to_string());
    }

    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY created_at DESC, id DESC");

    let mut stmt = conn.prepare(&sql)?;
    let bind: Vec<&dyn rusqlite::ToSql> =
        values.iter().map(|v| v as &dyn rusqlite::ToSql).collect();

    let rows = stmt.query_map(rusqlite::params_from_iter(bind), map_alert_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
