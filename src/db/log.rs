use crate::errors::AppResult;
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use rusqlite::params;

/// Write an audit line into the `log` table.
///
/// Every mutating ledger operation goes through here; this is the trail
/// coordinators consult after invariant-bypassing edits.
pub fn audit(
    conn: &Connection,
    now: DateTime<Utc>,
    operation: &str,
    target: &str,
    message: &str,
) -> AppResult<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO log (date, operation, target, message)
         VALUES (?1, ?2, ?3, ?4)",
    )?;

    stmt.execute(params![now.to_rfc3339(), operation, target, message])?;

    Ok(())
}
