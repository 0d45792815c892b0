use rusqlite::{Connection, OptionalExtension, Result};

/// Ensure that the `log` table exists with the modern schema.
fn ensure_log_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            date      TEXT NOT NULL,
            operation TEXT NOT NULL,
            target    TEXT DEFAULT '',
            message   TEXT NOT NULL
        );
        "#,
    )?;
    Ok(())
}

/// Check if a table exists.
fn table_exists(conn: &Connection, name: &str) -> Result<bool> {
    let mut stmt =
        conn.prepare("SELECT name FROM sqlite_master WHERE type='table' AND name=?1")?;
    let exists: Option<String> = stmt.query_row([name], |row| row.get(0)).optional()?;
    Ok(exists.is_some())
}

/// Check if a table has a given column.
fn has_column(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info('{table}')"))?;
    let cols = stmt.query_map([], |row| row.get::<_, String>(1))?;

    for c in cols {
        if c? == column {
            return Ok(true);
        }
    }
    Ok(false)
}

fn create_people_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS people (
            id           INTEGER PRIMARY KEY AUTOINCREMENT,
            name         TEXT NOT NULL,
            registration TEXT NOT NULL UNIQUE,
            role         TEXT NOT NULL CHECK(role IN ('student','coordinator')),
            active       INTEGER NOT NULL DEFAULT 1,
            created_at   TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_people_role ON people(role, active);
        "#,
    )?;
    Ok(())
}

fn create_events_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS events (
            id         INTEGER PRIMARY KEY AUTOINCREMENT,
            person_id  INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
            date       TEXT NOT NULL,
            time       TEXT NOT NULL,
            kind       TEXT NOT NULL CHECK(kind IN ('in','out')),
            source     TEXT NOT NULL DEFAULT 'punch',
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_events_person_date ON events(person_id, date, time);
        CREATE INDEX IF NOT EXISTS idx_events_date_kind ON events(date, kind);
        "#,
    )?;
    Ok(())
}

fn create_adjustments_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS adjustments (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id        INTEGER NOT NULL REFERENCES events(id) ON DELETE CASCADE,
            person_id       INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
            original_ts     TEXT NOT NULL,
            requested_ts    TEXT NOT NULL,
            justification   TEXT NOT NULL,
            status          TEXT NOT NULL DEFAULT 'pending'
                            CHECK(status IN ('pending','approved','rejected')),
            resolver_id     INTEGER REFERENCES people(id),
            resolution_note TEXT,
            resolved_at     TEXT,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_adjustments_status ON adjustments(status);
        CREATE INDEX IF NOT EXISTS idx_adjustments_person ON adjustments(person_id);
        "#,
    )?;
    Ok(())
}

fn create_alerts_table(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS alerts (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            person_id       INTEGER NOT NULL REFERENCES people(id) ON DELETE CASCADE,
            date            TEXT NOT NULL,
            expected_in     TEXT,
            expected_out    TEXT,
            justification   TEXT NOT NULL,
            status          TEXT NOT NULL DEFAULT 'pending'
                            CHECK(status IN ('pending','approved','rejected')),
            resolver_id     INTEGER REFERENCES people(id),
            resolution_note TEXT,
            resolved_at     TEXT,
            created_at      TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_alerts_person_date ON alerts(person_id, date);
        CREATE INDEX IF NOT EXISTS idx_alerts_status ON alerts(status);
        "#,
    )?;
    Ok(())
}

/// Early alert schemas carried a single expected time and no coordinator
/// note. Upgrade in place, marking the migration in the log table.
fn migrate_alerts_expected_out(conn: &Connection) -> Result<()> {
    let version = "20250425_0001_alerts_expected_out";

    // 1) Skip when already applied
    let mut chk = conn.prepare(
        "SELECT 1 FROM log
         WHERE operation = 'migration_applied' AND target = ?1
         LIMIT 1",
    )?;
    if chk.query_row([version], |_| Ok(())).optional()?.is_some() {
        return Ok(());
    }

    let mut changed = false;

    if !has_column(conn, "alerts", "expected_out")? {
        conn.execute("ALTER TABLE alerts ADD COLUMN expected_out TEXT;", [])?;
        changed = true;
    }

    if !has_column(conn, "alerts", "resolution_note")? {
        conn.execute("ALTER TABLE alerts ADD COLUMN resolution_note TEXT;", [])?;
        changed = true;
    }

    if changed {
        // 2) Mark as applied
        conn.execute(
            "INSERT INTO log (date, operation, target, message)
             VALUES (datetime('now'), 'migration_applied', ?1,
                     'Added expected_out/resolution_note to alerts')",
            [version],
        )?;
    }

    Ok(())
}

/// Public entry point: run all pending migrations.
///
/// Invoked from db::initialize::init_db().
pub fn run_pending_migrations(conn: &Connection) -> Result<()> {
    // 1) Ensure log table first: later steps record markers in it
    ensure_log_table(conn)?;

    // 2) Base tables, idempotent
    create_people_table(conn)?;
    create_events_table(conn)?;
    create_adjustments_table(conn)?;
    create_alerts_table(conn)?;

    // 3) Column upgrades for databases created before the current schema
    if table_exists(conn, "alerts")? {
        migrate_alerts_expected_out(conn)?;
    }

    Ok(())
}
