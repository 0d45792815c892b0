use crate::errors::{AppError, AppResult};
use crate::models::person::{Person, Role};
use rusqlite::{Connection, Result, Row, params};

pub fn map_row(row: &Row) -> Result<Person> {
    let role_str: String = row.get("role")?;
    let role = Role::from_db_str(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            0,
            rusqlite::types::Type::Text,
            Box::new(AppError::Validation(format!("invalid role: {role_str}"))),
        )
    })?;

    Ok(Person {
        id: row.get("id")?,
        name: row.get("name")?,
        registration: row.get("registration")?,
        role,
        active: row.get::<_, i64>("active")? == 1,
    })
}

/// Insert a person; the registration column is UNIQUE and a collision
/// surfaces as a validation error, not a database one.
pub fn insert_person(
    conn: &Connection,
    name: &str,
    registration: &str,
    role: Role,
    created_at: &str,
) -> AppResult<Person> {
    let inserted = conn.execute(
        "INSERT INTO people (name, registration, role, active, created_at)
         VALUES (?1, ?2, ?3, 1, ?4)",
        params![name, registration, role.to_db_str(), created_at],
    );

    match inserted {
        Ok(_) => {}
        Err(rusqlite::Error::SqliteFailure(e, _))
            if e.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            return Err(AppError::Validation(format!(
                "registration {registration} is already in use"
            )));
        }
        Err(e) => return Err(e.into()),
    }

    Ok(Person {
        id: conn.last_insert_rowid(),
        name: name.to_string(),
        registration: registration.to_string(),
        role,
        active: true,
    })
}

pub fn find_person(conn: &Connection, id: i64) -> AppResult<Option<Person>> {
    let mut stmt = conn.prepare("SELECT * FROM people WHERE id = ?1")?;
    let mut rows = stmt.query_map([id], map_row)?;

    match rows.next() {
        Some(r) => Ok(Some(r?)),
        None => Ok(None),
    }
}

pub fn find_by_registration(conn: &Connection, registration: &str) -> AppResult<Option<Person>> {
    let mut stmt = conn.prepare("SELECT * FROM people WHERE registration = ?1")?;
    let mut rows = stmt.query_map([registration], map_row)?;

    match rows.next() {
        Some(r) => Ok(Some(r?)),
        None => Ok(None),
    }
}

pub fn set_active(conn: &Connection, id: i64, active: bool) -> AppResult<usize> {
    let n = conn.execute(
        "UPDATE people SET active = ?1 WHERE id = ?2",
        params![if active { 1 } else { 0 }, id],
    )?;
    Ok(n)
}

pub fn count_people(conn: &Connection) -> AppResult<i64> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM people", [], |row| row.get(0))?;
    Ok(count)
}

/// Roster listing filter: active / inactive / everyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    Active,
    Inactive,
    All,
}

impl StatusFilter {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "active" => Some(Self::Active),
            "inactive" => Some(Self::Inactive),
            "all" => Some(Self::All),
            _ => None,
        }
    }
}

/// Students ordered by name, optionally narrowed by a name/registration
/// substring and by the active flag.
pub fn list_students(
    conn: &Connection,
    search: Option<&str>,
    status: StatusFilter,
) -> AppResult<Vec<Person>> {
    let mut sql = String::from("SELECT * FROM people WHERE role = 'student'");
    let mut values: Vec<String> = Vec::new();

    if let Some(term) = search {
        sql.push_str(" AND (name LIKE ? OR registration LIKE ?)");
        let pattern = format!("%{term}%");
        values.push(pattern.clone());
        values.push(pattern);
    }

    match status {
        StatusFilter::Active => sql.push_str(" AND active = 1"),
        StatusFilter::Inactive => sql.push_str(" AND active = 0"),
        StatusFilter::All => {}
    }

    sql.push_str(" ORDER BY name ASC");

    let mut stmt = conn.prepare(&sql)?;
    let bind: Vec<&dyn rusqlite::ToSql> =
        values.iter().map(|v| v as &dyn rusqlite::ToSql).collect();

    let rows = stmt.query_map(rusqlite::params_from_iter(bind), map_row)?;

    let mut out = Vec::new();
    for r in rows {
        out.push(r?);
    }
    Ok(out)
}
