use crate::db::log::audit;
use crate::db::people::find_by_registration;
use crate::db::pool::DbPool;
use crate::db::queries::{delete_event, find_event, insert_event, update_event_instant, update_event_kind};
use crate::errors::{AppError, AppResult};
use crate::models::event::ClockEvent;
use crate::models::event_kind::EventKind;
use crate::models::person::Person;
use chrono::{DateTime, NaiveDateTime, Utc};

/// Coordinator overrides on the raw ledger: add, edit or delete an event
/// at an arbitrary instant.
///
/// None of these re-check the day's alternation; that is the point of an
/// override. Every call is audit-logged and `revalidate` is the follow-up
/// pass for the coordinator to inspect what the edit did to the sequence.
pub struct ManualLogic;

fn require_coordinator(actor: &Person) -> AppResult<()> {
    if !actor.role.is_coordinator() {
        return Err(AppError::Unauthorized(
            "only coordinators may override the ledger".into(),
        ));
    }
    Ok(())
}

impl ManualLogic {
    pub fn add(
        pool: &mut DbPool,
        actor: &Person,
        registration: &str,
        kind: EventKind,
        instant: NaiveDateTime,
        now: DateTime<Utc>,
    ) -> AppResult<ClockEvent> {
        require_coordinator(actor)?;

        let target = find_by_registration(&pool.conn, registration)?
            .filter(|p| p.role.is_student())
            .ok_or_else(|| AppError::NotFound(format!("student {registration} not found")))?;

        let mut ev = ClockEvent {
            id: 0,
            person_id: target.id,
            date: instant.date(),
            time: instant.time(),
            kind,
            source: "manual".to_string(),
            created_at: now.to_rfc3339(),
        };
        ev.id = insert_event(&pool.conn, &ev)?;

        audit(
            &pool.conn,
            now,
            "event_add",
            &actor.registration,
            &format!(
                "{} {} at {} {} for {}",
                kind.to_db_str(),
                ev.id,
                ev.date_str(),
                ev.time_str(),
                registration
            ),
        )?;

        Ok(ev)
    }

    pub fn edit(
        pool: &mut DbPool,
        actor: &Person,
        event_id: i64,
        instant: Option<NaiveDateTime>,
        kind: Option<EventKind>,
        now: DateTime<Utc>,
    ) -> AppResult<ClockEvent> {
        require_coordinator(actor)?;

        if instant.is_none() && kind.is_none() {
            return Err(AppError::Validation(
                "nothing to edit: give a new time, a new kind, or both".into(),
            ));
        }

        let existing = find_event(&pool.conn, event_id)?
            .ok_or_else(|| AppError::NotFound(format!("event {event_id} not found")))?;

        if let Some(instant) = instant {
            update_event_instant(&pool.conn, event_id, instant, "manual")?;
        }
        if let Some(kind) = kind {
            update_event_kind(&pool.conn, event_id, kind)?;
        }

        audit(
            &pool.conn,
            now,
            "event_edit",
            &actor.registration,
            &format!(
                "event {} was {} {} {}",
                event_id,
                existing.kind.to_db_str(),
                existing.date_str(),
                existing.time_str()
            ),
        )?;

        find_event(&pool.conn, event_id)?
            .ok_or_else(|| AppError::NotFound(format!("event {event_id} not found")))
    }

    /// Delete an event outright. Bypasses any alternation re-check.
    pub fn delete(
        pool: &mut DbPool,
        actor: &Person,
        event_id: i64,
        now: DateTime<Utc>,
    ) -> AppResult<()> {
        require_coordinator(actor)?;

        let existing = find_event(&pool.conn, event_id)?
            .ok_or_else(|| AppError::NotFound(format!("event {event_id} not found")))?;

        delete_event(&pool.conn, event_id)?;

        audit(
            &pool.conn,
            now,
            "event_del",
            &actor.registration,
            &format!(
                "removed {} {} {} of person {}",
                existing.kind.to_db_str(),
                existing.date_str(),
                existing.time_str(),
                existing.person_id
            ),
        )?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use crate::db::people::insert_person;
    use crate::models::person::Role;
    use chrono::{NaiveDate, TimeZone};
    use rusqlite::Connection;

    fn test_pool() -> DbPool {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        init_db(&conn).expect("init schema");
        DbPool { conn }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
    }

    fn instant(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 18)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    #[test]
    fn overrides_are_coordinator_only() {
        let mut pool = test_pool();
        let student = insert_person(&pool.conn, "Ana", "2024001", Role::Student, "t").unwrap();

        let err = ManualLogic::add(
            &mut pool,
            &student,
            "2024001",
            EventKind::In,
            instant(8, 0),
            now(),
        )
        .expect_err("student override");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn add_edit_delete_roundtrip() {
        let mut pool = test_pool();
        let coord = insert_person(&pool.conn, "Carlos", "C-01", Role::Coordinator, "t").unwrap();
        insert_person(&pool.conn, "Ana", "2024001", Role::Student, "t").unwrap();

        let ev = ManualLogic::add(
            &mut pool,
            &coord,
            "2024001",
            EventKind::In,
            instant(8, 0),
            now(),
        )
        .expect("manual add");
        assert_eq!(ev.source, "manual");

        let edited = ManualLogic::edit(
            &mut pool,
            &coord,
            ev.id,
            Some(instant(8, 30)),
            Some(EventKind::Out),
            now(),
        )
        .expect("manual edit");
        assert_eq!(edited.time_str(), "08:30:00");
        assert_eq!(edited.kind, EventKind::Out);

        ManualLogic::delete(&mut pool, &coord, ev.id, now()).expect("manual delete");
        let err = ManualLogic::delete(&mut pool, &coord, ev.id, now()).expect_err("gone");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn add_requires_a_student_target() {
        let mut pool = test_pool();
        let coord = insert_person(&pool.conn, "Carlos", "C-01", Role::Coordinator, "t").unwrap();

        let err = ManualLogic::add(
            &mut pool,
            &coord,
            "C-01",
            EventKind::In,
            instant(8, 0),
            now(),
        )
        .expect_err("coordinator is not a valid target");
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
