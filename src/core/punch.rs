use crate::config::Config;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::queries::{insert_event, last_event_of_day};
use crate::errors::{AppError, AppResult};
use crate::models::event::ClockEvent;
use crate::models::event_kind::EventKind;
use crate::models::person::Person;
use chrono::{DateTime, Utc};
use rusqlite::TransactionBehavior;

/// The ledger validator: the only path that appends punches.
///
/// Invariant enforced here: per person, per local calendar day, events
/// alternate strictly starting with `in`. The consult-then-append runs in
/// an IMMEDIATE transaction so two simultaneous punches for the same
/// person cannot both pass the check.
pub struct PunchLogic;

impl PunchLogic {
    pub fn apply(
        pool: &mut DbPool,
        cfg: &Config,
        person: &Person,
        kind: EventKind,
        now: DateTime<Utc>,
    ) -> AppResult<ClockEvent> {
        if !person.role.is_student() {
            return Err(AppError::Unauthorized(
                "only students may punch the clock".into(),
            ));
        }
        if !person.active {
            return Err(AppError::Unauthorized(format!(
                "access for {} is blocked",
                person.registration
            )));
        }

        let local = cfg.localize(now);
        let date = local.date();

        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let last = last_event_of_day(&tx, person.id, date)?;

        match &last {
            None if kind.is_out() => {
                return Err(AppError::SequenceViolation(
                    "must clock in before clocking out".into(),
                ));
            }
            Some(prev) if prev.kind == kind => {
                return Err(AppError::SequenceViolation(format!(
                    "must clock {} before another {}",
                    kind.opposite().to_db_str(),
                    kind.to_db_str()
                )));
            }
            _ => {}
        }

        let mut ev = ClockEvent {
            id: 0,
            person_id: person.id,
            date,
            time: local.time(),
            kind,
            source: "punch".to_string(),
            created_at: now.to_rfc3339(),
        };

        ev.id = insert_event(&tx, &ev)?;

        audit(
            &tx,
            now,
            "punch",
            &person.registration,
            &format!("{} at {} {}", kind.to_db_str(), ev.date_str(), ev.time_str()),
        )?;

        tx.commit()?;

        Ok(ev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use crate::db::people::insert_person;
    use crate::models::person::Role;
    use chrono::TimeZone;
    use rusqlite::Connection;

    fn test_pool() -> DbPool {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        init_db(&conn).expect("init schema");
        DbPool { conn }
    }

    fn cfg() -> Config {
        Config {
            database: ":memory:".into(),
            ..Config::default()
        }
    }

    fn student(pool: &DbPool) -> Person {
        insert_person(&pool.conn, "Ana Souza", "2024001", Role::Student, "t").expect("insert")
    }

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        // 11:00 UTC == 08:00 at the default UTC-3 offset
        Utc.with_ymd_and_hms(2024, 3, 18, h, m, 0).unwrap()
    }

    #[test]
    fn first_punch_must_be_in() {
        let mut pool = test_pool();
        let p = student(&pool);

        let err = PunchLogic::apply(&mut pool, &cfg(), &p, EventKind::Out, at(11, 0))
            .expect_err("out without in");
        assert!(matches!(err, AppError::SequenceViolation(_)));
    }

    #[test]
    fn punches_must_alternate() {
        let mut pool = test_pool();
        let p = student(&pool);
        let c = cfg();

        PunchLogic::apply(&mut pool, &c, &p, EventKind::In, at(11, 0)).expect("first in");
        let err = PunchLogic::apply(&mut pool, &c, &p, EventKind::In, at(11, 5))
            .expect_err("second in must fail");
        assert!(matches!(err, AppError::SequenceViolation(_)));

        PunchLogic::apply(&mut pool, &c, &p, EventKind::Out, at(15, 0)).expect("out");
        PunchLogic::apply(&mut pool, &c, &p, EventKind::In, at(16, 0)).expect("in again");
    }

    #[test]
    fn timestamps_are_normalized_to_the_ledger_zone() {
        let mut pool = test_pool();
        let p = student(&pool);

        let ev = PunchLogic::apply(&mut pool, &cfg(), &p, EventKind::In, at(11, 0)).expect("in");
        assert_eq!(ev.date_str(), "2024-03-18");
        assert_eq!(ev.time_str(), "08:00:00");
    }

    #[test]
    fn inactive_or_non_student_is_rejected() {
        let mut pool = test_pool();
        let c = cfg();

        let coordinator =
            insert_person(&pool.conn, "Carlos Lima", "C-01", Role::Coordinator, "t").unwrap();
        let err = PunchLogic::apply(&mut pool, &c, &coordinator, EventKind::In, at(11, 0))
            .expect_err("coordinator cannot punch");
        assert!(matches!(err, AppError::Unauthorized(_)));

        let mut p = student(&pool);
        p.active = false;
        let err = PunchLogic::apply(&mut pool, &c, &p, EventKind::In, at(11, 0))
            .expect_err("inactive cannot punch");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn a_new_day_starts_a_fresh_sequence() {
        let mut pool = test_pool();
        let p = student(&pool);
        let c = cfg();

        PunchLogic::apply(&mut pool, &c, &p, EventKind::In, at(11, 0)).expect("day one in");
        // 02:30 UTC next day is still 23:30 on day one at UTC-3
        let late = Utc.with_ymd_and_hms(2024, 3, 19, 2, 30, 0).unwrap();
        PunchLogic::apply(&mut pool, &c, &p, EventKind::Out, late).expect("day one out");

        // Midday next local day: the sequence restarts with `in`
        let next_day = Utc.with_ymd_and_hms(2024, 3, 19, 12, 0, 0).unwrap();
        let err = PunchLogic::apply(&mut pool, &c, &p, EventKind::Out, next_day)
            .expect_err("fresh day must start with in");
        assert!(matches!(err, AppError::SequenceViolation(_)));
    }
}
