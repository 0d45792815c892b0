use crate::config::Config;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::queries::{find_event, update_event_instant};
use crate::db::requests::{
    find_adjustment, format_ts, insert_adjustment, list_adjustments, resolve_adjustment,
};
use crate::errors::{AppError, AppResult};
use crate::models::adjustment::AdjustmentRequest;
use crate::models::person::Person;
use crate::models::request_status::{Decision, RequestStatus};
use chrono::{DateTime, NaiveDateTime, Utc};
use rusqlite::TransactionBehavior;

/// Adjustment requests: a student asks for one of their events to be
/// moved to a different instant; a coordinator resolves exactly once.
pub struct AdjustLogic;

impl AdjustLogic {
    pub fn submit(
        pool: &mut DbPool,
        cfg: &Config,
        requester: &Person,
        event_id: i64,
        requested: NaiveDateTime,
        justification: &str,
        now: DateTime<Utc>,
    ) -> AppResult<AdjustmentRequest> {
        if justification.trim().chars().count() < cfg.min_justification_chars {
            return Err(AppError::Validation(format!(
                "justification must have at least {} characters",
                cfg.min_justification_chars
            )));
        }

        let event = find_event(&pool.conn, event_id)?
            .ok_or_else(|| AppError::NotFound(format!("event {event_id} not found")))?;

        if event.person_id != requester.id {
            return Err(AppError::Unauthorized(
                "you may only request adjustments for your own events".into(),
            ));
        }

        let original = event.timestamp();
        let id = insert_adjustment(
            &pool.conn,
            event_id,
            requester.id,
            original,
            requested,
            justification.trim(),
            &now.to_rfc3339(),
        )?;

        audit(
            &pool.conn,
            now,
            "adjust_submit",
            &requester.registration,
            &format!(
                "event {} {} -> {}",
                event_id,
                format_ts(original),
                format_ts(requested)
            ),
        )?;

        Ok(AdjustmentRequest {
            id,
            event_id,
            person_id: requester.id,
            original,
            requested,
            justification: justification.trim().to_string(),
            status: RequestStatus::Pending,
            resolver_id: None,
            resolution_note: None,
            resolved_at: None,
            created_at: now.to_rfc3339(),
        })
    }

    /// Resolve a pending request. Approval overwrites the target event's
    /// timestamp with the requested one (kind untouched) WITHOUT
    /// re-checking the day's alternation; the bypass is written to the
    /// audit log and `revalidate` is the follow-up pass.
    pub fn resolve(
        pool: &mut DbPool,
        resolver: &Person,
        request_id: i64,
        decision: Decision,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<AdjustmentRequest> {
        if !resolver.role.is_coordinator() {
            return Err(AppError::Unauthorized(
                "only coordinators may resolve adjustment requests".into(),
            ));
        }

        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let request = find_adjustment(&tx, request_id)?
            .ok_or_else(|| AppError::NotFound(format!("adjustment {request_id} not found")))?;

        if request.status.is_terminal() {
            return Err(AppError::AlreadyResolved(format!(
                "adjustment {} was already {}",
                request_id,
                request.status.to_db_str()
            )));
        }

        if decision == Decision::Approve {
            let touched = update_event_instant(&tx, request.event_id, request.requested, "adjusted")?;
            if touched == 0 {
                return Err(AppError::NotFound(format!(
                    "event {} no longer exists",
                    request.event_id
                )));
            }
        }

        let resolved_at = now.to_rfc3339();
        resolve_adjustment(&tx, request_id, decision.status(), resolver.id, note, &resolved_at)?;

        let operation = match decision {
            Decision::Approve => "adjust_approve",
            Decision::Reject => "adjust_reject",
        };
        let message = match decision {
            Decision::Approve => format!(
                "event {} moved to {} (sequence check bypassed)",
                request.event_id,
                format_ts(request.requested)
            ),
            Decision::Reject => format!("event {} left at {}", request.event_id, format_ts(request.original)),
        };
        audit(&tx, now, operation, &resolver.registration, &message)?;

        tx.commit()?;

        Ok(AdjustmentRequest {
            status: decision.status(),
            resolver_id: Some(resolver.id),
            resolution_note: note.map(str::to_string),
            resolved_at: Some(resolved_at),
            ..request
        })
    }

    /// A student sees their own requests; coordinators may list everyone's.
    pub fn list(
        pool: &mut DbPool,
        person_id: Option<i64>,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<AdjustmentRequest>> {
        list_adjustments(&pool.conn, person_id, status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use crate::db::people::insert_person;
    use crate::db::queries::insert_event;
    use crate::models::event::ClockEvent;
    use crate::models::event_kind::EventKind;
    use crate::models::person::Role;
    use chrono::{NaiveDate, NaiveTime, TimeZone};
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

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
    }

    fn seed(pool: &DbPool) -> (Person, Person, i64) {
        let student = insert_person(&pool.conn, "Ana", "2024001", Role::Student, "t").unwrap();
        let coord = insert_person(&pool.conn, "Carlos", "C-01", Role::Coordinator, "t").unwrap();
        let ev = ClockEvent {
            id: 0,
            person_id: student.id,
            date: NaiveDate::from_ymd_opt(2024, 3, 18).unwrap(),
            time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            kind: EventKind::In,
            source: "punch".into(),
            created_at: "t".into(),
        };
        let event_id = insert_event(&pool.conn, &ev).unwrap();
        (student, coord, event_id)
    }

    fn requested() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 18)
            .unwrap()
            .and_hms_opt(7, 30, 0)
            .unwrap()
    }

    #[test]
    fn submit_requires_a_real_justification() {
        let mut pool = test_pool();
        let (student, _, event_id) = seed(&pool);

        let err = AdjustLogic::submit(
            &mut pool,
            &cfg(),
            &student,
            event_id,
            requested(),
            "typo",
            now(),
        )
        .expect_err("short justification");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn submit_rejects_foreign_events() {
        let mut pool = test_pool();
        let (_, _coord, event_id) = seed(&pool);
        let other = insert_person(&pool.conn, "Bia", "2024002", Role::Student, "t").unwrap();

        let err = AdjustLogic::submit(
            &mut pool,
            &cfg(),
            &other,
            event_id,
            requested(),
            "forgot to punch on the way in",
            now(),
        )
        .expect_err("not the owner");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn approval_moves_exactly_the_target_event() {
        let mut pool = test_pool();
        let (student, coord, event_id) = seed(&pool);

        // a second event that must stay untouched
        let other = ClockEvent {
            id: 0,
            person_id: student.id,
            date: NaiveDate::from_ymd_opt(2024, 3, 18).unwrap(),
            time: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
            kind: EventKind::Out,
            source: "punch".into(),
            created_at: "t".into(),
        };
        let other_id = insert_event(&pool.conn, &other).unwrap();

        let req = AdjustLogic::submit(
            &mut pool,
            &cfg(),
            &student,
            event_id,
            requested(),
            "arrived earlier than recorded",
            now(),
        )
        .unwrap();

        let resolved =
            AdjustLogic::resolve(&mut pool, &coord, req.id, Decision::Approve, Some("ok"), now())
                .unwrap();
        assert_eq!(resolved.status, RequestStatus::Approved);

        let moved = find_event(&pool.conn, event_id).unwrap().unwrap();
        assert_eq!(moved.time_str(), "07:30:00");
        assert_eq!(moved.kind, EventKind::In); // kind untouched
        assert_eq!(moved.source, "adjusted");

        let untouched = find_event(&pool.conn, other_id).unwrap().unwrap();
        assert_eq!(untouched.time_str(), "12:00:00");
        assert_eq!(untouched.source, "punch");
    }

    #[test]
    fn a_request_resolves_exactly_once() {
        let mut pool = test_pool();
        let (student, coord, event_id) = seed(&pool);

        let req = AdjustLogic::submit(
            &mut pool,
            &cfg(),
            &student,
            event_id,
            requested(),
            "arrived earlier than recorded",
            now(),
        )
        .unwrap();

        AdjustLogic::resolve(&mut pool, &coord, req.id, Decision::Reject, None, now()).unwrap();
        let err = AdjustLogic::resolve(&mut pool, &coord, req.id, Decision::Approve, None, now())
            .expect_err("second resolution");
        assert!(matches!(err, AppError::AlreadyResolved(_)));

        // rejection leaves the ledger alone
        let ev = find_event(&pool.conn, event_id).unwrap().unwrap();
        assert_eq!(ev.time_str(), "08:00:00");
    }

    #[test]
    fn only_coordinators_resolve() {
        let mut pool = test_pool();
        let (student, _, event_id) = seed(&pool);

        let req = AdjustLogic::submit(
            &mut pool,
            &cfg(),
            &student,
            event_id,
            requested(),
            "arrived earlier than recorded",
            now(),
        )
        .unwrap();

        let err = AdjustLogic::resolve(&mut pool, &student, req.id, Decision::Approve, None, now())
            .expect_err("student resolving");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
