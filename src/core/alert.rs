use crate::config::Config;
use crate::db::log::audit;
use crate::db::pool::DbPool;
use crate::db::requests::{find_alert, has_open_alert, insert_alert, list_alerts, resolve_alert};
use crate::errors::{AppError, AppResult};
use crate::models::alert::ForgottenAlert;
use crate::models::person::Person;
use crate::models::request_status::{Decision, RequestStatus};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use rusqlite::TransactionBehavior;

/// Forgotten-punch alerts: a student documents a punch they missed.
///
/// Resolution is informational only. Approving records the coordinator's
/// judgment; it never writes to the ledger (the manual event override is
/// the single entry point for that).
pub struct AlertLogic;

impl AlertLogic {
    pub fn submit(
        pool: &mut DbPool,
        cfg: &Config,
        person: &Person,
        date: NaiveDate,
        expected_in: Option<NaiveTime>,
        expected_out: Option<NaiveTime>,
        justification: &str,
        now: DateTime<Utc>,
    ) -> AppResult<ForgottenAlert> {
        if !person.role.is_student() {
            return Err(AppError::Unauthorized(
                "only students may submit forgotten-punch alerts".into(),
            ));
        }

        if expected_in.is_none() && expected_out.is_none() {
            return Err(AppError::Validation(
                "at least one expected time (in or out) is required".into(),
            ));
        }

        if justification.trim().chars().count() < cfg.min_justification_chars {
            return Err(AppError::Validation(format!(
                "justification must have at least {} characters",
                cfg.min_justification_chars
            )));
        }

        let today = cfg.localize(now).date();
        if date < today - Duration::days(cfg.alert_lookback_days) {
            return Err(AppError::Validation(format!(
                "date cannot be more than {} days in the past",
                cfg.alert_lookback_days
            )));
        }
        if date > today + Duration::days(cfg.alert_lookahead_days) {
            return Err(AppError::Validation(format!(
                "date cannot be more than {} day(s) in the future",
                cfg.alert_lookahead_days
            )));
        }

        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        if has_open_alert(&tx, person.id, date)? {
            return Err(AppError::DuplicateAlert(format!(
                "an alert for {date} already exists"
            )));
        }

        let id = insert_alert(
            &tx,
            person.id,
            date,
            expected_in,
            expected_out,
            justification.trim(),
            &now.to_rfc3339(),
        )?;

        audit(
            &tx,
            now,
            "alert_submit",
            &person.registration,
            &format!("forgotten punch on {date}"),
        )?;

        tx.commit()?;

        Ok(ForgottenAlert {
            id,
            person_id: person.id,
            date,
            expected_in,
            expected_out,
            justification: justification.trim().to_string(),
            status: RequestStatus::Pending,
            resolver_id: None,
            resolution_note: None,
            resolved_at: None,
            created_at: now.to_rfc3339(),
        })
    }

    pub fn resolve(
        pool: &mut DbPool,
        resolver: &Person,
        alert_id: i64,
        decision: Decision,
        note: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<ForgottenAlert> {
        if !resolver.role.is_coordinator() {
            return Err(AppError::Unauthorized(
                "only coordinators may resolve alerts".into(),
            ));
        }

        let tx = pool
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;

        let alert = find_alert(&tx, alert_id)?
            .ok_or_else(|| AppError::NotFound(format!("alert {alert_id} not found")))?;

        if alert.status.is_terminal() {
            return Err(AppError::AlreadyResolved(format!(
                "alert {} was already {}",
                alert_id,
                alert.status.to_db_str()
            )));
        }

        let resolved_at = now.to_rfc3339();
        resolve_alert(&tx, alert_id, decision.status(), resolver.id, note, &resolved_at)?;

        let operation = match decision {
            Decision::Approve => "alert_approve",
            Decision::Reject => "alert_reject",
        };
        audit(
            &tx,
            now,
            operation,
            &resolver.registration,
            &format!("alert {} for {}", alert_id, alert.date),
        )?;

        tx.commit()?;

        Ok(ForgottenAlert {
            status: decision.status(),
            resolver_id: Some(resolver.id),
            resolution_note: note.map(str::to_string),
            resolved_at: Some(resolved_at),
            ..alert
        })
    }

    pub fn list(
        pool: &mut DbPool,
        person_id: Option<i64>,
        status: Option<RequestStatus>,
    ) -> AppResult<Vec<ForgottenAlert>> {
        list_alerts(&pool.conn, person_id, status)
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

    // 12:00 UTC == 09:00 local at the default offset; local date 2024-03-20
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
    }

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn t(h: u32, m: u32) -> Option<NaiveTime> {
        NaiveTime::from_hms_opt(h, m, 0)
    }

    fn submit(
        pool: &mut DbPool,
        person: &Person,
        date: &str,
    ) -> AppResult<ForgottenAlert> {
        AlertLogic::submit(
            pool,
            &cfg(),
            person,
            d(date),
            t(8, 0),
            None,
            "forgot my badge at the lab",
            now(),
        )
    }

    #[test]
    fn pending_alert_blocks_resubmission() {
        let mut pool = test_pool();
        let p = insert_person(&pool.conn, "Ana", "2024001", Role::Student, "t").unwrap();

        submit(&mut pool, &p, "2024-03-19").expect("first alert");
        let err = submit(&mut pool, &p, "2024-03-19").expect_err("duplicate");
        assert!(matches!(err, AppError::DuplicateAlert(_)));
    }

    #[test]
    fn rejection_frees_the_date() {
        let mut pool = test_pool();
        let p = insert_person(&pool.conn, "Ana", "2024001", Role::Student, "t").unwrap();
        let coord = insert_person(&pool.conn, "Carlos", "C-01", Role::Coordinator, "t").unwrap();

        let alert = submit(&mut pool, &p, "2024-03-19").unwrap();
        AlertLogic::resolve(&mut pool, &coord, alert.id, Decision::Reject, Some("no"), now())
            .unwrap();

        // rejected does not block; approved does
        let second = submit(&mut pool, &p, "2024-03-19").expect("resubmission after reject");
        AlertLogic::resolve(&mut pool, &coord, second.id, Decision::Approve, None, now()).unwrap();
        let err = submit(&mut pool, &p, "2024-03-19").expect_err("approved blocks");
        assert!(matches!(err, AppError::DuplicateAlert(_)));
    }

    #[test]
    fn submission_window_is_enforced() {
        let mut pool = test_pool();
        let p = insert_person(&pool.conn, "Ana", "2024001", Role::Student, "t").unwrap();

        // local today is 2024-03-20: 7 days back (03-13) ok, 8 days not
        submit(&mut pool, &p, "2024-03-13").expect("lookback edge");
        let err = submit(&mut pool, &p, "2024-03-12").expect_err("too far back");
        assert!(matches!(err, AppError::Validation(_)));

        submit(&mut pool, &p, "2024-03-21").expect("lookahead edge");
        let err = submit(&mut pool, &p, "2024-03-22").expect_err("too far ahead");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn at_least_one_expected_time() {
        let mut pool = test_pool();
        let p = insert_person(&pool.conn, "Ana", "2024001", Role::Student, "t").unwrap();

        let err = AlertLogic::submit(
            &mut pool,
            &cfg(),
            &p,
            d("2024-03-19"),
            None,
            None,
            "forgot my badge at the lab",
            now(),
        )
        .expect_err("no expected times");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn approval_does_not_touch_the_ledger() {
        let mut pool = test_pool();
        let p = insert_person(&pool.conn, "Ana", "2024001", Role::Student, "t").unwrap();
        let coord = insert_person(&pool.conn, "Carlos", "C-01", Role::Coordinator, "t").unwrap();

        let alert = submit(&mut pool, &p, "2024-03-19").unwrap();
        AlertLogic::resolve(&mut pool, &coord, alert.id, Decision::Approve, None, now()).unwrap();

        let count: i64 = pool
            .conn
            .query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);

        let err = AlertLogic::resolve(&mut pool, &coord, alert.id, Decision::Reject, None, now())
            .expect_err("already resolved");
        assert!(matches!(err, AppError::AlreadyResolved(_)));
    }
}
