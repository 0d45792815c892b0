use crate::db::log::audit;
use crate::db::people::{StatusFilter, count_people, find_by_registration, insert_person, list_students, set_active};
use crate::db::pool::DbPool;
use crate::errors::{AppError, AppResult};
use crate::models::person::{Person, Role};
use chrono::{DateTime, Utc};

/// Roster management: coordinators register students and gate their
/// access via the active flag. Credentials live in the identity
/// subsystem; the ledger only keeps name, registration, role and status.
pub struct RosterLogic;

impl RosterLogic {
    /// Register a person. Coordinator-only, except that the very first
    /// person may be created without an actor so a fresh deployment can
    /// bootstrap its coordinator.
    pub fn register(
        pool: &mut DbPool,
        actor: Option<&Person>,
        name: &str,
        registration: &str,
        role: Role,
        now: DateTime<Utc>,
    ) -> AppResult<Person> {
        match actor {
            Some(a) if a.role.is_coordinator() => {}
            Some(_) => {
                return Err(AppError::Unauthorized(
                    "only coordinators may register people".into(),
                ));
            }
            None => {
                if count_people(&pool.conn)? > 0 {
                    return Err(AppError::Unauthorized(
                        "an acting coordinator is required".into(),
                    ));
                }
            }
        }

        let name = name.trim();
        let registration = registration.trim();
        if name.is_empty() {
            return Err(AppError::Validation("name is required".into()));
        }
        if registration.is_empty() {
            return Err(AppError::Validation("registration is required".into()));
        }

        let person = insert_person(&pool.conn, name, registration, role, &now.to_rfc3339())?;

        audit(
            &pool.conn,
            now,
            "roster_add",
            registration,
            &format!("{} registered as {}", name, role.to_db_str()),
        )?;

        Ok(person)
    }

    /// Toggle a student's access. Targets students only.
    pub fn set_status(
        pool: &mut DbPool,
        actor: &Person,
        registration: &str,
        active: bool,
        now: DateTime<Utc>,
    ) -> AppResult<Person> {
        if !actor.role.is_coordinator() {
            return Err(AppError::Unauthorized(
                "only coordinators may change a student's status".into(),
            ));
        }

        let person = find_by_registration(&pool.conn, registration)?
            .filter(|p| p.role.is_student())
            .ok_or_else(|| AppError::NotFound(format!("student {registration} not found")))?;

        set_active(&pool.conn, person.id, active)?;

        audit(
            &pool.conn,
            now,
            "roster_status",
            registration,
            if active { "activated" } else { "deactivated" },
        )?;

        Ok(Person { active, ..person })
    }

    /// Student listing. Non-coordinators only see the active roster,
    /// whatever status filter they ask for.
    pub fn list(
        pool: &mut DbPool,
        actor: &Person,
        search: Option<&str>,
        status: StatusFilter,
    ) -> AppResult<Vec<Person>> {
        let effective = if actor.role.is_coordinator() {
            status
        } else {
            StatusFilter::Active
        };
        list_students(&pool.conn, search, effective)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::initialize::init_db;
    use chrono::TimeZone;
    use rusqlite::Connection;

    fn test_pool() -> DbPool {
        let conn = Connection::open_in_memory().expect("open in-memory db");
        init_db(&conn).expect("init schema");
        DbPool { conn }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 20, 12, 0, 0).unwrap()
    }

    #[test]
    fn bootstrap_then_coordinator_only() {
        let mut pool = test_pool();

        // empty roster: no actor needed for the first person
        let coord =
            RosterLogic::register(&mut pool, None, "Carlos", "C-01", Role::Coordinator, now())
                .expect("bootstrap coordinator");

        // from now on an actor is mandatory
        let err = RosterLogic::register(&mut pool, None, "Ana", "2024001", Role::Student, now())
            .expect_err("actor required");
        assert!(matches!(err, AppError::Unauthorized(_)));

        let ana =
            RosterLogic::register(&mut pool, Some(&coord), "Ana", "2024001", Role::Student, now())
                .expect("coordinator registers");

        // students cannot register anyone
        let err =
            RosterLogic::register(&mut pool, Some(&ana), "Bia", "2024002", Role::Student, now())
                .expect_err("student registering");
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[test]
    fn duplicate_registration_is_a_validation_error() {
        let mut pool = test_pool();
        let coord =
            RosterLogic::register(&mut pool, None, "Carlos", "C-01", Role::Coordinator, now())
                .unwrap();

        RosterLogic::register(&mut pool, Some(&coord), "Ana", "2024001", Role::Student, now())
            .unwrap();
        let err =
            RosterLogic::register(&mut pool, Some(&coord), "Bia", "2024001", Role::Student, now())
                .expect_err("duplicate registration");
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn status_toggle_targets_students_only() {
        let mut pool = test_pool();
        let coord =
            RosterLogic::register(&mut pool, None, "Carlos", "C-01", Role::Coordinator, now())
                .unwrap();
        RosterLogic::register(&mut pool, Some(&coord), "Ana", "2024001", Role::Student, now())
            .unwrap();

        let ana = RosterLogic::set_status(&mut pool, &coord, "2024001", false, now()).unwrap();
        assert!(!ana.active);

        let err = RosterLogic::set_status(&mut pool, &coord, "C-01", false, now())
            .expect_err("coordinator is not a student");
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[test]
    fn students_only_see_the_active_roster() {
        let mut pool = test_pool();
        let coord =
            RosterLogic::register(&mut pool, None, "Carlos", "C-01", Role::Coordinator, now())
                .unwrap();
        let ana =
            RosterLogic::register(&mut pool, Some(&coord), "Ana", "2024001", Role::Student, now())
                .unwrap();
        RosterLogic::register(&mut pool, Some(&coord), "Bia", "2024002", Role::Student, now())
            .unwrap();
        RosterLogic::set_status(&mut pool, &coord, "2024002", false, now()).unwrap();

        let all = RosterLogic::list(&mut pool, &coord, None, StatusFilter::All).unwrap();
        assert_eq!(all.len(), 2);

        let seen = RosterLogic::list(&mut pool, &ana, None, StatusFilter::All).unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].registration, "2024001");
    }
}
