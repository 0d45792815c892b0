use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;

mod common;
use common::{bootstrap_roster, init_db, plog, punch_at, punch_day, setup_test_db};

#[test]
fn test_day_record_for_a_complete_day() {
    let db_path = setup_test_db("day_complete");
    init_db(&db_path);
    bootstrap_roster(&db_path);

    punch_day(&db_path, "2024001", "2024-03-18", "08:00", "12:00");

    plog()
        .args([
            "--db",
            &db_path,
            "--test",
            "--actor",
            "2024001",
            "day",
            "--date",
            "2024-03-18",
        ])
        .assert()
        .success()
        .stdout(contains("Entry: 08:00"))
        .stdout(contains("Exit:  12:00"))
        .stdout(contains("Total: 04:00"));
}

#[test]
fn test_day_record_with_missing_exit() {
    let db_path = setup_test_db("day_open");
    init_db(&db_path);
    bootstrap_roster(&db_path);

    punch_at(&db_path, "2024001", "in", "2024-03-18 08:00")
        .assert()
        .success();

    plog()
        .args([
            "--db",
            &db_path,
            "--test",
            "--actor",
            "2024001",
            "day",
            "--date",
            "2024-03-18",
        ])
        .assert()
        .success()
        .stdout(contains("Entry: 08:00"))
        .stdout(contains("Exit:  -"))
        .stdout(contains("Total: 00:00"));
}

#[test]
fn test_day_record_as_json() {
    let db_path = setup_test_db("day_json");
    init_db(&db_path);
    bootstrap_roster(&db_path);

    punch_day(&db_path, "2024001", "2024-03-18", "08:00", "12:00");

    plog()
        .args([
            "--db",
            &db_path,
            "--test",
            "--actor",
            "2024001",
            "day",
            "--date",
            "2024-03-18",
            "--json",
        ])
        .assert()
        .success()
        .stdout(contains("\"duration_minutes\": 240"))
        .stdout(contains("\"entry\": \"08:00:00\""));
}

#[test]
fn test_presence_percentage_over_a_ten_day_range() {
    let db_path = setup_test_db("presence_pct");
    init_db(&db_path);
    bootstrap_roster(&db_path);

    for day in ["01", "02", "03", "06", "08", "09"] {
        punch_day(
            &db_path,
            "2024001",
            &format!("2024-01-{day}"),
            "08:00",
            "12:00",
        );
    }

    plog()
        .args([
            "--db",
            &db_path,
            "--test",
            "--actor",
            "2024001",
            "report",
            "--range",
            "2024-01-01:2024-01-10",
        ])
        .assert()
        .success()
        .stdout(contains("6 present / 4 absent of 10"))
        .stdout(contains("60.00%"))
        .stdout(contains("Total hours: 24:00"));
}

#[test]
fn test_roster_report_aggregates_per_person_results() {
    let db_path = setup_test_db("roster_report");
    init_db(&db_path);
    bootstrap_roster(&db_path);
    common::add_student(&db_path, "Bruno Dias", "2024002");

    // Ana present on both days, Bruno never
    punch_day(&db_path, "2024001", "2024-01-01", "08:00", "12:00");
    punch_day(&db_path, "2024001", "2024-01-02", "08:00", "12:00");

    plog()
        .args([
            "--db",
            &db_path,
            "--test",
            "--actor",
            "C-01",
            "report",
            "--range",
            "2024-01-01:2024-01-02",
        ])
        .assert()
        .success()
        .stdout(contains("Students: 2"))
        .stdout(contains("present: 1"))
        .stdout(contains("average presence: 50.00%"))
        .stdout(contains("2024001"))
        .stdout(contains("absent"));
}

#[test]
fn test_students_cannot_read_other_people() {
    let db_path = setup_test_db("peek_denied");
    init_db(&db_path);
    bootstrap_roster(&db_path);
    common::add_student(&db_path, "Bruno Dias", "2024002");

    plog()
        .args([
            "--db",
            &db_path,
            "--test",
            "--actor",
            "2024001",
            "day",
            "--date",
            "2024-03-18",
            "--person",
            "2024002",
        ])
        .assert()
        .failure()
        .stderr(contains("Unauthorized"));
}

#[test]
fn test_history_is_most_recent_first_by_default() {
    let db_path = setup_test_db("history_order");
    init_db(&db_path);
    bootstrap_roster(&db_path);

    punch_day(&db_path, "2024001", "2024-03-18", "08:00", "12:00");
    punch_day(&db_path, "2024001", "2024-03-19", "09:00", "11:00");

    // default: newest first
    plog()
        .args([
            "--db", &db_path, "--test", "--actor", "2024001", "history",
        ])
        .assert()
        .success()
        .stdout(
            predicates::str::is_match("(?s)2024-03-19.*2024-03-18").expect("valid regex"),
        );

    // --asc flips the contract
    plog()
        .args([
            "--db", &db_path, "--test", "--actor", "2024001", "history", "--asc",
        ])
        .assert()
        .success()
        .stdout(
            predicates::str::is_match("(?s)2024-03-18.*2024-03-19").expect("valid regex"),
        );
}

#[test]
fn test_history_kind_filter() {
    let db_path = setup_test_db("history_kind");
    init_db(&db_path);
    bootstrap_roster(&db_path);

    punch_day(&db_path, "2024001", "2024-03-18", "08:00", "12:00");

    plog()
        .args([
            "--db", &db_path, "--test", "--actor", "2024001", "history", "--kind", "in",
        ])
        .assert()
        .success()
        .stdout(contains("08:00:00"))
        .stdout(contains("12:00:00").not());
}

#[test]
fn test_hours_view_covers_today_and_week() {
    let db_path = setup_test_db("hours_view");
    init_db(&db_path);
    bootstrap_roster(&db_path);

    // 2024-03-18 is a Monday; 03-20 is the Wednesday of the same week
    punch_day(&db_path, "2024001", "2024-03-18", "08:00", "12:00");
    punch_day(&db_path, "2024001", "2024-03-20", "08:00", "10:00");

    plog()
        .args([
            "--db",
            &db_path,
            "--test",
            "--actor",
            "2024001",
            "--at",
            "2024-03-20 18:00",
            "hours",
        ])
        .assert()
        .success()
        .stdout(contains("Hours today:     02:00"))
        .stdout(contains("Hours this week: 06:00"));
}

#[test]
fn test_snapshot_counts_only_students_with_an_in() {
    let db_path = setup_test_db("snapshot");
    init_db(&db_path);
    bootstrap_roster(&db_path);
    common::add_student(&db_path, "Bruno Dias", "2024002");

    punch_day(&db_path, "2024001", "2024-03-18", "08:00", "12:00");

    plog()
        .args([
            "--db",
            &db_path,
            "--test",
            "--actor",
            "C-01",
            "snapshot",
            "--date",
            "2024-03-18",
        ])
        .assert()
        .success()
        .stdout(contains("present: 1"))
        .stdout(contains("absent: 1"))
        .stdout(contains("Punches: 1 morning, 1 afternoon, 0 evening"))
        .stdout(contains("Ana Souza"));

    // students have no snapshot access
    plog()
        .args([
            "--db",
            &db_path,
            "--test",
            "--actor",
            "2024001",
            "snapshot",
            "--date",
            "2024-03-18",
        ])
        .assert()
        .failure()
        .stderr(contains("Unauthorized"));
}
