#![allow(dead_code)]
use assert_cmd::{Command, cargo_bin_cmd};
use std::env;
use std::fs;
use std::path::PathBuf;

pub fn plog() -> Command {
    cargo_bin_cmd!("punchlog")
}

/// Create a unique test DB path inside the system temp dir and remove any existing file
pub fn setup_test_db(name: &str) -> String {
    let mut path: PathBuf = env::temp_dir();
    path.push(format!("{}_punchlog.sqlite", name));
    let db_path = path.to_string_lossy().to_string();
    fs::remove_file(&db_path).ok();
    db_path
}

/// Initialize the schema on a fresh DB.
pub fn init_db(db_path: &str) {
    plog()
        .args(["--db", db_path, "--test", "init"])
        .assert()
        .success();
}

/// Bootstrap the roster every scenario needs: one coordinator (C-01,
/// created actor-less on the empty roster) and one student (2024001).
pub fn bootstrap_roster(db_path: &str) {
    plog()
        .args([
            "--db",
            db_path,
            "--test",
            "roster",
            "add",
            "--name",
            "Carla Nunes",
            "--registration",
            "C-01",
            "--coordinator",
        ])
        .assert()
        .success();

    add_student(db_path, "Ana Souza", "2024001");
}

pub fn add_student(db_path: &str, name: &str, registration: &str) {
    plog()
        .args([
            "--db",
            db_path,
            "--test",
            "--actor",
            "C-01",
            "roster",
            "add",
            "--name",
            name,
            "--registration",
            registration,
        ])
        .assert()
        .success();
}

/// Punch at a deterministic local wall time, e.g. ("2024-03-18 08:00").
pub fn punch_at(db_path: &str, actor: &str, kind: &str, at: &str) -> Command {
    let mut cmd = plog();
    cmd.args([
        "--db", db_path, "--test", "--actor", actor, "--at", at, "punch", kind,
    ]);
    cmd
}

/// Punch a full in/out pair on one day.
pub fn punch_day(db_path: &str, actor: &str, date: &str, start: &str, end: &str) {
    punch_at(db_path, actor, "in", &format!("{date} {start}"))
        .assert()
        .success();
    punch_at(db_path, actor, "out", &format!("{date} {end}"))
        .assert()
        .success();
}

/// Open the test DB directly for white-box assertions.
pub fn open_raw(db_path: &str) -> rusqlite::Connection {
    rusqlite::Connection::open(db_path).expect("open test db")
}
