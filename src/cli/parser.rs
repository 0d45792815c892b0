use clap::{ArgAction, Parser, Subcommand};

/// Command-line interface definition for punchlog
/// CLI frontend for the attendance ledger: punches, reports and
/// coordinator exception workflows over SQLite
#[derive(Parser)]
#[command(
    name = "punchlog",
    version = env!("CARGO_PKG_VERSION"),
    about = "Attendance ledger CLI: track student clock-in/out, presence reports and exception workflows",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Act as this person (registration code)
    #[arg(global = true, long = "actor")]
    pub actor: Option<String>,

    /// Override the clock with a local wall time "YYYY-MM-DD HH:MM"
    #[arg(global = true, long = "at", hide = true)]
    pub at: Option<String>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or check)
    Config {
        #[arg(long = "print", help = "Print the current configuration file")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Fill missing configuration fields with defaults")]
        migrate: bool,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Punch the clock (students only)
    Punch {
        /// Punch kind: in | out
        kind: String,
    },

    /// Show one day's record (entry, exit, total)
    Day {
        /// Date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Registration of the person to inspect (coordinators only)
        #[arg(long)]
        person: Option<String>,

        #[arg(long, help = "Emit the record as JSON")]
        json: bool,
    },

    /// Worked hours today and over the current week
    Hours,

    /// Presence report over a range: one person or the whole roster
    Report {
        #[arg(long, short, help = "Year/month/day or a custom range (start:end)")]
        range: Option<String>,

        /// Registration of the person to report on (coordinators only)
        #[arg(long)]
        person: Option<String>,

        /// Narrow the roster by name/registration substring
        #[arg(long)]
        search: Option<String>,

        #[arg(long, help = "Emit the report as JSON")]
        json: bool,
    },

    /// Chronological event listing, most recent first
    History {
        #[arg(long, short, help = "Year/month/day or a custom range (start:end)")]
        range: Option<String>,

        /// Registration to filter by (coordinators only)
        #[arg(long)]
        person: Option<String>,

        /// Filter by punch kind: in | out
        #[arg(long)]
        kind: Option<String>,

        #[arg(long = "asc", help = "Oldest first instead of the default newest first")]
        ascending: bool,
    },

    /// Who is present on a given day (coordinators only)
    Snapshot {
        /// Date (YYYY-MM-DD); defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Manage the student roster
    Roster {
        #[command(subcommand)]
        action: RosterAction,
    },

    /// Time-adjustment requests
    Adjust {
        #[command(subcommand)]
        action: AdjustAction,
    },

    /// Forgotten-punch alerts
    Alert {
        #[command(subcommand)]
        action: AlertAction,
    },

    /// Coordinator overrides on raw ledger events
    Event {
        #[command(subcommand)]
        action: EventAction,
    },

    /// Re-check the alternation invariant over a person's days
    Revalidate {
        /// Registration to check (coordinators only; students check themselves)
        #[arg(long)]
        person: Option<String>,

        #[arg(long, short, help = "Year/month/day or a custom range (start:end)")]
        range: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum RosterAction {
    /// List students
    List {
        #[arg(long, help = "Name/registration substring")]
        search: Option<String>,

        #[arg(long, help = "active | inactive | all")]
        status: Option<String>,
    },

    /// Register a person
    Add {
        #[arg(long)]
        name: String,

        #[arg(long)]
        registration: String,

        #[arg(long, help = "Register a coordinator instead of a student")]
        coordinator: bool,
    },

    /// Activate or deactivate a student
    Status {
        registration: String,

        #[arg(long, action = ArgAction::Set, help = "true | false")]
        active: bool,
    },
}

#[derive(Subcommand)]
pub enum AdjustAction {
    /// Ask for one of your events to be moved
    Submit {
        #[arg(long, help = "Target event id")]
        event: i64,

        #[arg(long, help = "Requested instant \"YYYY-MM-DD HH:MM\"")]
        time: String,

        #[arg(long)]
        justification: String,
    },

    /// List adjustment requests
    List {
        #[arg(long, help = "Every person's requests (coordinators only)")]
        all: bool,

        #[arg(long, help = "pending | approved | rejected")]
        status: Option<String>,
    },

    /// Approve or reject a pending request (coordinators only)
    Resolve {
        #[arg(long)]
        id: i64,

        #[arg(long, help = "approve | reject")]
        decision: String,

        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum AlertAction {
    /// Document a forgotten punch
    Submit {
        #[arg(long, help = "Date of the missed punch (YYYY-MM-DD)")]
        date: String,

        #[arg(long = "in", help = "Expected clock-in time (HH:MM)")]
        expected_in: Option<String>,

        #[arg(long = "out", help = "Expected clock-out time (HH:MM)")]
        expected_out: Option<String>,

        #[arg(long)]
        justification: String,
    },

    /// List forgotten-punch alerts
    List {
        #[arg(long, help = "Every person's alerts (coordinators only)")]
        all: bool,

        #[arg(long, help = "pending | approved | rejected")]
        status: Option<String>,
    },

    /// Approve or reject a pending alert (coordinators only)
    Resolve {
        #[arg(long)]
        id: i64,

        #[arg(long, help = "approve | reject")]
        decision: String,

        #[arg(long)]
        note: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum EventAction {
    /// Add a manual event for a student
    Add {
        #[arg(long, help = "Target student registration")]
        person: String,

        #[arg(long, help = "Punch kind: in | out")]
        kind: String,

        #[arg(long, help = "Instant \"YYYY-MM-DD HH:MM\"")]
        time: String,
    },

    /// Edit an event's instant and/or kind
    Edit {
        #[arg(long)]
        id: i64,

        #[arg(long, help = "New instant \"YYYY-MM-DD HH:MM\"")]
        time: Option<String>,

        #[arg(long, help = "New kind: in | out")]
        kind: Option<String>,
    },

    /// Delete an event
    Del {
        #[arg(long)]
        id: i64,
    },
}
