use super::request_status::RequestStatus;
use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;

/// A forgotten-punch alert: the student documents the punch(es) they
/// missed on a given day. At least one expected time must be present.
///
/// Resolution is informational only: approving records the coordinator's
/// judgment but never writes to the ledger.
#[derive(Debug, Clone, Serialize)]
pub struct ForgottenAlert {
    pub id: i64,
    pub person_id: i64,
    pub date: NaiveDate,
    pub expected_in: Option<NaiveTime>,
    pub expected_out: Option<NaiveTime>,
    pub justification: String,
    pub status: RequestStatus,
    pub resolver_id: Option<i64>,
    pub resolution_note: Option<String>,
    pub resolved_at: Option<String>,
    pub created_at: String,
}
