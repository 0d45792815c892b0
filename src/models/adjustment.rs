use super::request_status::RequestStatus;
use chrono::NaiveDateTime;
use serde::Serialize;

/// A request to move one clock event to a different instant.
///
/// The original timestamp is snapshotted at submission time; approval
/// overwrites the event with `requested` (kind untouched) without
/// re-checking the day's alternation. Once resolved the record is frozen.
#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentRequest {
    pub id: i64,
    pub event_id: i64,
    pub person_id: i64,
    pub original: NaiveDateTime,
    pub requested: NaiveDateTime,
    pub justification: String,
    pub status: RequestStatus,
    pub resolver_id: Option<i64>,
    pub resolution_note: Option<String>,
    pub resolved_at: Option<String>,
    pub created_at: String,
}
