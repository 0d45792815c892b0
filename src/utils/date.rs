use chrono::NaiveDate;

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Calendar days in the inclusive range, both ends counted.
pub fn total_days(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}
