use crate::errors::{AppError, AppResult};
use chrono::NaiveDate;

/// Parse a reporting range (year / month / day / interval).
///
/// Supported:
/// - YYYY
/// - YYYY-MM
/// - YYYY-MM-DD
/// - YYYY:YYYY
/// - YYYY-MM:YYYY-MM
/// - YYYY-MM-DD:YYYY-MM-DD
pub fn parse_range(r: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    if let Some((start_raw, end_raw)) = r.split_once(':') {
        let start = start_raw.trim();
        let end = end_raw.trim();

        if start.len() != end.len() {
            return Err(AppError::InvalidDate(
                "start and end must have the same format".into(),
            ));
        }

        match start.len() {
            // YYYY:YYYY
            4 => {
                let ys: i32 = start
                    .parse()
                    .map_err(|_| AppError::InvalidDate(format!("invalid start year: {start}")))?;
                let ye: i32 = end
                    .parse()
                    .map_err(|_| AppError::InvalidDate(format!("invalid end year: {end}")))?;

                let d1 = NaiveDate::from_ymd_opt(ys, 1, 1)
                    .ok_or_else(|| AppError::InvalidDate(start.to_string()))?;
                let d2 = NaiveDate::from_ymd_opt(ye, 12, 31)
                    .ok_or_else(|| AppError::InvalidDate(end.to_string()))?;
                check_order(d1, d2)
            }
            // YYYY-MM:YYYY-MM
            7 => {
                let d1 = first_of_month(start)?;
                let d2 = last_of_month(end)?;
                check_order(d1, d2)
            }
            // YYYY-MM-DD:YYYY-MM-DD
            10 => {
                let d1 = NaiveDate::parse_from_str(start, "%Y-%m-%d")
                    .map_err(|_| AppError::InvalidDate(start.to_string()))?;
                let d2 = NaiveDate::parse_from_str(end, "%Y-%m-%d")
                    .map_err(|_| AppError::InvalidDate(end.to_string()))?;
                check_order(d1, d2)
            }
            _ => Err(AppError::InvalidDate(format!(
                "unsupported range format: {r}"
            ))),
        }
    } else {
        match r.len() {
            // YYYY
            4 => {
                let y: i32 = r
                    .parse()
                    .map_err(|_| AppError::InvalidDate(format!("invalid year: {r}")))?;
                let d1 = NaiveDate::from_ymd_opt(y, 1, 1)
                    .ok_or_else(|| AppError::InvalidDate(r.to_string()))?;
                let d2 = NaiveDate::from_ymd_opt(y, 12, 31)
                    .ok_or_else(|| AppError::InvalidDate(r.to_string()))?;
                Ok((d1, d2))
            }
            // YYYY-MM
            7 => Ok((first_of_month(r)?, last_of_month(r)?)),
            // YYYY-MM-DD
            10 => {
                let d = NaiveDate::parse_from_str(r, "%Y-%m-%d")
                    .map_err(|_| AppError::InvalidDate(r.to_string()))?;
                Ok((d, d))
            }
            _ => Err(AppError::InvalidDate(format!(
                "unsupported range format: {r}"
            ))),
        }
    }
}

fn check_order(d1: NaiveDate, d2: NaiveDate) -> AppResult<(NaiveDate, NaiveDate)> {
    if d2 < d1 {
        return Err(AppError::Validation(format!(
            "range end {d2} is before range start {d1}"
        )));
    }
    Ok((d1, d2))
}

fn first_of_month(s: &str) -> AppResult<NaiveDate> {
    let (y, m) = split_year_month(s)?;
    NaiveDate::from_ymd_opt(y, m, 1).ok_or_else(|| AppError::InvalidDate(s.to_string()))
}

fn last_of_month(s: &str) -> AppResult<NaiveDate> {
    let (y, m) = split_year_month(s)?;
    let last = month_last_day(y, m).ok_or_else(|| AppError::InvalidDate(s.to_string()))?;
    NaiveDate::from_ymd_opt(y, m, last).ok_or_else(|| AppError::InvalidDate(s.to_string()))
}

fn split_year_month(s: &str) -> AppResult<(i32, u32)> {
    if s.len() != 7 || s.as_bytes().get(4) != Some(&b'-') {
        return Err(AppError::InvalidDate(s.to_string()));
    }
    let y: i32 = s[0..4]
        .parse()
        .map_err(|_| AppError::InvalidDate(s.to_string()))?;
    let m: u32 = s[5..7]
        .parse()
        .map_err(|_| AppError::InvalidDate(s.to_string()))?;
    Ok((y, m))
}

fn month_last_day(y: i32, m: u32) -> Option<u32> {
    match m {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => Some(31),
        4 | 6 | 9 | 11 => Some(30),
        2 => {
            let leap = (y % 4 == 0 && y % 100 != 0) || (y % 400 == 0);
            Some(if leap { 29 } else { 28 })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn parses_single_forms() {
        assert_eq!(parse_range("2024").unwrap(), (d(2024, 1, 1), d(2024, 12, 31)));
        assert_eq!(parse_range("2024-02").unwrap(), (d(2024, 2, 1), d(2024, 2, 29)));
        assert_eq!(
            parse_range("2024-01-15").unwrap(),
            (d(2024, 1, 15), d(2024, 1, 15))
        );
    }

    #[test]
    fn parses_intervals() {
        assert_eq!(
            parse_range("2024-01-01:2024-01-10").unwrap(),
            (d(2024, 1, 1), d(2024, 1, 10))
        );
        assert_eq!(
            parse_range("2024-11:2025-02").unwrap(),
            (d(2024, 11, 1), d(2025, 2, 28))
        );
    }

    #[test]
    fn rejects_inverted_and_malformed() {
        assert!(parse_range("2024-01-10:2024-01-01").is_err());
        assert!(parse_range("2024-1").is_err());
        assert!(parse_range("soon").is_err());
    }
}
