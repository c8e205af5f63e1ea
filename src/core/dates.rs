use crate::domain::model::DateSpec;
use crate::utils::error::{Result, TravelError};
use chrono::{Datelike, NaiveDate};

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// 只接受補零的 `YYYY-MM-DD`；chrono 的 `%m`、`%d` 本身允許不補零
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    let trimmed = input.trim();
    if !is_iso_shape(trimmed) {
        return Err(TravelError::DateParse {
            input: input.to_string(),
            source: None,
        });
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|source| TravelError::DateParse {
        input: input.to_string(),
        source: Some(source),
    })
}

fn is_iso_shape(s: &str) -> bool {
    s.len() == 10
        && s.bytes().enumerate().all(|(i, b)| match i {
            4 | 7 => b == b'-',
            _ => b.is_ascii_digit(),
        })
}

/// 把過去的日期推到「今天之後」最近的同月同日。
///
/// 今天或之後的日期原樣返回，所以對結果再正規化一次不會有變化。
pub fn normalize(input: &str, today: NaiveDate) -> Result<DateSpec> {
    let date = parse_date(input)?;
    if date >= today {
        return Ok(DateSpec::unchanged(date));
    }

    let mut candidate = same_day_in_year(date, today.year());
    if candidate <= today {
        candidate = same_day_in_year(date, today.year() + 1);
    }

    let note = format!(
        "Date {} is in the past; adjusted to {}.",
        date.format(DATE_FORMAT),
        candidate.format(DATE_FORMAT)
    );
    tracing::warn!("📅 {}", note);

    Ok(DateSpec {
        date: candidate,
        adjustment_note: Some(note),
    })
}

// 2/29 在非閏年落到 2/28
fn same_day_in_year(date: NaiveDate, year: i32) -> NaiveDate {
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, date.month(), 28))
        .unwrap_or(date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    #[test]
    fn test_future_date_unchanged() {
        let today = day("2026-10-17");
        let spec = normalize("2026-12-24", today).unwrap();
        assert_eq!(spec.date, day("2026-12-24"));
        assert!(!spec.was_adjusted());
    }

    #[test]
    fn test_today_unchanged() {
        let today = day("2026-10-17");
        let spec = normalize("2026-10-17", today).unwrap();
        assert_eq!(spec.date, today);
        assert!(spec.adjustment_note.is_none());
    }

    #[test]
    fn test_past_date_moves_to_current_year() {
        let today = day("2026-10-17");
        let spec = normalize("2020-12-01", today).unwrap();
        assert_eq!(spec.date, day("2026-12-01"));
        let note = spec.adjustment_note.unwrap();
        assert!(note.contains("2020-12-01"));
        assert!(note.contains("2026-12-01"));
    }

    #[test]
    fn test_past_date_moves_to_next_year() {
        let today = day("2026-10-17");
        let spec = normalize("2020-01-01", today).unwrap();
        assert_eq!(spec.date, day("2027-01-01"));
        assert!(spec.was_adjusted());
    }

    #[test]
    fn test_same_month_day_as_today_moves_forward() {
        let today = day("2026-10-17");
        let spec = normalize("2019-10-17", today).unwrap();
        assert_eq!(spec.date, day("2027-10-17"));
    }

    #[test]
    fn test_adjusted_date_is_fixed_point() {
        let today = day("2026-10-17");
        for input in ["2020-01-01", "2025-10-16", "2001-11-30", "2024-02-29"] {
            let first = normalize(input, today).unwrap();
            assert!(first.date > today, "{} -> {}", input, first.date);

            let second = normalize(&first.to_param(), today).unwrap();
            assert_eq!(second.date, first.date);
            assert!(!second.was_adjusted());
        }
    }

    #[test]
    fn test_leap_day_falls_back_to_28th() {
        let today = day("2026-10-17");
        let spec = normalize("2024-02-29", today).unwrap();
        assert_eq!(spec.date, day("2027-02-28"));
    }

    #[test]
    fn test_malformed_date_is_an_error() {
        let today = day("2026-10-17");
        for input in ["tomorrow", "2026/11/01", "2026-13-01", ""] {
            let err = normalize(input, today).unwrap_err();
            assert!(matches!(err, TravelError::DateParse { .. }), "{}", input);
        }
    }

    #[test]
    fn test_unpadded_fields_rejected() {
        let today = day("2026-10-17");
        for input in ["2026-1-5", "2026-01-5", "02026-1-05", "2026-1-015"] {
            let err = normalize(input, today).unwrap_err();
            assert!(matches!(err, TravelError::DateParse { .. }), "{}", input);
            assert!(err.to_string().contains(input));
        }
        assert_eq!(parse_date(" 2026-01-05 ").unwrap(), day("2026-01-05"));
    }
}
