//! Date windows for reports

use chrono::{Datelike, Duration, NaiveDate};
use shared::error::{AppError, ErrorCode};

/// Half-open calendar month `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl MonthWindow {
    /// Parse `YYYY-MM`
    pub fn parse(value: &str) -> Result<Self, AppError> {
        let invalid = || {
            AppError::with_message(ErrorCode::InvalidFormat, "Invalid month format. Use YYYY-MM")
                .with_detail("month", value)
        };

        let bytes = value.as_bytes();
        let well_formed = bytes.len() == 7
            && bytes[4] == b'-'
            && bytes[..4].iter().all(u8::is_ascii_digit)
            && bytes[5..].iter().all(u8::is_ascii_digit);
        if !well_formed {
            return Err(invalid());
        }

        let year: i32 = value[..4].parse().map_err(|_| invalid())?;
        let month: u32 = value[5..].parse().map_err(|_| invalid())?;
        Self::of(year, month).ok_or_else(invalid)
    }

    /// The month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        // Day 1 of a valid date's month always exists.
        Self::of(date.year(), date.month()).unwrap_or(Self {
            start: date,
            end: date + Duration::days(1),
        })
    }

    fn of(year: i32, month: u32) -> Option<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1)?;
        let end = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)?
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)?
        };
        Some(Self { start, end })
    }
}

/// Last membership end date still counted as "expiring soon"
pub fn expiring_until(today: NaiveDate, days: i64) -> NaiveDate {
    today + Duration::days(days.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_month() {
        let w = MonthWindow::parse("2024-02").unwrap();
        assert_eq!(w.start, date(2024, 2, 1));
        assert_eq!(w.end, date(2024, 3, 1));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let w = MonthWindow::parse("2023-12").unwrap();
        assert_eq!(w.end, date(2024, 1, 1));
    }

    #[test]
    fn rejects_malformed_months() {
        for bad in ["2024-13", "2024-00", "2024-1", "24-01", "2024/01", "2024-01-01", "abcd-ef", ""] {
            let err = MonthWindow::parse(bad).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidFormat, "{bad}");
        }
    }

    #[test]
    fn containing_covers_the_whole_month() {
        let w = MonthWindow::containing(date(2024, 5, 17));
        assert_eq!(w, MonthWindow::parse("2024-05").unwrap());
    }

    #[test]
    fn expiring_window_is_inclusive_offset() {
        assert_eq!(expiring_until(date(2024, 5, 29), 5), date(2024, 6, 3));
        assert_eq!(expiring_until(date(2024, 5, 29), -3), date(2024, 5, 29));
    }
}
