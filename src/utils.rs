use crate::error::{Result, StatisticsError};
use chrono::{Datelike, Days, Months, NaiveDate};

pub fn last_day_of_month(year: i32, month: u32) -> Result<NaiveDate> {
    let last_day = if month == 12 {
        NaiveDate::from_ymd_opt(year, 12, 31)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1).and_then(|d| d.checked_sub_days(Days::new(1)))
    };

    last_day.ok_or_else(|| {
            StatisticsError::DateError(format!(
                "No last day for {}-{:02}: outside the supported calendar",
                year, month
            ))
        })
}

/// Steps forward by calendar months, clamping to the last valid day
/// (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_add_months(Months::new(months)).ok_or_else(|| {
        StatisticsError::DateError(format!("Cannot add {} months to {}", months, date))
    })
}

/// Steps back by calendar months with the same clamping as [`add_months`].
pub fn sub_months(date: NaiveDate, months: u32) -> Result<NaiveDate> {
    date.checked_sub_months(Months::new(months)).ok_or_else(|| {
        StatisticsError::DateError(format!("Cannot subtract {} months from {}", months, date))
    })
}

pub fn months_between(start: NaiveDate, end: NaiveDate) -> i32 {
    let year_diff = end.year() - start.year();
    let month_diff = end.month() as i32 - start.month() as i32;
    year_diff * 12 + month_diff
}

/// Parses a calendar date given as "YYYY-MM-DD" or "YYYY-MM".
/// A bare month resolves to its first day.
pub fn parse_calendar_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    let month_start = format!("{}-01", trimmed);
    NaiveDate::parse_from_str(&month_start, "%Y-%m-%d").map_err(|_| {
        StatisticsError::DateError(format!(
            "Invalid date '{}'. Expected YYYY-MM-DD or YYYY-MM",
            raw
        ))
    })
}

/// Parses the closing bound of a window. Like [`parse_calendar_date`], except
/// that a bare "YYYY-MM" resolves to the last day of that month.
pub fn parse_calendar_end_date(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    let month_start = parse_calendar_date(trimmed)?;
    last_day_of_month(month_start.year(), month_start.month())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_day_of_month() {
        assert_eq!(
            last_day_of_month(2023, 2).unwrap(),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );
        assert_eq!(
            last_day_of_month(2024, 2).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            last_day_of_month(2023, 12).unwrap(),
            NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()
        );
        assert_eq!(last_day_of_month(NaiveDate::MAX.year(), 12).unwrap(), NaiveDate::MAX);
        assert!(last_day_of_month(2024, 13).is_err());
    }

    #[test]
    fn test_add_months_clamps_to_month_end() {
        let jan_31 = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        assert_eq!(
            add_months(jan_31, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 2, 28).unwrap()
        );

        let leap = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
        assert_eq!(
            add_months(leap, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_sub_months() {
        let date = NaiveDate::from_ymd_opt(2024, 7, 15).unwrap();
        assert_eq!(
            sub_months(date, 6).unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );

        let may_31 = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        assert_eq!(
            sub_months(may_31, 3).unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
    }

    #[test]
    fn test_months_between() {
        let start = NaiveDate::from_ymd_opt(2023, 11, 20).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        assert_eq!(months_between(start, end), 3);
        assert_eq!(months_between(end, end), 0);
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(
            parse_calendar_date("2024-03-18").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 18).unwrap()
        );
        assert_eq!(
            parse_calendar_date(" 2024-03 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
        assert!(parse_calendar_date("18/03/2024").is_err());
        assert!(parse_calendar_date("2024-02-30").is_err());
    }

    #[test]
    fn test_parse_calendar_end_date() {
        assert_eq!(
            parse_calendar_end_date("2024-02").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            parse_calendar_end_date("2024-02-10").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 10).unwrap()
        );
        assert!(parse_calendar_end_date("2024/02").is_err());
    }
}
