use crate::clock::Clock;
use crate::error::{Result, StatisticsError};
use crate::month::MonthKey;
use crate::utils::sub_months;
use chrono::NaiveDate;
use log::debug;

/// Builds the ordered month buckets between `start` and `end`, both inclusive.
///
/// A missing `start` falls back to `today - default_span_months` calendar
/// months and a missing `end` to `today`, with "today" read from `clock`.
/// Only the month of each bound matters for the buckets, so a window from
/// 2024-01-15 to 2024-07-10 still covers January through July.
pub fn build_range<C: Clock>(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    default_span_months: u32,
    clock: &C,
) -> Result<Vec<MonthKey>> {
    let (start, end) = resolve_window(start, end, default_span_months, clock)?;
    month_range(MonthKey::from_date(start), MonthKey::from_date(end))
}

/// Fills in the missing bounds of a date window and checks its ordering.
pub fn resolve_window<C: Clock>(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    default_span_months: u32,
    clock: &C,
) -> Result<(NaiveDate, NaiveDate)> {
    let today = clock.today();
    let start = match start {
        Some(date) => date,
        None => sub_months(today, default_span_months)?,
    };
    let end = end.unwrap_or(today);

    if start > end {
        return Err(StatisticsError::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        });
    }

    debug!("Resolved window {} .. {}", start, end);
    Ok((start, end))
}

/// Every calendar month from `start` to `end` inclusive, ascending.
pub fn month_range(start: MonthKey, end: MonthKey) -> Result<Vec<MonthKey>> {
    if start > end {
        return Err(StatisticsError::invalid_month_range(start, end));
    }

    let mut months = Vec::new();
    let mut current = start;
    loop {
        months.push(current);
        if current == end {
            break;
        }
        current = current.next()?;
    }

    Ok(months)
}
