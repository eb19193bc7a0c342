use crate::error::{Result, StatisticsError};
use crate::month::MonthKey;
use chrono::NaiveDate;

/// Earliest and latest month among `rows`, found in a single pass.
pub fn infer_interval<R, F>(rows: &[R], date_of: F) -> Result<(MonthKey, MonthKey)>
where
    F: Fn(&R) -> NaiveDate,
{
    let mut dates = rows.iter().map(&date_of);
    let first = dates.next().ok_or(StatisticsError::EmptyInput)?;

    let (min, max) = dates.fold((first, first), |(min, max), date| {
        (min.min(date), max.max(date))
    });

    Ok((MonthKey::from_date(min), MonthKey::from_date(max)))
}
