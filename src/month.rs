use crate::error::{Result, StatisticsError};
use crate::utils::last_day_of_month;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A calendar month, rendered as `YYYY-MM`.
///
/// Field order makes the derived `Ord` chronological, so a `BTreeMap` keyed by
/// `MonthKey` iterates months in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    year: i32,
    month: u32,
}

impl MonthKey {
    /// Years are limited to the range `NaiveDate` can represent.
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(NaiveDate::MIN.year()..=NaiveDate::MAX.year()).contains(&year) {
            return Err(StatisticsError::DateError(format!(
                "Year {} is outside the supported calendar ({}..={})",
                year,
                NaiveDate::MIN.year(),
                NaiveDate::MAX.year()
            )));
        }
        if !(1..=12).contains(&month) {
            return Err(StatisticsError::DateError(format!(
                "Invalid month {} in {}-{:02}: must be between 1 and 12",
                month, year, month
            )));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// The following month; fails past the last supported year.
    pub fn next(&self) -> Result<Self> {
        if self.month == 12 {
            Self::new(self.year + 1, 1)
        } else {
            Ok(Self {
                year: self.year,
                month: self.month + 1,
            })
        }
    }

    pub fn first_day(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).ok_or_else(|| {
            StatisticsError::DateError(format!("{} is outside the supported calendar", self))
        })
    }

    pub fn last_day(&self) -> Result<NaiveDate> {
        last_day_of_month(self.year, self.month)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = StatisticsError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            StatisticsError::DateError(format!("Invalid month key '{}'. Expected YYYY-MM", s))
        };

        let (year, month) = s.trim().split_once('-').ok_or_else(invalid)?;
        if month.len() != 2 {
            return Err(invalid());
        }
        let year: i32 = year.parse().map_err(|_| invalid())?;
        let month: u32 = month.parse().map_err(|_| invalid())?;

        Self::new(year, month)
    }
}

impl Serialize for MonthKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_and_parse() {
        let key: MonthKey = "2024-03".parse().unwrap();
        assert_eq!(key.year(), 2024);
        assert_eq!(key.month(), 3);
        assert_eq!(key.to_string(), "2024-03");

        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("2024-3".parse::<MonthKey>().is_err());
        assert!("March".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_ordering_is_chronological() {
        let mut keys: Vec<MonthKey> = ["2024-02", "2023-12", "2024-10", "2024-01"]
            .iter()
            .map(|s| s.parse().unwrap())
            .collect();
        keys.sort();

        let rendered: Vec<String> = keys.iter().map(|k| k.to_string()).collect();
        assert_eq!(rendered, vec!["2023-12", "2024-01", "2024-02", "2024-10"]);
    }

    #[test]
    fn test_next_rolls_over_year() {
        let dec = MonthKey::new(2023, 12).unwrap();
        assert_eq!(dec.next().unwrap(), MonthKey::new(2024, 1).unwrap());
    }

    #[test]
    fn test_year_outside_calendar_is_rejected() {
        assert!(matches!(
            "2147483647-12".parse::<MonthKey>(),
            Err(StatisticsError::DateError(_))
        ));
        assert!(MonthKey::new(i32::MIN, 1).is_err());

        let last = MonthKey::new(NaiveDate::MAX.year(), 12).unwrap();
        assert!(matches!(last.next(), Err(StatisticsError::DateError(_))));
        assert!(last.last_day().is_ok());
    }

    #[test]
    fn test_serializes_as_string() {
        let key = MonthKey::new(2024, 7).unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"2024-07\"");

        let back: MonthKey = serde_json::from_str("\"2024-07\"").unwrap();
        assert_eq!(back, key);
    }
}
