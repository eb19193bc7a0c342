use crate::month::MonthKey;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StatisticsError {
    #[error("Invalid range: start {start} is after end {end}")]
    InvalidRange { start: String, end: String },

    #[error("No operations to infer a date interval from")]
    EmptyInput,

    #[error("Operation references category '{code}' which is not in the catalog")]
    UnknownCategory { code: String },

    #[error("Catalog label '{label}' is used by both '{first}' and '{second}'")]
    DuplicateLabel {
        label: String,
        first: String,
        second: String,
    },

    #[error("Date calculation error: {0}")]
    DateError(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl StatisticsError {
    pub(crate) fn invalid_month_range(start: MonthKey, end: MonthKey) -> Self {
        Self::InvalidRange {
            start: start.to_string(),
            end: end.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, StatisticsError>;
