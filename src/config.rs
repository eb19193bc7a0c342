use crate::error::{Result, StatisticsError};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

const MAX_WINDOW_MONTHS: u32 = 120;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct StatisticsConfig {
    #[schemars(
        description = "How far back operations are fetched when a report has no start date, in calendar months."
    )]
    #[serde(default = "default_query_window")]
    pub query_window_months: u32,

    #[schemars(
        description = "Length of the trailing month window for breakdown reports without a start date, in calendar months."
    )]
    #[serde(default = "default_bucket_window")]
    pub bucket_window_months: u32,
}

fn default_query_window() -> u32 {
    12
}

fn default_bucket_window() -> u32 {
    6
}

impl Default for StatisticsConfig {
    fn default() -> Self {
        Self {
            query_window_months: default_query_window(),
            bucket_window_months: default_bucket_window(),
        }
    }
}

impl StatisticsConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("query_window_months", self.query_window_months),
            ("bucket_window_months", self.bucket_window_months),
        ] {
            if !(1..=MAX_WINDOW_MONTHS).contains(&value) {
                return Err(StatisticsError::InvalidConfig(format!(
                    "{} must be between 1 and {}, got {}",
                    name, MAX_WINDOW_MONTHS, value
                )));
            }
        }
        Ok(())
    }

    pub fn schema_as_json() -> Result<String> {
        let schema = schemars::schema_for!(StatisticsConfig);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = StatisticsConfig::default();
        assert_eq!(config.query_window_months, 12);
        assert_eq!(config.bucket_window_months, 6);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_json_fills_missing_fields() {
        let config = StatisticsConfig::from_json(r#"{"bucket_window_months": 3}"#).unwrap();
        assert_eq!(config.query_window_months, 12);
        assert_eq!(config.bucket_window_months, 3);
    }

    #[test]
    fn test_rejects_zero_window() {
        let result = StatisticsConfig::from_json(r#"{"query_window_months": 0}"#);
        assert!(matches!(result, Err(StatisticsError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_json() {
        let result = StatisticsConfig::from_json("{not json");
        assert!(matches!(result, Err(StatisticsError::SerializationError(_))));
    }

    #[test]
    fn test_schema_generation() {
        let schema_json = StatisticsConfig::schema_as_json().unwrap();
        assert!(schema_json.contains("query_window_months"));
        assert!(schema_json.contains("bucket_window_months"));
    }
}
