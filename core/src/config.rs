use crate::matcher::{DEFAULT_RELEVANCE_THRESHOLD, DEFAULT_TOP_N};
use crate::urgency::UrgencyWeights;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Ranking tunables. Any field missing from a config file keeps its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub urgency: UrgencyWeights,
    pub relevance_threshold: f64,
    pub top_n: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self { urgency: UrgencyWeights::default(), relevance_threshold: DEFAULT_RELEVANCE_THRESHOLD, top_n: DEFAULT_TOP_N }
    }
}

impl RankingConfig {
    pub fn validate(&self) -> Result<()> {
        self.urgency.validate()?;
        if !(0.0..=1.0).contains(&self.relevance_threshold) {
            return Err(Error::InvalidConfig(format!("relevance_threshold must be within [0, 1], got {}", self.relevance_threshold)));
        }
        if self.top_n == 0 {
            return Err(Error::InvalidConfig("top_n must be positive".into()));
        }
        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = File::open(path)?;
        let config: Self = serde_json::from_reader(BufReader::new(f)).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = RankingConfig::from_json(r#"{"top_n": 5, "urgency": {"time_weight": 0.5}}"#).unwrap();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.urgency.stock_weight, 0.7);
        assert_eq!(config.urgency.time_weight, 0.5);
        assert_eq!(config.relevance_threshold, 0.10);
    }

    #[test]
    fn rejects_zero_top_n() {
        assert!(matches!(RankingConfig::from_json(r#"{"top_n": 0}"#), Err(Error::InvalidConfig(_))));
    }
}
