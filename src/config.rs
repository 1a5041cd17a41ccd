use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Resolver options, set once at startup
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Persist factory samples inside a transaction that is rolled back
    #[serde(alias = "useTransactions")]
    pub use_transactions: bool,
    /// Print full error detail instead of a one-line hint
    #[serde(alias = "verboseLogging", alias = "verbose")]
    pub verbose_logging: bool,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid YAML configuration: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResolverConfig {
    pub fn from_yaml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(source)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn transactional(mut self) -> Self {
        self.use_transactions = true;
        self
    }

    pub fn verbose(mut self) -> Self {
        self.verbose_logging = true;
        self
    }
}
