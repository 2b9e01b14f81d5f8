use std::path::Path;

use conciliador_import::{CsvOptions, ExclusionRules, LedgerSource};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matcher::MatchKey;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Per-ledger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub source: LedgerSource,
    /// Replaces the source's default blocklist when present.
    #[serde(default)]
    pub exclusions: Option<Vec<String>>,
}

impl LedgerConfig {
    pub fn new(source: LedgerSource) -> Self {
        Self {
            source,
            exclusions: None,
        }
    }

    pub fn rules(&self) -> ExclusionRules {
        match &self.exclusions {
            Some(keywords) => ExclusionRules::new(keywords),
            None => self.source.default_exclusions(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub match_key: MatchKey,
    pub delimiter: String,
    pub has_header: bool,
    pub statement: LedgerConfig,
    pub control: LedgerConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            match_key: MatchKey::default(),
            delimiter: ";".to_string(),
            has_header: true,
            statement: LedgerConfig::new(LedgerSource::Sicoob),
            control: LedgerConfig::new(LedgerSource::ControlSheet),
        }
    }
}

impl RunConfig {
    pub fn from_toml(toml_content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_content)?)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn csv_options(&self) -> CsvOptions {
        CsvOptions {
            delimiter: self.delimiter.clone(),
            has_header: self.has_header,
        }
    }
}
