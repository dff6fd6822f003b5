//! Scorer configuration
//!
//! One explicit struct tree, deserialized from JSON and handed to collaborator
//! constructors at startup. Every field has a default, so `{}` is a valid
//! configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::knn::Aggregation;
use crate::knn::ql::DEFAULT_MU;
use crate::{Error, Result};

/// Settings of the entry index collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexSettings {
    /// Text field queries are run against
    pub field: String,
    /// Dirichlet smoothing parameter
    pub mu: f64,
    /// Name of the analyzer (see [`crate::AnalyzerRegistry`]) shared by
    /// indexing and query construction
    pub analyzer: String,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            field: "text".to_string(),
            mu: DEFAULT_MU,
            analyzer: "en_stop_stem".to_string(),
        }
    }
}

/// Top-level scorer configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScorerConfig {
    /// Number of query terms taken from the text
    pub topwords: usize,
    /// Number of neighbor entries aggregated
    pub topentries: usize,
    pub index: IndexSettings,
    pub aggregation: Aggregation,
}

impl Default for ScorerConfig {
    fn default() -> Self {
        Self {
            topwords: 20,
            topentries: 20,
            index: IndexSettings::default(),
            aggregation: Aggregation::Generative,
        }
    }
}

impl ScorerConfig {
    /// Load and validate a JSON configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config = Self::from_json_str(&content)?;
        log::info!(
            "loaded scorer configuration from {}",
            path.as_ref().display()
        );
        Ok(config)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.index.field.trim().is_empty() {
            return Err(Error::Config("index field must not be empty".to_string()));
        }
        if !self.index.mu.is_finite() || self.index.mu < 0.0 {
            return Err(Error::Config(format!(
                "mu must be a non-negative number, got {}",
                self.index.mu
            )));
        }
        validate_aggregation(&self.aggregation)
    }
}

fn validate_aggregation(aggregation: &Aggregation) -> Result<()> {
    match aggregation {
        Aggregation::Generative => Ok(()),
        Aggregation::Cutoff { inner, cutoff } => {
            if !cutoff.is_finite() {
                return Err(Error::Config(format!(
                    "cutoff must be finite, got {cutoff}"
                )));
            }
            validate_aggregation(inner)
        }
    }
}
