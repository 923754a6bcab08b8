//! Index configuration: BM25 parameters, field weights, search options.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::types::ArticleType;

/// Okapi BM25 parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Bm25Config {
    /// Term-frequency saturation, `k1 ≥ 0`.
    pub k1: f64,
    /// Length normalisation, `b ∈ [0, 1]`.
    pub b: f64,
}

impl Default for Bm25Config {
    fn default() -> Self {
        Self { k1: 1.2, b: 0.75 }
    }
}

impl Bm25Config {
    pub fn validate(&self) -> Result<()> {
        if !(self.k1 >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "k1 must be >= 0, got {}",
                self.k1
            )));
        }
        if !(0.0..=1.0).contains(&self.b) {
            return Err(Error::InvalidConfig(format!(
                "b must be in [0, 1], got {}",
                self.b
            )));
        }
        Ok(())
    }
}

/// Per-field score multipliers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    pub title: f64,
    pub description: f64,
    pub content: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            title: 2.0,
            description: 1.5,
            content: 1.0,
        }
    }
}

impl FieldWeights {
    pub fn validate(&self) -> Result<()> {
        for (name, weight) in [
            ("title", self.title),
            ("description", self.description),
            ("content", self.content),
        ] {
            if !(weight >= 0.0) {
                return Err(Error::InvalidConfig(format!(
                    "field weight {} must be >= 0, got {}",
                    name, weight
                )));
            }
        }
        if self.title == 0.0 && self.description == 0.0 && self.content == 0.0 {
            return Err(Error::InvalidConfig(
                "at least one field weight must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-query options.
#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Maximum results; `None` means the default of 20.
    pub limit: Option<usize>,
    pub min_score: f64,
    /// When set, only these article types are returned.
    pub types: Option<HashSet<ArticleType>>,
}

impl SearchOptions {
    pub const DEFAULT_LIMIT: usize = 20;

    pub fn validate(&self) -> Result<()> {
        if self.limit == Some(0) {
            return Err(Error::InvalidConfig("limit must be >= 1".to_string()));
        }
        if !(self.min_score >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "min_score must be >= 0, got {}",
                self.min_score
            )));
        }
        Ok(())
    }

    pub fn effective_limit(&self) -> usize {
        self.limit.unwrap_or(Self::DEFAULT_LIMIT)
    }
}

/// Complete index configuration, loadable from YAML.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct IndexConfig {
    pub bm25: Bm25Config,
    pub field_weights: FieldWeights,
    /// Progress callback cadence for `build_from`, in documents.
    pub progress_every: ProgressEvery,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProgressEvery(pub usize);

impl Default for ProgressEvery {
    fn default() -> Self {
        ProgressEvery(1_000)
    }
}

impl IndexConfig {
    pub fn validate(&self) -> Result<()> {
        self.bm25.validate()?;
        self.field_weights.validate()?;
        if self.progress_every.0 == 0 {
            return Err(Error::InvalidConfig(
                "progress_every must be >= 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Load overrides from a YAML file; missing keys keep defaults.
    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: IndexConfig = serde_yaml::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = IndexConfig::default();
        assert_eq!(config.bm25.k1, 1.2);
        assert_eq!(config.bm25.b, 0.75);
        assert_eq!(config.field_weights.title, 2.0);
        assert_eq!(config.field_weights.description, 1.5);
        assert_eq!(config.field_weights.content, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_bm25() {
        let config = Bm25Config { k1: -0.1, b: 0.75 };
        assert!(config.validate().is_err());
        let config = Bm25Config { k1: 1.2, b: 1.5 };
        assert!(config.validate().is_err());
        let config = Bm25Config {
            k1: f64::NAN,
            b: 0.5,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_weights_rejected() {
        let weights = FieldWeights {
            title: 0.0,
            description: 0.0,
            content: 0.0,
        };
        assert!(weights.validate().is_err());
        let weights = FieldWeights {
            title: -1.0,
            ..FieldWeights::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_search_options() {
        assert_eq!(SearchOptions::default().effective_limit(), 20);
        let options = SearchOptions {
            limit: Some(0),
            ..SearchOptions::default()
        };
        assert!(options.validate().is_err());
    }
}
