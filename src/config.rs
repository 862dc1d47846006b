//! Configuration handling for the lucene-filter CLI and embedding services
//!
//! Manages the lucene-filter.toml configuration file.
//!
//! ## Environment Variables
//!
//! The following environment variables override config file settings:
//!
//! - `LUCENE_MAX_QUERY_LENGTH` - Maximum query length in bytes
//! - `LUCENE_MAX_DEPTH` - Maximum nesting depth
//! - `LUCENE_MAX_TERMS` - Maximum number of terms
//!
//! These can be set in a `.env` file in the config directory.

use std::path::Path;

use lucene_core::{FieldInfo, FieldRegistry, FuzzyStrategy, ParserLimits, QueryParser};
use serde::{Deserialize, Serialize};

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "lucene-filter.toml";

/// Environment variable names
pub const ENV_MAX_QUERY_LENGTH: &str = "LUCENE_MAX_QUERY_LENGTH";
pub const ENV_MAX_DEPTH: &str = "LUCENE_MAX_DEPTH";
pub const ENV_MAX_TERMS: &str = "LUCENE_MAX_TERMS";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Parser resource limits
    #[serde(default)]
    pub limits: ParserLimits,
    /// SQL rendering options
    #[serde(default)]
    pub sql: SqlConfig,
    /// Known fields
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FuzzyMode {
    #[default]
    Contains,
    Similarity,
}

/// SQL-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SqlConfig {
    #[serde(default)]
    pub fuzzy: FuzzyMode,
    /// Only used with `fuzzy = "similarity"`
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
}

fn default_similarity_threshold() -> f64 {
    lucene_core::compiler::DEFAULT_SIMILARITY_THRESHOLD
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self {
            fuzzy: FuzzyMode::default(),
            similarity_threshold: default_similarity_threshold(),
        }
    }
}

impl SqlConfig {
    pub fn fuzzy_strategy(&self) -> FuzzyStrategy {
        match self.fuzzy {
            FuzzyMode::Contains => FuzzyStrategy::Contains,
            FuzzyMode::Similarity => FuzzyStrategy::Similarity {
                threshold: self.similarity_threshold,
            },
        }
    }
}

impl Config {
    /// Load configuration from a directory
    ///
    /// This also loads any `.env` file in the directory and applies
    /// environment variable overrides. A missing config file yields the
    /// built-in defaults with no fields.
    pub fn load(dir: &Path) -> anyhow::Result<Self> {
        // Load env file if present (ignore errors)
        let env_path = dir.join(".env");
        if env_path.exists() {
            let _ = dotenvy::from_path(&env_path);
        }

        Self::load_with(dir, |key| std::env::var(key).ok())
    }

    /// Load configuration, resolving overrides through `lookup` instead of
    /// the process environment
    pub fn load_with<F>(dir: &Path, lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_path = dir.join(CONFIG_FILE_NAME);
        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            Self::from_toml(&content)?
        } else {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            Self::default()
        };

        config.apply_overrides(lookup);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would otherwise surface only when a query is
    /// compiled
    pub fn validate(&self) -> anyhow::Result<()> {
        let threshold = self.sql.similarity_threshold;
        if !(threshold.is_finite() && (0.0..=1.0).contains(&threshold)) {
            anyhow::bail!(
                "sql.similarity_threshold must be between 0 and 1, got {}",
                threshold
            );
        }
        Ok(())
    }

    /// Apply limit overrides; unparsable values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| -> Option<usize> {
            let raw = lookup(key)?;
            match raw.trim().parse::<usize>() {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid {}={:?}", key, raw);
                    None
                }
            }
        };

        if let Some(value) = read(ENV_MAX_QUERY_LENGTH) {
            self.limits.max_query_length = value;
        }
        if let Some(value) = read(ENV_MAX_DEPTH) {
            self.limits.max_depth = value;
        }
        if let Some(value) = read(ENV_MAX_TERMS) {
            self.limits.max_terms = value;
        }
    }

    /// Save configuration to a directory
    pub fn save(&self, dir: &Path) -> anyhow::Result<()> {
        let config_path = dir.join(CONFIG_FILE_NAME);
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&config_path, content)?;
        Ok(())
    }

    pub fn field_registry(&self) -> FieldRegistry {
        FieldRegistry::new(self.fields.clone())
    }

    /// Parser over the configured fields, limits and fuzzy strategy
    pub fn query_parser(&self) -> QueryParser {
        self.query_parser_for(self.field_registry())
    }

    /// Parser over an externally built registry, keeping configured limits
    pub fn query_parser_for(&self, registry: FieldRegistry) -> QueryParser {
        QueryParser::new(registry)
            .with_limits(self.limits)
            .with_fuzzy_strategy(self.sql.fuzzy_strategy())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_serialization() {
        let config = Config {
            fields: vec![FieldInfo::text("name")],
            ..Config::default()
        };
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("max_depth = 20"));
        assert!(toml_str.contains("name = \"name\""));
        assert!(toml_str.contains("fuzzy = \"contains\""));
    }

    #[test]
    fn test_fuzzy_strategy() {
        let sql = SqlConfig {
            fuzzy: FuzzyMode::Similarity,
            similarity_threshold: 0.45,
        };
        assert_eq!(
            sql.fuzzy_strategy(),
            FuzzyStrategy::Similarity { threshold: 0.45 }
        );
        assert_eq!(SqlConfig::default().fuzzy_strategy(), FuzzyStrategy::Contains);
    }

    #[test]
    fn test_validate_threshold() {
        assert!(Config::default().validate().is_ok());

        let mut config = Config::default();
        config.sql.similarity_threshold = f64::NAN;
        assert!(config.validate().is_err());
        config.sql.similarity_threshold = -0.5;
        assert!(config.validate().is_err());
    }
}
