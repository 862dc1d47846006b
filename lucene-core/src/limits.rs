use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_QUERY_LENGTH: usize = 10_000;
pub const DEFAULT_MAX_DEPTH: usize = 20;
pub const DEFAULT_MAX_TERMS: usize = 100;

/// Resource guards applied to every parse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserLimits {
    /// Maximum query length in bytes (default: 10,000)
    pub max_query_length: usize,
    /// Maximum nesting depth (default: 20)
    pub max_depth: usize,
    /// Maximum number of leaf terms, implicit-search expansion included (default: 100)
    pub max_terms: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_query_length: DEFAULT_MAX_QUERY_LENGTH,
            max_depth: DEFAULT_MAX_DEPTH,
            max_terms: DEFAULT_MAX_TERMS,
        }
    }
}

impl ParserLimits {
    /// Tighter limits for anonymous public endpoints
    pub fn strict() -> Self {
        Self {
            max_query_length: 1_000,
            max_depth: 8,
            max_terms: 25,
        }
    }

    pub fn with_max_query_length(mut self, max: usize) -> Self {
        self.max_query_length = max;
        self
    }

    pub fn with_max_depth(mut self, max: usize) -> Self {
        self.max_depth = max;
        self
    }

    pub fn with_max_terms(mut self, max: usize) -> Self {
        self.max_terms = max;
        self
    }
}
