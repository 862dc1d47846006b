//! PostgreSQL rendering with `$n` placeholders.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Dialect;
use crate::ast::{Comparison, FieldRef, Literal, MatchKind, PatternPart, WildcardPattern};
use crate::error::{QueryError, QueryResult};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.3;

/// How `term~n` is rendered. Neither is a true edit-distance match.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "lowercase")]
pub enum FuzzyStrategy {
    /// Case-insensitive substring match
    #[default]
    Contains,
    /// `similarity()` from the pg_trgm extension
    Similarity { threshold: f64 },
}

impl FuzzyStrategy {
    pub fn similarity() -> Self {
        FuzzyStrategy::Similarity {
            threshold: DEFAULT_SIMILARITY_THRESHOLD,
        }
    }

    /// The threshold is written into the clause, so it must be a finite
    /// value in `[0, 1]`.
    pub fn validate(&self) -> QueryResult<()> {
        match *self {
            FuzzyStrategy::Similarity { threshold }
                if !(threshold.is_finite() && (0.0..=1.0).contains(&threshold)) =>
            {
                Err(QueryError::InvalidSimilarityThreshold { threshold })
            }
            _ => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PostgresDialect {
    fuzzy: FuzzyStrategy,
}

impl PostgresDialect {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fuzzy(mut self, fuzzy: FuzzyStrategy) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn fuzzy_strategy(&self) -> FuzzyStrategy {
        self.fuzzy
    }
}

fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

fn quote_key(key: &str) -> String {
    format!("'{}'", key.replace('\'', "''"))
}

/// Column reference; JSON paths end in `->>` so they compare as text.
fn column_expr(field: &FieldRef) -> String {
    match field {
        FieldRef::Column(name) => quote_identifier(name),
        FieldRef::Json { column, path } => {
            let mut expr = quote_identifier(column);
            for (i, key) in path.iter().enumerate() {
                let arrow = if i + 1 == path.len() { "->>" } else { "->" };
                expr.push_str(arrow);
                expr.push_str(&quote_key(key));
            }
            expr
        }
    }
}

/// Text view of a field for pattern matching.
fn text_expr(field: &FieldRef) -> String {
    match field {
        FieldRef::Column(_) => format!("{}::text", column_expr(field)),
        FieldRef::Json { .. } => column_expr(field),
    }
}

fn escape_like(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

/// `*` → `%`, `?` → `_`, then anchor according to the match kind.
pub(crate) fn like_pattern(pattern: &WildcardPattern, kind: MatchKind) -> String {
    let body: String = pattern
        .parts()
        .iter()
        .map(|part| match part {
            PatternPart::Literal(s) => escape_like(s),
            PatternPart::AnyChars => "%".to_string(),
            PatternPart::AnyChar => "_".to_string(),
        })
        .collect();

    match kind {
        MatchKind::StartsWith => format!("{}%", body),
        MatchKind::EndsWith => format!("%{}", body),
        MatchKind::Contains => format!("%{}%", body),
    }
}

fn bind(params: &mut Vec<Value>, value: impl Into<String>) -> String {
    params.push(Value::String(value.into()));
    format!("${}", params.len())
}

impl Dialect for PostgresDialect {
    type Param = Value;

    fn name(&self) -> &'static str {
        "postgres"
    }

    fn term(
        &self,
        field: &FieldRef,
        op: Comparison,
        value: &Literal,
        params: &mut Vec<Value>,
    ) -> QueryResult<String> {
        let column = column_expr(field);
        match value {
            Literal::Null if op.is_ordering() => Err(QueryError::NullComparison {
                field: field.to_string(),
                operator: op.to_string(),
            }),
            Literal::Null => Ok(format!("{} IS NULL", column)),
            Literal::Text(text) => {
                let placeholder = bind(params, text.as_str());
                Ok(format!("{} {} {}", column, op, placeholder))
            }
        }
    }

    fn wildcard(
        &self,
        field: &FieldRef,
        pattern: &WildcardPattern,
        kind: MatchKind,
        params: &mut Vec<Value>,
    ) -> QueryResult<String> {
        if pattern.is_match_all() {
            return Ok(format!("{} IS NOT NULL", column_expr(field)));
        }
        let placeholder = bind(params, like_pattern(pattern, kind));
        Ok(format!("{} ILIKE {}", text_expr(field), placeholder))
    }

    fn fuzzy(
        &self,
        field: &FieldRef,
        value: &str,
        _distance: u32,
        params: &mut Vec<Value>,
    ) -> QueryResult<String> {
        match self.fuzzy {
            FuzzyStrategy::Contains => self.wildcard(
                field,
                &WildcardPattern::literal(value),
                MatchKind::Contains,
                params,
            ),
            FuzzyStrategy::Similarity { threshold } => {
                self.fuzzy.validate()?;
                let placeholder = bind(params, value);
                Ok(format!(
                    "similarity({}, {}) > {}",
                    text_expr(field),
                    placeholder,
                    threshold
                ))
            }
        }
    }
}
