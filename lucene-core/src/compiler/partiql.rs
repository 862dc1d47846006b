//! PartiQL rendering for key/value stores (`?` placeholders, function-call
//! predicates).
//!
//! There is no ends-with primitive, so ends-with patterns use `contains`.
//! Patterns with embedded wildcards are approximated by matching each literal
//! segment independently.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::Dialect;
use crate::ast::{Comparison, FieldRef, Literal, MatchKind, PatternPart, WildcardPattern};
use crate::error::{QueryError, QueryResult};

static BARE_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex"));

/// Typed parameter value, serialized in the DynamoDB JSON shape (`{"S": ".."}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
}

impl AttributeValue {
    pub fn as_s(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PartiqlDialect;

fn quote_identifier(name: &str) -> String {
    if BARE_IDENTIFIER.is_match(name) {
        name.to_string()
    } else {
        format!("\"{}\"", name.replace('"', "\"\""))
    }
}

fn path_expr(field: &FieldRef) -> String {
    match field {
        FieldRef::Column(name) => quote_identifier(name),
        FieldRef::Json { column, path } => std::iter::once(column)
            .chain(path.iter())
            .map(|segment| quote_identifier(segment))
            .collect::<Vec<_>>()
            .join("."),
    }
}

fn bind(params: &mut Vec<AttributeValue>, value: impl Into<String>) {
    params.push(AttributeValue::S(value.into()));
}

impl Dialect for PartiqlDialect {
    type Param = AttributeValue;

    fn name(&self) -> &'static str {
        "partiql"
    }

    fn term(
        &self,
        field: &FieldRef,
        op: Comparison,
        value: &Literal,
        params: &mut Vec<AttributeValue>,
    ) -> QueryResult<String> {
        let path = path_expr(field);
        match value {
            Literal::Null if op.is_ordering() => Err(QueryError::NullComparison {
                field: field.to_string(),
                operator: op.to_string(),
            }),
            Literal::Null => Ok(format!("{} IS NULL", path)),
            Literal::Text(text) => {
                bind(params, text.as_str());
                Ok(format!("{} {} ?", path, op))
            }
        }
    }

    fn wildcard(
        &self,
        field: &FieldRef,
        pattern: &WildcardPattern,
        kind: MatchKind,
        params: &mut Vec<AttributeValue>,
    ) -> QueryResult<String> {
        let path = path_expr(field);
        if pattern.is_match_all() {
            return Ok(format!("{} IS NOT MISSING", path));
        }

        let anchored = kind == MatchKind::StartsWith
            && matches!(pattern.parts().first(), Some(PatternPart::Literal(_)));

        let mut conditions = Vec::new();
        for (i, segment) in pattern.literal_segments().enumerate() {
            bind(params, segment);
            if i == 0 && anchored {
                conditions.push(format!("begins_with({}, ?)", path));
            } else {
                conditions.push(format!("contains({}, ?)", path));
            }
        }

        Ok(match conditions.len() {
            // only single-character wildcards: the attribute must at least exist
            0 => format!("{} IS NOT MISSING", path),
            1 => conditions.remove(0),
            _ => format!("({})", conditions.join(" AND ")),
        })
    }

    fn fuzzy(
        &self,
        field: &FieldRef,
        value: &str,
        _distance: u32,
        params: &mut Vec<AttributeValue>,
    ) -> QueryResult<String> {
        self.wildcard(
            field,
            &WildcardPattern::literal(value),
            MatchKind::Contains,
            params,
        )
    }
}
