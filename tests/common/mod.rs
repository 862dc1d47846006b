//! Common test fixtures for lucene-filter integration tests
//!
//! Provides a user-table field list and helpers that parse and compile in
//! one step.
#![allow(dead_code)]

use lucene_filter::{AttributeValue, FieldInfo, ParserLimits, QueryParser};
use serde_json::Value;

/// Three default-searchable text fields, plain columns and one JSON document
pub fn user_fields() -> Vec<FieldInfo> {
    vec![
        FieldInfo::text("name"),
        FieldInfo::text("email"),
        FieldInfo::text("description"),
        FieldInfo::new("age"),
        FieldInfo::new("status"),
        FieldInfo::new("created_at"),
        FieldInfo::new("deleted_at"),
        FieldInfo::json("metadata"),
    ]
}

pub fn user_parser() -> QueryParser {
    QueryParser::new(user_fields())
}

pub fn limited_parser(limits: ParserLimits) -> QueryParser {
    user_parser().with_limits(limits)
}

pub fn sql(query: &str) -> (String, Vec<Value>) {
    let fragment = user_parser()
        .parse_to_sql(query)
        .unwrap_or_else(|e| panic!("failed to compile {:?}: {}", query, e));
    (fragment.clause, fragment.params)
}

pub fn partiql(query: &str) -> (String, Vec<AttributeValue>) {
    let fragment = user_parser()
        .parse_to_partiql(query)
        .unwrap_or_else(|e| panic!("failed to compile {:?}: {}", query, e));
    (fragment.clause, fragment.params)
}

pub fn s(value: &str) -> AttributeValue {
    AttributeValue::S(value.to_string())
}
