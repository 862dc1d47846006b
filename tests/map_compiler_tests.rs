//! Map Compiler Tests
//!
//! Nested JSON rendering of the annotated tree, modifiers included.

mod common;

use common::user_parser;
use lucene_filter::{MapCompiler, QueryParser};
use serde_json::{json, Value};

fn map(query: &str) -> Value {
    user_parser()
        .parse_to_map(query)
        .unwrap_or_else(|e| panic!("failed to compile {:?}: {}", query, e))
}

#[test]
fn test_simple_term() {
    assert_eq!(map("name:john"), json!({"name": "john"}));
}

#[test]
fn test_null_term() {
    assert_eq!(map("deleted_at:null"), json!({"deleted_at": null}));
}

#[test]
fn test_json_field_keeps_dotted_name() {
    assert_eq!(map("metadata.owner:alice"), json!({"metadata.owner": "alice"}));
}

#[test]
fn test_range() {
    assert_eq!(
        map("age:[18 TO 65]"),
        json!({
            "age": {"$gte": "18", "$lte": "65"},
            "$range": {"min": "18", "max": "65", "inclusive": true}
        })
    );
}

#[test]
fn test_open_exclusive_range() {
    assert_eq!(
        map("age:{* TO 65}"),
        json!({
            "age": {"$lt": "65"},
            "$range": {"min": "*", "max": "65", "inclusive": false}
        })
    );
}

#[test]
fn test_wildcards_restore_lucene_form() {
    assert_eq!(
        map("name:john* OR email:*@example.com"),
        json!({"OR": [
            {"name": {"$wildcard": "john*"}},
            {"email": {"$wildcard": "*@example.com"}}
        ]})
    );
}

#[test]
fn test_modifiers() {
    assert_eq!(map("-status:inactive"), json!({"status": "inactive", "$prohibited": true}));
    assert_eq!(map("NOT status:inactive"), json!({"status": "inactive", "$prohibited": true}));
    assert_eq!(
        map("+name:john^2"),
        json!({"name": "john", "$required": true, "$boost": 2.0})
    );
    assert_eq!(map("name:roam~1"), json!({"name": "roam", "$fuzzy": 1}));
    assert_eq!(
        map(r#"name:"john smith"~3"#),
        json!({"name": "john smith", "$proximity": 3})
    );
}

#[test]
fn test_group_boost() {
    assert_eq!(
        map("(status:a OR status:b)^3"),
        json!({"OR": [{"status": "a"}, {"status": "b"}], "$boost": 3.0})
    );
}

#[test]
fn test_implicit_search() {
    assert_eq!(
        map("john"),
        json!({"OR": [
            {"name": {"$wildcard": "*john*"}},
            {"email": {"$wildcard": "*john*"}},
            {"description": {"$wildcard": "*john*"}}
        ]})
    );
}

#[test]
fn test_nested_groups() {
    assert_eq!(
        map("name:john AND (status:active OR -status:banned)"),
        json!({"AND": [
            {"name": "john"},
            {"OR": [
                {"status": "active"},
                {"status": "banned", "$prohibited": true}
            ]}
        ]})
    );
}

#[test]
fn test_match_all_and_blank() {
    assert_eq!(map("*:*"), json!({"AND": []}));
    assert_eq!(map(""), json!({}));
    assert_eq!(map("  \t "), json!({}));
}

#[test]
fn test_compiler_on_parsed_tree() {
    let parser = QueryParser::new(common::user_fields());
    let tree = parser.parse("age:42").unwrap();
    assert_eq!(MapCompiler::new().compile(tree.as_ref()), json!({"age": "42"}));
}
