//! SQL Compiler Tests
//!
//! PostgreSQL fragments rendered from Lucene queries, covering:
//! - Terms, phrases and null literals
//! - Wildcards and LIKE escaping
//! - Ranges with open bounds
//! - Boolean structure and negation
//! - JSON-document field access
//! - Fuzzy strategies

mod common;

use common::{sql, user_parser};
use lucene_filter::{FuzzyStrategy, PostgresDialect, QueryError, SqlCompiler};
use serde_json::json;

// ============================================================================
// Terms
// ============================================================================

#[test]
fn test_simple_term() {
    let (clause, params) = sql("name:john");
    assert_eq!(clause, r#""name" = $1"#);
    assert_eq!(params, vec![json!("john")]);
}

#[test]
fn test_numeric_value_is_bound_as_text() {
    let (clause, params) = sql("age:42");
    assert_eq!(clause, r#""age" = $1"#);
    assert_eq!(params, vec![json!("42")]);
}

#[test]
fn test_phrase_is_exact_match() {
    let (clause, params) = sql(r#"name:"john smith""#);
    assert_eq!(clause, r#""name" = $1"#);
    assert_eq!(params, vec![json!("john smith")]);
}

#[test]
fn test_phrase_proximity_is_exact_match() {
    let (clause, params) = sql(r#"name:"john smith"~5"#);
    assert_eq!(clause, r#""name" = $1"#);
    assert_eq!(params, vec![json!("john smith")]);
}

#[test]
fn test_boost_is_dropped() {
    let (clause, params) = sql("name:rust^4");
    assert_eq!(clause, r#""name" = $1"#);
    assert_eq!(params, vec![json!("rust")]);
}

#[test]
fn test_null_renders_is_null() {
    for query in ["deleted_at:null", "deleted_at:NIL"] {
        let (clause, params) = sql(query);
        assert_eq!(clause, r#""deleted_at" IS NULL"#);
        assert!(params.is_empty());
    }
}

#[test]
fn test_null_with_ordering_comparator_fails() {
    let err = user_parser().parse_to_sql("age:[null TO 5]").unwrap_err();
    assert_eq!(
        err,
        QueryError::NullComparison {
            field: "age".into(),
            operator: ">=".into()
        }
    );
    assert!(err.to_string().contains("null"));
}

// ============================================================================
// Wildcards
// ============================================================================

#[test]
fn test_wildcard_positions() {
    let cases = [
        ("name:john*", "john%"),
        ("name:*john", "%john"),
        ("name:*john*", "%john%"),
        ("name:jo?n", "%jo_n%"),
        ("name:j*n", "%j%n%"),
    ];
    for (query, pattern) in cases {
        let (clause, params) = sql(query);
        assert_eq!(clause, r#""name"::text ILIKE $1"#, "{}", query);
        assert_eq!(params, vec![json!(pattern)], "{}", query);
    }
}

#[test]
fn test_like_metacharacters_are_escaped() {
    let (_, params) = sql("name:50%*");
    assert_eq!(params, vec![json!("50\\%%")]);

    let (_, params) = sql("description:*under_score*");
    assert_eq!(params, vec![json!("%under\\_score%")]);
}

#[test]
fn test_field_star_is_existence_check() {
    let (clause, params) = sql("name:*");
    assert_eq!(clause, r#""name" IS NOT NULL"#);
    assert!(params.is_empty());
}

// ============================================================================
// Ranges
// ============================================================================

#[test]
fn test_inclusive_range() {
    let (clause, params) = sql("age:[18 TO 65]");
    assert_eq!(clause, r#"("age" >= $1 AND "age" <= $2)"#);
    assert_eq!(params, vec![json!("18"), json!("65")]);
}

#[test]
fn test_exclusive_range() {
    let (clause, _) = sql("age:{18 TO 65}");
    assert_eq!(clause, r#"("age" > $1 AND "age" < $2)"#);
}

#[test]
fn test_open_ranges() {
    let (clause, params) = sql("age:[18 TO *]");
    assert_eq!(clause, r#""age" >= $1"#);
    assert_eq!(params, vec![json!("18")]);

    let (clause, params) = sql("age:[* TO 65]");
    assert_eq!(clause, r#""age" <= $1"#);
    assert_eq!(params, vec![json!("65")]);

    let (clause, _) = sql("age:{* TO 65}");
    assert_eq!(clause, r#""age" < $1"#);
}

#[test]
fn test_fully_open_range_fails() {
    let err = user_parser().parse_to_sql("age:[* TO *]").unwrap_err();
    assert!(matches!(err, QueryError::UnboundedRange { .. }));
}

#[test]
fn test_date_range() {
    let (clause, params) = sql("created_at:[2024-01-01 TO 2024-12-31]");
    assert_eq!(clause, r#"("created_at" >= $1 AND "created_at" <= $2)"#);
    assert_eq!(params, vec![json!("2024-01-01"), json!("2024-12-31")]);
}

#[test]
fn test_negative_bounds() {
    let (_, params) = sql("temperature:[-10 TO -2.5]");
    assert_eq!(params, vec![json!("-10"), json!("-2.5")]);
}

// ============================================================================
// Boolean structure
// ============================================================================

#[test]
fn test_prohibited_term() {
    let (clause, params) = sql("-status:inactive");
    assert_eq!(clause, r#"NOT ("status" = $1)"#);
    assert_eq!(params, vec![json!("inactive")]);
}

#[test]
fn test_not_group() {
    let (clause, _) = sql("NOT (status:a OR status:b)");
    assert_eq!(clause, r#"NOT (("status" = $1 OR "status" = $2))"#);
}

#[test]
fn test_double_negation_nests() {
    let (clause, _) = sql("-(-status:inactive)");
    assert_eq!(clause, r#"NOT (NOT ("status" = $1))"#);
}

#[test]
fn test_required_is_plain_and() {
    let (clause, _) = sql("+name:john +status:active");
    assert_eq!(clause, r#"("name" = $1 AND "status" = $2)"#);
}

#[test]
fn test_complex_query() {
    let (clause, params) =
        sql("name:john AND (status:active OR status:pending) -deleted_at:null");
    assert_eq!(
        clause,
        r#"("name" = $1 AND ("status" = $2 OR "status" = $3) AND NOT ("deleted_at" IS NULL))"#
    );
    assert_eq!(params, vec![json!("john"), json!("active"), json!("pending")]);
}

#[test]
fn test_placeholders_follow_emission_order() {
    let (clause, params) = sql("age:1 OR (age:2 AND age:3) OR age:4");
    assert_eq!(
        clause,
        r#"("age" = $1 OR ("age" = $2 AND "age" = $3) OR "age" = $4)"#
    );
    assert_eq!(params, vec![json!("1"), json!("2"), json!("3"), json!("4")]);
}

#[test]
fn test_implicit_search_across_default_fields() {
    let (clause, params) = sql("john");
    assert_eq!(
        clause,
        r#"("name"::text ILIKE $1 OR "email"::text ILIKE $2 OR "description"::text ILIKE $3)"#
    );
    assert_eq!(params, vec![json!("%john%"); 3]);
}

#[test]
fn test_implicit_wildcard_and_phrase() {
    let (_, params) = sql("jo*");
    assert_eq!(params, vec![json!("jo%"); 3]);

    let (_, params) = sql(r#""jo* smith""#);
    assert_eq!(params, vec![json!("%jo* smith%"); 3]);
}

#[test]
fn test_empty_query() {
    for query in ["", "   ", "*:*"] {
        let fragment = user_parser().parse_to_sql(query).unwrap();
        assert_eq!(fragment.clause, "", "{:?}", query);
        assert!(fragment.params.is_empty());
        assert!(fragment.is_empty());
    }
}

#[test]
fn test_match_all_absorbs_or() {
    let fragment = user_parser().parse_to_sql("name:x OR *:*").unwrap();
    assert!(fragment.is_empty());
    assert!(fragment.params.is_empty());

    let (clause, params) = sql("name:x AND *:*");
    assert_eq!(clause, r#""name" = $1"#);
    assert_eq!(params, vec![json!("x")]);
}

#[test]
fn test_negated_match_all_matches_nothing() {
    for query in ["NOT *:*", "name:x -*:*", "(name:x OR name:y) AND NOT *:*"] {
        let (clause, params) = sql(query);
        assert_eq!(clause, "FALSE", "{}", query);
        assert!(params.is_empty(), "{}", query);
    }

    let (clause, params) = sql("name:x OR -*:*");
    assert_eq!(clause, r#""name" = $1"#);
    assert_eq!(params, vec![json!("x")]);
}

// ============================================================================
// Fields
// ============================================================================

#[test]
fn test_json_document_field() {
    let (clause, params) = sql("metadata.key:value");
    assert_eq!(clause, r#""metadata"->>'key' = $1"#);
    assert_eq!(params, vec![json!("value")]);
    assert!(!clause.contains(r#""metadata.key""#));
}

#[test]
fn test_nested_json_path() {
    let (clause, _) = sql("metadata.owner.name:alice");
    assert_eq!(clause, r#""metadata"->'owner'->>'name' = $1"#);
}

#[test]
fn test_json_wildcard_skips_text_cast() {
    let (clause, params) = sql("metadata.tag:urg*");
    assert_eq!(clause, r#""metadata"->>'tag' ILIKE $1"#);
    assert_eq!(params, vec![json!("urg%")]);
}

#[test]
fn test_dotted_plain_field_is_quoted_whole() {
    let (clause, _) = sql("user.name:bob");
    assert_eq!(clause, r#""user.name" = $1"#);
}

#[test]
fn test_user_text_never_reaches_clause() {
    let (clause, params) = sql(r#"name:"x'; DROP TABLE users; --""#);
    assert_eq!(clause, r#""name" = $1"#);
    assert_eq!(params, vec![json!("x'; DROP TABLE users; --")]);

    let (clause, _) = sql(r#"na\"me:x"#);
    assert_eq!(clause, r#""na""me" = $1"#);
}

// ============================================================================
// Fuzzy
// ============================================================================

#[test]
fn test_fuzzy_defaults_to_contains() {
    let (clause, params) = sql("name:roam~");
    assert_eq!(clause, r#""name"::text ILIKE $1"#);
    assert_eq!(params, vec![json!("%roam%")]);
}

#[test]
fn test_fuzzy_similarity_strategy() {
    let parser = user_parser().with_fuzzy_strategy(FuzzyStrategy::similarity());
    let fragment = parser.parse_to_sql("name:roam~1").unwrap();
    assert_eq!(fragment.clause, r#"similarity("name"::text, $1) > 0.3"#);
    assert_eq!(fragment.params, vec![json!("roam")]);
}

#[test]
fn test_fuzzy_on_bare_term_is_implicit_search() {
    let parser = user_parser().with_fuzzy_strategy(FuzzyStrategy::similarity());
    for query in ["roam~2", "roam~"] {
        let fragment = parser.parse_to_sql(query).unwrap();
        assert_eq!(
            fragment.clause,
            r#"("name"::text ILIKE $1 OR "email"::text ILIKE $2 OR "description"::text ILIKE $3)"#,
            "{}",
            query
        );
        assert_eq!(fragment.params, vec![json!("%roam%"); 3]);
    }
}

#[test]
fn test_invalid_similarity_threshold_fails_to_compile() {
    for threshold in [f64::NAN, f64::INFINITY, 2.0] {
        let parser = user_parser().with_fuzzy_strategy(FuzzyStrategy::Similarity { threshold });
        let err = parser.parse_to_sql("name:roam~1").unwrap_err();
        assert!(matches!(err, QueryError::InvalidSimilarityThreshold { .. }));
        assert!(!err.is_client_error());

        // only fuzzy terms consult the threshold
        assert!(parser.parse_to_sql("name:roam").is_ok());
    }
}

#[test]
fn test_fuzzy_on_wildcard_keeps_wildcard() {
    let (clause, params) = sql("name:ro*~");
    assert_eq!(clause, r#""name"::text ILIKE $1"#);
    assert_eq!(params, vec![json!("ro%")]);
}

// ============================================================================
// Compiler reuse
// ============================================================================

#[test]
fn test_compiler_reuse_is_deterministic() {
    let compiler = SqlCompiler::new(PostgresDialect::new());
    let node = user_parser()
        .parse_to_node("name:jo* AND age:[18 TO *] -status:banned")
        .unwrap()
        .unwrap();

    let first = compiler.compile(&node).unwrap();
    let second = compiler.compile(&node).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.params.len(), 3);
}

#[test]
fn test_fragment_serializes() {
    let fragment = user_parser().parse_to_sql("name:john").unwrap();
    assert_eq!(
        serde_json::to_value(&fragment).unwrap(),
        json!({"clause": "\"name\" = $1", "params": ["john"]})
    );
}
