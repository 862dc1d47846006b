use serde_json::{json, Map, Value};

use crate::ast::{Comparison, EnhancedKind, EnhancedNode, Literal, Node, RangeInfo};

/// Renders the annotated tree as nested JSON for debugging and for backends
/// without a dedicated compiler.
///
/// Terms are keyed by field name, groups by operator (`AND`/`OR`/`NOT`).
/// Modifiers survive as `$required`, `$prohibited`, `$boost`, `$proximity`,
/// `$fuzzy` and `$range` keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapCompiler;

impl MapCompiler {
    pub fn new() -> Self {
        Self
    }

    /// `None` (blank query) renders as an empty object.
    pub fn compile(&self, node: Option<&EnhancedNode>) -> Value {
        match node {
            Some(node) => Value::Object(self.enhanced_to_map(node)),
            None => Value::Object(Map::new()),
        }
    }

    fn enhanced_to_map(&self, node: &EnhancedNode) -> Map<String, Value> {
        let mut map = match &node.kind {
            EnhancedKind::Leaf(leaf) => node_to_map(leaf),
            EnhancedKind::Range(range) => range_to_map(range),
            EnhancedKind::Group { op, children } => {
                let children: Vec<Value> = children
                    .iter()
                    .map(|child| Value::Object(self.enhanced_to_map(child)))
                    .collect();
                let mut map = Map::new();
                map.insert(op.as_str().to_string(), Value::Array(children));
                map
            }
        };

        if node.required {
            map.insert("$required".into(), Value::Bool(true));
        }
        if node.prohibited {
            map.insert("$prohibited".into(), Value::Bool(true));
        }
        if let Some(boost) = node.boost {
            map.insert("$boost".into(), json!(boost));
        }
        if let Some(proximity) = node.proximity {
            map.insert("$proximity".into(), json!(proximity));
        }
        if let Some(fuzzy) = node.fuzzy {
            map.insert("$fuzzy".into(), json!(fuzzy));
        }
        map
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Text(s) => Value::String(s.clone()),
        Literal::Null => Value::Null,
    }
}

fn operator_key(op: Comparison) -> &'static str {
    match op {
        Comparison::Eq => "$eq",
        Comparison::Gt => "$gt",
        Comparison::Gte => "$gte",
        Comparison::Lt => "$lt",
        Comparison::Lte => "$lte",
    }
}

fn node_to_map(node: &Node) -> Map<String, Value> {
    let mut map = Map::new();
    match node {
        Node::Term {
            field,
            value,
            op: Comparison::Eq,
        } => {
            map.insert(field.to_string(), literal_value(value));
        }
        Node::Term { field, value, op } => {
            map.insert(field.to_string(), json!({ operator_key(*op): literal_value(value) }));
        }
        Node::Wildcard {
            field,
            pattern,
            kind,
        } => {
            map.insert(
                field.to_string(),
                json!({ "$wildcard": pattern.to_lucene(*kind) }),
            );
        }
        Node::Fuzzy {
            field,
            value,
            distance,
        } => {
            map.insert(
                field.to_string(),
                json!({ "$fuzzy": { "value": value, "distance": distance } }),
            );
        }
        Node::Logical { op, children } => {
            let children: Vec<Value> = children
                .iter()
                .map(|child| Value::Object(node_to_map(child)))
                .collect();
            map.insert(op.as_str().to_string(), Value::Array(children));
        }
        Node::MatchNone => {
            map.insert("$none".into(), Value::Bool(true));
        }
    }
    map
}

fn range_to_map(range: &RangeInfo) -> Map<String, Value> {
    let (lower, upper) = if range.inclusive {
        (Comparison::Gte, Comparison::Lte)
    } else {
        (Comparison::Gt, Comparison::Lt)
    };

    let mut bounds = Map::new();
    if let Some(min) = &range.min {
        bounds.insert(operator_key(lower).into(), literal_value(min));
    }
    if let Some(max) = &range.max {
        bounds.insert(operator_key(upper).into(), literal_value(max));
    }

    let open = || Value::String("*".into());
    let mut map = Map::new();
    map.insert(range.field.to_string(), Value::Object(bounds));
    map.insert(
        "$range".into(),
        json!({
            "min": range.min.as_ref().map(literal_value).unwrap_or_else(open),
            "max": range.max.as_ref().map(literal_value).unwrap_or_else(open),
            "inclusive": range.inclusive,
        }),
    );
    map
}
