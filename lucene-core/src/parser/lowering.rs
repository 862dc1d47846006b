use crate::ast::{Comparison, EnhancedKind, EnhancedNode, Literal, LogicalOp, Node, RangeInfo};

/// Lower an annotated tree to the plain form the compilers consume.
///
/// - prohibited clauses are wrapped in a single-child NOT
/// - ranges become one or two comparisons (ANDed), or nothing when both sides are open
/// - `~n` on an equality term becomes a fuzzy node
/// - `~n` on a group (a fuzzy bare term) is ignored
/// - required, boost and proximity carry no filtering meaning and are dropped
///
/// Returns `None` when the clause places no restriction (`*:*`, an empty
/// group). An unrestricted child absorbs an OR and is skipped by an AND;
/// negating it yields [`Node::MatchNone`].
pub fn lower(node: EnhancedNode) -> Option<Node> {
    let EnhancedNode {
        kind,
        prohibited,
        fuzzy,
        ..
    } = node;

    let lowered = match kind {
        EnhancedKind::Leaf(leaf) => Some(apply_fuzzy(leaf, fuzzy)),
        EnhancedKind::Range(range) => lower_range(range),
        EnhancedKind::Group { op, children } => lower_group(op, children),
    };

    if prohibited {
        negate(lowered)
    } else {
        lowered
    }
}

fn negate(node: Option<Node>) -> Option<Node> {
    match node {
        None => Some(Node::MatchNone),
        Some(Node::MatchNone) => None,
        Some(node) => Some(Node::not(node)),
    }
}

fn lower_group(op: LogicalOp, children: Vec<EnhancedNode>) -> Option<Node> {
    if children.is_empty() {
        return None;
    }

    let mut nodes = Vec::with_capacity(children.len());
    for child in children {
        match (op, lower(child)) {
            (LogicalOp::Or, None) => return None,
            (LogicalOp::And, Some(Node::MatchNone)) | (LogicalOp::Not, None) => {
                return Some(Node::MatchNone)
            }
            // identity elements
            (LogicalOp::And, None)
            | (LogicalOp::Or, Some(Node::MatchNone))
            | (LogicalOp::Not, Some(Node::MatchNone)) => {}
            (_, Some(node)) => nodes.push(node),
        }
    }

    match (op, nodes.len()) {
        (LogicalOp::Or, 0) => Some(Node::MatchNone),
        (_, 0) => None,
        (LogicalOp::And | LogicalOp::Or, 1) => nodes.pop(),
        _ => Some(Node::Logical {
            op,
            children: nodes,
        }),
    }
}

fn apply_fuzzy(node: Node, fuzzy: Option<u32>) -> Node {
    match (node, fuzzy) {
        (
            Node::Term {
                field,
                value: Literal::Text(value),
                op: Comparison::Eq,
            },
            Some(distance),
        ) => Node::Fuzzy {
            field,
            value,
            distance,
        },
        (node, _) => node,
    }
}

fn lower_range(range: RangeInfo) -> Option<Node> {
    let RangeInfo {
        field,
        min,
        max,
        inclusive,
    } = range;

    let (lower_op, upper_op) = if inclusive {
        (Comparison::Gte, Comparison::Lte)
    } else {
        (Comparison::Gt, Comparison::Lt)
    };

    let mut conditions = Vec::with_capacity(2);
    if let Some(min) = min {
        conditions.push(Node::compare(field.clone(), lower_op, min));
    }
    if let Some(max) = max {
        conditions.push(Node::compare(field, upper_op, max));
    }

    match conditions.len() {
        0 => None,
        1 => conditions.pop(),
        _ => Some(Node::and(conditions)),
    }
}
