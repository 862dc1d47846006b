//! Compilers from the lowered tree to backend filter fragments.
//!
//! [`FilterCompiler`] owns the boolean structure; a [`Dialect`] renders the
//! leaves and decides the placeholder and parameter types.

mod map;
mod partiql;
mod sql;

use serde::Serialize;
use tracing::debug;

use crate::ast::{Comparison, FieldRef, Literal, LogicalOp, MatchKind, Node, WildcardPattern};
use crate::error::QueryResult;

pub use map::MapCompiler;
pub use partiql::{AttributeValue, PartiqlDialect};
pub use sql::{FuzzyStrategy, PostgresDialect, DEFAULT_SIMILARITY_THRESHOLD};

/// A filter expression and its positional parameters, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Fragment<P> {
    pub clause: String,
    pub params: Vec<P>,
}

impl<P> Fragment<P> {
    pub fn empty() -> Self {
        Self {
            clause: String::new(),
            params: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }
}

/// Leaf rendering strategy for one backend.
pub trait Dialect {
    type Param;

    /// Short name used in logs
    fn name(&self) -> &'static str;

    fn term(
        &self,
        field: &FieldRef,
        op: Comparison,
        value: &Literal,
        params: &mut Vec<Self::Param>,
    ) -> QueryResult<String>;

    fn wildcard(
        &self,
        field: &FieldRef,
        pattern: &WildcardPattern,
        kind: MatchKind,
        params: &mut Vec<Self::Param>,
    ) -> QueryResult<String>;

    fn fuzzy(
        &self,
        field: &FieldRef,
        value: &str,
        distance: u32,
        params: &mut Vec<Self::Param>,
    ) -> QueryResult<String>;

    /// Predicate that is never true
    fn match_none(&self) -> String {
        "FALSE".to_string()
    }
}

#[derive(Debug, Clone, Default)]
pub struct FilterCompiler<D> {
    dialect: D,
}

pub type SqlCompiler = FilterCompiler<PostgresDialect>;
pub type PartiqlCompiler = FilterCompiler<PartiqlDialect>;

impl<D: Dialect> FilterCompiler<D> {
    pub fn new(dialect: D) -> Self {
        Self { dialect }
    }

    pub fn dialect(&self) -> &D {
        &self.dialect
    }

    pub fn compile(&self, node: &Node) -> QueryResult<Fragment<D::Param>> {
        let mut params = Vec::new();
        let clause = self.render(node, &mut params)?;
        debug!(
            dialect = self.dialect.name(),
            params = params.len(),
            "compiled filter"
        );
        Ok(Fragment { clause, params })
    }

    /// Nothing to filter on compiles to an empty fragment.
    pub fn compile_optional(&self, node: Option<&Node>) -> QueryResult<Fragment<D::Param>> {
        match node {
            Some(node) => self.compile(node),
            None => Ok(Fragment::empty()),
        }
    }

    fn render(&self, node: &Node, params: &mut Vec<D::Param>) -> QueryResult<String> {
        match node {
            Node::Term { field, value, op } => self.dialect.term(field, *op, value, params),
            Node::Wildcard {
                field,
                pattern,
                kind,
            } => self.dialect.wildcard(field, pattern, *kind, params),
            Node::Fuzzy {
                field,
                value,
                distance,
            } => self.dialect.fuzzy(field, value, *distance, params),
            Node::MatchNone => Ok(self.dialect.match_none()),
            Node::Logical { op, children } => {
                let mut parts = Vec::with_capacity(children.len());
                for child in children {
                    let part = self.render(child, params)?;
                    if part.is_empty() {
                        continue;
                    }
                    parts.push(match op {
                        LogicalOp::Not => format!("NOT ({})", part),
                        _ => part,
                    });
                }

                // Several NOT children are negated one by one and ANDed
                let joiner = match op {
                    LogicalOp::Or => " OR ",
                    LogicalOp::And | LogicalOp::Not => " AND ",
                };

                Ok(match parts.len() {
                    0 => String::new(),
                    1 => parts.remove(0),
                    _ => format!("({})", parts.join(joiner)),
                })
            }
        }
    }
}
