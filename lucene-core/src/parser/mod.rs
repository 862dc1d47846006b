//! Recursive-descent parser for Lucene query strings.
//!
//! Grammar, loosest binding first:
//!
//! ```text
//! Expression := Or
//! Or         := And ( OR And )*
//! And        := Unary ( (AND | <implicit>) Unary )*
//! Unary      := NOT Primary | '+' Primary | '-' Primary | Primary
//! Primary    := '(' Expression ')' [^n] | Phrase | Term
//! ```
//!
//! Every call works on its own token buffer and counters; only the field
//! registry is shared between parses.

mod lowering;
mod terms;


use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, warn};

use crate::ast::{EnhancedNode, LogicalOp, Node};
use crate::compiler::{
    AttributeValue, Fragment, FuzzyStrategy, MapCompiler, PartiqlCompiler, PartiqlDialect,
    PostgresDialect, SqlCompiler,
};
use crate::error::{QueryError, QueryResult};
use crate::fields::FieldRegistry;
use crate::lexer::{Lexer, Token, TokenKind};
use crate::limits::ParserLimits;

pub use lowering::lower;

/// Entry point: parses queries against a fixed field registry and limits.
///
/// Cheap to clone; clones share the registry.
#[derive(Debug, Clone)]
pub struct QueryParser {
    registry: Arc<FieldRegistry>,
    limits: ParserLimits,
    fuzzy: FuzzyStrategy,
}

impl QueryParser {
    pub fn new(registry: impl Into<FieldRegistry>) -> Self {
        Self::with_registry(Arc::new(registry.into()))
    }

    pub fn with_registry(registry: Arc<FieldRegistry>) -> Self {
        Self {
            registry,
            limits: ParserLimits::default(),
            fuzzy: FuzzyStrategy::default(),
        }
    }

    pub fn with_limits(mut self, limits: ParserLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Fuzzy rendering used by [`QueryParser::parse_to_sql`]
    pub fn with_fuzzy_strategy(mut self, fuzzy: FuzzyStrategy) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    pub fn registry(&self) -> &FieldRegistry {
        &self.registry
    }

    pub fn limits(&self) -> &ParserLimits {
        &self.limits
    }

    /// Parse into the annotated tree. Blank input yields `None`.
    pub fn parse(&self, query: &str) -> QueryResult<Option<EnhancedNode>> {
        if query.len() > self.limits.max_query_length {
            warn!(
                length = query.len(),
                max = self.limits.max_query_length,
                "rejecting oversized query"
            );
            return Err(QueryError::QueryTooLong {
                length: query.len(),
                max: self.limits.max_query_length,
            });
        }

        if query.trim().is_empty() {
            return Ok(None);
        }

        debug!(length = query.len(), "parsing query");
        let tokens = Lexer::new(query).tokenize()?;
        let mut parser = Parser::new(tokens, &self.registry, &self.limits);
        let node = parser.parse_query()?;
        debug!(terms = parser.terms, "parsed query");

        Ok(Some(node))
    }

    /// Parse and lower to the plain tree consumed by the compilers.
    pub fn parse_to_node(&self, query: &str) -> QueryResult<Option<Node>> {
        Ok(self.parse(query)?.and_then(lower))
    }

    pub fn parse_to_sql(&self, query: &str) -> QueryResult<Fragment<Value>> {
        let compiler = SqlCompiler::new(PostgresDialect::new().with_fuzzy(self.fuzzy));
        compiler.compile_optional(self.parse_to_node(query)?.as_ref())
    }

    pub fn parse_to_partiql(&self, query: &str) -> QueryResult<Fragment<AttributeValue>> {
        let compiler = PartiqlCompiler::new(PartiqlDialect);
        compiler.compile_optional(self.parse_to_node(query)?.as_ref())
    }

    pub fn parse_to_map(&self, query: &str) -> QueryResult<Value> {
        Ok(MapCompiler::new().compile(self.parse(query)?.as_ref()))
    }
}

/// Single-use parse session.
pub(crate) struct Parser<'a> {
    tokens: Vec<Token>,
    position: usize,
    eof: Token,
    pub(crate) registry: &'a FieldRegistry,
    limits: &'a ParserLimits,
    depth: usize,
    pub(crate) terms: usize,
}

impl<'a> Parser<'a> {
    pub(crate) fn new(tokens: Vec<Token>, registry: &'a FieldRegistry, limits: &'a ParserLimits) -> Self {
        let end = tokens.last().map(|t| t.position).unwrap_or_default();
        Self {
            tokens,
            position: 0,
            eof: Token::new(TokenKind::Eof, "", end),
            registry,
            limits,
            depth: 0,
            terms: 0,
        }
    }

    pub(crate) fn current_token(&self) -> &Token {
        self.tokens.get(self.position).unwrap_or(&self.eof)
    }

    pub(crate) fn advance(&mut self) {
        if self.position < self.tokens.len() {
            self.position += 1;
        }
    }

    pub(crate) fn expect(&mut self, expected: TokenKind, message: &str) -> QueryResult<()> {
        if self.current_token().is(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(message))
        }
    }

    /// Syntax error at the current token.
    pub(crate) fn unexpected(&self, message: &str) -> QueryError {
        let token = self.current_token();
        let found = match token.kind {
            TokenKind::Eof => "end of query".to_string(),
            _ => format!("'{}'", token.text),
        };
        QueryError::syntax(format!("{}, found {}", message, found), token.position)
    }

    fn check_depth(&self) -> QueryResult<()> {
        if self.depth > self.limits.max_depth {
            warn!(
                depth = self.depth,
                max = self.limits.max_depth,
                "query nesting limit reached"
            );
            return Err(QueryError::NestingTooDeep {
                depth: self.depth,
                max: self.limits.max_depth,
            });
        }
        Ok(())
    }

    /// Charge one leaf against the term budget.
    pub(crate) fn count_term(&mut self) -> QueryResult<()> {
        self.terms += 1;
        if self.terms > self.limits.max_terms {
            warn!(
                terms = self.terms,
                max = self.limits.max_terms,
                "query term limit reached"
            );
            return Err(QueryError::TooManyTerms {
                count: self.terms,
                max: self.limits.max_terms,
            });
        }
        Ok(())
    }

    pub(crate) fn parse_query(&mut self) -> QueryResult<EnhancedNode> {
        let node = self.parse_expression()?;
        if !self.current_token().is(TokenKind::Eof) {
            return Err(self.unexpected("expected end of query"));
        }
        Ok(node)
    }

    fn parse_expression(&mut self) -> QueryResult<EnhancedNode> {
        self.parse_or_expression()
    }

    /// Parenthesized sub-expression; `depth` counts the open groups.
    fn parse_group(&mut self) -> QueryResult<EnhancedNode> {
        self.depth += 1;
        self.check_depth()?;
        let node = self.parse_expression()?;
        self.expect(TokenKind::RParen, "expected ')' to close group")?;
        self.depth -= 1;
        Ok(node)
    }

    fn parse_or_expression(&mut self) -> QueryResult<EnhancedNode> {
        let mut clauses = vec![self.parse_and_expression()?];

        while self.current_token().is(TokenKind::Or) {
            self.advance();
            clauses.push(self.parse_and_expression()?);
        }

        Ok(combine(LogicalOp::Or, clauses))
    }

    fn parse_and_expression(&mut self) -> QueryResult<EnhancedNode> {
        let mut clauses = vec![self.parse_unary_expression()?];

        loop {
            if self.current_token().is(TokenKind::And) {
                self.advance();
            } else if !starts_clause(self.current_token().kind) {
                break;
            }
            clauses.push(self.parse_unary_expression()?);
        }

        Ok(combine(LogicalOp::And, clauses))
    }

    fn parse_unary_expression(&mut self) -> QueryResult<EnhancedNode> {
        match self.current_token().kind {
            TokenKind::Not | TokenKind::Minus => {
                self.advance();
                let node = self.parse_primary_expression()?;
                Ok(prohibit(node))
            }
            TokenKind::Plus => {
                self.advance();
                let mut node = self.parse_primary_expression()?;
                node.required = true;
                Ok(node)
            }
            _ => self.parse_primary_expression(),
        }
    }

    fn parse_primary_expression(&mut self) -> QueryResult<EnhancedNode> {
        match self.current_token().kind {
            TokenKind::LParen => {
                self.advance();
                let mut node = self.parse_group()?;
                let modifiers = self.parse_modifiers()?;
                if modifiers.boost.is_some() {
                    node.boost = modifiers.boost;
                }
                Ok(node)
            }
            TokenKind::String => self.parse_bare_phrase(),
            TokenKind::Ident | TokenKind::Number | TokenKind::Wildcard => self.parse_term(),
            TokenKind::LBracket | TokenKind::LBrace => {
                Err(self.unexpected("range queries require a field prefix"))
            }
            _ => Err(self.unexpected("expected a term, phrase or group")),
        }
    }
}

/// Tokens that can open a new clause without an explicit operator.
fn starts_clause(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Ident
            | TokenKind::String
            | TokenKind::Number
            | TokenKind::Wildcard
            | TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Not
            | TokenKind::LParen
            | TokenKind::LBracket
            | TokenKind::LBrace
    )
}

fn combine(op: LogicalOp, mut clauses: Vec<EnhancedNode>) -> EnhancedNode {
    if clauses.len() == 1 {
        if let Some(only) = clauses.pop() {
            return only;
        }
    }
    EnhancedNode::group(op, clauses)
}

/// Mark a clause prohibited; an already prohibited clause is wrapped so the
/// negations nest.
fn prohibit(mut node: EnhancedNode) -> EnhancedNode {
    if node.prohibited {
        let mut wrapper = EnhancedNode::group(LogicalOp::And, vec![node]);
        wrapper.prohibited = true;
        wrapper
    } else {
        node.prohibited = true;
        node
    }
}
