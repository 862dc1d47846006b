use tracing::debug;

use super::Parser;
use crate::ast::{
    EnhancedNode, FieldRef, Literal, LogicalOp, MatchKind, Node, RangeInfo, WildcardPattern,
};
use crate::error::{QueryError, QueryResult};
use crate::lexer::TokenKind;

/// Distance used by a bare `~`
pub const DEFAULT_FUZZY_DISTANCE: u32 = 2;

/// Postfix `~n` / `^n`, accepted once each in either order.
#[derive(Debug, Default)]
pub(crate) struct Modifiers {
    pub distance: Option<u32>,
    pub boost: Option<f64>,
}

impl<'a> Parser<'a> {
    pub(crate) fn parse_modifiers(&mut self) -> QueryResult<Modifiers> {
        let mut modifiers = Modifiers::default();
        let mut seen_tilde = false;
        let mut seen_caret = false;

        loop {
            match self.current_token().kind {
                TokenKind::Tilde if !seen_tilde => {
                    seen_tilde = true;
                    self.advance();
                    let distance = if self.current_token().is(TokenKind::Number) {
                        let token = self.current_token().clone();
                        self.advance();
                        token.text.parse::<u32>().map_err(|_| {
                            QueryError::syntax(
                                format!("invalid distance '{}'", token.text),
                                token.position,
                            )
                        })?
                    } else {
                        DEFAULT_FUZZY_DISTANCE
                    };
                    modifiers.distance = Some(distance);
                }
                TokenKind::Caret if !seen_caret => {
                    seen_caret = true;
                    self.advance();
                    if self.current_token().is(TokenKind::Number) {
                        let token = self.current_token().clone();
                        self.advance();
                        let boost = token.text.parse::<f64>().map_err(|_| {
                            QueryError::syntax(
                                format!("invalid boost '{}'", token.text),
                                token.position,
                            )
                        })?;
                        modifiers.boost = Some(boost);
                    }
                }
                _ => break,
            }
        }

        Ok(modifiers)
    }

    /// `field:value`, `field:"phrase"`, `field:[a TO b]` or a bare term.
    pub(crate) fn parse_term(&mut self) -> QueryResult<EnhancedNode> {
        let token = self.current_token().clone();
        self.advance();

        if !self.current_token().is(TokenKind::Colon) {
            let modifiers = self.parse_modifiers()?;
            let mut node = self.implicit_search(&token.text, false)?;
            node.fuzzy = modifiers.distance;
            node.boost = modifiers.boost;
            return Ok(node);
        }
        self.advance(); // Skip ':'

        if has_wildcard_chars(&token.text) {
            // `*:*` matches everything
            let value = self.current_token();
            if token.text == "*" && value.is(TokenKind::Wildcard) && value.text == "*" {
                self.advance();
                return Ok(EnhancedNode::group(LogicalOp::And, Vec::new()));
            }
            return Err(QueryError::syntax(
                "field names cannot contain wildcards",
                token.position,
            ));
        }

        let field = self.registry.resolve(&token.text);

        match self.current_token().kind {
            TokenKind::LBracket | TokenKind::LBrace => self.parse_range(field),
            TokenKind::String => self.parse_field_phrase(field),
            TokenKind::Ident | TokenKind::Number | TokenKind::Wildcard => {
                self.parse_field_value(field)
            }
            _ => Err(self.unexpected("expected value after ':'")),
        }
    }

    fn parse_field_value(&mut self, field: FieldRef) -> QueryResult<EnhancedNode> {
        let token = self.current_token().clone();
        self.advance();
        let modifiers = self.parse_modifiers()?;
        self.count_term()?;

        let is_ident = token.is(TokenKind::Ident);
        let value = token.text;
        let node = if is_ident && is_null_keyword(&value) {
            Node::term(field, Literal::Null)
        } else if has_wildcard_chars(&value) {
            let (kind, pattern) = WildcardPattern::classify(&value);
            Node::Wildcard {
                field,
                pattern,
                kind,
            }
        } else {
            Node::term(field, Literal::Text(value))
        };

        let mut node = EnhancedNode::leaf(node);
        node.fuzzy = modifiers.distance;
        node.boost = modifiers.boost;
        Ok(node)
    }

    /// Phrases match exactly; wildcard characters inside them are literal.
    fn parse_field_phrase(&mut self, field: FieldRef) -> QueryResult<EnhancedNode> {
        let phrase = self.current_token().text.clone();
        self.advance();
        let modifiers = self.parse_modifiers()?;
        self.count_term()?;

        let mut node = EnhancedNode::leaf(Node::term(field, Literal::Text(phrase)));
        node.is_phrase = true;
        node.proximity = modifiers.distance;
        node.boost = modifiers.boost;
        Ok(node)
    }

    pub(crate) fn parse_bare_phrase(&mut self) -> QueryResult<EnhancedNode> {
        let phrase = self.current_token().text.clone();
        self.advance();
        let modifiers = self.parse_modifiers()?;

        let mut node = self.implicit_search(&phrase, true)?;
        node.is_phrase = true;
        node.proximity = modifiers.distance;
        node.boost = modifiers.boost;
        Ok(node)
    }

    fn parse_range(&mut self, field: FieldRef) -> QueryResult<EnhancedNode> {
        let inclusive = self.current_token().is(TokenKind::LBracket);
        self.advance();

        let min = self.parse_range_bound("expected lower bound in range")?;
        self.expect(TokenKind::To, "expected TO in range")?;
        let max = self.parse_range_bound("expected upper bound in range")?;

        if inclusive {
            self.expect(TokenKind::RBracket, "expected ']' to close range")?;
        } else {
            self.expect(TokenKind::RBrace, "expected '}' to close range")?;
        }

        if min.is_none() && max.is_none() {
            return Err(QueryError::UnboundedRange {
                field: field.to_string(),
            });
        }

        let modifiers = self.parse_modifiers()?;
        self.count_term()?;

        let mut node = EnhancedNode::range(RangeInfo {
            field,
            min,
            max,
            inclusive,
        });
        node.boost = modifiers.boost;
        Ok(node)
    }

    /// `None` for an open `*` bound.
    fn parse_range_bound(&mut self, message: &str) -> QueryResult<Option<Literal>> {
        let token = self.current_token().clone();
        let bound = match token.kind {
            TokenKind::Wildcard if token.text.chars().all(|c| c == '*') => None,
            TokenKind::Ident if is_null_keyword(&token.text) => Some(Literal::Null),
            TokenKind::Ident | TokenKind::Number | TokenKind::String | TokenKind::Wildcard => {
                Some(Literal::Text(token.text))
            }
            _ => return Err(self.unexpected(message)),
        };
        self.advance();
        Ok(bound)
    }

    /// OR across every default-searchable field, one term charged per field.
    pub(crate) fn implicit_search(&mut self, value: &str, phrase: bool) -> QueryResult<EnhancedNode> {
        let registry = self.registry;
        let fields: Vec<_> = registry.default_fields().collect();
        if fields.is_empty() {
            return Err(QueryError::NoDefaultFields);
        }
        debug!(fields = fields.len(), phrase, "expanding implicit search");

        let (kind, pattern) = if !phrase && has_wildcard_chars(value) {
            WildcardPattern::classify(value)
        } else {
            (MatchKind::Contains, WildcardPattern::literal(value))
        };

        let mut children = Vec::with_capacity(fields.len());
        for info in fields {
            self.count_term()?;
            children.push(EnhancedNode::leaf(Node::Wildcard {
                field: FieldRef::column(info.name.as_str()),
                pattern: pattern.clone(),
                kind,
            }));
        }

        Ok(EnhancedNode::group(LogicalOp::Or, children))
    }
}

fn is_null_keyword(value: &str) -> bool {
    value.eq_ignore_ascii_case("null") || value.eq_ignore_ascii_case("nil")
}

fn has_wildcard_chars(value: &str) -> bool {
    value.contains(['*', '?'])
}
