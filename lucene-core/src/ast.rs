use std::fmt;

/// A resolved field reference
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FieldRef {
    /// Plain column, dots included verbatim
    Column(String),
    /// Sub-field of a JSON-document column (`metadata.owner.name`)
    Json { column: String, path: Vec<String> },
}

impl FieldRef {
    pub fn column(name: impl Into<String>) -> Self {
        FieldRef::Column(name.into())
    }

    pub fn json(column: impl Into<String>, path: Vec<String>) -> Self {
        FieldRef::Json {
            column: column.into(),
            path,
        }
    }

    /// Name of the underlying column
    pub fn base(&self) -> &str {
        match self {
            FieldRef::Column(name) => name,
            FieldRef::Json { column, .. } => column,
        }
    }

    pub fn is_json(&self) -> bool {
        matches!(self, FieldRef::Json { .. })
    }
}

impl fmt::Display for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRef::Column(name) => write!(f, "{}", name),
            FieldRef::Json { column, path } => write!(f, "{}.{}", column, path.join(".")),
        }
    }
}

/// A value on the right-hand side of a term or range bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    Text(String),
    /// Unquoted `null` / `nil`
    Null,
}

impl Literal {
    pub fn text(value: impl Into<String>) -> Self {
        Literal::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Literal::Text(s) => Some(s),
            Literal::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Literal::Null)
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Text(s) => write!(f, "{}", s),
            Literal::Null => write!(f, "null"),
        }
    }
}

/// Comparison operator carried by a term
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparison::Eq => "=",
            Comparison::Gt => ">",
            Comparison::Gte => ">=",
            Comparison::Lt => "<",
            Comparison::Lte => "<=",
        }
    }

    /// Operators that order values (everything except equality)
    pub fn is_ordering(&self) -> bool {
        !matches!(self, Comparison::Eq)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl LogicalOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOp::And => "AND",
            LogicalOp::Or => "OR",
            LogicalOp::Not => "NOT",
        }
    }
}

/// Wildcard classification by position of the `*` characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    StartsWith,
    EndsWith,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatternPart {
    Literal(String),
    /// `*`
    AnyChars,
    /// `?`
    AnyChar,
}

/// Wildcard value with the classifying leading/trailing `*` removed.
///
/// Translation to a backend's own wildcard syntax happens at render time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WildcardPattern {
    parts: Vec<PatternPart>,
}

impl WildcardPattern {
    /// Classify a raw value containing `*` or `?` and strip the positional stars.
    pub fn classify(raw: &str) -> (MatchKind, WildcardPattern) {
        let leading = raw.starts_with('*');
        let trailing = raw.ends_with('*');

        let (kind, core) = match (leading, trailing) {
            (true, true) => (MatchKind::Contains, raw.trim_matches('*')),
            (true, false) => (MatchKind::EndsWith, raw.trim_start_matches('*')),
            (false, true) => (MatchKind::StartsWith, raw.trim_end_matches('*')),
            (false, false) => (MatchKind::Contains, raw),
        };

        (kind, WildcardPattern::parse(core))
    }

    /// Split text on `*` and `?`.
    pub fn parse(text: &str) -> Self {
        let mut parts = Vec::new();
        let mut literal = String::new();

        for ch in text.chars() {
            let part = match ch {
                '*' => PatternPart::AnyChars,
                '?' => PatternPart::AnyChar,
                _ => {
                    literal.push(ch);
                    continue;
                }
            };
            if !literal.is_empty() {
                parts.push(PatternPart::Literal(std::mem::take(&mut literal)));
            }
            parts.push(part);
        }
        if !literal.is_empty() {
            parts.push(PatternPart::Literal(literal));
        }

        Self { parts }
    }

    /// A pattern matching `text` verbatim (phrases, fuzzy downgrades).
    pub fn literal(text: impl Into<String>) -> Self {
        let text = text.into();
        let parts = if text.is_empty() {
            Vec::new()
        } else {
            vec![PatternPart::Literal(text)]
        };
        Self { parts }
    }

    pub fn parts(&self) -> &[PatternPart] {
        &self.parts
    }

    /// Nothing left once the positional stars are gone: `field:*`.
    pub fn is_match_all(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn has_wildcards(&self) -> bool {
        self.parts
            .iter()
            .any(|p| !matches!(p, PatternPart::Literal(_)))
    }

    /// Literal runs between wildcards
    pub fn literal_segments(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().filter_map(|p| match p {
            PatternPart::Literal(s) => Some(s.as_str()),
            _ => None,
        })
    }

    /// Rebuild the Lucene form including the positional stars of `kind`.
    pub fn to_lucene(&self, kind: MatchKind) -> String {
        let core = self.to_string();
        match kind {
            MatchKind::StartsWith => format!("{}*", core),
            MatchKind::EndsWith => format!("*{}", core),
            MatchKind::Contains if self.is_match_all() => "*".to_string(),
            MatchKind::Contains => format!("*{}*", core),
        }
    }
}

impl fmt::Display for WildcardPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for part in &self.parts {
            match part {
                PatternPart::Literal(s) => f.write_str(s)?,
                PatternPart::AnyChars => f.write_str("*")?,
                PatternPart::AnyChar => f.write_str("?")?,
            }
        }
        Ok(())
    }
}

/// Plain AST node handed to the compilers
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Term {
        field: FieldRef,
        value: Literal,
        op: Comparison,
    },
    Wildcard {
        field: FieldRef,
        pattern: WildcardPattern,
        kind: MatchKind,
    },
    /// Equality term carrying a `~n` modifier
    Fuzzy {
        field: FieldRef,
        value: String,
        distance: u32,
    },
    Logical {
        op: LogicalOp,
        children: Vec<Node>,
    },
    /// Constant false, e.g. `NOT *:*`
    MatchNone,
}

impl Node {
    pub fn term(field: FieldRef, value: Literal) -> Self {
        Node::Term {
            field,
            value,
            op: Comparison::Eq,
        }
    }

    pub fn compare(field: FieldRef, op: Comparison, value: Literal) -> Self {
        Node::Term { field, value, op }
    }

    pub fn and(children: Vec<Node>) -> Self {
        Node::Logical {
            op: LogicalOp::And,
            children,
        }
    }

    pub fn or(children: Vec<Node>) -> Self {
        Node::Logical {
            op: LogicalOp::Or,
            children,
        }
    }

    pub fn not(child: Node) -> Self {
        Node::Logical {
            op: LogicalOp::Not,
            children: vec![child],
        }
    }
}

/// Range bounds; `None` is an open (`*`) side.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeInfo {
    pub field: FieldRef,
    pub min: Option<Literal>,
    pub max: Option<Literal>,
    pub inclusive: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnhancedKind {
    Leaf(Node),
    Range(RangeInfo),
    Group {
        op: LogicalOp,
        children: Vec<EnhancedNode>,
    },
}

/// Parse-time node carrying the modifiers accumulated around a clause.
///
/// Always lowered to a [`Node`] before compilation; see [`crate::parser::lower`].
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancedNode {
    pub kind: EnhancedKind,
    /// `+clause`
    pub required: bool,
    /// `-clause`, `NOT clause`, `!clause`
    pub prohibited: bool,
    /// `^n`, informational only
    pub boost: Option<f64>,
    /// `"phrase"~n`
    pub proximity: Option<u32>,
    /// `term~n`
    pub fuzzy: Option<u32>,
    pub is_phrase: bool,
}

impl EnhancedNode {
    pub fn new(kind: EnhancedKind) -> Self {
        Self {
            kind,
            required: false,
            prohibited: false,
            boost: None,
            proximity: None,
            fuzzy: None,
            is_phrase: false,
        }
    }

    pub fn leaf(node: Node) -> Self {
        Self::new(EnhancedKind::Leaf(node))
    }

    pub fn range(range: RangeInfo) -> Self {
        Self::new(EnhancedKind::Range(range))
    }

    pub fn group(op: LogicalOp, children: Vec<EnhancedNode>) -> Self {
        Self::new(EnhancedKind::Group { op, children })
    }

    pub fn has_modifiers(&self) -> bool {
        self.required
            || self.prohibited
            || self.boost.is_some()
            || self.proximity.is_some()
            || self.fuzzy.is_some()
    }
}
