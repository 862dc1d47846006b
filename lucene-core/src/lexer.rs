//! Lexer for Lucene query strings.
//!
//! Produces one [`Token`] per call to [`Lexer::next_token`]. Once the input is
//! exhausted every further call returns an end-of-input token.

use crate::error::{QueryError, QueryResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Eof,
    Error,

    // Literals
    Ident,    // field names, bare values
    String,   // "quoted phrase"
    Number,   // 42, 3.14, 2024-01-01
    Wildcard, // *, ?, ** (identifier made only of wildcard characters)

    // Boolean operators
    And, // AND, &&
    Or,  // OR, ||
    Not, // NOT, !

    // Modifiers
    Plus,  // +
    Minus, // -
    Tilde, // ~
    Caret, // ^

    // Delimiters
    Colon,    // :
    LParen,   // (
    RParen,   // )
    LBracket, // [
    RBracket, // ]
    LBrace,   // {
    RBrace,   // }
    To,       // TO
}

/// A lexical token. `position` is the character offset of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, position: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            position,
        }
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    current_char: Option<char>,
    last_kind: Option<TokenKind>,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        let chars: Vec<char> = input.chars().collect();
        let current_char = chars.first().copied();

        Self {
            input: chars,
            position: 0,
            current_char,
            last_kind: None,
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.current_char = self.input.get(self.position).copied();
    }

    fn peek(&self) -> Option<char> {
        self.input.get(self.position + 1).copied()
    }

    fn reset_to(&mut self, position: usize) {
        self.position = position;
        self.current_char = self.input.get(position).copied();
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// A leading `-` belongs to a number only where a value is expected.
    fn expects_value(&self) -> bool {
        matches!(
            self.last_kind,
            Some(TokenKind::Colon | TokenKind::LBracket | TokenKind::LBrace | TokenKind::To)
        )
    }

    /// Whether `ch` at the current position ends an identifier.
    fn is_terminator(&self, ch: char) -> bool {
        match ch {
            '&' | '|' => self.peek() == Some(ch),
            _ => ch.is_whitespace() || is_special_char(ch),
        }
    }

    fn single(&mut self, kind: TokenKind, start: usize) -> Token {
        let ch = self.current_char.unwrap_or_default();
        self.advance();
        Token::new(kind, ch.to_string(), start)
    }

    fn double(&mut self, kind: TokenKind, start: usize) -> Token {
        let text: String = self.input[start..start + 2].iter().collect();
        self.advance();
        self.advance();
        Token::new(kind, text, start)
    }

    fn read_string(&mut self, start: usize) -> Token {
        self.advance(); // Skip opening quote

        let mut string = String::new();

        while let Some(ch) = self.current_char {
            match ch {
                '"' => {
                    self.advance();
                    return Token::new(TokenKind::String, string, start);
                }
                '\\' => {
                    self.advance();
                    match self.current_char {
                        Some(escaped) => {
                            string.push(escaped);
                            self.advance();
                        }
                        None => {
                            return Token::new(TokenKind::Error, "unexpected end in string", start)
                        }
                    }
                }
                _ => {
                    string.push(ch);
                    self.advance();
                }
            }
        }

        Token::new(TokenKind::Error, "unterminated string", start)
    }

    /// Integers, decimals and `YYYY-MM-DD` shaped values. A digit run that
    /// continues into identifier characters is re-read as an identifier.
    fn read_number(&mut self, start: usize) -> Token {
        let mut number = String::new();

        if self.current_char == Some('-') {
            number.push('-');
            self.advance();
        }

        while let Some(ch) = self.current_char.filter(|c| c.is_ascii_digit()) {
            number.push(ch);
            self.advance();
        }

        if let Some(separator) = self.current_char.filter(|c| *c == '.' || *c == '-') {
            if self.peek().is_some_and(|c| c.is_ascii_digit()) {
                number.push(separator);
                self.advance();
                while let Some(ch) = self
                    .current_char
                    .filter(|c| c.is_ascii_digit() || *c == separator)
                {
                    number.push(ch);
                    self.advance();
                }
            }
        }

        match self.current_char {
            Some(ch) if !self.is_terminator(ch) => {
                self.reset_to(start);
                if number.starts_with('-') {
                    self.single(TokenKind::Minus, start)
                } else {
                    self.read_identifier(start)
                }
            }
            _ => Token::new(TokenKind::Number, number, start),
        }
    }

    fn read_identifier(&mut self, start: usize) -> Token {
        let mut ident = String::new();
        let mut escaped = false;

        while let Some(ch) = self.current_char {
            if ch == '\\' {
                self.advance();
                match self.current_char {
                    Some(next) => {
                        ident.push(next);
                        escaped = true;
                        self.advance();
                    }
                    None => {
                        return Token::new(
                            TokenKind::Error,
                            "unexpected end after backslash",
                            start,
                        )
                    }
                }
                continue;
            }
            if self.is_terminator(ch) {
                break;
            }
            ident.push(ch);
            self.advance();
        }

        if !escaped && !ident.is_empty() && ident.chars().all(|c| c == '*' || c == '?') {
            return Token::new(TokenKind::Wildcard, ident, start);
        }

        let kind = match ident.to_uppercase().as_str() {
            "AND" => TokenKind::And,
            "OR" => TokenKind::Or,
            "NOT" => TokenKind::Not,
            "TO" => TokenKind::To,
            _ => TokenKind::Ident,
        };
        Token::new(kind, ident, start)
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();
        let start = self.position;

        let token = match self.current_char {
            None => Token::new(TokenKind::Eof, "", start),
            Some('"') => self.read_string(start),
            Some('-') => {
                let digit_follows = self.peek().is_some_and(|c| c.is_ascii_digit());
                if digit_follows && self.expects_value() {
                    self.read_number(start)
                } else {
                    self.single(TokenKind::Minus, start)
                }
            }
            Some('+') => self.single(TokenKind::Plus, start),
            Some(':') => self.single(TokenKind::Colon, start),
            Some('(') => self.single(TokenKind::LParen, start),
            Some(')') => self.single(TokenKind::RParen, start),
            Some('[') => self.single(TokenKind::LBracket, start),
            Some(']') => self.single(TokenKind::RBracket, start),
            Some('{') => self.single(TokenKind::LBrace, start),
            Some('}') => self.single(TokenKind::RBrace, start),
            Some('~') => self.single(TokenKind::Tilde, start),
            Some('^') => self.single(TokenKind::Caret, start),
            Some('!') => self.single(TokenKind::Not, start),
            Some('&') if self.peek() == Some('&') => self.double(TokenKind::And, start),
            Some('|') if self.peek() == Some('|') => self.double(TokenKind::Or, start),
            Some(ch) if ch.is_ascii_digit() => self.read_number(start),
            Some(_) => self.read_identifier(start),
        };

        self.last_kind = Some(token.kind);
        token
    }

    /// Collect every token up to and including end-of-input.
    pub fn tokenize(&mut self) -> QueryResult<Vec<Token>> {
        let mut tokens = Vec::new();

        loop {
            let token = self.next_token();
            match token.kind {
                TokenKind::Error => return Err(QueryError::syntax(token.text, token.position)),
                TokenKind::Eof => {
                    tokens.push(token);
                    break;
                }
                _ => tokens.push(token),
            }
        }

        Ok(tokens)
    }
}

/// Characters with operator meaning in Lucene syntax.
fn is_special_char(ch: char) -> bool {
    matches!(
        ch,
        ':' | '(' | ')' | '[' | ']' | '{' | '}' | '+' | '-' | '!' | '~' | '^' | '"'
    )
}
