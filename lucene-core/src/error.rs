//! Error types for lucene-core.
//!
//! Every error is terminal: a failed parse or compile never yields a partial
//! tree or fragment.

use thiserror::Error;

/// Broad class of a [`QueryError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Malformed token sequence
    Syntax,
    /// A resource guard tripped
    LimitExceeded,
    /// Well-formed input that cannot be given a meaning
    Semantic,
}

/// Query parsing and compilation error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum QueryError {
    #[error("Syntax error at position {position}: {message}")]
    Syntax { message: String, position: usize },

    #[error("query too long: {length} bytes exceeds maximum of {max} bytes")]
    QueryTooLong { length: usize, max: usize },

    #[error("query nesting depth {depth} exceeds maximum of {max}")]
    NestingTooDeep { depth: usize, max: usize },

    #[error("query with {count} terms exceeds maximum of {max}")]
    TooManyTerms { count: usize, max: usize },

    #[error("no default fields configured for implicit search")]
    NoDefaultFields,

    #[error("both range bounds cannot be open (*) for field '{field}'")]
    UnboundedRange { field: String },

    #[error("cannot use comparison operator '{operator}' with null value on field '{field}'")]
    NullComparison { field: String, operator: String },

    #[error("similarity threshold {threshold} must be a finite number between 0 and 1")]
    InvalidSimilarityThreshold { threshold: f64 },
}

/// Result type for query operations
pub type QueryResult<T> = Result<T, QueryError>;

impl QueryError {
    pub(crate) fn syntax(message: impl Into<String>, position: usize) -> Self {
        QueryError::Syntax {
            message: message.into(),
            position,
        }
    }

    /// Classify the error.
    pub fn class(&self) -> ErrorClass {
        match self {
            QueryError::Syntax { .. } => ErrorClass::Syntax,
            QueryError::QueryTooLong { .. }
            | QueryError::NestingTooDeep { .. }
            | QueryError::TooManyTerms { .. } => ErrorClass::LimitExceeded,
            QueryError::NoDefaultFields
            | QueryError::UnboundedRange { .. }
            | QueryError::NullComparison { .. }
            | QueryError::InvalidSimilarityThreshold { .. } => ErrorClass::Semantic,
        }
    }

    /// Whether the error stems from the caller's input rather than from
    /// how the compiler was configured.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, QueryError::InvalidSimilarityThreshold { .. })
    }
}

impl serde::Serialize for QueryError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = QueryError::syntax("expected ')'", 7);
        assert_eq!(err.to_string(), "Syntax error at position 7: expected ')'");

        let err = QueryError::QueryTooLong {
            length: 12000,
            max: 10000,
        };
        assert!(err.to_string().contains("query too long"));

        let err = QueryError::NestingTooDeep { depth: 4, max: 3 };
        assert!(err.to_string().contains("nesting depth"));

        let err = QueryError::TooManyTerms { count: 6, max: 5 };
        assert!(err.to_string().contains("terms exceeds maximum"));

        assert!(QueryError::NoDefaultFields
            .to_string()
            .contains("no default fields"));
    }

    #[test]
    fn test_error_classes() {
        assert_eq!(QueryError::syntax("x", 0).class(), ErrorClass::Syntax);
        assert_eq!(
            QueryError::TooManyTerms { count: 2, max: 1 }.class(),
            ErrorClass::LimitExceeded
        );
        assert_eq!(
            QueryError::UnboundedRange {
                field: "age".to_string()
            }
            .class(),
            ErrorClass::Semantic
        );
        assert!(QueryError::NoDefaultFields.is_client_error());
        assert!(!QueryError::InvalidSimilarityThreshold { threshold: 1.5 }.is_client_error());
    }

    #[test]
    fn test_serialize_as_message() {
        let err = QueryError::NoDefaultFields;
        let json = serde_json::to_string(&err).unwrap();
        assert_eq!(json, "\"no default fields configured for implicit search\"");
    }
}
