//! Lucene Core - Lucene query string parser and filter compilers.
//!
//! Turns an end-user search expression into parameterized filter fragments
//! without interpolating user text into the query body. No I/O happens here.
//!
//! # Main Components
//!
//! - **Lexer**: Tokenizes query strings
//! - **Parser**: Builds an annotated tree under length, depth and term-count limits
//! - **Fields**: Registry of searchable fields and JSON-document columns
//! - **Compiler**: Renders the tree as PostgreSQL, PartiQL or a JSON map
//!
//! # Example
//!
//! ```rust
//! use lucene_core::{FieldInfo, QueryParser};
//! use serde_json::json;
//!
//! let parser = QueryParser::new(vec![
//!     FieldInfo::text("name"),
//!     FieldInfo::text("email"),
//!     FieldInfo::json("metadata"),
//! ]);
//!
//! let fragment = parser.parse_to_sql("name:john* AND -metadata.role:admin").unwrap();
//! assert_eq!(
//!     fragment.clause,
//!     r#"("name"::text ILIKE $1 AND NOT ("metadata"->>'role' = $2))"#
//! );
//! assert_eq!(fragment.params, vec![json!("john%"), json!("admin")]);
//! ```

pub mod ast;
pub mod compiler;
pub mod error;
pub mod fields;
pub mod lexer;
pub mod limits;
pub mod parser;

// Re-export main types for convenience
pub use ast::{
    Comparison, EnhancedKind, EnhancedNode, FieldRef, Literal, LogicalOp, MatchKind, Node,
    PatternPart, RangeInfo, WildcardPattern,
};
pub use compiler::{
    AttributeValue, Dialect, FilterCompiler, Fragment, FuzzyStrategy, MapCompiler,
    PartiqlCompiler, PartiqlDialect, PostgresDialect, SqlCompiler,
};
pub use error::{ErrorClass, QueryError, QueryResult};
pub use fields::{
    is_text_type, ColumnInfo, FieldDescriptor, FieldInfo, FieldRegistry, FieldSpecError,
    SearchMode, SearchableModel, ValueType,
};
pub use lexer::{Lexer, Token, TokenKind};
pub use limits::ParserLimits;
pub use parser::{lower, QueryParser};
