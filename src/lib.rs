//! lucene-filter - translate end-user Lucene query strings into
//! parameterized filters for PostgreSQL and PartiQL backends.
//!
//! The parser and compilers live in [`lucene_core`] and are re-exported here.
//! This crate adds file/environment configuration and column-catalog
//! introspection.

pub mod catalog;
pub mod config;

pub use catalog::{introspect, CatalogError, ColumnCatalog, InMemoryCatalog, COLUMNS_QUERY};
pub use config::{Config, FuzzyMode, SqlConfig, CONFIG_FILE_NAME};
pub use lucene_core::*;
