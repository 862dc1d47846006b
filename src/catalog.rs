//! Field registry construction from a backend column catalog.
//!
//! Introspection is the only blocking step around parsing; it runs once,
//! ahead of time, under a caller-chosen timeout.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use lucene_core::{ColumnInfo, FieldRegistry};
use thiserror::Error;

/// Catalog query for PostgreSQL adapters; `$1` is the table name.
pub const COLUMNS_QUERY: &str = "SELECT column_name, data_type, udt_name \
     FROM information_schema.columns \
     WHERE table_name = $1 \
     ORDER BY ordinal_position";

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("schema introspection for table '{table}' timed out after {timeout:?}")]
    Timeout { table: String, timeout: Duration },

    #[error("no columns found for table '{0}'")]
    NoColumns(String),

    #[error("catalog backend error: {0}")]
    Backend(String),
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        CatalogError::Backend(err.to_string())
    }
}

/// Source of column metadata, implemented by storage adapters.
#[async_trait]
pub trait ColumnCatalog: Send + Sync {
    /// Columns of `table` in ordinal order
    async fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, CatalogError>;
}

/// Build a registry for `table`: text-like columns become default-searchable,
/// `jsonb` columns become JSON-document fields.
pub async fn introspect<C>(
    catalog: &C,
    table: &str,
    timeout: Duration,
) -> Result<FieldRegistry, CatalogError>
where
    C: ColumnCatalog + ?Sized,
{
    let columns = tokio::time::timeout(timeout, catalog.columns(table))
        .await
        .map_err(|_| {
            tracing::warn!("Introspection of {} exceeded {:?}", table, timeout);
            CatalogError::Timeout {
                table: table.to_string(),
                timeout,
            }
        })??;

    if columns.is_empty() {
        return Err(CatalogError::NoColumns(table.to_string()));
    }

    let registry = FieldRegistry::from_columns(&columns);
    tracing::info!(
        "Introspected {} columns for {} ({} default-searchable)",
        registry.len(),
        table,
        registry.default_fields().count()
    );
    Ok(registry)
}

/// In-memory catalog for tests and exported schema snapshots
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    tables: HashMap<String, Vec<ColumnInfo>>,
    delay: Option<Duration>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a snapshot shaped as `{"table": [{"column_name": .., "data_type": .., "udt_name": ..}]}`
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let tables: HashMap<String, Vec<ColumnInfo>> = serde_json::from_str(content)?;
        Ok(Self {
            tables,
            delay: None,
        })
    }

    pub fn insert(&mut self, table: &str, columns: Vec<ColumnInfo>) {
        self.tables.insert(table.to_string(), columns);
    }

    pub fn with_table(mut self, table: &str, columns: Vec<ColumnInfo>) -> Self {
        self.insert(table, columns);
        self
    }

    /// Simulate a slow backend
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }
}

#[async_trait]
impl ColumnCatalog for InMemoryCatalog {
    async fn columns(&self, table: &str) -> Result<Vec<ColumnInfo>, CatalogError> {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.tables.get(table).cloned().unwrap_or_default())
    }
}
