//! Field registry: which fields exist, which hold JSON documents, and which
//! take part in implicit (unprefixed) search.
//!
//! A registry is built once, from an explicit list, from a type's published
//! descriptors, or from a column catalog, and is read-only afterwards.

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ast::FieldRef;

/// Column data types searched by default when introspected from a catalog
const TEXT_TYPES: &[&str] = &[
    "text",
    "character varying",
    "varchar",
    "character",
    "char",
    "name",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    /// Column holds a JSON document reachable through `name.sub` access
    #[serde(default)]
    pub json_document: bool,
    /// Participates in implicit search
    #[serde(default)]
    pub default_search: bool,
}

impl FieldInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            json_document: false,
            default_search: false,
        }
    }

    /// Plain field searched by bare terms
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name).default_search(true)
    }

    /// JSON-document field, reachable only through dotted access
    pub fn json(name: impl Into<String>) -> Self {
        Self {
            json_document: true,
            ..Self::new(name)
        }
    }

    pub fn default_search(mut self, enabled: bool) -> Self {
        self.default_search = enabled;
        self
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FieldSpecError {
    #[error("field name cannot be empty")]
    EmptyName,

    #[error("unknown field flag '{0}' (expected json, default or nodefault)")]
    UnknownFlag(String),
}

/// Parses `name[:json][:default|:nodefault]`.
///
/// Plain fields default to searchable, JSON fields to not searchable.
impl FromStr for FieldInfo {
    type Err = FieldSpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(FieldSpecError::EmptyName);
        }

        let mut json = false;
        let mut search = None;
        for flag in parts {
            match flag.trim().to_ascii_lowercase().as_str() {
                "json" | "jsonb" => json = true,
                "default" => search = Some(true),
                "nodefault" => search = Some(false),
                other => return Err(FieldSpecError::UnknownFlag(other.to_string())),
            }
        }

        Ok(Self {
            name: name.to_string(),
            json_document: json,
            default_search: search.unwrap_or(!json),
        })
    }
}

/// Value type of a described field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Text,
    Json,
    Other,
}

/// Default-search override for a described field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    /// Searchable iff the field is text
    #[default]
    Auto,
    Default,
    NoDefault,
}

/// Ahead-of-time description of one field of a searchable type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    pub value_type: ValueType,
    pub search: SearchMode,
}

impl FieldDescriptor {
    pub fn new(name: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value_type,
            search: SearchMode::Auto,
        }
    }

    pub fn with_search(mut self, search: SearchMode) -> Self {
        self.search = search;
        self
    }

    pub fn to_field_info(&self) -> FieldInfo {
        let json_document = self.value_type == ValueType::Json;
        let default_search = match self.search {
            SearchMode::Default => true,
            SearchMode::NoDefault => false,
            SearchMode::Auto => self.value_type == ValueType::Text,
        };
        FieldInfo {
            name: self.name.clone(),
            json_document,
            default_search,
        }
    }
}

/// Implemented by types that publish their searchable fields.
pub trait SearchableModel {
    fn field_descriptors() -> Vec<FieldDescriptor>;
}

/// One row of `information_schema.columns`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnInfo {
    pub column_name: String,
    pub data_type: String,
    pub udt_name: String,
}

impl ColumnInfo {
    pub fn new(
        column_name: impl Into<String>,
        data_type: impl Into<String>,
        udt_name: impl Into<String>,
    ) -> Self {
        Self {
            column_name: column_name.into(),
            data_type: data_type.into(),
            udt_name: udt_name.into(),
        }
    }

    pub fn is_json_document(&self) -> bool {
        self.udt_name.eq_ignore_ascii_case("jsonb") || self.data_type.eq_ignore_ascii_case("jsonb")
    }

    pub fn to_field_info(&self) -> FieldInfo {
        FieldInfo {
            name: self.column_name.clone(),
            json_document: self.is_json_document(),
            default_search: is_text_type(&self.data_type, &self.udt_name),
        }
    }
}

/// Text-like column types are good candidates for implicit search.
pub fn is_text_type(data_type: &str, udt_name: &str) -> bool {
    let data_type = data_type.to_ascii_lowercase();
    let udt_name = udt_name.to_ascii_lowercase();
    TEXT_TYPES
        .iter()
        .any(|t| *t == data_type || *t == udt_name)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldRegistry {
    fields: Vec<FieldInfo>,
    index: HashMap<String, usize>,
}

impl FieldRegistry {
    /// A later entry with the same name replaces the earlier one.
    pub fn new(fields: Vec<FieldInfo>) -> Self {
        let mut registry = Self::default();
        for field in fields {
            match registry.index.get(&field.name) {
                Some(&i) => registry.fields[i] = field,
                None => {
                    registry
                        .index
                        .insert(field.name.clone(), registry.fields.len());
                    registry.fields.push(field);
                }
            }
        }
        registry
    }

    pub fn from_descriptors(descriptors: &[FieldDescriptor]) -> Self {
        Self::new(descriptors.iter().map(FieldDescriptor::to_field_info).collect())
    }

    pub fn for_model<T: SearchableModel>() -> Self {
        Self::from_descriptors(&T::field_descriptors())
    }

    pub fn from_columns(columns: &[ColumnInfo]) -> Self {
        Self::new(columns.iter().map(ColumnInfo::to_field_info).collect())
    }

    pub fn get(&self, name: &str) -> Option<&FieldInfo> {
        self.index.get(name).map(|&i| &self.fields[i])
    }

    pub fn is_json_document(&self, name: &str) -> bool {
        self.get(name).is_some_and(|f| f.json_document)
    }

    pub fn default_fields(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter().filter(|f| f.default_search)
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldInfo> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Resolve a field name as written in a query.
    ///
    /// `base.sub.key` becomes a JSON accessor only when `base` is a registered
    /// JSON-document field; otherwise the dots stay part of the column name.
    pub fn resolve(&self, name: &str) -> FieldRef {
        if let Some((base, rest)) = name.split_once('.') {
            if self.is_json_document(base) {
                let path: Vec<String> = rest
                    .split('.')
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if !path.is_empty() {
                    return FieldRef::json(base, path);
                }
            }
        }
        FieldRef::column(name)
    }
}

impl From<Vec<FieldInfo>> for FieldRegistry {
    fn from(fields: Vec<FieldInfo>) -> Self {
        Self::new(fields)
    }
}
