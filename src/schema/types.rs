//! Schema types

use crate::error::{Error, Result};
use crate::load::TableName;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Declared type of one destination column
///
/// Parsed from free-form tags such as `int(11)`, `datetime` or
/// `varchar(255)` by substring match; unrecognized tags pass through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ColumnType {
    Int,
    DateTime,
    Varchar,
    Other(String),
}

impl ColumnType {
    /// Parse a type tag
    pub fn parse(tag: &str) -> Self {
        let lower = tag.trim().to_lowercase();
        if lower.contains("int") {
            ColumnType::Int
        } else if lower.contains("datetime") || lower.contains("timestamp") || lower.contains("date")
        {
            ColumnType::DateTime
        } else if lower.contains("varchar") || lower.contains("char") || lower.contains("text") {
            ColumnType::Varchar
        } else {
            ColumnType::Other(tag.trim().to_string())
        }
    }

    /// Check if values of this type are converted during a load
    pub fn is_coerced(&self) -> bool {
        !matches!(self, ColumnType::Other(_))
    }
}

impl From<String> for ColumnType {
    fn from(tag: String) -> Self {
        ColumnType::parse(&tag)
    }
}

impl From<ColumnType> for String {
    fn from(column_type: ColumnType) -> Self {
        column_type.to_string()
    }
}

impl std::fmt::Display for ColumnType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColumnType::Int => write!(f, "int"),
            ColumnType::DateTime => write!(f, "datetime"),
            ColumnType::Varchar => write!(f, "varchar"),
            ColumnType::Other(tag) => write!(f, "{tag}"),
        }
    }
}

/// Declared column types per table
///
/// Loaded once per run from a JSON object mapping table names to ordered
/// lists of type tags. Keys are stored sanitized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnTypeMap {
    tables: HashMap<String, Vec<ColumnType>>,
}

impl ColumnTypeMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON text
    pub fn from_json_str(content: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<ColumnType>> = serde_json::from_str(content)
            .map_err(|e| Error::schema(format!("Invalid schema description: {e}")))?;

        let mut map = Self::new();
        for (table, types) in raw {
            map.insert(&TableName::new(&table), types);
        }
        Ok(map)
    }

    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    /// Declare the column types of a table
    pub fn insert(&mut self, table: &TableName, types: Vec<ColumnType>) {
        self.tables.insert(table.as_str().to_string(), types);
    }

    /// Declared column types of a table
    pub fn get(&self, table: &TableName) -> Option<&[ColumnType]> {
        self.tables.get(table.as_str()).map(Vec::as_slice)
    }

    /// Number of tables described
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if no table is described
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}
