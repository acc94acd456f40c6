//! Load types

use crate::schema::CoercionReport;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A sanitized destination table name
///
/// Quoting characters (`` ` ``, `"`, `[`, `]`) are stripped so that
/// `` `groups` `` and `groups` name the same table, both for schema lookup
/// and for writing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableName(String);

impl TableName {
    /// Sanitize a raw table name
    pub fn new(raw: &str) -> Self {
        let cleaned: String = raw
            .chars()
            .filter(|c| !matches!(c, '`' | '"' | '[' | ']'))
            .collect();
        Self(cleaned.trim().to_string())
    }

    /// The sanitized name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Check if nothing is left after sanitizing
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Name quoted as an SQL identifier
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0)
    }
}

impl std::fmt::Display for TableName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TableName {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// How rows reach an existing table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Delete existing rows, then insert
    #[default]
    Replace,
    /// Insert only
    Append,
}

impl WriteMode {
    /// Mode for a `replace` flag
    pub fn from_replace(replace: bool) -> Self {
        if replace {
            WriteMode::Replace
        } else {
            WriteMode::Append
        }
    }
}

/// Where a record set is persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadTarget {
    /// A CSV file, overwritten on every load
    Csv {
        path: PathBuf,
        /// Used only to look up declared column types
        schema_table: Option<TableName>,
    },
    /// A relational table
    Table { name: TableName, mode: WriteMode },
}

impl LoadTarget {
    /// CSV target
    pub fn csv(path: impl Into<PathBuf>) -> Self {
        LoadTarget::Csv {
            path: path.into(),
            schema_table: None,
        }
    }

    /// Table target
    pub fn table(name: impl Into<TableName>, mode: WriteMode) -> Self {
        LoadTarget::Table {
            name: name.into(),
            mode,
        }
    }

    /// Set the table name used for schema lookup of a CSV target
    #[must_use]
    pub fn with_schema_table(self, table: impl Into<TableName>) -> Self {
        match self {
            LoadTarget::Csv { path, .. } => LoadTarget::Csv {
                path,
                schema_table: Some(table.into()),
            },
            other => other,
        }
    }

    /// Table name used to look up declared column types
    pub fn schema_key(&self) -> Option<&TableName> {
        match self {
            LoadTarget::Csv { schema_table, .. } => schema_table.as_ref(),
            LoadTarget::Table { name, .. } => Some(name),
        }
    }
}

impl std::fmt::Display for LoadTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadTarget::Csv { path, .. } => write!(f, "{}", path.display()),
            LoadTarget::Table { name, .. } => write!(f, "{name}"),
        }
    }
}

/// Result of one load
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Rows written to the destination
    pub rows_written: usize,
    /// Coercion applied before writing
    pub coercion: CoercionReport,
}
