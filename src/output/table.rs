//! Tabular view of a record set
//!
//! Records become rows; columns appear in order of first appearance across
//! all records and missing fields are null.

use crate::error::{Error, Result};
use crate::flatten::ensure_scalar;
use crate::pagination::RecordSet;
use crate::types::JsonValue;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Timestamp format used when rendering datetimes as text
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One scalar value of a table
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Cell {
    /// Convert a scalar JSON value
    ///
    /// Callers must reject nested values first; they map to their JSON text.
    pub fn from_json(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Cell::Null,
            JsonValue::Bool(b) => Cell::Bool(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Cell::Int(i),
                None => n.as_f64().map_or(Cell::Null, Cell::Float),
            },
            JsonValue::String(s) => Cell::Text(s.clone()),
            other => Cell::Text(other.to_string()),
        }
    }

    /// Check if the cell is null
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Render as text (null is empty)
    pub fn to_text(&self) -> String {
        match self {
            Cell::Null => String::new(),
            Cell::Bool(b) => b.to_string(),
            Cell::Int(i) => i.to_string(),
            Cell::Float(f) => f.to_string(),
            Cell::Text(s) => s.clone(),
            Cell::DateTime(dt) => dt.format(DATETIME_FORMAT).to_string(),
        }
    }
}

// ============================================================================
// SQL Types
// ============================================================================

/// Destination column type inferred from the cells of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Boolean,
    BigInt,
    Double,
    Timestamp,
    Varchar,
}

impl SqlType {
    /// Type of a single cell (`None` for null)
    pub fn of(cell: &Cell) -> Option<SqlType> {
        match cell {
            Cell::Null => None,
            Cell::Bool(_) => Some(SqlType::Boolean),
            Cell::Int(_) => Some(SqlType::BigInt),
            Cell::Float(_) => Some(SqlType::Double),
            Cell::Text(_) => Some(SqlType::Varchar),
            Cell::DateTime(_) => Some(SqlType::Timestamp),
        }
    }

    /// Merge two types, returning the more general type
    pub fn merge_with(self, other: SqlType) -> SqlType {
        match (self, other) {
            (a, b) if a == b => a,
            (SqlType::BigInt, SqlType::Double) | (SqlType::Double, SqlType::BigInt) => {
                SqlType::Double
            }
            // Incompatible types - fall back to text
            _ => SqlType::Varchar,
        }
    }

    /// Type name used in DDL
    pub fn ddl(self) -> &'static str {
        match self {
            SqlType::Boolean => "BOOLEAN",
            SqlType::BigInt => "BIGINT",
            SqlType::Double => "DOUBLE",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::Varchar => "VARCHAR",
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.ddl())
    }
}

// ============================================================================
// Table
// ============================================================================

/// Rows and named columns built from a record set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Create a table from columns and rows
    ///
    /// Every row must have exactly one cell per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        if let Some(row) = rows.iter().position(|r| r.len() != columns.len()) {
            return Err(Error::schema(format!(
                "row {row} has {} cells, expected {}",
                rows[row].len(),
                columns.len()
            )));
        }
        Ok(Self { columns, rows })
    }

    /// Build a table from a record set
    ///
    /// Fails without building anything when a record is not an object or
    /// any value is a mapping or a list.
    pub fn from_records(records: &RecordSet) -> Result<Self> {
        ensure_scalar(records)?;

        let mut columns: Vec<String> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();
        for record in records {
            if let JsonValue::Object(map) = record {
                for key in map.keys() {
                    if !index.contains_key(key) {
                        index.insert(key.clone(), columns.len());
                        columns.push(key.clone());
                    }
                }
            }
        }

        let rows = records
            .iter()
            .map(|record| {
                let mut row = vec![Cell::Null; columns.len()];
                if let JsonValue::Object(map) = record {
                    for (key, value) in map {
                        if let Some(&i) = index.get(key) {
                            row[i] = Cell::from_json(value);
                        }
                    }
                }
                row
            })
            .collect();

        Ok(Self { columns, rows })
    }

    /// Column names in order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Rows in order
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Iterate over the cells of one column
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> {
        self.rows.iter().filter_map(move |row| row.get(index))
    }

    /// Replace every cell of one column, returning how many calls reported a substitution
    pub fn map_column<F>(&mut self, index: usize, mut f: F) -> usize
    where
        F: FnMut(&Cell) -> (Cell, bool),
    {
        let mut substituted = 0;
        for row in &mut self.rows {
            if let Some(cell) = row.get_mut(index) {
                let (value, changed) = f(cell);
                if changed {
                    substituted += 1;
                }
                *cell = value;
            }
        }
        substituted
    }

    /// Destination type of every column
    ///
    /// All-null columns are `VARCHAR`.
    pub fn column_types(&self) -> Vec<SqlType> {
        (0..self.columns.len())
            .map(|i| {
                self.column(i)
                    .filter_map(SqlType::of)
                    .reduce(SqlType::merge_with)
                    .unwrap_or(SqlType::Varchar)
            })
            .collect()
    }
}
