//! Column type coercion
//!
//! Applied positionally: column `i` of the table gets declared type `i`.
//! Values that cannot be converted are replaced (zero for `int`, null for
//! `datetime`) and counted; coercion never fails a load.

use super::types::ColumnType;
use crate::output::{Cell, Table};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::warn;

/// Formats accepted for `datetime` columns, besides RFC 3339 and Unix seconds
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%d/%m/%Y, %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
];

/// Outcome of coercing one column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnCoercion {
    pub column: String,
    pub column_type: ColumnType,
    /// Values replaced because they could not be converted
    pub substituted: usize,
}

/// Outcome of coercing a table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoercionReport {
    pub columns: Vec<ColumnCoercion>,
}

impl CoercionReport {
    /// Total number of substituted values
    pub fn total_substituted(&self) -> usize {
        self.columns.iter().map(|c| c.substituted).sum()
    }

    /// Substituted values of one column
    pub fn substituted(&self, column: &str) -> usize {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map_or(0, |c| c.substituted)
    }

    /// Check if every value converted cleanly
    pub fn is_clean(&self) -> bool {
        self.total_substituted() == 0
    }
}

/// Coerce the columns of a table to their declared types
///
/// Columns beyond the declared list, and columns with unrecognized tags,
/// are left unchanged.
pub fn coerce_table(table: &mut Table, types: &[ColumnType]) -> CoercionReport {
    let columns: Vec<String> = table.columns().to_vec();
    let mut report = CoercionReport::default();

    for (index, (column, column_type)) in columns.iter().zip(types).enumerate() {
        let substituted = match column_type {
            ColumnType::Int => table.map_column(index, coerce_int),
            ColumnType::DateTime => table.map_column(index, coerce_datetime),
            ColumnType::Varchar => table.map_column(index, |cell| (coerce_varchar(cell), false)),
            ColumnType::Other(_) => continue,
        };

        if substituted > 0 {
            warn!(
                "Column '{}' ({}): {} value(s) could not be converted and were replaced",
                column, column_type, substituted
            );
        }
        report.columns.push(ColumnCoercion {
            column: column.clone(),
            column_type: column_type.clone(),
            substituted,
        });
    }

    report
}

/// Convert to an integer; zero (and a substitution) when impossible
pub fn coerce_int(cell: &Cell) -> (Cell, bool) {
    match cell {
        Cell::Int(i) => (Cell::Int(*i), false),
        Cell::Bool(b) => (Cell::Int(i64::from(*b)), false),
        Cell::Float(f) => float_to_int(*f),
        Cell::Text(s) => {
            let s = s.trim();
            if let Ok(i) = s.parse::<i64>() {
                (Cell::Int(i), false)
            } else if let Ok(f) = s.parse::<f64>() {
                float_to_int(f)
            } else {
                (Cell::Int(0), true)
            }
        }
        Cell::DateTime(dt) => (Cell::Int(dt.and_utc().timestamp()), false),
        Cell::Null => (Cell::Int(0), true),
    }
}

fn float_to_int(f: f64) -> (Cell, bool) {
    if f.is_finite() && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        (Cell::Int(f.trunc() as i64), false)
    } else {
        (Cell::Int(0), true)
    }
}

/// Convert to a timestamp; null (and a substitution) when impossible
///
/// Null and blank values stay null without counting as substitutions.
pub fn coerce_datetime(cell: &Cell) -> (Cell, bool) {
    match cell {
        Cell::Null => (Cell::Null, false),
        Cell::DateTime(dt) => (Cell::DateTime(*dt), false),
        Cell::Text(s) if s.trim().is_empty() => (Cell::Null, false),
        Cell::Text(s) => match parse_datetime(s) {
            Some(dt) => (Cell::DateTime(dt), false),
            None => (Cell::Null, true),
        },
        Cell::Int(secs) => match from_unix_seconds(*secs) {
            Some(dt) => (Cell::DateTime(dt), false),
            None => (Cell::Null, true),
        },
        Cell::Float(f) if f.is_finite() => match from_unix_seconds(f.trunc() as i64) {
            Some(dt) => (Cell::DateTime(dt), false),
            None => (Cell::Null, true),
        },
        Cell::Float(_) | Cell::Bool(_) => (Cell::Null, true),
    }
}

/// Convert to text unconditionally (null becomes empty)
pub fn coerce_varchar(cell: &Cell) -> Cell {
    Cell::Text(cell.to_text())
}

/// Parse a timestamp in any of the accepted formats
pub fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.naive_utc());
    }
    if let Some(dt) = DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
    {
        return Some(dt);
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    if !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    // Eight digits are a compact date; unix seconds need at least nine
    match value.len() {
        8 => NaiveDate::parse_from_str(value, "%Y%m%d")
            .ok()
            .and_then(|date| date.and_hms_opt(0, 0, 0)),
        n if n >= 9 => value.parse().ok().and_then(from_unix_seconds),
        _ => None,
    }
}

fn from_unix_seconds(secs: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc())
}
