//! Schema module
//!
//! Declared destination column types and the coercion applied before a
//! table is written.
//!
//! # Features
//!
//! - **Type Tags**: `int`, `datetime`/`timestamp`/`date`, `varchar`/`char`/`text`
//! - **Schema Map**: table name -> ordered column types, loaded from JSON
//! - **Coercion**: positional, lossy, counted per column

mod coercion;
mod types;

pub use coercion::{
    coerce_datetime, coerce_int, coerce_table, coerce_varchar, parse_datetime, CoercionReport,
    ColumnCoercion,
};
pub use types::{ColumnType, ColumnTypeMap};
