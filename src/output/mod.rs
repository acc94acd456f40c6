//! Output module
//!
//! Turns record sets into tables and writes CSV artifacts.
//!
//! # Overview
//!
//! This module provides utilities for:
//! - Building a [`Table`] from flat JSON records
//! - Inferring destination column types from cell values
//! - Writing CSV files with a header row and no index column

mod csv;
mod table;

pub use self::csv::write_csv;
pub use table::{Cell, SqlType, Table, DATETIME_FORMAT};
