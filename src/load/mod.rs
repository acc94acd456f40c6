//! Load module
//!
//! Persists a record set: validate that every value is scalar, build a
//! table, coerce declared column types, then write a CSV file or a
//! relational table.

mod types;

pub use types::{LoadReport, LoadTarget, TableName, WriteMode};

use crate::database::DatabaseEngine;
use crate::error::{Error, Result};
use crate::output::{write_csv, Table};
use crate::pagination::RecordSet;
use crate::schema::{coerce_table, ColumnTypeMap};
use tracing::{debug, info};

/// Writes record sets to CSV files or database tables
#[derive(Debug, Default)]
pub struct Loader {
    database: Option<DatabaseEngine>,
}

impl Loader {
    /// Loader without a database; only CSV targets can be written
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader writing tables through the given engine
    pub fn with_database(database: DatabaseEngine) -> Self {
        Self {
            database: Some(database),
        }
    }

    /// The database engine, if any
    pub fn database(&self) -> Option<&DatabaseEngine> {
        self.database.as_ref()
    }

    /// Check whether table targets can be written
    pub fn has_database(&self) -> bool {
        self.database.is_some()
    }

    /// Load a record set into a target
    ///
    /// Nothing is written when a record holds a mapping or a list.
    pub fn load(
        &mut self,
        records: &RecordSet,
        target: &LoadTarget,
        column_types: &ColumnTypeMap,
    ) -> Result<LoadReport> {
        info!("Inserting data into {}", target);

        let mut table = Table::from_records(records)?;
        debug!("Final columns: {:?}", table.columns());

        let coercion = match target.schema_key().and_then(|key| column_types.get(key)) {
            Some(types) => coerce_table(&mut table, types),
            None => Default::default(),
        };

        let rows_written = match target {
            LoadTarget::Csv { path, .. } => {
                let rows = write_csv(path, &table)?;
                info!("{} records saved to {}", rows, path.display());
                rows
            }
            LoadTarget::Table { name, mode } => {
                let database = self.database.as_mut().ok_or_else(|| {
                    Error::load_target(format!("no database configured for table {name}"))
                })?;
                let rows = database.write_table(name, &table, *mode)?;
                info!("{} records inserted into {}", rows, name);
                rows
            }
        };

        Ok(LoadReport {
            rows_written,
            coercion,
        })
    }
}

#[cfg(test)]
mod tests;
