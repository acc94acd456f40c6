//! CSV artifact writer

use super::table::Table;
use crate::error::{Error, Result};
use std::path::Path;
use tracing::debug;

/// Write a table to a CSV file, replacing any existing file
///
/// The first row is the header. Nulls are written as empty fields.
/// Returns the number of data rows written.
pub fn write_csv(path: impl AsRef<Path>, table: &Table) -> Result<usize> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            Error::write(format!(
                "Failed to create directory {}: {e}",
                parent.display()
            ))
        })?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    if !table.columns().is_empty() {
        writer.write_record(table.columns())?;
    }
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.to_text()))?;
    }
    writer
        .flush()
        .map_err(|e| Error::write(format!("Failed to flush {}: {e}", path.display())))?;

    debug!("Wrote {} rows to {}", table.len(), path.display());
    Ok(table.len())
}
