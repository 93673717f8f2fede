//! Reads sales data files produced by [`crate::source`] or any other provider.

use std::path::Path;

use log::{debug, warn};

use crate::error::{ReportError, Result};
use crate::model::{SalesRecord, SalesTable};

/// Parses the CSV file at `path` into a table, preserving row order.
///
/// The file must carry the `Date,Product,Units_Sold,Revenue` header. A missing
/// file, a missing column, or a value that does not parse is reported as
/// [`ReportError::DataFormat`]. An empty file yields an empty table.
///
/// Rows are not required to share a date: the report date comes from the
/// caller, so a file spanning several days loads as-is and only logs a warning.
pub fn load(path: impl AsRef<Path>) -> Result<SalesTable> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|err| ReportError::data_format(path, err))?;

    let records = reader
        .deserialize::<SalesRecord>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| ReportError::data_format(path, err))?;

    if let Some(first) = records.first() {
        if let Some(other) = records.iter().find(|record| record.date != first.date) {
            warn!(
                "{} mixes sales dates ({} and {}); totals cover every row",
                path.display(),
                first.date,
                other.date
            );
        }
    }

    debug!("Loaded {} sales records from {}", records.len(), path.display());
    Ok(SalesTable::new(records))
}
