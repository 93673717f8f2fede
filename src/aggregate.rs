//! Summary statistics over a sales table.

use chrono::NaiveDate;

use crate::error::{ReportError, Result};
use crate::model::{SalesTable, Summary};

/// Computes the report metrics for `table`.
///
/// `report_date` is stamped onto the summary as given; the table's own date
/// column is not consulted. The top product is the record with the highest
/// revenue, and ties go to the record that appears first.
pub fn summarize(table: &SalesTable, report_date: NaiveDate) -> Result<Summary> {
    let mut records = table.iter();
    let first = records.next().ok_or(ReportError::EmptyDataset)?;

    let mut top = first;
    let mut total_sales = first.revenue;
    let mut total_units = u64::from(first.units_sold);

    for record in records {
        total_sales = total_sales
            .checked_add(record.revenue)
            .ok_or(ReportError::TotalOverflow { field: "revenue" })?;
        total_units = total_units
            .checked_add(u64::from(record.units_sold))
            .ok_or(ReportError::TotalOverflow { field: "units" })?;
        // strict comparison keeps the earliest record on ties
        if record.revenue > top.revenue {
            top = record;
        }
    }

    Ok(Summary {
        report_date,
        total_sales,
        total_units,
        top_product: top.product.clone(),
    })
}
