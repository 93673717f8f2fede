//! Data structures that flow through the report pipeline.
//!
//! Records are read from and written to CSV through serde, so the field
//! renames below define the on-disk column headers
//! (`Date,Product,Units_Sold,Revenue`).

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One product's sales for a single day.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Calendar date of the sales, written as `YYYY-MM-DD`.
    #[serde(rename = "Date")]
    pub date: NaiveDate,
    /// Product name.
    #[serde(rename = "Product")]
    pub product: String,
    /// Units sold during the day.
    #[serde(rename = "Units_Sold")]
    pub units_sold: u32,
    /// Revenue for the day in whole currency units.
    #[serde(rename = "Revenue")]
    pub revenue: u64,
}

impl SalesRecord {
    /// Creates a record for `product` on `date`.
    pub fn new(date: NaiveDate, product: impl Into<String>, units_sold: u32, revenue: u64) -> Self {
        Self {
            date,
            product: product.into(),
            units_sold,
            revenue,
        }
    }
}

/// Ordered collection of sales records.
///
/// Row order is significant: the aggregator breaks revenue ties in favour of
/// the record that appears first.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SalesTable {
    records: Vec<SalesRecord>,
}

impl SalesTable {
    /// Creates a table from records in their original order.
    pub fn new(records: impl Into<Vec<SalesRecord>>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Returns the records in table order.
    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    /// Returns an iterator over the records in table order.
    pub fn iter(&self) -> std::slice::Iter<'_, SalesRecord> {
        self.records.iter()
    }

    /// Number of records in the table.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<'a> IntoIterator for &'a SalesTable {
    type Item = &'a SalesRecord;
    type IntoIter = std::slice::Iter<'a, SalesRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl FromIterator<SalesRecord> for SalesTable {
    fn from_iter<I: IntoIterator<Item = SalesRecord>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect::<Vec<_>>())
    }
}

/// Aggregate metrics shown on the rendered report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Summary {
    /// Date printed on the report.
    pub report_date: NaiveDate,
    /// Sum of revenue over all records.
    pub total_sales: u64,
    /// Sum of units sold over all records.
    pub total_units: u64,
    /// Product of the record with the highest single revenue.
    pub top_product: String,
}

/// A message carrying one rendered report to one recipient.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Delivery {
    pub recipient: String,
    pub subject: String,
    pub body: String,
    /// File sent as the only attachment.
    pub attachment_path: PathBuf,
}

/// File name of the rendered report for `date`, e.g. `daily_report_2024-03-05.pdf`.
pub fn report_file_name(date: NaiveDate) -> String {
    format!("daily_report_{}.pdf", date.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_file_name_uses_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        assert_eq!(report_file_name(date), "daily_report_2024-03-05.pdf");
    }

    #[test]
    fn table_preserves_insertion_order() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 5).unwrap();
        let table: SalesTable = ["Yoga Mat", "Gym Towel", "Energy Bar"]
            .into_iter()
            .map(|product| SalesRecord::new(date, product, 1, 10))
            .collect();

        let products: Vec<_> = table.iter().map(|record| record.product.as_str()).collect();
        assert_eq!(products, ["Yoga Mat", "Gym Towel", "Energy Bar"]);
        assert_eq!(table.len(), 3);
    }
}
