//! Synthetic sales data generation.

use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use chrono::NaiveDate;
use log::info;
use rand::Rng;

use crate::error::{ReportError, Result};
use crate::model::{SalesRecord, SalesTable};

/// Products emitted by the generator, in output order.
pub const PRODUCT_CATALOG: [&str; 5] = [
    "Protein Shake",
    "Gym Towel",
    "Water Bottle",
    "Yoga Mat",
    "Energy Bar",
];

/// Range for the number of units sold per product.
pub const UNITS_SOLD_RANGE: RangeInclusive<u32> = 5..=50;

/// Range for the per-unit price drawn for each record. The price is not stored.
pub const UNIT_PRICE_RANGE: RangeInclusive<u64> = 20..=50;

/// Builds one record per catalog product for `date` using `rng`.
pub fn synthesize<R: Rng>(rng: &mut R, date: NaiveDate) -> SalesTable {
    PRODUCT_CATALOG
        .iter()
        .map(|product| {
            let units_sold = rng.gen_range(UNITS_SOLD_RANGE);
            let price = rng.gen_range(UNIT_PRICE_RANGE);
            SalesRecord::new(date, *product, units_sold, u64::from(units_sold) * price)
        })
        .collect()
}

/// Generates a random table for `date` and writes it to `target_path`.
pub fn generate(target_path: impl AsRef<Path>, date: NaiveDate) -> Result<SalesTable> {
    generate_with_rng(target_path, date, &mut rand::thread_rng())
}

/// Same as [`generate`] but draws from the provided random number generator.
pub fn generate_with_rng<R: Rng>(
    target_path: impl AsRef<Path>,
    date: NaiveDate,
    rng: &mut R,
) -> Result<SalesTable> {
    let target_path = target_path.as_ref();
    let table = synthesize(rng, date);
    write_table(target_path, &table)?;
    info!(
        "Generated {} sales records at {}",
        table.len(),
        target_path.display()
    );
    Ok(table)
}

/// Writes `table` as CSV with a header row, replacing any existing file.
pub fn write_table(path: impl AsRef<Path>, table: &SalesTable) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|err| ReportError::data_format(path, err))?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(|err| ReportError::data_format(path, err))?;
    for record in table {
        writer
            .serialize(record)
            .map_err(|err| ReportError::data_format(path, err))?;
    }
    writer
        .flush()
        .map_err(|err| ReportError::data_format(path, err))
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn synthesizes_one_record_per_product() {
        let mut rng = StdRng::seed_from_u64(7);
        let table = synthesize(&mut rng, date());

        let products: Vec<_> = table.iter().map(|record| record.product.as_str()).collect();
        assert_eq!(products, PRODUCT_CATALOG);
        assert!(table.iter().all(|record| record.date == date()));
    }

    #[test]
    fn values_stay_within_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..200 {
            for record in &synthesize(&mut rng, date()) {
                assert!(UNITS_SOLD_RANGE.contains(&record.units_sold));
                let units = u64::from(record.units_sold);
                assert_eq!(record.revenue % units, 0, "revenue must be units * price");
                assert!(UNIT_PRICE_RANGE.contains(&(record.revenue / units)));
            }
        }
    }

    #[test]
    fn writes_header_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/sales.csv");
        let mut rng = StdRng::seed_from_u64(1);

        generate_with_rng(&path, date(), &mut rng).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("Date,Product,Units_Sold,Revenue"));
        assert_eq!(lines.count(), PRODUCT_CATALOG.len());
        assert!(contents.contains("2024-03-05,Protein Shake,"));
    }
}
