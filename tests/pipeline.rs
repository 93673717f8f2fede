use std::cell::RefCell;
use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::SeedableRng;
use sales_report::aggregate::summarize;
use sales_report::config::ReportConfig;
use sales_report::loader::load;
use sales_report::mail::Mailer;
use sales_report::model::{Delivery, SalesRecord, SalesTable};
use sales_report::pipeline::run_daily_report;
use sales_report::source::{self, PRODUCT_CATALOG};
use sales_report::{ReportError, Result};

#[derive(Default)]
struct RecordingMailer {
    sent: RefCell<Vec<Delivery>>,
}

impl Mailer for RecordingMailer {
    fn deliver(&self, delivery: &Delivery) -> Result<()> {
        assert!(
            delivery.attachment_path.is_file(),
            "attachment must exist when the mailer runs"
        );
        self.sent.borrow_mut().push(delivery.clone());
        Ok(())
    }
}

fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
}

fn config_in(root: &Path) -> ReportConfig {
    ReportConfig {
        data_path: root.join("data/sales_data.csv"),
        output_dir: root.join("reports"),
        recipient: "owner@example.com".to_owned(),
        ..ReportConfig::default()
    }
}

#[test]
fn write_then_load_round_trips() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.csv");
    let table = SalesTable::new(vec![
        SalesRecord::new(date(), "Protein Shake", 10, 300),
        SalesRecord::new(date(), "Gym Towel, large", 5, 200),
        SalesRecord::new(date(), "Yoga Mat", 50, 2500),
    ]);

    source::write_table(&path, &table).unwrap();

    assert_eq!(load(&path).unwrap(), table);
}

#[test]
fn generated_file_loads_back_identically() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sales.csv");
    let mut rng = StdRng::seed_from_u64(99);

    let generated = source::generate_with_rng(&path, date(), &mut rng).unwrap();

    assert_eq!(generated.len(), PRODUCT_CATALOG.len());
    assert_eq!(load(&path).unwrap(), generated);
}

#[test]
fn daily_run_renders_and_delivers_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mailer = RecordingMailer::default();

    let report = run_daily_report(&config, &mailer, date()).unwrap();

    assert_eq!(
        report.report_path,
        dir.path().join("reports/daily_report_2024-03-05.pdf")
    );
    assert!(fs::read(&report.report_path).unwrap().starts_with(b"%PDF-"));

    let table = load(&config.data_path).unwrap();
    assert_eq!(report.summary, summarize(&table, date()).unwrap());

    let sent = mailer.sent.borrow();
    assert_eq!(sent.len(), 1);
    assert_eq!(
        sent[0],
        Delivery {
            recipient: "owner@example.com".to_owned(),
            subject: "Daily Sales Report".to_owned(),
            body: "Here is the daily sales report.".to_owned(),
            attachment_path: report.report_path.clone(),
        }
    );
}

#[test]
fn same_day_rerun_overwrites_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path());
    let mailer = RecordingMailer::default();

    run_daily_report(&config, &mailer, date()).unwrap();
    run_daily_report(&config, &mailer, date()).unwrap();

    let reports: Vec<_> = fs::read_dir(&config.output_dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(reports, ["daily_report_2024-03-05.pdf"]);
    assert_eq!(mailer.sent.borrow().len(), 2);
}

#[test]
fn unwritable_output_dir_fails_before_delivery() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("reports");
    fs::write(&blocker, b"not a directory").unwrap();

    let config = config_in(dir.path());
    let mailer = RecordingMailer::default();

    let err = run_daily_report(&config, &mailer, date()).unwrap_err();
    assert!(matches!(err, ReportError::Io { .. }), "{err:?}");
    assert!(mailer.sent.borrow().is_empty());
}
