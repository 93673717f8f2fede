//! One end-to-end report run: generate, load, summarize, render, deliver.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use log::info;

use crate::aggregate::summarize;
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::loader::load;
use crate::mail::Mailer;
use crate::model::{Delivery, Summary};
use crate::render::ReportRenderer;
use crate::source::generate;

/// Outcome of a successful run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub summary: Summary,
    pub report_path: PathBuf,
}

/// Runs the full pipeline for `today` and mails the result through `mailer`.
///
/// Each stage runs to completion before the next starts; the first failure
/// ends the run and is returned unchanged.
pub fn run_daily_report<M>(config: &ReportConfig, mailer: &M, today: NaiveDate) -> Result<RunReport>
where
    M: Mailer + ?Sized,
{
    if let Some(parent) = config.data_path.parent() {
        ensure_dir(parent)?;
    }
    ensure_dir(&config.output_dir)?;

    generate(&config.data_path, today)?;
    let table = load(&config.data_path)?;
    let summary = summarize(&table, today)?;
    info!(
        "Summary for {}: revenue {}, units {}, top product {}",
        summary.report_date, summary.total_sales, summary.total_units, summary.top_product
    );

    let report_path = config.report_path(today);
    ReportRenderer::new(config.currency_symbol.as_str()).render(&summary, &report_path)?;

    mailer.deliver(&Delivery {
        recipient: config.recipient.clone(),
        subject: config.subject.clone(),
        body: config.body.clone(),
        attachment_path: report_path.clone(),
    })?;

    Ok(RunReport {
        summary,
        report_path,
    })
}

fn ensure_dir(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(path).map_err(|err| ReportError::io(path, err))
}
