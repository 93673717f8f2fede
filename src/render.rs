//! Renders a [`Summary`] onto the one-page daily report.

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::builder::{PageLayout, PaperSize};
use crate::error::{ReportError, Result};
use crate::fonts::FontWeight;
use crate::model::Summary;

/// Heading printed at the top of every report.
pub const REPORT_TITLE: &str = "Daily Sales Report";

/// Currency prefix used when none is configured.
pub const DEFAULT_CURRENCY_SYMBOL: &str = "R";

const TITLE_FONT_SIZE: f64 = 16.0;
const BODY_FONT_SIZE: f64 = 12.0;
const TITLE_POSITION: (f64, f64) = (200.0, 800.0);
const BODY_X: f64 = 50.0;
const BODY_BASELINES: [f64; 4] = [760.0, 730.0, 700.0, 670.0];

/// Lays out and writes daily report documents.
#[derive(Clone, Debug)]
pub struct ReportRenderer {
    currency_symbol: String,
}

impl Default for ReportRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_CURRENCY_SYMBOL)
    }
}

impl ReportRenderer {
    /// Creates a renderer that prefixes revenue with `currency_symbol`.
    pub fn new(currency_symbol: impl Into<String>) -> Self {
        Self {
            currency_symbol: currency_symbol.into(),
        }
    }

    /// The four labelled body lines, top to bottom.
    pub fn body_lines(&self, summary: &Summary) -> [String; 4] {
        [
            format!("Date: {}", summary.report_date.format("%Y-%m-%d")),
            format!(
                "Total Revenue: {}{}",
                self.currency_symbol, summary.total_sales
            ),
            format!("Total Units Sold: {}", summary.total_units),
            format!("Top Performing Product: {}", summary.top_product),
        ]
    }

    /// Builds the fixed page layout for `summary`.
    pub fn layout(&self, summary: &Summary) -> PageLayout {
        let (title_x, title_y) = TITLE_POSITION;
        let layout = PageLayout::new()
            .with_title(REPORT_TITLE)
            .with_paper_size(PaperSize::A4)
            .with_text(REPORT_TITLE, FontWeight::Bold, TITLE_FONT_SIZE, title_x, title_y);

        self.body_lines(summary)
            .into_iter()
            .zip(BODY_BASELINES)
            .fold(layout, |layout, (text, y)| {
                layout.with_text(text, FontWeight::Regular, BODY_FONT_SIZE, BODY_X, y)
            })
    }

    /// Renders `summary` into PDF bytes.
    pub fn render_to_bytes(&self, summary: &Summary) -> Result<Vec<u8>> {
        self.layout(summary).render()
    }

    /// Renders `summary` to `output_path`, replacing any existing file.
    ///
    /// The document is written to a sibling temporary file first and then
    /// renamed into place.
    pub fn render(&self, summary: &Summary, output_path: impl AsRef<Path>) -> Result<()> {
        let output_path = output_path.as_ref();
        let bytes = self.render_to_bytes(summary)?;

        if let Some(parent) = output_path
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
        {
            fs::create_dir_all(parent).map_err(|err| {
                ReportError::render(format!("creating {}", parent.display()), err)
            })?;
        }

        let partial = partial_path(output_path);
        if let Err(err) = fs::write(&partial, &bytes) {
            let _ = fs::remove_file(&partial);
            return Err(ReportError::render(
                format!("writing {}", partial.display()),
                err,
            ));
        }
        fs::rename(&partial, output_path).map_err(|err| {
            let _ = fs::remove_file(&partial);
            ReportError::render(format!("replacing {}", output_path.display()), err)
        })?;

        info!(
            "Rendered report {} ({} bytes)",
            output_path.display(),
            bytes.len()
        );
        Ok(())
    }
}

/// Renders `summary` to `output_path` with the default currency symbol.
pub fn render(summary: &Summary, output_path: impl AsRef<Path>) -> Result<()> {
    ReportRenderer::default().render(summary, output_path)
}

fn partial_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}
