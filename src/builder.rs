//! Fixed-layout page construction on top of `printpdf`.
//!
//! A [`PageLayout`] describes exactly one page: its paper size and a list of
//! text lines, each anchored at an absolute position. Nothing flows or wraps,
//! so the output is always a single page regardless of content.

use std::io::BufWriter;

use printpdf::{Mm, PdfDocument};

use crate::error::{ReportError, Result};
use crate::fonts::{self, FontWeight};

const MM_PER_POINT: f64 = 25.4 / 72.0;
const LAYER_NAME: &str = "Layer 1";

/// Converts PDF points (1/72 inch) to millimetres.
pub fn points_to_mm(points: f64) -> Mm {
    Mm(points * MM_PER_POINT)
}

/// Physical page dimensions in millimetres.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PaperSize {
    pub width_mm: f64,
    pub height_mm: f64,
}

impl PaperSize {
    /// ISO A4, 210 x 297 mm (595 x 842 pt).
    pub const A4: PaperSize = PaperSize {
        width_mm: 210.0,
        height_mm: 297.0,
    };
}

impl Default for PaperSize {
    fn default() -> Self {
        Self::A4
    }
}

/// A single run of text placed at an absolute position.
///
/// Coordinates are PDF points measured from the bottom-left page corner.
#[derive(Clone, Debug, PartialEq)]
pub struct TextLine {
    pub text: String,
    pub weight: FontWeight,
    pub font_size: f64,
    pub x: f64,
    pub y: f64,
}

/// Builder for one-page documents with absolutely positioned text.
#[derive(Clone, Debug, Default)]
pub struct PageLayout {
    title: Option<String>,
    paper_size: Option<PaperSize>,
    lines: Vec<TextLine>,
}

impl PageLayout {
    /// Creates an empty A4 layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the document title stored in the PDF metadata.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Sets the paper size.
    pub fn with_paper_size(mut self, paper_size: PaperSize) -> Self {
        self.paper_size = Some(paper_size);
        self
    }

    /// Adds a line of text with its baseline origin at (`x`, `y`) points.
    pub fn with_text(
        mut self,
        text: impl Into<String>,
        weight: FontWeight,
        font_size: f64,
        x: f64,
        y: f64,
    ) -> Self {
        self.lines.push(TextLine {
            text: text.into(),
            weight,
            font_size,
            x,
            y,
        });
        self
    }

    /// Returns the document title, if any.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Returns the configured paper size, defaulting to A4.
    pub fn paper_size(&self) -> PaperSize {
        self.paper_size.unwrap_or_default()
    }

    /// Returns the text lines in drawing order.
    pub fn lines(&self) -> &[TextLine] {
        &self.lines
    }

    /// Renders the layout into PDF bytes.
    pub fn render(&self) -> Result<Vec<u8>> {
        let paper = self.paper_size();
        let (document, page, layer) = PdfDocument::new(
            self.title.clone().unwrap_or_default(),
            Mm(paper.width_mm),
            Mm(paper.height_mm),
            LAYER_NAME.to_owned(),
        );
        let fonts = fonts::install_default_fonts(&document)?;

        let layer = document.get_page(page).get_layer(layer);
        for line in &self.lines {
            layer.use_text(
                line.text.clone(),
                line.font_size,
                points_to_mm(line.x),
                points_to_mm(line.y),
                fonts.get(line.weight),
            );
        }

        let mut writer = BufWriter::new(Vec::new());
        document
            .save(&mut writer)
            .map_err(|err| ReportError::render("serializing PDF", err.to_string()))?;
        writer
            .into_inner()
            .map_err(|err| ReportError::render("flushing PDF buffer", err.into_error()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a4_matches_point_dimensions() {
        let Mm(width) = points_to_mm(595.0);
        let Mm(height) = points_to_mm(842.0);
        assert!((width - PaperSize::A4.width_mm).abs() < 0.1);
        assert!((height - PaperSize::A4.height_mm).abs() < 0.2);
    }

    #[test]
    fn lines_keep_insertion_order() {
        let layout = PageLayout::new()
            .with_text("first", FontWeight::Bold, 16.0, 200.0, 800.0)
            .with_text("second", FontWeight::Regular, 12.0, 50.0, 760.0);

        let texts: Vec<_> = layout.lines().iter().map(|line| line.text.as_str()).collect();
        assert_eq!(texts, ["first", "second"]);
        assert_eq!(layout.paper_size(), PaperSize::A4);
    }

    #[test]
    fn renders_pdf_header() {
        let bytes = PageLayout::new()
            .with_title("Check")
            .with_text("hello", FontWeight::Regular, 12.0, 50.0, 50.0)
            .render()
            .unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
    }
}
