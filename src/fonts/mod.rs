//! Font selection for rendered reports.
//!
//! Reports use the standard PDF base fonts, so nothing has to be shipped or
//! located on disk; the viewer supplies the glyphs.

use printpdf::{BuiltinFont, IndirectFontRef, PdfDocumentReference};

use crate::error::{ReportError, Result};

/// Name of the font family used for every report.
pub const DEFAULT_FONT_FAMILY_NAME: &str = "Helvetica";

/// Weight of a positioned text line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FontWeight {
    /// Helvetica.
    #[default]
    Regular,
    /// Helvetica-Bold.
    Bold,
}

impl FontWeight {
    /// Base font backing this weight.
    pub fn builtin(self) -> BuiltinFont {
        match self {
            Self::Regular => BuiltinFont::Helvetica,
            Self::Bold => BuiltinFont::HelveticaBold,
        }
    }
}

/// Fonts registered with a single document.
pub struct FontSet {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

impl FontSet {
    /// Returns the document font for `weight`.
    pub fn get(&self, weight: FontWeight) -> &IndirectFontRef {
        match weight {
            FontWeight::Regular => &self.regular,
            FontWeight::Bold => &self.bold,
        }
    }
}

/// Registers the Helvetica family with `document` and returns the references.
pub fn install_default_fonts(document: &PdfDocumentReference) -> Result<FontSet> {
    Ok(FontSet {
        regular: add_builtin(document, FontWeight::Regular)?,
        bold: add_builtin(document, FontWeight::Bold)?,
    })
}

fn add_builtin(document: &PdfDocumentReference, weight: FontWeight) -> Result<IndirectFontRef> {
    document.add_builtin_font(weight.builtin()).map_err(|err| {
        ReportError::render(
            format!("registering {} {:?}", DEFAULT_FONT_FAMILY_NAME, weight),
            err.to_string(),
        )
    })
}
