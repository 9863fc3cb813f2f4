//! Document format detection and adapter dispatch.
//!
//! Formats form a closed set: dispatch is a `match` over [`DocFormat`], and
//! adding a format means adding a variant plus its extraction arm. Each
//! adapter turns a file into an ordered sequence of [`RawBlock`]s; the
//! format-aware heuristics in [`crate::units`] turn those blocks into units.

use std::path::Path;

use crate::error::{Error, Result};

/// A raw extraction block: text plus the structural label the adapter could
/// recover for it (a page number, a paragraph style, a chapter heading, or
/// nothing at all for flat text).
#[derive(Debug, Clone)]
pub struct RawBlock {
    pub text: String,
    pub label: String,
}

impl RawBlock {
    pub fn new(text: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            label: label.into(),
        }
    }
}

/// The supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFormat {
    Pdf,
    Docx,
    Epub,
    Txt,
}

impl DocFormat {
    /// Detect the format from a file extension, case-insensitively.
    ///
    /// Returns `None` for unknown extensions; the caller treats that as a
    /// failed load rather than guessing at content.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" | "doc" => Some(Self::Docx),
            "epub" => Some(Self::Epub),
            "txt" => Some(Self::Txt),
            _ => None,
        }
    }

    /// Human-readable format name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Docx => "DOCX",
            Self::Epub => "EPUB",
            Self::Txt => "TXT",
        }
    }

    /// Run the format's adapter, producing the raw block sequence.
    pub fn extract(self, path: &Path) -> Result<Vec<RawBlock>> {
        match self {
            Self::Pdf => extract_pdf(path),
            Self::Docx => crate::docx::extract_docx(path),
            Self::Epub => crate::ebook::extract_epub(path),
            Self::Txt => extract_txt(path),
        }
    }
}

/// Extract a plain-text file as a single unlabeled block.
///
/// Decoding is lossy: invalid UTF-8 sequences are replaced rather than
/// failing the whole load.
fn extract_txt(path: &Path) -> Result<Vec<RawBlock>> {
    let bytes = std::fs::read(path)?;
    let content = String::from_utf8_lossy(&bytes).into_owned();
    Ok(vec![RawBlock::new(content, "")])
}

/// Extract a PDF as one block per physical page.
///
/// `pdf-extract` separates pages with form feeds, so splitting on `\x0C`
/// recovers page boundaries. Labels carry the physical page number even when
/// blank pages are later dropped by the unit heuristics.
fn extract_pdf(path: &Path) -> Result<Vec<RawBlock>> {
    let text = pdf_extract::extract_text(path).map_err(|e| Error::Parse {
        format: DocFormat::Pdf.name(),
        reason: e.to_string(),
    })?;

    Ok(text
        .split('\x0C')
        .enumerate()
        .map(|(i, page)| RawBlock::new(page.trim(), format!("Page {}", i + 1)))
        .collect())
}
