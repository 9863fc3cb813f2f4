//! The normalized unit model and format-aware unit construction.
//!
//! Adapters produce raw `(text, label)` blocks; this module applies each
//! format's heuristic to turn them into the ordered, contiguous sequence of
//! [`Unit`]s that every navigation, search, and retrieval operation reads.

use serde::Serialize;

use crate::{
    chunking::chunk_words,
    format::{DocFormat, RawBlock},
};

/// Window size in words used to synthesize units from flat text files.
pub const FLAT_TEXT_UNIT_WORDS: usize = 600;

/// Window size in words for word-processor documents with no headings.
pub const NO_HEADING_UNIT_WORDS: usize = 500;

/// Minimum character count for an EPUB spine document to count as a chapter.
/// Shorter documents are navigation pages, covers, and colophons.
pub const MIN_CHAPTER_CHARS: usize = 100;

/// A normalized, ordered, labeled block of extracted text — a "page" or
/// "chapter". Indices are contiguous from 0 within one document; labels are
/// human-readable and need not be unique.
#[derive(Debug, Clone, Serialize)]
pub struct Unit {
    pub index: usize,
    pub text: String,
    pub label: String,
}

/// Build the unit sequence for a document from its raw blocks.
pub fn build_units(format: DocFormat, blocks: &[RawBlock]) -> Vec<Unit> {
    match format {
        DocFormat::Pdf => paged_units(blocks),
        DocFormat::Epub => chapter_units(blocks),
        DocFormat::Docx => heading_split_units(blocks),
        DocFormat::Txt => windowed_units(&join_blocks(blocks), FLAT_TEXT_UNIT_WORDS),
    }
}

/// One unit per non-blank page. Labels keep the physical page number; unit
/// indices stay contiguous even when blank pages are dropped.
fn paged_units(blocks: &[RawBlock]) -> Vec<Unit> {
    let mut units = Vec::new();
    for block in blocks {
        let text = block.text.trim();
        if text.is_empty() {
            continue;
        }
        units.push(Unit {
            index: units.len(),
            text: text.to_string(),
            label: block.label.clone(),
        });
    }
    units
}

/// One unit per substantial spine document. Documents at or below
/// [`MIN_CHAPTER_CHARS`] characters are dropped; missing headings fall back
/// to "Chapter N" numbered over the kept units.
fn chapter_units(blocks: &[RawBlock]) -> Vec<Unit> {
    let mut units = Vec::new();
    for block in blocks {
        if block.text.chars().count() <= MIN_CHAPTER_CHARS {
            continue;
        }
        let label = if block.label.is_empty() {
            format!("Chapter {}", units.len() + 1)
        } else {
            block.label.clone()
        };
        units.push(Unit {
            index: units.len(),
            text: block.text.clone(),
            label,
        });
    }
    units
}

/// Split paragraph blocks into chapters at `Heading*` styles.
///
/// A heading's own text becomes the label of the unit that follows it; text
/// before the first heading lands in "Section 1". When the document has no
/// headings at all (no unit was produced), fall back to fixed-size word
/// windows over the full text.
fn heading_split_units(blocks: &[RawBlock]) -> Vec<Unit> {
    let mut units: Vec<Unit> = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut label = String::from("Section 1");

    for block in blocks {
        if block.label.starts_with("Heading") {
            if !current.is_empty() {
                units.push(Unit {
                    index: units.len(),
                    text: current.join("\n"),
                    label: label.clone(),
                });
                current.clear();
            }
            label = if block.text.is_empty() {
                format!("Section {}", units.len() + 1)
            } else {
                block.text.clone()
            };
        } else if !block.text.is_empty() {
            current.push(&block.text);
        }
    }

    if !current.is_empty() {
        units.push(Unit {
            index: units.len(),
            text: current.join("\n"),
            label,
        });
    }

    if units.is_empty() {
        return windowed_units(&join_blocks(blocks), NO_HEADING_UNIT_WORDS);
    }
    units
}

/// Synthesize units as fixed-size word windows labeled "Section N".
fn windowed_units(text: &str, window: usize) -> Vec<Unit> {
    chunk_words(text, window, 0)
        .into_iter()
        .enumerate()
        .map(|(i, chunk)| Unit {
            index: i,
            text: chunk,
            label: format!("Section {}", i + 1),
        })
        .collect()
}

fn join_blocks(blocks: &[RawBlock]) -> String {
    blocks
        .iter()
        .map(|b| b.text.as_str())
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
