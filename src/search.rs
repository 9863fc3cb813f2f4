//! Case-insensitive lexical search over loaded units.
//!
//! One match per unit, first occurrence only, returned in unit order. This
//! is the exact-text complement to semantic retrieval: no fuzzy matching,
//! no ranking.

use serde::Serialize;

use crate::units::Unit;

/// Characters of context kept before the match start.
pub const SNIPPET_BEFORE_CHARS: usize = 60;

/// Characters of context kept from the match start onward.
pub const SNIPPET_AFTER_CHARS: usize = 120;

/// A lexical match within one unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchMatch {
    pub unit_index: usize,
    pub label: String,
    pub snippet: String,
}

/// Find the first occurrence of `query` in each unit, case-insensitively.
pub fn search_units(units: &[Unit], query: &str) -> Vec<SearchMatch> {
    let query_lower = query.to_lowercase();

    units
        .iter()
        .filter_map(|unit| {
            let text_lower = unit.text.to_lowercase();
            let byte_pos = text_lower.find(&query_lower)?;
            let match_char = text_lower[..byte_pos].chars().count();
            Some(SearchMatch {
                unit_index: unit.index,
                label: unit.label.clone(),
                snippet: snippet_around(&unit.text, match_char),
            })
        })
        .collect()
}

/// Cut the snippet window around a match, clipped to the unit's bounds.
///
/// Offsets are in characters; the char-to-byte map keeps slicing safe for
/// multi-byte text. Lowercasing can shift offsets for a handful of scripts,
/// so the window position is also clamped to the original text's length.
fn snippet_around(text: &str, match_char: usize) -> String {
    let char_to_byte: Vec<usize> = text
        .char_indices()
        .map(|(byte, _)| byte)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = char_to_byte.len() - 1;

    let start = match_char
        .saturating_sub(SNIPPET_BEFORE_CHARS)
        .min(total_chars);
    let end = (match_char + SNIPPET_AFTER_CHARS).min(total_chars);

    text[char_to_byte[start]..char_to_byte[end]].to_string()
}
