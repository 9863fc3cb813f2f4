//! Sliding word-window chunking for semantic indexing.
//!
//! Units are split into overlapping word runs before being submitted to the
//! embedding index. Word-based windows keep chunk boundaries aligned with
//! token boundaries regardless of the source format.

/// Default retrieval-chunk window in words, applied uniformly across formats.
pub const DEFAULT_CHUNK_WORDS: usize = 300;

/// Default overlap between adjacent retrieval chunks in words.
pub const DEFAULT_CHUNK_OVERLAP: usize = 50;

/// Split text into overlapping word-window chunks.
///
/// Words are whitespace-separated. An empty word list produces no chunks.
/// Chunk `i` starts at word offset `i * (window - overlap)`; the final chunk
/// may be shorter than `window`. Together the chunks cover every word with
/// exactly `overlap` words shared between consecutive chunks.
///
/// The caller guarantees `overlap < window`; the stride is clamped to 1
/// so a bad configuration degrades to dense chunking instead of looping.
///
/// # Examples
///
/// ```
/// use lectern::chunking::chunk_words;
///
/// let chunks = chunk_words("one two three four five six", 4, 2);
/// assert_eq!(chunks, vec!["one two three four", "three four five six"]);
///
/// assert!(chunk_words("   ", 4, 2).is_empty());
/// ```
pub fn chunk_words(text: &str, window: usize, overlap: usize) -> Vec<String> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return Vec::new();
    }

    let stride = window.saturating_sub(overlap).max(1);
    // Once a start offset is within `overlap` of the end, the previous
    // chunk already covers the remaining words.
    let limit = words.len().saturating_sub(overlap).max(1);

    let mut chunks = Vec::new();
    let mut start = 0;
    while start < limit {
        let end = (start + window).min(words.len());
        chunks.push(words[start..end].join(" "));
        start += stride;
    }

    chunks
}
