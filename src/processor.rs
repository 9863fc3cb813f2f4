//! The document processor: one loaded document, its navigation cursor, and
//! the layered retrieval policy over it.
//!
//! A processor is always in one of two states. *Unloaded*: no units, cursor
//! 0, no index. *Loaded*: non-empty units, cursor within bounds, index
//! present when the embedding service cooperated (and absent when it did
//! not — semantic retrieval then degrades to truncated full text).
//!
//! All operations are synchronous and blocking; one processor serves one
//! caller at a time.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::{
    error::Result,
    format::DocFormat,
    index::{EmbeddingIndexProvider, IndexManager},
    memory_index::MemoryIndexService,
    search::{SearchMatch, search_units},
    units::{Unit, build_units},
};

/// Default character cap for [`DocumentProcessor::get_full_text`].
pub const DEFAULT_FULL_TEXT_CHARS: usize = 50_000;

/// Character cap applied when retrieval falls back to full text.
pub const FALLBACK_CONTEXT_CHARS: usize = 10_000;

/// Default number of chunks requested by retrieval.
pub const DEFAULT_CONTEXT_RESULTS: usize = 4;

/// Separator between ranked chunks in a context string.
const CONTEXT_SEPARATOR: &str = "\n...\n";

/// Separator between unit texts in full-text output.
const UNIT_SEPARATOR: &str = "\n\n";

const UNTITLED: &str = "Untitled Document";

/// Loads one document at a time and answers navigation, search, and
/// retrieval requests against it.
pub struct DocumentProcessor {
    path: Option<PathBuf>,
    format: Option<DocFormat>,
    title: String,
    units: Vec<Unit>,
    cursor: usize,
    index: IndexManager,
}

impl DocumentProcessor {
    /// Create a processor backed by the given embedding-index service.
    pub fn new(provider: Box<dyn EmbeddingIndexProvider>) -> Self {
        Self {
            path: None,
            format: None,
            title: UNTITLED.to_string(),
            units: Vec::new(),
            cursor: 0,
            index: IndexManager::new(provider),
        }
    }

    /// Create a processor backed by the built-in in-memory index.
    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryIndexService::new()))
    }

    /// Title of the loaded document (its file name), or "Untitled Document".
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Format of the loaded document, if any.
    pub fn format(&self) -> Option<DocFormat> {
        self.format
    }

    /// Path of the loaded document, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_loaded(&self) -> bool {
        !self.units.is_empty()
    }

    // -- Lifecycle --

    /// Load a document, replacing whatever was loaded before.
    ///
    /// Returns `false` for unsupported extensions, parse failures, and
    /// documents with no extractable text; no partial state survives a
    /// failed load. Index construction failure does NOT fail the load —
    /// the document comes up without semantic retrieval.
    pub fn load(&mut self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref();
        match self.try_load(path) {
            Ok(()) => true,
            Err(e) => {
                warn!(path = %path.display(), "load failed: {e}");
                self.reset();
                false
            }
        }
    }

    fn try_load(&mut self, path: &Path) -> Result<()> {
        // The previous document's index must not outlive its units: tear it
        // down up front so a failed load ends fully unloaded.
        self.index.teardown();
        self.reset();

        let format =
            DocFormat::from_path(path).ok_or_else(|| crate::error::Error::UnsupportedFormat {
                extension: path
                    .extension()
                    .map(|e| e.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            })?;

        let blocks = format.extract(path)?;
        let units = build_units(format, &blocks);
        if units.is_empty() {
            return Err(crate::error::Error::EmptyDocument);
        }

        self.title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| UNTITLED.to_string());
        self.path = Some(path.to_path_buf());
        self.format = Some(format);
        self.units = units;
        self.cursor = 0;

        debug!(
            format = format.name(),
            units = self.units.len(),
            "document loaded"
        );

        // Degrades internally; a document without an index is still loaded.
        let doc_key = path.to_string_lossy();
        self.index.rebuild(&doc_key, &self.units);

        Ok(())
    }

    /// Unload the current document, optionally deleting its backing file.
    ///
    /// Idempotent. File deletion and index teardown are best-effort: their
    /// failures are logged and swallowed.
    pub fn unload(&mut self, delete_file: bool) -> bool {
        if delete_file
            && let Some(path) = &self.path
            && path.is_file()
            && let Err(e) = std::fs::remove_file(path)
        {
            let e = crate::error::Error::FileDeletion(e.to_string());
            warn!(path = %path.display(), "{e}");
        }

        self.index.teardown();
        self.reset();
        true
    }

    fn reset(&mut self) {
        self.path = None;
        self.format = None;
        self.title = UNTITLED.to_string();
        self.units.clear();
        self.cursor = 0;
    }

    // -- Unit access --

    pub fn page_count(&self) -> usize {
        self.units.len()
    }

    /// Text of the unit at `index`, or empty when out of range.
    pub fn get_page(&self, index: usize) -> &str {
        self.units.get(index).map(|u| u.text.as_str()).unwrap_or("")
    }

    /// Text of a chapter by 1-indexed number, or empty when out of range.
    pub fn get_chapter_text(&self, chapter_num: usize) -> &str {
        match chapter_num.checked_sub(1) {
            Some(index) => self.get_page(index),
            None => "",
        }
    }

    /// Combined text of all units, truncated to `max_chars` characters.
    pub fn get_full_text(&self, max_chars: usize) -> String {
        let combined = self
            .units
            .iter()
            .map(|u| u.text.as_str())
            .collect::<Vec<_>>()
            .join(UNIT_SEPARATOR);
        truncate_chars(combined, max_chars)
    }

    // -- Navigation cursor --

    pub fn get_current_text(&self) -> &str {
        self.get_page(self.cursor)
    }

    pub fn get_current_label(&self) -> &str {
        self.units
            .get(self.cursor)
            .map(|u| u.label.as_str())
            .unwrap_or("Unknown")
    }

    /// Advance the cursor; fails without moving at the last unit.
    pub fn next_page(&mut self) -> bool {
        if self.cursor + 1 < self.units.len() {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    /// Step the cursor back; fails without moving at the first unit.
    pub fn prev_page(&mut self) -> bool {
        if self.cursor > 0 {
            self.cursor -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to a unit; fails without moving when out of range.
    pub fn go_to_page(&mut self, index: usize) -> bool {
        if index < self.units.len() {
            self.cursor = index;
            true
        } else {
            false
        }
    }

    // -- Search & retrieval --

    /// Lexical search over all units; see [`crate::search`].
    pub fn search(&self, query: &str) -> Vec<SearchMatch> {
        search_units(&self.units, query)
    }

    /// Resolve a query into context text via the layered retrieval policy:
    /// semantic top-k when an index with chunks is available, otherwise the
    /// full text truncated to [`FALLBACK_CONTEXT_CHARS`]; an explicit
    /// `n_results` of 0 yields an empty string.
    ///
    /// The service's ranking is authoritative: no deduplication, no
    /// re-ranking, no similarity threshold.
    pub fn get_relevant_context(&self, query: &str, n_results: usize) -> String {
        let chunk_count = self.index.chunk_count();
        if !self.index.is_available() || chunk_count == 0 {
            return self.get_full_text(FALLBACK_CONTEXT_CHARS);
        }

        let k = n_results.min(chunk_count);
        if k == 0 {
            return String::new();
        }

        match self.index.query(query, k) {
            Ok(chunks) if !chunks.is_empty() => chunks.join(CONTEXT_SEPARATOR),
            Ok(_) => {
                debug!("semantic query returned no chunks, falling back to full text");
                self.get_full_text(FALLBACK_CONTEXT_CHARS)
            }
            Err(e) => {
                warn!("semantic query failed, falling back to full text: {e}");
                self.get_full_text(FALLBACK_CONTEXT_CHARS)
            }
        }
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::in_memory()
    }
}

/// Truncate a string to at most `max_chars` characters on a char boundary.
fn truncate_chars(mut s: String, max_chars: usize) -> String {
    if let Some((byte_idx, _)) = s.char_indices().nth(max_chars) {
        s.truncate(byte_idx);
    }
    s
}
