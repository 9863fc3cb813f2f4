//! lectern - document normalization, chunking, and retrieval for reading
//! assistants.
//!
//! lectern loads a PDF, DOCX, EPUB, or plain-text file and normalizes it into
//! an ordered sequence of labeled units ("pages" or "chapters"). On top of
//! that sequence it offers cursor-based navigation, case-insensitive lexical
//! search with context snippets, and semantic top-k retrieval backed by a
//! pluggable embedding-index service (an in-memory implementation ships in
//! the crate).
//!
//! # Quick start
//!
//! ```no_run
//! use lectern::DocumentProcessor;
//!
//! let mut processor = DocumentProcessor::in_memory();
//! if !processor.load("book.pdf") {
//!     eprintln!("could not load document");
//!     return;
//! }
//!
//! println!("{}: {} pages", processor.title(), processor.page_count());
//! println!("now reading: {}", processor.get_current_label());
//!
//! for hit in processor.search("harbor") {
//!     println!("[{}] ...{}...", hit.label, hit.snippet);
//! }
//!
//! let context = processor.get_relevant_context("what happens at the harbor?", 4);
//! println!("{context}");
//!
//! processor.unload(false);
//! ```

pub mod chunking;
pub mod docx;
pub mod ebook;
pub mod error;
pub mod format;
pub mod index;
pub mod memory_index;
pub mod processor;
pub mod search;
pub mod units;

pub use error::{Error, Result};
pub use format::DocFormat;
pub use index::{ChunkMeta, EmbeddingIndex, EmbeddingIndexProvider, IndexManager};
pub use memory_index::MemoryIndexService;
pub use processor::DocumentProcessor;
pub use search::SearchMatch;
pub use units::Unit;
