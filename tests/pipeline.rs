//! End-to-end pipeline tests: real files on disk, through load, navigation,
//! search, and retrieval.

use std::io::Write as _;
use std::path::PathBuf;

use lectern::{DocFormat, DocumentProcessor};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn write_file(dir: &tempfile::TempDir, name: &str, content: &str) -> PathBuf {
    init_tracing();
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

fn numbered_words(n: usize) -> String {
    (0..n).map(|i| format!("w{i}")).collect::<Vec<_>>().join(" ")
}

/// Minimal but well-formed DOCX: a zip with word/document.xml inside.
fn write_docx(dir: &tempfile::TempDir, name: &str, document_xml: &str) -> PathBuf {
    init_tracing();
    let path = dir.path().join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut archive = zip::ZipWriter::new(file);
    let options = zip::write::SimpleFileOptions::default();
    archive.start_file("word/document.xml", options).unwrap();
    archive.write_all(document_xml.as_bytes()).unwrap();
    archive.finish().unwrap();
    path
}

#[test]
fn txt_pipeline_load_navigate_search_retrieve() {
    let tmp = tempfile::tempdir().unwrap();
    let content = format!("{} the lighthouse keeper waited {}", numbered_words(600), numbered_words(40));
    let path = write_file(&tmp, "story.txt", &content);

    let mut processor = DocumentProcessor::in_memory();
    assert!(processor.load(&path));

    assert_eq!(processor.title(), "story.txt");
    assert_eq!(processor.format(), Some(DocFormat::Txt));
    assert_eq!(processor.page_count(), 2);
    assert_eq!(processor.get_current_label(), "Section 1");

    assert!(processor.next_page());
    assert_eq!(processor.get_current_label(), "Section 2");
    assert!(!processor.next_page());

    let matches = processor.search("lighthouse");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].label, "Section 2");
    assert!(matches[0].snippet.contains("lighthouse keeper"));

    let context = processor.get_relevant_context("lighthouse keeper", 4);
    assert!(context.contains("lighthouse"));

    assert!(processor.unload(false));
    assert!(path.exists());
    assert_eq!(processor.page_count(), 0);
    assert_eq!(processor.get_relevant_context("lighthouse", 4), "");
}

#[test]
fn docx_pipeline_splits_on_headings() {
    let tmp = tempfile::tempdir().unwrap();
    let xml = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Harbor Lights</w:t></w:r></w:p>
    <w:p><w:r><w:t>The ships came in at dawn.</w:t></w:r></w:p>
    <w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Open Water</w:t></w:r></w:p>
    <w:p><w:r><w:t>Beyond the breakwater the sea turned gray.</w:t></w:r></w:p>
  </w:body>
</w:document>"#;
    let path = write_docx(&tmp, "voyage.docx", xml);

    let mut processor = DocumentProcessor::in_memory();
    assert!(processor.load(&path));

    assert_eq!(processor.format(), Some(DocFormat::Docx));
    assert_eq!(processor.page_count(), 2);
    assert_eq!(processor.get_current_label(), "Harbor Lights");
    assert_eq!(processor.get_page(0), "The ships came in at dawn.");

    assert!(processor.go_to_page(1));
    assert_eq!(processor.get_current_label(), "Open Water");

    // 1-indexed chapter access matches page 0-indexing shifted by one.
    assert_eq!(processor.get_chapter_text(2), processor.get_page(1));
}

#[test]
fn corrupt_docx_fails_without_side_effects() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_file(&tmp, "broken.docx", "this is not a zip archive");

    let mut processor = DocumentProcessor::in_memory();
    assert!(!processor.load(&path));
    assert!(!processor.is_loaded());
    assert!(path.exists());
}

#[test]
fn failed_load_does_not_serve_previous_index() {
    let tmp = tempfile::tempdir().unwrap();
    let good = write_file(&tmp, "good.txt", "alpha beta gamma delta epsilon");
    let bad = write_file(&tmp, "bad.xyz", "unsupported");

    let mut processor = DocumentProcessor::in_memory();
    assert!(processor.load(&good));
    assert!(!processor.load(&bad));
    assert!(!processor.is_loaded());

    // Fully unloaded means no index either: retrieval must not answer with
    // the first document's chunks.
    assert_eq!(processor.get_relevant_context("alpha", 4), "");
}

#[test]
fn reload_switches_documents_and_indexes() {
    let tmp = tempfile::tempdir().unwrap();
    let first = write_file(&tmp, "first.txt", "alpha beta gamma delta");
    let second = write_file(&tmp, "second.txt", "completely different vocabulary here");

    let mut processor = DocumentProcessor::in_memory();
    assert!(processor.load(&first));
    assert!(processor.load(&second));

    assert_eq!(processor.title(), "second.txt");
    let context = processor.get_relevant_context("vocabulary", 1);
    assert!(context.contains("vocabulary"));
    assert!(!context.contains("alpha"));
}

#[test]
fn unload_with_delete_removes_file() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_file(&tmp, "ephemeral.txt", "short lived content");

    let mut processor = DocumentProcessor::in_memory();
    assert!(processor.load(&path));
    assert!(processor.unload(true));
    assert!(!path.exists());

    // Second unload with delete on is still fine: nothing left to delete.
    assert!(processor.unload(true));
}

#[test]
fn full_text_fallback_when_requesting_from_small_document() {
    let tmp = tempfile::tempdir().unwrap();
    let path = write_file(&tmp, "note.txt", "a single short note about tides");

    let mut processor = DocumentProcessor::in_memory();
    assert!(processor.load(&path));

    // One unit, one chunk; asking for many results clamps to what exists.
    let context = processor.get_relevant_context("tides", 10);
    assert_eq!(context, "a single short note about tides");
}
