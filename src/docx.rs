//! DOCX paragraph extraction.
//!
//! A `.docx` file is a zip container; the body lives in `word/document.xml`.
//! Each `<w:p>` paragraph becomes one [`RawBlock`] whose label is the
//! paragraph style id (`<w:pStyle w:val="Heading1"/>`), so the unit
//! heuristics can split chapters at `Heading*` styles.

use std::{fs::File, io::Read, path::Path};

use quick_xml::{Reader, events::Event};

use crate::{
    error::{Error, Result},
    format::{DocFormat, RawBlock},
};

const DOCUMENT_PART: &str = "word/document.xml";

/// Paragraph style assumed when no explicit `w:pStyle` is present.
const DEFAULT_STYLE: &str = "Normal";

fn parse_error(reason: impl ToString) -> Error {
    Error::Parse {
        format: DocFormat::Docx.name(),
        reason: reason.to_string(),
    }
}

/// Extract one block per paragraph from a DOCX file.
pub fn extract_docx(path: &Path) -> Result<Vec<RawBlock>> {
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(parse_error)?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(parse_error)?
        .read_to_string(&mut xml)?;

    parse_document_xml(&xml)
}

/// Walk the WordprocessingML event stream, collecting paragraph text and
/// style. Only `<w:t>` runs contribute text; everything else (fields,
/// properties, drawings) is skipped.
fn parse_document_xml(xml: &str) -> Result<Vec<RawBlock>> {
    let mut reader = Reader::from_str(xml);

    let mut blocks = Vec::new();
    let mut paragraph = String::new();
    let mut style = DEFAULT_STYLE.to_string();
    let mut in_text_run = false;

    loop {
        match reader.read_event().map_err(parse_error)? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => {
                    paragraph.clear();
                    style = DEFAULT_STYLE.to_string();
                }
                b"w:t" => in_text_run = true,
                b"w:pStyle" => {
                    if let Some(val) = style_value(&e) {
                        style = val;
                    }
                }
                _ => {}
            },
            Event::Empty(e) => match e.name().as_ref() {
                b"w:pStyle" => {
                    if let Some(val) = style_value(&e) {
                        style = val;
                    }
                }
                b"w:tab" | b"w:br" => {
                    if in_text_run || !paragraph.is_empty() {
                        paragraph.push(' ');
                    }
                }
                _ => {}
            },
            Event::Text(t) if in_text_run => {
                let text = t.unescape().map_err(parse_error)?;
                paragraph.push_str(&text);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => {
                    blocks.push(RawBlock::new(paragraph.trim(), style.as_str()));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(blocks)
}

fn style_value(e: &quick_xml::events::BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.as_ref() == b"w:val")
        .map(|a| String::from_utf8_lossy(&a.value).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<?xml version="1.0"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:pPr><w:pStyle w:val="Heading1"/></w:pPr>
      <w:r><w:t>Intro</w:t></w:r>
    </w:p>
    <w:p>
      <w:r><w:t>First paragraph</w:t></w:r>
      <w:r><w:t xml:space="preserve"> continued.</w:t></w:r>
    </w:p>
    <w:p>
      <w:pPr><w:pStyle w:val="Heading1"/></w:pPr>
      <w:r><w:t>Methods</w:t></w:r>
    </w:p>
    <w:p>
      <w:r><w:t>Second body.</w:t></w:r>
    </w:p>
  </w:body>
</w:document>"#;

    #[test]
    fn paragraphs_carry_style_labels() {
        let blocks = parse_document_xml(SAMPLE).unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].label, "Heading1");
        assert_eq!(blocks[0].text, "Intro");
        assert_eq!(blocks[1].label, "Normal");
        assert_eq!(blocks[1].text, "First paragraph continued.");
        assert_eq!(blocks[2].text, "Methods");
        assert_eq!(blocks[3].text, "Second body.");
    }

    #[test]
    fn text_runs_join_within_paragraph() {
        let xml = r#"<w:document xmlns:w="x"><w:body>
          <w:p><w:r><w:t>a</w:t></w:r><w:r><w:t>b</w:t></w:r></w:p>
        </w:body></w:document>"#;
        let blocks = parse_document_xml(xml).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "ab");
    }

    #[test]
    fn tabs_and_breaks_become_spaces() {
        let xml = r#"<w:document xmlns:w="x"><w:body>
          <w:p><w:r><w:t>left</w:t><w:tab/><w:t>right</w:t></w:r></w:p>
        </w:body></w:document>"#;
        let blocks = parse_document_xml(xml).unwrap();
        assert_eq!(blocks[0].text, "left right");
    }

    #[test]
    fn entities_are_unescaped() {
        let xml = r#"<w:document xmlns:w="x"><w:body>
          <w:p><w:r><w:t>a &amp; b</w:t></w:r></w:p>
        </w:body></w:document>"#;
        let blocks = parse_document_xml(xml).unwrap();
        assert_eq!(blocks[0].text, "a & b");
    }

    #[test]
    fn missing_file_is_parse_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("not-a-zip.docx");
        std::fs::write(&path, "plain text, not a zip archive").unwrap();

        let err = extract_docx(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { format: "DOCX", .. }));
    }

    #[test]
    fn real_docx_container_roundtrip() {
        use std::io::Write;
        use zip::write::SimpleFileOptions;

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("doc.docx");
        let file = File::create(&path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        writer
            .start_file(DOCUMENT_PART, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(SAMPLE.as_bytes()).unwrap();
        writer.finish().unwrap();

        let blocks = extract_docx(&path).unwrap();
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].text, "Intro");
    }
}
