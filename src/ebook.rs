//! EPUB chapter extraction.
//!
//! The `epub` crate handles the container and spine; each spine document is
//! stripped from XHTML to plain text and becomes one [`RawBlock`]. The first
//! `<h1>`-`<h3>` in a document is recovered as its structural label so the
//! unit heuristics can name chapters.

use std::path::Path;

use epub::doc::EpubDoc;

use crate::{
    error::{Error, Result},
    format::{DocFormat, RawBlock},
};

/// Extract one block per spine document from an EPUB file.
pub fn extract_epub(path: &Path) -> Result<Vec<RawBlock>> {
    let mut doc = EpubDoc::new(path).map_err(|e| Error::Parse {
        format: DocFormat::Epub.name(),
        reason: e.to_string(),
    })?;

    let mut blocks = Vec::new();
    for page in 0..doc.get_num_pages() {
        if !doc.set_current_page(page) {
            continue;
        }
        let Some((content, _mime)) = doc.get_current_str() else {
            continue;
        };

        let stripped = strip_html(&content);
        blocks.push(RawBlock::new(
            stripped.text.trim(),
            stripped.heading.unwrap_or_default(),
        ));
    }

    Ok(blocks)
}

struct StrippedHtml {
    text: String,
    /// Content of the first h1-h3 element, if any.
    heading: Option<String>,
}

/// Tags whose entire content is dropped.
const SKIPPED_TAGS: &[&str] = &["script", "style", "head"];

/// Tags that terminate a line of text.
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "li", "ul", "ol", "h1", "h2", "h3", "h4", "h5", "h6", "tr", "td", "table",
    "blockquote", "section", "article",
];

/// Reduce an XHTML document to plain text.
///
/// Tag-level state machine, not a full HTML parser: tags are dropped,
/// block-level tags insert newlines, script/style/head content is skipped,
/// and the handful of entities common in EPUB text are decoded.
fn strip_html(html: &str) -> StrippedHtml {
    let mut text = String::with_capacity(html.len() / 2);
    let mut heading: Option<String> = None;
    let mut heading_buf: Option<String> = None;
    let mut skip_depth = 0usize;

    let mut chars = html.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '<' {
            let mut tag = String::new();
            for t in chars.by_ref() {
                if t == '>' {
                    break;
                }
                tag.push(t);
            }
            let (name, closing) = tag_name(&tag);

            if SKIPPED_TAGS.contains(&name.as_str()) {
                if closing {
                    skip_depth = skip_depth.saturating_sub(1);
                } else if !tag.ends_with('/') {
                    skip_depth += 1;
                }
                continue;
            }

            if heading.is_none() && matches!(name.as_str(), "h1" | "h2" | "h3") {
                if closing {
                    if let Some(buf) = heading_buf.take() {
                        let buf = buf.trim().to_string();
                        if !buf.is_empty() {
                            heading = Some(buf);
                        }
                    }
                } else {
                    heading_buf = Some(String::new());
                }
            }

            if BLOCK_TAGS.contains(&name.as_str()) && !text.ends_with('\n') && !text.is_empty() {
                text.push('\n');
            }
            continue;
        }

        if skip_depth > 0 {
            continue;
        }

        let decoded = if c == '&' {
            decode_entity(&mut chars)
        } else {
            Some(c)
        };
        if let Some(d) = decoded {
            text.push(d);
            if let Some(buf) = heading_buf.as_mut() {
                buf.push(d);
            }
        }
    }

    StrippedHtml { text, heading }
}

/// Split a raw tag body into (lowercased name, is_closing).
fn tag_name(tag: &str) -> (String, bool) {
    let body = tag.trim();
    let closing = body.starts_with('/');
    let body = body.trim_start_matches('/');
    let name: String = body
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    (name, closing)
}

/// Decode an entity reference at the cursor; the leading `&` is consumed.
/// Unknown entities are dropped.
fn decode_entity(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> Option<char> {
    let mut entity = String::new();
    while let Some(&next) = chars.peek() {
        if next == ';' {
            chars.next();
            break;
        }
        if entity.len() > 8 || next == '<' || next.is_whitespace() {
            // Not an entity; nothing consumed renders better than guessing.
            break;
        }
        entity.push(next);
        chars.next();
    }

    match entity.as_str() {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" | "#39" => Some('\''),
        "nbsp" | "#160" => Some(' '),
        code if code.starts_with('#') => code[1..]
            .parse::<u32>()
            .ok()
            .and_then(char::from_u32),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_tags_to_text() {
        let html = "<html><body><p>Hello</p><p>world</p></body></html>";
        let out = strip_html(html);
        assert_eq!(out.text.trim(), "Hello\nworld");
    }

    #[test]
    fn first_heading_becomes_label() {
        let html = "<body><h1>The Voyage</h1><p>It began at sea.</p><h2>Later</h2></body>";
        let out = strip_html(html);
        assert_eq!(out.heading.as_deref(), Some("The Voyage"));
        assert!(out.text.contains("It began at sea."));
    }

    #[test]
    fn h2_counts_when_no_h1() {
        let html = "<body><h2>Part Two</h2><p>text</p></body>";
        let out = strip_html(html);
        assert_eq!(out.heading.as_deref(), Some("Part Two"));
    }

    #[test]
    fn no_heading_yields_none() {
        let out = strip_html("<body><p>just text</p></body>");
        assert!(out.heading.is_none());
    }

    #[test]
    fn script_and_style_content_dropped() {
        let html = "<head><style>p { color: red }</style></head><body>\
                    <script>var x = 1;</script><p>visible</p></body>";
        let out = strip_html(html);
        assert!(!out.text.contains("color"));
        assert!(!out.text.contains("var x"));
        assert!(out.text.contains("visible"));
    }

    #[test]
    fn entities_decoded() {
        let out = strip_html("<p>Fish &amp; Chips &lt;fresh&gt;&nbsp;&#233;</p>");
        assert_eq!(out.text.trim(), "Fish & Chips <fresh> \u{e9}");
    }

    #[test]
    fn missing_file_is_parse_failure() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("absent.epub");
        let err = extract_epub(&path).unwrap_err();
        assert!(matches!(err, Error::Parse { format: "EPUB", .. }));
    }
}
