//! Word-processing document text extraction
//!
//! A DOCX file is a zip archive; the body text lives in
//! `word/document.xml` as `<w:t>` runs grouped into `<w:p>` paragraphs.
//! We pull the runs out and keep paragraph boundaries as newlines —
//! formatting, tables-as-layout, headers and footers are not analysis
//! input.

use crate::ExtractError;
use quick_xml::events::Event;
use quick_xml::Reader;
use std::io::{Cursor, Read};

const DOCUMENT_PART: &str = "word/document.xml";

pub(crate) fn extract_docx(bytes: &[u8]) -> Result<String, ExtractError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| ExtractError::WordDocument(format!("not a document archive: {e}")))?;

    let mut xml = String::new();
    archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| ExtractError::WordDocument(format!("missing {DOCUMENT_PART}: {e}")))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractError::WordDocument(format!("unreadable {DOCUMENT_PART}: {e}")))?;

    document_text(&xml)
}

/// Collect the text runs of a WordprocessingML body
fn document_text(xml: &str) -> Result<String, ExtractError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_run = false,
                // Paragraph boundary
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) if e.name().as_ref() == b"w:br" => out.push('\n'),
            Ok(Event::Text(t)) if in_run => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractError::WordDocument(format!("bad text run: {e}")))?;
                out.push_str(&text);
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractError::WordDocument(format!(
                    "malformed document XML: {e}"
                )))
            }
            _ => {}
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    /// Build an in-memory DOCX containing the given document.xml body
    fn docx_with_body(body_xml: &str) -> Vec<u8> {
        let document = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
<w:body>{body_xml}</w:body>
</w:document>"#
        );

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file(DOCUMENT_PART, SimpleFileOptions::default())
                .unwrap();
            writer.write_all(document.as_bytes()).unwrap();
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn test_extracts_paragraph_text() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>Plaintiff moves for summary judgment.</w:t></w:r></w:p>\
             <w:p><w:r><w:t>Hearing set for March 15, 2024.</w:t></w:r></w:p>",
        );

        let text = extract_docx(&bytes).unwrap();
        assert!(text.contains("Plaintiff moves for summary judgment."));
        assert!(text.contains("Hearing set for March 15, 2024."));

        // Paragraphs stay on separate lines
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_joins_split_runs_within_a_paragraph() {
        let bytes = docx_with_body(
            "<w:p><w:r><w:t>Case No. </w:t></w:r><w:r><w:t>2024-CV-1234</w:t></w:r></w:p>",
        );

        let text = extract_docx(&bytes).unwrap();
        assert!(text.contains("Case No. 2024-CV-1234"));
    }

    #[test]
    fn test_unescapes_entities() {
        let bytes = docx_with_body("<w:p><w:r><w:t>Smith &amp; Jones</w:t></w:r></w:p>");
        let text = extract_docx(&bytes).unwrap();
        assert!(text.contains("Smith & Jones"));
    }

    #[test]
    fn test_rejects_non_zip_input() {
        let result = extract_docx(b"plain text pretending to be a docx");
        assert!(matches!(result, Err(ExtractError::WordDocument(_))));
    }

    #[test]
    fn test_rejects_archive_without_document_part() {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            writer
                .start_file("unrelated.txt", SimpleFileOptions::default())
                .unwrap();
            writer.write_all(b"hello").unwrap();
            writer.finish().unwrap();
        }

        let result = extract_docx(&cursor.into_inner());
        assert!(matches!(result, Err(ExtractError::WordDocument(_))));
    }
}
