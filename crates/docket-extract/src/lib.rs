//! Docket Content Extractor
//!
//! Converts an uploaded file's raw bytes plus its declared media type into
//! analyzable plain text, or flags the buffer for native pass-through when
//! the model should read the bytes directly (PDF, where page layout and
//! embedded images carry information).
//!
//! # Conversions
//!
//! - Word-processing documents: text runs of the embedded `word/document.xml`
//! - Spreadsheets: per sheet, a `=== Sheet: <name> ===` header followed by a
//!   comma-separated row dump; sheets separated by a blank line
//! - PDF: native pass-through by default, with a text-layer fallback
//! - `text/*`: direct UTF-8 decoding
//! - Anything else: lossy UTF-8 decoding, best-effort rather than an error
//!
//! Malformed word-processing or spreadsheet content is an error; the caller
//! aborts the whole batch rather than silently skipping the file.

#![warn(missing_docs)]

mod sheet;
mod word;

use thiserror::Error;
use tracing::debug;

/// Media type routed to native pass-through
pub const MEDIA_PDF: &str = "application/pdf";

/// Word-processing media types we decode
pub const MEDIA_WORD: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/msword",
];

/// Spreadsheet media types we decode
pub const MEDIA_SPREADSHEET: &[&str] = &[
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/vnd.ms-excel",
    "application/vnd.oasis.opendocument.spreadsheet",
];

/// Errors that can occur during content extraction
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Word-processing document could not be decoded
    #[error("failed to parse word-processing document: {0}")]
    WordDocument(String),

    /// Spreadsheet could not be decoded
    #[error("failed to parse spreadsheet: {0}")]
    Spreadsheet(String),

    /// PDF text layer could not be decoded
    #[error("failed to parse PDF: {0}")]
    Pdf(String),
}

/// Outcome of extracting one file
#[derive(Debug, Clone, PartialEq)]
pub enum FileContent {
    /// Decoded plain text ready for analysis
    Text(String),

    /// The raw buffer should be forwarded to the model unchanged
    Native,
}

/// Extract analyzable content from a file
///
/// PDFs come back [`FileContent::Native`] (the preferred mode — the model
/// reads layout and images itself); [`pdf_text`] is the text-layer fallback
/// for callers that need plain text. Unrecognized media types degrade to a
/// lossy UTF-8 decode rather than failing.
pub fn extract(bytes: &[u8], media_type: &str) -> Result<FileContent, ExtractError> {
    if media_type == MEDIA_PDF {
        return Ok(FileContent::Native);
    }
    if MEDIA_WORD.contains(&media_type) {
        return word::extract_docx(bytes).map(FileContent::Text);
    }
    if MEDIA_SPREADSHEET.contains(&media_type) {
        return sheet::extract_workbook(bytes).map(FileContent::Text);
    }
    if media_type.starts_with("text/") {
        return Ok(FileContent::Text(
            String::from_utf8_lossy(bytes).into_owned(),
        ));
    }

    debug!(media_type, "unrecognized media type, decoding as UTF-8");
    Ok(FileContent::Text(
        String::from_utf8_lossy(bytes).into_owned(),
    ))
}

/// Text-layer extraction for PDFs (fallback mode)
///
/// Loses visual layout; prefer native pass-through when the model supports
/// it.
pub fn pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))
}
