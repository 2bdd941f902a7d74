//! Batch input types

/// Content of one batch entry
#[derive(Debug, Clone)]
pub enum EntryContent {
    /// Decoded plain text
    Text(String),

    /// Raw bytes the model reads natively (attached to the request)
    Native(Vec<u8>),
}

/// One file's contribution to an analysis batch
#[derive(Debug, Clone)]
pub struct BatchEntry {
    /// Original file name, used to label the content in the prompt
    pub file_name: String,

    /// Declared media type
    pub media_type: String,

    /// Extracted text or native payload
    pub content: EntryContent,
}

impl BatchEntry {
    /// A text entry
    pub fn text(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            content: EntryContent::Text(text.into()),
        }
    }

    /// A native pass-through entry
    pub fn native(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            content: EntryContent::Native(bytes),
        }
    }
}
