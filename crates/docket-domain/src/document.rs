//! Document - an uploaded file attached to a case

use crate::ids::{CaseId, DocumentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded document
///
/// The file content itself lives in the blob store; `storage_path` is an
/// opaque locator into it. Rows are immutable after creation except for
/// deletion (which also removes the blob).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Unique identifier
    pub id: DocumentId,

    /// Case this document belongs to
    pub case_id: CaseId,

    /// Original file name as uploaded
    pub file_name: String,

    /// Declared media type (e.g. "application/pdf")
    pub media_type: String,

    /// Size of the uploaded content in bytes
    pub byte_size: u64,

    /// Opaque locator into the blob store
    pub storage_path: String,

    /// When the document was uploaded
    pub uploaded_at: DateTime<Utc>,
}
