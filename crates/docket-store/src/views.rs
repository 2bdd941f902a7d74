//! Query-layer shapes: read-path assemblies the API serves directly
//!
//! These are denormalized at query time, never stored.

use chrono::{DateTime, Utc};
use docket_domain::{Case, CaseId, Document, ExtractedData, Priority, SuggestedAction};
use serde::Serialize;

/// A case with its derived counts, as shown in the case list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseSummary {
    /// Case identifier
    pub id: CaseId,

    /// Display name
    pub name: String,

    /// Display-only case number
    pub case_number: String,

    /// Free-text status
    pub status: String,

    /// When the case was created
    pub created_at: DateTime<Utc>,

    /// Number of documents uploaded to the case
    pub document_count: usize,

    /// Number of suggested actions still pending review
    pub pending_approvals: usize,
}

/// One extraction result together with its originating document
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionEntry {
    /// The extraction result
    pub extracted: ExtractedData,

    /// The document it links to (first of the analyzed batch)
    pub document: Document,
}

/// An approved action annotated with its full provenance chain
#[derive(Debug, Clone, Serialize)]
pub struct ApprovedAction {
    /// The approved action
    pub action: SuggestedAction,

    /// The extraction result it came from
    pub extracted: ExtractedData,

    /// The originating document
    pub document: Document,

    /// The case everything belongs to
    pub case: Case,
}

/// A deadline flattened out of an extraction result, annotated with where
/// it came from
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseDeadline {
    /// Date as written in the source document
    pub date: String,

    /// What is due
    pub description: String,

    /// How urgent the deadline is
    pub priority: Priority,

    /// Name of the owning case
    pub case_name: String,

    /// Identifier of the owning case
    pub case_id: CaseId,

    /// Display-only case number
    pub case_number: String,

    /// File name of the originating document
    pub document_name: String,
}
