//! Analysis results as returned by the model, before persistence
//!
//! [`DocumentAnalysis`] is the validated shape of one batch analysis. The
//! store turns it into an [`crate::ExtractedData`] row plus one
//! [`crate::SuggestedAction`] row per draft.

use crate::extraction::{Deadline, Priority};
use serde::{Deserialize, Serialize};

/// A suggested action as proposed by the model, not yet persisted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionDraft {
    /// Short imperative title
    pub title: String,

    /// What the action involves
    pub description: String,

    /// Why the model proposed it
    pub rationale: String,

    /// Suggested urgency
    pub priority: Priority,
}

/// Validated structured output of one analysis batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentAnalysis {
    /// Case number the model found, if any
    pub case_number: Option<String>,

    /// Parties involved
    pub parties: Vec<String>,

    /// Deadlines found across the batch
    pub deadlines: Vec<Deadline>,

    /// Key facts, evidence, or testimony
    pub key_facts: Vec<String>,

    /// Model confidence in [0, 1]; defaults to 0.85 when the model omits it
    pub confidence: f64,

    /// Proposed next steps
    pub suggested_actions: Vec<ActionDraft>,

    /// Conversational summary tailored to the user's instructions, when the
    /// follow-up call produced one
    pub conversational_response: Option<String>,
}

impl DocumentAnalysis {
    /// An empty analysis with the default confidence
    pub fn empty() -> Self {
        Self {
            case_number: None,
            parties: Vec::new(),
            deadlines: Vec::new(),
            key_facts: Vec::new(),
            confidence: DEFAULT_CONFIDENCE,
            suggested_actions: Vec::new(),
            conversational_response: None,
        }
    }
}

/// Confidence assumed when the model does not report one
pub const DEFAULT_CONFIDENCE: f64 = 0.85;
