//! Extraction results - the structured output of one analysis batch

use crate::ids::{DocumentId, ExtractionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority attached to deadlines and suggested actions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Needs attention now
    High,
    /// Normal attention
    Medium,
    /// Can wait
    Low,
}

impl Priority {
    /// Canonical lowercase string form, as stored and serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "high",
            Priority::Medium => "medium",
            Priority::Low => "low",
        }
    }

    /// Parse the canonical string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "high" => Some(Priority::High),
            "medium" => Some(Priority::Medium),
            "low" => Some(Priority::Low),
            _ => None,
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dated item found inside analyzed documents
///
/// Embedded in [`ExtractedData`], not a standalone row. The date stays a
/// string: models return anything from ISO dates to "30 days after
/// service", and the review UI shows it verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Deadline {
    /// Date as written in the source document
    pub date: String,

    /// What is due
    pub description: String,

    /// How urgent the deadline is
    pub priority: Priority,
}

/// The structured result of one successful analysis batch
///
/// Created once per batch and never mutated. When a batch spans several
/// documents the row links to the first document in upload order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    /// Unique identifier
    pub id: ExtractionId,

    /// First document of the analyzed batch
    pub document_id: DocumentId,

    /// Case number the model found, if any
    pub case_number: Option<String>,

    /// Parties involved (plaintiff, defendant, counsel, witnesses)
    pub parties: Vec<String>,

    /// Deadlines found across the batch
    pub deadlines: Vec<Deadline>,

    /// Key facts, evidence, or testimony
    pub key_facts: Vec<String>,

    /// Model confidence in [0, 1]
    pub confidence: f64,

    /// When the analysis completed
    pub extracted_at: DateTime<Utc>,
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: every priority survives a serde round trip
        #[test]
        fn test_priority_serde_roundtrip(idx in 0usize..3) {
            let p = [Priority::High, Priority::Medium, Priority::Low][idx];
            let json = serde_json::to_string(&p).unwrap();
            let back: Priority = serde_json::from_str(&json).unwrap();
            prop_assert_eq!(p, back);
        }
    }
}
