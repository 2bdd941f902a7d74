//! Suggested actions - reviewable next steps derived from analysis

use crate::extraction::Priority;
use crate::ids::{ActionId, ExtractionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Review state of a suggested action
///
/// Actions start `pending` and move to `approved` or `rejected`; both are
/// terminal. Re-applying a terminal status is an idempotent overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    /// Awaiting review
    Pending,
    /// Accepted by the team
    Approved,
    /// Declined by the team
    Rejected,
}

impl ActionStatus {
    /// Canonical lowercase string form, as stored and serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionStatus::Pending => "pending",
            ActionStatus::Approved => "approved",
            ActionStatus::Rejected => "rejected",
        }
    }

    /// Parse the canonical string form
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(ActionStatus::Pending),
            "approved" => Some(ActionStatus::Approved),
            "rejected" => Some(ActionStatus::Rejected),
            _ => None,
        }
    }

    /// True for the reviewable end states (`approved`, `rejected`)
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ActionStatus::Pending)
    }
}

impl fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A next step the model proposed for the legal team
///
/// Status is the only field that changes after creation; `updated_at`
/// refreshes on every status write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedAction {
    /// Unique identifier
    pub id: ActionId,

    /// Extraction result this action came from
    pub extracted_data_id: ExtractionId,

    /// Short imperative title
    pub title: String,

    /// What the action involves
    pub description: String,

    /// Why the model proposed it
    pub rationale: String,

    /// Suggested urgency
    pub priority: Priority,

    /// Review state
    pub status: ActionStatus,

    /// When the action was created
    pub created_at: DateTime<Utc>,

    /// When the status last changed
    pub updated_at: DateTime<Utc>,
}
