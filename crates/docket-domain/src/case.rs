//! Case - the unit of work a legal team organizes documents under

use crate::ids::{CaseId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A case owned by an account
///
/// The case number is display-only; uniqueness is not enforced. Status is
/// free text (default `"active"`). Deleting a case cascades to its
/// documents, their extraction results and suggested actions, and
/// independently to its chat messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    /// Unique identifier
    pub id: CaseId,

    /// Display name
    pub name: String,

    /// Court or internal case number (display-only)
    pub case_number: String,

    /// Free-text status, e.g. "active"
    pub status: String,

    /// Account that created the case
    pub owner_id: UserId,

    /// When the case was created
    pub created_at: DateTime<Utc>,
}

/// Default status for newly created cases
pub const DEFAULT_CASE_STATUS: &str = "active";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_serializes_camel_case() {
        let case = Case {
            id: CaseId::new(),
            name: "Smith v. Jones".to_string(),
            case_number: "2024-CV-1234".to_string(),
            status: DEFAULT_CASE_STATUS.to_string(),
            owner_id: UserId::new(),
            created_at: Utc::now(),
        };

        let json = serde_json::to_value(&case).unwrap();
        assert_eq!(json["caseNumber"], "2024-CV-1234");
        assert_eq!(json["status"], "active");
        assert!(json.get("case_number").is_none());
    }
}
