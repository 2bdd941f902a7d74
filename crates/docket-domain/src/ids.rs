//! Entity identifiers
//!
//! Every persisted entity is keyed by a UUIDv7. UUIDv7 provides:
//! - Chronological sortability, so newest-first reads can tiebreak on id
//! - 128-bit uniqueness with no coordination between writers
//! - RFC 9562-standard format with broad ecosystem support
//!
//! Ids are distinct newtypes so a `DocumentId` can never be passed where a
//! `CaseId` is expected.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Error returned when an id string is not a valid UUID
#[derive(Debug, Error)]
#[error("invalid identifier: {0}")]
pub struct IdParseError(pub String);

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a new UUIDv7-based id
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Parse an id from its canonical hyphenated string form
            pub fn parse(s: &str) -> Result<Self, IdParseError> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|_| IdParseError(s.to_string()))
            }

            /// The underlying UUID
            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Identifier for a user account
    UserId
);
entity_id!(
    /// Identifier for a case
    CaseId
);
entity_id!(
    /// Identifier for an uploaded document
    DocumentId
);
entity_id!(
    /// Identifier for a chat message
    MessageId
);
entity_id!(
    /// Identifier for an extraction result
    ExtractionId
);
entity_id!(
    /// Identifier for a suggested action
    ActionId
);
