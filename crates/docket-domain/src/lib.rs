//! Docket Domain Layer
//!
//! Core data model for the Docket case-management service. This crate holds
//! the entities every other layer passes around — cases, documents, chat
//! messages, extraction results, suggested actions, user accounts — plus the
//! id newtypes that key them.
//!
//! ## Key Concepts
//!
//! - **Case**: a matter a legal team is working; owns documents and chat
//! - **Document**: an uploaded file; immutable after creation
//! - **ExtractedData**: the structured result of one analysis batch
//! - **SuggestedAction**: a reviewable next step derived from analysis
//! - **Deadline**: a dated item embedded inside an extraction result
//!
//! ## Architecture
//!
//! Pure types only: serde for the wire model, chrono for timestamps, uuid
//! for identity. Persistence, HTTP, and LLM integration live in other
//! crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod action;
pub mod analysis;
pub mod case;
pub mod document;
pub mod extraction;
pub mod ids;
pub mod message;
pub mod user;

// Re-exports for convenience
pub use action::{ActionStatus, SuggestedAction};
pub use analysis::{ActionDraft, DocumentAnalysis};
pub use case::Case;
pub use document::Document;
pub use extraction::{Deadline, ExtractedData, Priority};
pub use ids::{ActionId, CaseId, DocumentId, ExtractionId, IdParseError, MessageId, UserId};
pub use message::{ChatMessage, MessageRole};
pub use user::{UserAccount, UserCredentials};
