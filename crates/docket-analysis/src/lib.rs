//! Docket Analysis Requester
//!
//! Turns one batch of extracted document contents into a structured
//! [`docket_domain::DocumentAnalysis`] via the injected model client.
//!
//! # Overview
//!
//! ```text
//! Batch entries → PromptBuilder → LLM (one call) → parser → DocumentAnalysis
//!                                      ↓ (optional, instructions present)
//!                               summary call → conversational response
//! ```
//!
//! # Key Behaviors
//!
//! - **One call per batch**: every file's content rides in a single
//!   composite prompt so the model can cross-reference facts and the cost
//!   stays bounded; native entries become binary attachments.
//! - **Untrusted output**: the model response is scanned for the first
//!   balanced `{...}` region, parsed, and then coerced field by field —
//!   missing lists become empty, missing confidence becomes 0.85, unknown
//!   priorities become `medium`, actions without a title are dropped.
//! - **Degrading summary**: when the caller supplied free-text
//!   instructions a second call restates the findings conversationally;
//!   if that call fails the analysis still succeeds without it.

#![warn(missing_docs)]

mod error;
mod parser;
mod prompt;
mod requester;
mod types;

pub use error::AnalysisError;
pub use parser::parse_analysis;
pub use prompt::{chat_prompt, summary_prompt, PromptBuilder};
pub use requester::{AnalysisConfig, AnalysisRequester};
pub use types::{BatchEntry, EntryContent};
