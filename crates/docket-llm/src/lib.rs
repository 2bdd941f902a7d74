//! Docket LLM Client Layer
//!
//! The seam between the application and the hosted language model.
//!
//! # Architecture
//!
//! [`LlmClient`] is an object-safe async trait so the model can be swapped
//! at construction time — the real [`GeminiClient`] in production, a
//! [`MockClient`] in tests. Callers hand over a [`GenerateRequest`]
//! (a prompt plus optional binary attachments for documents the model
//! consumes natively) and get back the raw response text.
//!
//! # Examples
//!
//! ```
//! use docket_llm::{GenerateRequest, LlmClient, MockClient};
//!
//! # tokio_test::block_on(async {
//! let client = MockClient::new("Hello from the model!");
//! let response = client
//!     .generate(&GenerateRequest::text("test prompt"))
//!     .await
//!     .unwrap();
//! assert_eq!(response, "Hello from the model!");
//! # });
//! ```

#![warn(missing_docs)]

pub mod gemini;

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use thiserror::Error;

pub use gemini::GeminiClient;

/// Errors that can occur talking to the model
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error (possibly transient)
    #[error("communication error: {0}")]
    Communication(String),

    /// The API answered but the payload was not usable
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The request did not complete within the client timeout
    #[error("model request timed out")]
    Timeout,

    /// The configured model does not exist on the endpoint
    #[error("model not available: {0}")]
    ModelNotAvailable(String),

    /// Missing or unusable credential
    #[error("credential error: {0}")]
    Credential(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

impl LlmError {
    /// Whether retrying the same request could plausibly succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, LlmError::Communication(_) | LlmError::Timeout)
    }
}

/// A binary payload forwarded to the model alongside the prompt
///
/// Used for formats where visual layout carries information (paginated
/// documents with embedded images); the model reads the bytes directly
/// instead of extracted text.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Declared media type of the payload
    pub media_type: String,

    /// Raw file bytes
    pub data: Vec<u8>,
}

/// One generation request: a prompt plus optional native attachments
#[derive(Debug, Clone, Default)]
pub struct GenerateRequest {
    /// The full prompt text
    pub prompt: String,

    /// Binary documents the model should read natively
    pub attachments: Vec<Attachment>,
}

impl GenerateRequest {
    /// A text-only request
    pub fn text(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            attachments: Vec::new(),
        }
    }

    /// Attach a binary document
    pub fn with_attachment(mut self, media_type: impl Into<String>, data: Vec<u8>) -> Self {
        self.attachments.push(Attachment {
            media_type: media_type.into(),
            data,
        });
        self
    }
}

/// The model capability: submit content and instructions, receive text
///
/// Implementations are injected wherever analysis happens; nothing in the
/// workspace constructs a model client behind the caller's back.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Generate a completion for the request
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError>;
}

/// Mock model client for deterministic testing
///
/// Responses are scripted in order; when the script runs dry the default
/// response is returned. Every request is recorded for assertions.
///
/// # Examples
///
/// ```
/// use docket_llm::{GenerateRequest, LlmClient, MockClient};
///
/// # tokio_test::block_on(async {
/// let client = MockClient::new("fallback");
/// client.push_response("first");
/// client.push_response("second");
///
/// assert_eq!(client.generate(&GenerateRequest::text("a")).await.unwrap(), "first");
/// assert_eq!(client.generate(&GenerateRequest::text("b")).await.unwrap(), "second");
/// assert_eq!(client.generate(&GenerateRequest::text("c")).await.unwrap(), "fallback");
/// assert_eq!(client.call_count(), 3);
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct MockClient {
    default_response: String,
    scripted: Arc<Mutex<VecDeque<Result<String, String>>>>,
    calls: Arc<Mutex<Vec<GenerateRequest>>>,
}

impl MockClient {
    /// Create a mock returning `response` whenever the script is empty
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            default_response: response.into(),
            scripted: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queue a response for the next unanswered call
    pub fn push_response(&self, response: impl Into<String>) {
        self.scripted
            .lock()
            .unwrap()
            .push_back(Ok(response.into()));
    }

    /// Queue an error for the next unanswered call
    pub fn push_error(&self, message: impl Into<String>) {
        self.scripted
            .lock()
            .unwrap()
            .push_back(Err(message.into()));
    }

    /// Number of generate calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Copies of every request received, in order
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new("Default mock response")
    }
}

#[async_trait]
impl LlmClient for MockClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        self.calls.lock().unwrap().push(request.clone());

        match self.scripted.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(LlmError::Other(message)),
            None => Ok(self.default_response.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_default_response() {
        let client = MockClient::new("Test response");
        let result = client.generate(&GenerateRequest::text("any prompt")).await;
        assert_eq!(result.unwrap(), "Test response");
    }

    #[tokio::test]
    async fn test_mock_scripted_responses_in_order() {
        let client = MockClient::default();
        client.push_response("one");
        client.push_response("two");

        assert_eq!(
            client.generate(&GenerateRequest::text("a")).await.unwrap(),
            "one"
        );
        assert_eq!(
            client.generate(&GenerateRequest::text("b")).await.unwrap(),
            "two"
        );
        assert_eq!(
            client.generate(&GenerateRequest::text("c")).await.unwrap(),
            "Default mock response"
        );
    }

    #[tokio::test]
    async fn test_mock_scripted_error() {
        let client = MockClient::default();
        client.push_error("scripted failure");

        let result = client.generate(&GenerateRequest::text("boom")).await;
        assert!(matches!(result, Err(LlmError::Other(_))));
    }

    #[tokio::test]
    async fn test_mock_records_requests() {
        let client = MockClient::default();
        let request = GenerateRequest::text("prompt").with_attachment("application/pdf", vec![1, 2]);

        client.generate(&request).await.unwrap();

        let recorded = client.requests();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].prompt, "prompt");
        assert_eq!(recorded[0].attachments.len(), 1);
        assert_eq!(recorded[0].attachments[0].media_type, "application/pdf");
    }

    #[tokio::test]
    async fn test_mock_clone_shares_state() {
        let client1 = MockClient::new("test");
        let client2 = client1.clone();

        client1.generate(&GenerateRequest::text("x")).await.unwrap();

        // Both should share the same call log due to Arc
        assert_eq!(client1.call_count(), 1);
        assert_eq!(client2.call_count(), 1);
    }

    #[test]
    fn test_transient_classification() {
        assert!(LlmError::Communication("reset".into()).is_transient());
        assert!(LlmError::Timeout.is_transient());
        assert!(!LlmError::InvalidResponse("bad".into()).is_transient());
        assert!(!LlmError::ModelNotAvailable("m".into()).is_transient());
    }
}
