//! Gemini API client
//!
//! Talks to the hosted Gemini `generateContent` endpoint over REST. Native
//! attachments (PDFs) ride along as base64 `inlineData` parts so the model
//! can read page layout and embedded images directly.
//!
//! # Features
//!
//! - Async HTTP via reqwest with a per-request timeout
//! - Bounded retry: one extra attempt on transient transport/5xx failures,
//!   none on anything the retry cannot fix
//! - Credential injected at construction, never read from a global

use crate::{Attachment, GenerateRequest, LlmClient, LlmError};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default Gemini REST endpoint
pub const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Default per-request timeout (seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Default number of attempts (first try + one retry)
pub const DEFAULT_MAX_ATTEMPTS: u32 = 2;

/// Environment variable holding the API credential
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Client for the Gemini generateContent API
pub struct GeminiClient {
    endpoint: String,
    model: String,
    api_key: String,
    client: reqwest::Client,
    max_attempts: u32,
}

#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,

    #[serde(rename = "inlineData", skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Serialize)]
struct InlineData {
    #[serde(rename = "mimeType")]
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

impl GeminiClient {
    /// Create a client with an explicit API key and default settings
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_timeout(api_key, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Create a client reading the API key from [`API_KEY_ENV`]
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var(API_KEY_ENV)
            .map_err(|_| LlmError::Credential(format!("{API_KEY_ENV} is not set")))?;
        if api_key.is_empty() {
            return Err(LlmError::Credential(format!("{API_KEY_ENV} is empty")));
        }
        Ok(Self::new(api_key))
    }

    /// Create a client with an explicit per-request timeout
    pub fn with_timeout(api_key: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_key: api_key.into(),
            client,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Override the REST endpoint (useful for proxies and test servers)
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Override the model
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Override the attempt budget (1 = no retry)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    fn build_body(request: &GenerateRequest) -> GeminiRequest {
        let mut parts = Vec::with_capacity(1 + request.attachments.len());
        parts.push(Part {
            text: Some(request.prompt.clone()),
            inline_data: None,
        });
        for Attachment { media_type, data } in &request.attachments {
            parts.push(Part {
                text: None,
                inline_data: Some(InlineData {
                    mime_type: media_type.clone(),
                    data: BASE64.encode(data),
                }),
            });
        }
        GeminiRequest {
            contents: vec![Content { parts }],
        }
    }

    async fn attempt(&self, body: &GeminiRequest) -> Result<String, LlmError> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.endpoint.trim_end_matches('/'),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Communication(format!("request failed: {e}"))
                }
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(LlmError::ModelNotAvailable(self.model.clone()));
        }
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let message = format!("HTTP {status}: {detail}");
            return if status.is_server_error() {
                Err(LlmError::Communication(message))
            } else {
                Err(LlmError::InvalidResponse(message))
            };
        }

        let parsed: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("failed to parse response: {e}")))?;

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(LlmError::InvalidResponse(
                "response contained no text candidates".to_string(),
            ));
        }

        Ok(text)
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(&self, request: &GenerateRequest) -> Result<String, LlmError> {
        let body = Self::build_body(request);
        debug!(
            prompt_chars = request.prompt.len(),
            attachments = request.attachments.len(),
            model = %self.model,
            "calling generateContent"
        );

        let mut last_error = None;
        for attempt in 1..=self.max_attempts {
            match self.attempt(&body).await {
                Ok(text) => return Ok(text),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(attempt, error = %e, "transient model failure, retrying");
                    // Linear backoff is enough for a single retry
                    tokio::time::sleep(Duration::from_secs(attempt as u64)).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error
            .unwrap_or_else(|| LlmError::Communication("attempt budget exhausted".to_string())))
    }
}
