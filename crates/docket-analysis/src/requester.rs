//! The analysis requester: one model call per batch

use crate::error::AnalysisError;
use crate::parser::parse_analysis;
use crate::prompt::{chat_prompt, summary_prompt, PromptBuilder};
use crate::types::{BatchEntry, EntryContent};
use docket_domain::DocumentAnalysis;
use docket_llm::{GenerateRequest, LlmClient};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;
use tracing::{debug, info, warn};

/// Configuration for the requester
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Maximum time for a single model call (seconds)
    pub call_timeout_secs: u64,
}

impl AnalysisConfig {
    /// Get the call timeout as a Duration
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            call_timeout_secs: 120,
        }
    }
}

/// Submits one batch of document contents to the model and validates the
/// structured result
#[derive(Clone)]
pub struct AnalysisRequester {
    llm: Arc<dyn LlmClient>,
    config: AnalysisConfig,
}

impl AnalysisRequester {
    /// Create a requester over an injected model client
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self {
            llm,
            config: AnalysisConfig::default(),
        }
    }

    /// Override the configuration
    pub fn with_config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    /// Analyze a batch of extracted contents
    ///
    /// Makes exactly one extraction call for the whole batch. When
    /// `instructions` is present, a second call produces a conversational
    /// summary; that call degrading or failing never fails the batch.
    pub async fn analyze(
        &self,
        entries: &[BatchEntry],
        instructions: Option<&str>,
    ) -> Result<DocumentAnalysis, AnalysisError> {
        let instructions = instructions.map(str::trim).filter(|s| !s.is_empty());

        let prompt = PromptBuilder::new(entries)
            .with_instructions(instructions)
            .build();

        let mut request = GenerateRequest::text(prompt);
        for entry in entries {
            if let EntryContent::Native(bytes) = &entry.content {
                request = request.with_attachment(entry.media_type.clone(), bytes.clone());
            }
        }

        debug!(
            prompt_chars = request.prompt.len(),
            attachments = request.attachments.len(),
            "requesting batch analysis"
        );

        let response = self.call(&request).await?;
        let mut analysis = parse_analysis(&response)?;

        info!(
            parties = analysis.parties.len(),
            deadlines = analysis.deadlines.len(),
            key_facts = analysis.key_facts.len(),
            actions = analysis.suggested_actions.len(),
            confidence = analysis.confidence,
            "batch analysis parsed"
        );

        if let Some(instructions) = instructions {
            analysis.conversational_response =
                self.conversational_summary(&analysis, instructions).await;
        }

        Ok(analysis)
    }

    /// Generate a plain conversational reply (no documents involved)
    pub async fn chat(
        &self,
        message: &str,
        context: Option<&str>,
    ) -> Result<String, AnalysisError> {
        let request = GenerateRequest::text(chat_prompt(message, context));
        let response = self.call(&request).await?;
        Ok(response.trim().to_string())
    }

    /// The follow-up summary call; failure degrades to `None`
    async fn conversational_summary(
        &self,
        analysis: &DocumentAnalysis,
        instructions: &str,
    ) -> Option<String> {
        let request = GenerateRequest::text(summary_prompt(analysis, instructions));

        match self.call(&request).await {
            Ok(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
            Ok(_) => {
                warn!("conversational summary came back empty, using generic confirmation");
                None
            }
            Err(e) => {
                warn!(error = %e, "conversational summary failed, using generic confirmation");
                None
            }
        }
    }

    async fn call(&self, request: &GenerateRequest) -> Result<String, AnalysisError> {
        timeout(self.config.call_timeout(), self.llm.generate(request))
            .await
            .map_err(|_| AnalysisError::Timeout)?
            .map_err(AnalysisError::Llm)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_llm::MockClient;

    const ANALYSIS_JSON: &str = r#"{
        "caseNumber": "2024-CV-1234",
        "parties": ["Smith", "Jones"],
        "deadlines": [{"date": "March 15, 2024", "description": "file motion", "priority": "high"}],
        "keyFacts": ["fact"],
        "confidence": 0.9,
        "suggestedActions": [{"title": "Act", "description": "d", "rationale": "r", "priority": "medium"}]
    }"#;

    fn requester(mock: &MockClient) -> AnalysisRequester {
        AnalysisRequester::new(Arc::new(mock.clone()))
    }

    #[tokio::test]
    async fn test_single_call_without_instructions() {
        let mock = MockClient::new(ANALYSIS_JSON);
        let entries = vec![BatchEntry::text("a.txt", "text/plain", "some text")];

        let analysis = requester(&mock).analyze(&entries, None).await.unwrap();

        assert_eq!(mock.call_count(), 1);
        assert_eq!(analysis.case_number.as_deref(), Some("2024-CV-1234"));
        assert_eq!(analysis.conversational_response, None);
    }

    #[tokio::test]
    async fn test_instructions_trigger_second_call() {
        let mock = MockClient::default();
        mock.push_response(ANALYSIS_JSON);
        mock.push_response("I found the deadline you asked about: March 15, 2024.");

        let entries = vec![BatchEntry::text("a.txt", "text/plain", "some text")];
        let analysis = requester(&mock)
            .analyze(&entries, Some("find deadlines"))
            .await
            .unwrap();

        assert_eq!(mock.call_count(), 2);
        assert_eq!(
            analysis.conversational_response.as_deref(),
            Some("I found the deadline you asked about: March 15, 2024.")
        );

        // First prompt carries the instructions, second restates findings
        let requests = mock.requests();
        assert!(requests[0].prompt.contains("find deadlines"));
        assert!(requests[1].prompt.contains("file motion (March 15, 2024)"));
    }

    #[tokio::test]
    async fn test_summary_failure_degrades_not_fails() {
        let mock = MockClient::default();
        mock.push_response(ANALYSIS_JSON);
        mock.push_error("summary backend down");

        let entries = vec![BatchEntry::text("a.txt", "text/plain", "some text")];
        let analysis = requester(&mock)
            .analyze(&entries, Some("find deadlines"))
            .await
            .unwrap();

        // Extraction survives; the summary is simply absent
        assert_eq!(analysis.case_number.as_deref(), Some("2024-CV-1234"));
        assert_eq!(analysis.conversational_response, None);
    }

    #[tokio::test]
    async fn test_primary_call_failure_is_fatal() {
        let mock = MockClient::default();
        mock.push_error("backend down");

        let entries = vec![BatchEntry::text("a.txt", "text/plain", "some text")];
        let result = requester(&mock).analyze(&entries, None).await;
        assert!(matches!(result, Err(AnalysisError::Llm(_))));
    }

    #[tokio::test]
    async fn test_unparseable_response_is_fatal_without_retry() {
        let mock = MockClient::new("I refuse to answer in JSON.");

        let entries = vec![BatchEntry::text("a.txt", "text/plain", "some text")];
        let result = requester(&mock).analyze(&entries, None).await;

        assert!(matches!(result, Err(AnalysisError::NoJsonFound)));
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_native_entries_become_attachments() {
        let mock = MockClient::new(ANALYSIS_JSON);
        let entries = vec![
            BatchEntry::native("scan.pdf", "application/pdf", vec![0x25, 0x50]),
            BatchEntry::text("notes.txt", "text/plain", "notes"),
        ];

        requester(&mock).analyze(&entries, None).await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].attachments.len(), 1);
        assert_eq!(requests[0].attachments[0].media_type, "application/pdf");
        assert!(requests[0].prompt.contains("notes"));
    }

    #[tokio::test]
    async fn test_chat_uses_single_call() {
        let mock = MockClient::new("Happy to help with your case.");
        let reply = requester(&mock).chat("hello", None).await.unwrap();

        assert_eq!(reply, "Happy to help with your case.");
        assert_eq!(mock.call_count(), 1);
        assert!(mock.requests()[0].prompt.contains("User message: hello"));
    }
}
