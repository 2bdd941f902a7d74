//! Docket Intake Orchestrator
//!
//! Drives the document-intake pipeline for one case: extract every uploaded
//! file, analyze the whole batch with a single model call, then persist
//! documents, extraction result, pending actions, and chat messages as one
//! unit of work.
//!
//! # Pipeline
//!
//! ```text
//! files → content extraction (per file) → batch analysis (one call)
//!       → blob writes → one DB transaction → IntakeRecord
//! ```
//!
//! # Failure policy
//!
//! A batch succeeds or fails atomically. Extraction and analysis run before
//! anything is persisted; all rows then land in a single transaction, and
//! blobs written for a batch whose transaction fails are deleted again. A
//! failed batch leaves no trace.

#![warn(missing_docs)]

use docket_analysis::{AnalysisError, AnalysisRequester, BatchEntry};
use docket_domain::CaseId;
use docket_extract::{extract, ExtractError, FileContent, MEDIA_PDF};
use docket_store::{BlobError, FileBlobStore, IntakeRecord, NewDocument, SqliteStore, StoreError};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{info, warn};

/// Minimum extracted-text length a non-native file must reach
pub const DEFAULT_MIN_TEXT_CHARS: usize = 50;

/// Errors that can abort an intake batch
#[derive(Error, Debug)]
pub enum IntakeError {
    /// The request carried no files
    #[error("no files uploaded")]
    EmptyBatch,

    /// The target case does not exist
    #[error("case not found: {0}")]
    CaseNotFound(CaseId),

    /// A file decoded but yielded too little text to analyze
    #[error("could not extract readable text from {0}")]
    UnreadableDocument(String),

    /// A file's content could not be decoded at all
    #[error("failed to extract {file_name}: {source}")]
    Extraction {
        /// The offending file
        file_name: String,
        /// What the extractor reported
        source: ExtractError,
    },

    /// The batch analysis failed
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// Persistence failed
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Blob storage failed
    #[error(transparent)]
    Blob(#[from] BlobError),

    /// The shared store lock was poisoned
    #[error("store lock poisoned")]
    StoreLock,
}

/// One uploaded file, as received from the HTTP layer
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original file name
    pub file_name: String,

    /// Declared media type
    pub media_type: String,

    /// Raw content
    pub bytes: Vec<u8>,
}

/// Tunables for the pipeline
#[derive(Debug, Clone)]
pub struct IntakeConfig {
    /// Minimum extracted-text length for non-native files
    pub min_text_chars: usize,
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            min_text_chars: DEFAULT_MIN_TEXT_CHARS,
        }
    }
}

/// The intake pipeline coordinator
#[derive(Clone)]
pub struct IntakePipeline {
    store: Arc<Mutex<SqliteStore>>,
    blobs: FileBlobStore,
    requester: AnalysisRequester,
    config: IntakeConfig,
}

impl IntakePipeline {
    /// Create a pipeline over shared collaborators
    pub fn new(
        store: Arc<Mutex<SqliteStore>>,
        blobs: FileBlobStore,
        requester: AnalysisRequester,
    ) -> Self {
        Self {
            store,
            blobs,
            requester,
            config: IntakeConfig::default(),
        }
    }

    /// Override the configuration
    pub fn with_config(mut self, config: IntakeConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the full intake pipeline for one batch
    ///
    /// Exactly one analysis call is made regardless of the number of files.
    /// PDFs go to the model natively; everything else is extracted to text
    /// and must clear the minimum-length floor.
    pub async fn ingest(
        &self,
        case_id: CaseId,
        files: Vec<UploadedFile>,
        instructions: Option<String>,
    ) -> Result<IntakeRecord, IntakeError> {
        if files.is_empty() {
            return Err(IntakeError::EmptyBatch);
        }
        let instructions = instructions
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        {
            let store = self.store.lock().map_err(|_| IntakeError::StoreLock)?;
            if store.get_case(case_id)?.is_none() {
                return Err(IntakeError::CaseNotFound(case_id));
            }
        }

        info!(
            case_id = %case_id,
            files = files.len(),
            has_instructions = instructions.is_some(),
            "starting intake batch"
        );

        let entries = self.extract_batch(&files)?;
        let analysis = self
            .requester
            .analyze(&entries, instructions.as_deref())
            .await?;

        let upload_message = upload_message(&files, instructions.as_deref());
        let analysis_message = analysis
            .conversational_response
            .clone()
            .unwrap_or_else(|| generic_confirmation(files.len()));

        // Nothing is persisted until here; blobs first, then every row in
        // one transaction, with the blobs compensated if the rows fail
        let new_documents = self.write_blobs(&files)?;
        let record = {
            let mut store = self.store.lock().map_err(|_| IntakeError::StoreLock)?;
            store.persist_intake(
                case_id,
                &new_documents,
                &upload_message,
                &analysis,
                &analysis_message,
            )
        };

        match record {
            Ok(record) => {
                info!(
                    case_id = %case_id,
                    documents = record.documents.len(),
                    actions = record.actions.len(),
                    "intake batch committed"
                );
                Ok(record)
            }
            Err(e) => {
                self.discard_blobs(&new_documents);
                Err(e.into())
            }
        }
    }

    /// Run the content extractor over every file in the batch
    fn extract_batch(&self, files: &[UploadedFile]) -> Result<Vec<BatchEntry>, IntakeError> {
        let mut entries = Vec::with_capacity(files.len());
        for file in files {
            // PDF goes to the model natively; layout and embedded images
            // carry information the text layer loses
            if file.media_type == MEDIA_PDF {
                entries.push(BatchEntry::native(
                    &file.file_name,
                    &file.media_type,
                    file.bytes.clone(),
                ));
                continue;
            }

            let content = extract(&file.bytes, &file.media_type).map_err(|source| {
                IntakeError::Extraction {
                    file_name: file.file_name.clone(),
                    source,
                }
            })?;
            match content {
                FileContent::Text(text) => {
                    if text.trim().len() < self.config.min_text_chars {
                        return Err(IntakeError::UnreadableDocument(file.file_name.clone()));
                    }
                    entries.push(BatchEntry::text(&file.file_name, &file.media_type, text));
                }
                FileContent::Native => {
                    entries.push(BatchEntry::native(
                        &file.file_name,
                        &file.media_type,
                        file.bytes.clone(),
                    ));
                }
            }
        }
        Ok(entries)
    }

    /// Write every file's blob, compensating on a mid-batch failure
    fn write_blobs(&self, files: &[UploadedFile]) -> Result<Vec<NewDocument>, IntakeError> {
        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            match self.blobs.store(&file.file_name, &file.bytes) {
                Ok(storage_path) => documents.push(NewDocument {
                    file_name: file.file_name.clone(),
                    media_type: file.media_type.clone(),
                    byte_size: file.bytes.len() as u64,
                    storage_path,
                }),
                Err(e) => {
                    self.discard_blobs(&documents);
                    return Err(e.into());
                }
            }
        }
        Ok(documents)
    }

    fn discard_blobs(&self, documents: &[NewDocument]) {
        for document in documents {
            if let Err(e) = self.blobs.delete(&document.storage_path) {
                warn!(
                    storage_path = %document.storage_path,
                    error = %e,
                    "failed to discard blob for aborted batch"
                );
            }
        }
    }
}

/// The chat record of what the user uploaded
fn upload_message(files: &[UploadedFile], instructions: Option<&str>) -> String {
    let names = files
        .iter()
        .map(|f| f.file_name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let noun = if files.len() == 1 {
        "document"
    } else {
        "documents"
    };
    match instructions {
        Some(instructions) => format!(
            "Uploaded {} {noun}: {names}\nInstructions: {instructions}",
            files.len()
        ),
        None => format!("Uploaded {} {noun}: {names}", files.len()),
    }
}

/// Fallback analysis message when no conversational summary was produced
fn generic_confirmation(file_count: usize) -> String {
    let noun = if file_count == 1 {
        "document"
    } else {
        "documents"
    };
    format!(
        "Analysis complete! I've extracted key information from {file_count} {noun}. \
         Please review the extracted data in the documents and approve or reject the \
         suggested actions."
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use docket_domain::{ActionStatus, MessageRole};
    use docket_llm::MockClient;
    use std::sync::Arc;

    const ANALYSIS_JSON: &str = r#"{
        "caseNumber": "2024-CV-1234",
        "parties": ["Smith", "Jones"],
        "deadlines": [{"date": "March 15, 2024", "description": "file motion", "priority": "high"}],
        "keyFacts": ["The contract was signed on January 2."],
        "confidence": 0.9,
        "suggestedActions": [
            {"title": "File motion", "description": "File by March 15", "rationale": "Deadline found", "priority": "high"},
            {"title": "Contact counsel", "description": "Reach out", "rationale": "Parties identified", "priority": "medium"}
        ]
    }"#;

    struct Fixture {
        _dir: tempfile::TempDir,
        pipeline: IntakePipeline,
        store: Arc<Mutex<SqliteStore>>,
        blobs: FileBlobStore,
        mock: MockClient,
        case_id: CaseId,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::in_memory().unwrap();
        let owner = store
            .create_user("paralegal", "Pat", "pat@example.com", "hash")
            .unwrap();
        let case = store
            .create_case("Smith v. Jones", "2024-CV-1234", "active", owner.id)
            .unwrap();

        let store = Arc::new(Mutex::new(store));
        let blobs = FileBlobStore::new(dir.path());
        let mock = MockClient::new(ANALYSIS_JSON);
        let pipeline = IntakePipeline::new(
            Arc::clone(&store),
            blobs.clone(),
            AnalysisRequester::new(Arc::new(mock.clone())),
        );

        Fixture {
            _dir: dir,
            pipeline,
            store,
            blobs,
            mock,
            case_id: case.id,
        }
    }

    fn text_file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            media_type: "text/plain".to_string(),
            bytes: b"Deadline: March 15, 2024 - file motion for summary judgment in this matter."
                .to_vec(),
        }
    }

    #[tokio::test]
    async fn test_single_file_batch_shape() {
        let fx = fixture();

        let record = fx
            .pipeline
            .ingest(fx.case_id, vec![text_file("notes.txt")], None)
            .await
            .unwrap();

        assert_eq!(record.documents.len(), 1);
        assert_eq!(record.extracted.document_id, record.documents[0].id);
        assert_eq!(record.actions.len(), 2);
        assert!(record
            .actions
            .iter()
            .all(|a| a.status == ActionStatus::Pending));
        // One model call for the whole batch, no instructions given
        assert_eq!(fx.mock.call_count(), 1);
    }

    #[tokio::test]
    async fn test_multi_file_batch_single_analysis_call() {
        let fx = fixture();

        let record = fx
            .pipeline
            .ingest(
                fx.case_id,
                vec![text_file("first.txt"), text_file("second.txt")],
                None,
            )
            .await
            .unwrap();

        assert_eq!(record.documents.len(), 2);
        assert_eq!(record.extracted.document_id, record.documents[0].id);
        assert_eq!(fx.mock.call_count(), 1);

        let prompt = &fx.mock.requests()[0].prompt;
        assert!(prompt.contains("Document: first.txt"));
        assert!(prompt.contains("Document: second.txt"));
    }

    #[tokio::test]
    async fn test_empty_batch_is_rejected_before_any_work() {
        let fx = fixture();

        let result = fx.pipeline.ingest(fx.case_id, vec![], None).await;
        assert!(matches!(result, Err(IntakeError::EmptyBatch)));
        assert_eq!(fx.mock.call_count(), 0);

        let store = fx.store.lock().unwrap();
        assert!(store.documents_for_case(fx.case_id).unwrap().is_empty());
        assert!(store.messages_for_case(fx.case_id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unknown_case_is_rejected() {
        let fx = fixture();

        let result = fx
            .pipeline
            .ingest(CaseId::new(), vec![text_file("a.txt")], None)
            .await;
        assert!(matches!(result, Err(IntakeError::CaseNotFound(_))));
        assert_eq!(fx.mock.call_count(), 0);
    }

    #[tokio::test]
    async fn test_short_text_aborts_the_whole_batch() {
        let fx = fixture();
        let stub = UploadedFile {
            file_name: "stub.txt".to_string(),
            media_type: "text/plain".to_string(),
            bytes: b"too short".to_vec(),
        };

        let result = fx
            .pipeline
            .ingest(fx.case_id, vec![text_file("good.txt"), stub], None)
            .await;

        match result {
            Err(IntakeError::UnreadableDocument(name)) => assert_eq!(name, "stub.txt"),
            other => panic!("expected UnreadableDocument, got {other:?}"),
        }
        // Nothing reached the model or the database
        assert_eq!(fx.mock.call_count(), 0);
        let store = fx.store.lock().unwrap();
        assert!(store.documents_for_case(fx.case_id).unwrap().is_empty());
        assert!(store.messages_for_case(fx.case_id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_spreadsheet_aborts_with_extraction_error() {
        let fx = fixture();
        let bad = UploadedFile {
            file_name: "ledger.xlsx".to_string(),
            media_type: "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
                .to_string(),
            bytes: b"not a workbook at all".to_vec(),
        };

        let result = fx.pipeline.ingest(fx.case_id, vec![bad], None).await;
        match result {
            Err(IntakeError::Extraction { file_name, .. }) => assert_eq!(file_name, "ledger.xlsx"),
            other => panic!("expected Extraction, got {other:?}"),
        }

        // Idempotent failure: nothing visible in subsequent reads
        let store = fx.store.lock().unwrap();
        assert!(store.extracted_for_case(fx.case_id).unwrap().is_empty());
        assert!(store.documents_for_case(fx.case_id).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_analysis_leaves_no_rows_or_blobs() {
        let fx = fixture();
        fx.mock.push_error("model unavailable");

        let result = fx
            .pipeline
            .ingest(fx.case_id, vec![text_file("a.txt")], None)
            .await;
        assert!(matches!(result, Err(IntakeError::Analysis(_))));

        let store = fx.store.lock().unwrap();
        assert!(store.documents_for_case(fx.case_id).unwrap().is_empty());
        assert!(store.messages_for_case(fx.case_id).unwrap().is_empty());

        // No blobs linger either
        let dir = fx.blobs.documents_dir();
        let blob_count = std::fs::read_dir(&dir).map(|d| d.count()).unwrap_or(0);
        assert_eq!(blob_count, 0);
    }

    #[tokio::test]
    async fn test_pdf_rides_natively() {
        let fx = fixture();
        let pdf = UploadedFile {
            file_name: "exhibit-a.pdf".to_string(),
            media_type: "application/pdf".to_string(),
            bytes: b"%PDF-1.7 tiny".to_vec(),
        };

        fx.pipeline
            .ingest(fx.case_id, vec![pdf], None)
            .await
            .unwrap();

        let request = &fx.mock.requests()[0];
        assert_eq!(request.attachments.len(), 1);
        assert_eq!(request.attachments[0].media_type, "application/pdf");
        assert!(request.prompt.contains("exhibit-a.pdf (provided as an attached file)"));
    }

    #[tokio::test]
    async fn test_instructions_flow_into_messages_and_summary() {
        let fx = fixture();
        fx.mock.push_response(ANALYSIS_JSON);
        fx.mock
            .push_response("The deadline you asked about is March 15, 2024: file motion.");

        let record = fx
            .pipeline
            .ingest(
                fx.case_id,
                vec![text_file("notes.txt")],
                Some("find deadlines".to_string()),
            )
            .await
            .unwrap();

        assert!(!record.extracted.deadlines.is_empty());
        // The analysis message is the tailored summary, not the template
        assert!(record.message.content.contains("March 15, 2024"));
        assert!(record.message.is_analysis);
        assert_eq!(fx.mock.call_count(), 2);

        let store = fx.store.lock().unwrap();
        let messages = store.messages_for_case(fx.case_id).unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, MessageRole::User);
        assert!(messages[0].content.contains("Uploaded 1 document: notes.txt"));
        assert!(messages[0].content.contains("Instructions: find deadlines"));
    }

    #[tokio::test]
    async fn test_summary_failure_degrades_to_generic_confirmation() {
        let fx = fixture();
        fx.mock.push_response(ANALYSIS_JSON);
        fx.mock.push_error("summary backend down");

        let record = fx
            .pipeline
            .ingest(
                fx.case_id,
                vec![text_file("a.txt"), text_file("b.txt")],
                Some("find deadlines".to_string()),
            )
            .await
            .unwrap();

        assert!(record
            .message
            .content
            .contains("extracted key information from 2 documents"));
    }

    #[test]
    fn test_upload_message_wording() {
        let files = vec![text_file("a.txt"), text_file("b.txt")];
        assert_eq!(
            upload_message(&files, None),
            "Uploaded 2 documents: a.txt, b.txt"
        );
        assert_eq!(
            upload_message(&files[..1].to_vec(), Some("find deadlines")),
            "Uploaded 1 document: a.txt\nInstructions: find deadlines"
        );
    }
}
