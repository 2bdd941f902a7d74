//! Docket Storage Layer
//!
//! SQLite persistence for every Docket entity plus the query layer the API
//! reads from and the filesystem blob store document content lives in.
//!
//! # Architecture
//!
//! - One [`rusqlite::Connection`] per store; callers share it behind a mutex
//! - Schema applied from `schema.sql` at open
//! - The intake write path ([`SqliteStore::persist_intake`]) runs in a single
//!   transaction so a failed batch leaves no rows behind
//! - Read paths denormalize at query time ([`views`])
//!
//! # Examples
//!
//! ```
//! use docket_store::SqliteStore;
//!
//! let store = SqliteStore::in_memory().unwrap();
//! assert!(store.list_cases().unwrap().is_empty());
//! ```

#![warn(missing_docs)]

pub mod blob;
pub mod views;

use chrono::{DateTime, Utc};
use docket_domain::{
    ActionId, ActionStatus, Case, CaseId, ChatMessage, Deadline, Document, DocumentAnalysis,
    DocumentId, ExtractedData, ExtractionId, MessageId, MessageRole, Priority, SuggestedAction,
    UserAccount, UserCredentials, UserId,
};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use thiserror::Error;
use tracing::debug;

pub use blob::{BlobError, FileBlobStore};
pub use views::{ApprovedAction, CaseDeadline, CaseSummary, ExtractionEntry};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// Database error
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Referenced entity does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Stored or supplied data did not have the expected shape
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The requested username is already registered
    #[error("username already exists: {0}")]
    UsernameTaken(String),
}

/// A document to be created as part of one intake batch
///
/// The blob is already written; `storage_path` is its locator.
#[derive(Debug, Clone)]
pub struct NewDocument {
    /// Original file name as uploaded
    pub file_name: String,

    /// Declared media type
    pub media_type: String,

    /// Size of the uploaded content in bytes
    pub byte_size: u64,

    /// Opaque locator into the blob store
    pub storage_path: String,
}

/// Everything one successful intake batch created
#[derive(Debug, Clone, serde::Serialize)]
pub struct IntakeRecord {
    /// Created documents, in upload order
    pub documents: Vec<Document>,

    /// The extraction result, linked to the first document
    pub extracted: ExtractedData,

    /// Created actions, all pending
    pub actions: Vec<SuggestedAction>,

    /// The assistant chat message summarizing the analysis
    pub message: ChatMessage,
}

/// SQLite-backed store for all Docket entities
///
/// # Thread Safety
///
/// SQLite connections are not thread-safe; share a store behind
/// `Arc<Mutex<SqliteStore>>` and keep lock scopes short.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) a store at the given database path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open(path)?)
    }

    /// Open an in-memory store, useful for testing
    pub fn in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        // Cascading deletes depend on foreign keys, which SQLite leaves off
        // per connection unless asked
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(include_str!("schema.sql"))?;
        Ok(Self { conn })
    }

    // ---- users ----

    /// Register an account; the username is stored lowercase
    pub fn create_user(
        &self,
        username: &str,
        full_name: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserAccount, StoreError> {
        let username = username.trim().to_lowercase();

        let taken: bool = self
            .conn
            .query_row(
                "SELECT 1 FROM users WHERE username = ?1",
                params![&username],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if taken {
            return Err(StoreError::UsernameTaken(username));
        }

        let account = UserAccount {
            id: UserId::new(),
            username,
            full_name: full_name.to_string(),
            email: email.to_string(),
            created_at: Utc::now(),
        };
        self.conn.execute(
            "INSERT INTO users (id, username, full_name, email, password_hash, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                account.id.to_string(),
                &account.username,
                &account.full_name,
                &account.email,
                password_hash,
                account.created_at,
            ],
        )?;
        Ok(account)
    }

    /// Look up an account with its password hash, for credential checks
    pub fn credentials_by_username(
        &self,
        username: &str,
    ) -> Result<Option<UserCredentials>, StoreError> {
        let username = username.trim().to_lowercase();
        let row = self
            .conn
            .query_row(
                "SELECT id, username, full_name, email, password_hash, created_at
                 FROM users WHERE username = ?1",
                params![&username],
                |row| {
                    Ok(UserCredentials {
                        account: user_from_row(row)?,
                        password_hash: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(row)
    }

    /// Look up an account by id
    pub fn user_by_id(&self, id: UserId) -> Result<Option<UserAccount>, StoreError> {
        let account = self
            .conn
            .query_row(
                "SELECT id, username, full_name, email, password_hash, created_at
                 FROM users WHERE id = ?1",
                params![id.to_string()],
                user_from_row,
            )
            .optional()?;
        Ok(account)
    }

    // ---- sessions ----

    /// Record a session token for an account
    ///
    /// Expired sessions are swept opportunistically on every create.
    pub fn create_session(
        &self,
        token: &str,
        user_id: UserId,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.conn.execute(
            "DELETE FROM sessions WHERE expires_at <= ?1",
            params![Utc::now()],
        )?;
        self.conn.execute(
            "INSERT INTO sessions (token, user_id, expires_at) VALUES (?1, ?2, ?3)",
            params![token, user_id.to_string(), expires_at],
        )?;
        Ok(())
    }

    /// Resolve a session token to its account, if the session is still live
    pub fn session_user(&self, token: &str) -> Result<Option<UserAccount>, StoreError> {
        let account = self
            .conn
            .query_row(
                "SELECT u.id, u.username, u.full_name, u.email, u.password_hash, u.created_at
                 FROM sessions s JOIN users u ON s.user_id = u.id
                 WHERE s.token = ?1 AND s.expires_at > ?2",
                params![token, Utc::now()],
                user_from_row,
            )
            .optional()?;
        Ok(account)
    }

    /// Remove a session; returns whether one existed
    pub fn delete_session(&self, token: &str) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(removed > 0)
    }

    // ---- cases ----

    /// Create a case owned by an account
    pub fn create_case(
        &self,
        name: &str,
        case_number: &str,
        status: &str,
        owner_id: UserId,
    ) -> Result<Case, StoreError> {
        let case = Case {
            id: CaseId::new(),
            name: name.to_string(),
            case_number: case_number.to_string(),
            status: status.to_string(),
            owner_id,
            created_at: Utc::now(),
        };
        self.conn.execute(
            "INSERT INTO cases (id, name, case_number, status, owner_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                case.id.to_string(),
                &case.name,
                &case.case_number,
                &case.status,
                case.owner_id.to_string(),
                case.created_at,
            ],
        )?;
        Ok(case)
    }

    /// Fetch a case by id
    pub fn get_case(&self, id: CaseId) -> Result<Option<Case>, StoreError> {
        let case = self
            .conn
            .query_row(
                "SELECT id, name, case_number, status, owner_id, created_at
                 FROM cases WHERE id = ?1",
                params![id.to_string()],
                case_from_row,
            )
            .optional()?;
        Ok(case)
    }

    /// Delete a case and everything under it
    ///
    /// Row deletion cascades through documents to extraction results and
    /// actions, and independently to chat messages. Returns the documents
    /// that existed so the caller can delete their blobs.
    pub fn delete_case(&self, id: CaseId) -> Result<Vec<Document>, StoreError> {
        let documents = self.documents_for_case(id)?;
        let removed = self
            .conn
            .execute("DELETE FROM cases WHERE id = ?1", params![id.to_string()])?;
        if removed == 0 {
            return Err(StoreError::NotFound(format!("case {id}")));
        }
        debug!(case_id = %id, documents = documents.len(), "case deleted");
        Ok(documents)
    }

    /// List every case, newest first, with its derived counts
    pub fn list_cases(&self) -> Result<Vec<CaseSummary>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT c.id, c.name, c.case_number, c.status, c.created_at,
                    (SELECT COUNT(*) FROM documents d WHERE d.case_id = c.id),
                    (SELECT COUNT(*) FROM suggested_actions sa
                       JOIN extracted_data ed ON sa.extracted_data_id = ed.id
                       JOIN documents d2 ON ed.document_id = d2.id
                      WHERE d2.case_id = c.id AND sa.status = 'pending')
             FROM cases c
             ORDER BY c.created_at DESC, c.id DESC",
        )?;

        let summaries = stmt
            .query_map([], |row| {
                let id: String = row.get(0)?;
                Ok(CaseSummary {
                    id: CaseId::parse(&id).map_err(|e| bad_column(0, e))?,
                    name: row.get(1)?,
                    case_number: row.get(2)?,
                    status: row.get(3)?,
                    created_at: row.get(4)?,
                    document_count: row.get::<_, i64>(5)? as usize,
                    pending_approvals: row.get::<_, i64>(6)? as usize,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(summaries)
    }

    // ---- chat ----

    /// Append one message to a case's chat history
    pub fn append_message(
        &self,
        case_id: CaseId,
        role: MessageRole,
        content: &str,
        is_analysis: bool,
    ) -> Result<ChatMessage, StoreError> {
        insert_message(&self.conn, case_id, role, content, is_analysis)
    }

    /// Chat history for a case, oldest first
    pub fn messages_for_case(&self, case_id: CaseId) -> Result<Vec<ChatMessage>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, case_id, role, content, is_analysis, created_at
             FROM chat_messages WHERE case_id = ?1
             ORDER BY created_at ASC, id ASC",
        )?;
        let messages = stmt
            .query_map(params![case_id.to_string()], message_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(messages)
    }

    // ---- intake ----

    /// Persist everything one successful intake batch produced, atomically
    ///
    /// One transaction inserts the documents (in upload order), the user's
    /// upload message, the extraction result linked to the first document,
    /// one pending action per draft, and the assistant analysis message.
    /// If anything fails the transaction rolls back and no rows remain.
    pub fn persist_intake(
        &mut self,
        case_id: CaseId,
        files: &[NewDocument],
        upload_message: &str,
        analysis: &DocumentAnalysis,
        analysis_message: &str,
    ) -> Result<IntakeRecord, StoreError> {
        if files.is_empty() {
            return Err(StoreError::InvalidData("empty intake batch".to_string()));
        }

        let tx = self.conn.transaction()?;

        let exists: bool = tx
            .query_row(
                "SELECT 1 FROM cases WHERE id = ?1",
                params![case_id.to_string()],
                |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false);
        if !exists {
            return Err(StoreError::NotFound(format!("case {case_id}")));
        }

        let mut documents = Vec::with_capacity(files.len());
        for file in files {
            let document = Document {
                id: DocumentId::new(),
                case_id,
                file_name: file.file_name.clone(),
                media_type: file.media_type.clone(),
                byte_size: file.byte_size,
                storage_path: file.storage_path.clone(),
                uploaded_at: Utc::now(),
            };
            tx.execute(
                "INSERT INTO documents
                     (id, case_id, file_name, media_type, byte_size, storage_path, uploaded_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                params![
                    document.id.to_string(),
                    document.case_id.to_string(),
                    &document.file_name,
                    &document.media_type,
                    document.byte_size as i64,
                    &document.storage_path,
                    document.uploaded_at,
                ],
            )?;
            documents.push(document);
        }

        insert_message(&tx, case_id, MessageRole::User, upload_message, false)?;

        let extracted = ExtractedData {
            id: ExtractionId::new(),
            document_id: documents[0].id,
            case_number: analysis.case_number.clone(),
            parties: analysis.parties.clone(),
            deadlines: analysis.deadlines.clone(),
            key_facts: analysis.key_facts.clone(),
            confidence: analysis.confidence,
            extracted_at: Utc::now(),
        };
        tx.execute(
            "INSERT INTO extracted_data
                 (id, document_id, case_number, parties, deadlines, key_facts,
                  confidence, extracted_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                extracted.id.to_string(),
                extracted.document_id.to_string(),
                extracted.case_number,
                to_json(&extracted.parties)?,
                to_json(&extracted.deadlines)?,
                to_json(&extracted.key_facts)?,
                extracted.confidence,
                extracted.extracted_at,
            ],
        )?;

        let mut actions = Vec::with_capacity(analysis.suggested_actions.len());
        for draft in &analysis.suggested_actions {
            let now = Utc::now();
            let action = SuggestedAction {
                id: ActionId::new(),
                extracted_data_id: extracted.id,
                title: draft.title.clone(),
                description: draft.description.clone(),
                rationale: draft.rationale.clone(),
                priority: draft.priority,
                status: ActionStatus::Pending,
                created_at: now,
                updated_at: now,
            };
            tx.execute(
                "INSERT INTO suggested_actions
                     (id, extracted_data_id, title, description, rationale,
                      priority, status, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    action.id.to_string(),
                    action.extracted_data_id.to_string(),
                    &action.title,
                    &action.description,
                    &action.rationale,
                    action.priority.as_str(),
                    action.status.as_str(),
                    action.created_at,
                    action.updated_at,
                ],
            )?;
            actions.push(action);
        }

        let message = insert_message(&tx, case_id, MessageRole::Assistant, analysis_message, true)?;

        tx.commit()?;
        debug!(
            case_id = %case_id,
            documents = documents.len(),
            actions = actions.len(),
            "intake batch persisted"
        );

        Ok(IntakeRecord {
            documents,
            extracted,
            actions,
            message,
        })
    }

    // ---- action lifecycle ----

    /// Overwrite an action's status and refresh its update time
    ///
    /// Idempotent: re-applying a terminal status succeeds. The API boundary
    /// restricts the status to `approved`/`rejected`.
    pub fn set_action_status(
        &self,
        id: ActionId,
        status: ActionStatus,
    ) -> Result<SuggestedAction, StoreError> {
        let updated = self.conn.execute(
            "UPDATE suggested_actions SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), Utc::now(), id.to_string()],
        )?;
        if updated == 0 {
            return Err(StoreError::NotFound(format!("action {id}")));
        }
        self.get_action(id)?
            .ok_or_else(|| StoreError::NotFound(format!("action {id}")))
    }

    /// Delete an action, returning the removed row
    pub fn delete_action(&self, id: ActionId) -> Result<SuggestedAction, StoreError> {
        let action = self
            .get_action(id)?
            .ok_or_else(|| StoreError::NotFound(format!("action {id}")))?;
        self.conn.execute(
            "DELETE FROM suggested_actions WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(action)
    }

    /// Fetch an action by id
    pub fn get_action(&self, id: ActionId) -> Result<Option<SuggestedAction>, StoreError> {
        let action = self
            .conn
            .query_row(
                "SELECT id, extracted_data_id, title, description, rationale,
                        priority, status, created_at, updated_at
                 FROM suggested_actions WHERE id = ?1",
                params![id.to_string()],
                action_from_row,
            )
            .optional()?;
        Ok(action)
    }

    // ---- query layer ----

    /// Documents uploaded to a case, in upload order
    pub fn documents_for_case(&self, case_id: CaseId) -> Result<Vec<Document>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, case_id, file_name, media_type, byte_size, storage_path, uploaded_at
             FROM documents WHERE case_id = ?1
             ORDER BY uploaded_at ASC, id ASC",
        )?;
        let documents = stmt
            .query_map(params![case_id.to_string()], document_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(documents)
    }

    /// Extraction results for a case, newest first, with their documents
    pub fn extracted_for_case(&self, case_id: CaseId) -> Result<Vec<ExtractionEntry>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT ed.id, ed.document_id, ed.case_number, ed.parties, ed.deadlines,
                    ed.key_facts, ed.confidence, ed.extracted_at,
                    d.id, d.case_id, d.file_name, d.media_type, d.byte_size,
                    d.storage_path, d.uploaded_at
             FROM extracted_data ed
             JOIN documents d ON ed.document_id = d.id
             WHERE d.case_id = ?1
             ORDER BY ed.extracted_at DESC, ed.id DESC",
        )?;
        let entries = stmt
            .query_map(params![case_id.to_string()], |row| {
                Ok(ExtractionEntry {
                    extracted: extracted_from_row(row, 0)?,
                    document: document_from_row_at(row, 8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    /// Actions for a case, newest first
    pub fn actions_for_case(&self, case_id: CaseId) -> Result<Vec<SuggestedAction>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT sa.id, sa.extracted_data_id, sa.title, sa.description, sa.rationale,
                    sa.priority, sa.status, sa.created_at, sa.updated_at
             FROM suggested_actions sa
             JOIN extracted_data ed ON sa.extracted_data_id = ed.id
             JOIN documents d ON ed.document_id = d.id
             WHERE d.case_id = ?1
             ORDER BY sa.created_at DESC, sa.id DESC",
        )?;
        let actions = stmt
            .query_map(params![case_id.to_string()], action_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(actions)
    }

    /// Every approved action across all cases, most recently reviewed first
    pub fn approved_actions(&self) -> Result<Vec<ApprovedAction>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT sa.id, sa.extracted_data_id, sa.title, sa.description, sa.rationale,
                    sa.priority, sa.status, sa.created_at, sa.updated_at,
                    ed.id, ed.document_id, ed.case_number, ed.parties, ed.deadlines,
                    ed.key_facts, ed.confidence, ed.extracted_at,
                    d.id, d.case_id, d.file_name, d.media_type, d.byte_size,
                    d.storage_path, d.uploaded_at,
                    c.id, c.name, c.case_number, c.status, c.owner_id, c.created_at
             FROM suggested_actions sa
             JOIN extracted_data ed ON sa.extracted_data_id = ed.id
             JOIN documents d ON ed.document_id = d.id
             JOIN cases c ON d.case_id = c.id
             WHERE sa.status = 'approved'
             ORDER BY sa.updated_at DESC, sa.id DESC",
        )?;
        let approved = stmt
            .query_map([], |row| {
                Ok(ApprovedAction {
                    action: action_from_row_at(row, 0)?,
                    extracted: extracted_from_row(row, 9)?,
                    document: document_from_row_at(row, 17)?,
                    case: case_from_row_at(row, 24)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(approved)
    }

    /// Every deadline across all cases, flattened out of the extraction
    /// results and annotated with where it came from
    pub fn all_deadlines(&self) -> Result<Vec<CaseDeadline>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT ed.deadlines, c.name, c.id, c.case_number, d.file_name
             FROM extracted_data ed
             JOIN documents d ON ed.document_id = d.id
             JOIN cases c ON d.case_id = c.id
             ORDER BY ed.extracted_at DESC, ed.id DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let deadlines: String = row.get(0)?;
                let case_name: String = row.get(1)?;
                let case_id: String = row.get(2)?;
                let case_number: String = row.get(3)?;
                let document_name: String = row.get(4)?;
                Ok((deadlines, case_name, case_id, case_number, document_name))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut flattened = Vec::new();
        for (deadlines, case_name, case_id, case_number, document_name) in rows {
            let case_id = CaseId::parse(&case_id)
                .map_err(|e| StoreError::InvalidData(e.to_string()))?;
            let deadlines: Vec<Deadline> = serde_json::from_str(&deadlines)
                .map_err(|e| StoreError::InvalidData(format!("deadlines column: {e}")))?;
            for deadline in deadlines {
                flattened.push(CaseDeadline {
                    date: deadline.date,
                    description: deadline.description,
                    priority: deadline.priority,
                    case_name: case_name.clone(),
                    case_id,
                    case_number: case_number.clone(),
                    document_name: document_name.clone(),
                });
            }
        }
        Ok(flattened)
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, StoreError> {
    serde_json::to_string(value).map_err(|e| StoreError::InvalidData(e.to_string()))
}

fn insert_message(
    conn: &Connection,
    case_id: CaseId,
    role: MessageRole,
    content: &str,
    is_analysis: bool,
) -> Result<ChatMessage, StoreError> {
    let message = ChatMessage {
        id: MessageId::new(),
        case_id,
        role,
        content: content.to_string(),
        is_analysis,
        created_at: Utc::now(),
    };
    conn.execute(
        "INSERT INTO chat_messages (id, case_id, role, content, is_analysis, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            message.id.to_string(),
            message.case_id.to_string(),
            message.role.as_str(),
            &message.content,
            message.is_analysis,
            message.created_at,
        ],
    )?;
    Ok(message)
}

/// Wrap a column decoding failure in the rusqlite error shape row-mapping
/// closures must return
fn bad_column(
    index: usize,
    error: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(index, rusqlite::types::Type::Text, Box::new(error))
}

#[derive(Debug, Error)]
#[error("{0}")]
struct ColumnError(String);

fn bad_value(index: usize, message: impl Into<String>) -> rusqlite::Error {
    bad_column(index, ColumnError(message.into()))
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<UserAccount> {
    let id: String = row.get(0)?;
    Ok(UserAccount {
        id: UserId::parse(&id).map_err(|e| bad_column(0, e))?,
        username: row.get(1)?,
        full_name: row.get(2)?,
        email: row.get(3)?,
        created_at: row.get(5)?,
    })
}

fn case_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Case> {
    case_from_row_at(row, 0)
}

fn case_from_row_at(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Case> {
    let id: String = row.get(base)?;
    let owner_id: String = row.get(base + 4)?;
    Ok(Case {
        id: CaseId::parse(&id).map_err(|e| bad_column(base, e))?,
        name: row.get(base + 1)?,
        case_number: row.get(base + 2)?,
        status: row.get(base + 3)?,
        owner_id: UserId::parse(&owner_id).map_err(|e| bad_column(base + 4, e))?,
        created_at: row.get(base + 5)?,
    })
}

fn document_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Document> {
    document_from_row_at(row, 0)
}

fn document_from_row_at(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<Document> {
    let id: String = row.get(base)?;
    let case_id: String = row.get(base + 1)?;
    Ok(Document {
        id: DocumentId::parse(&id).map_err(|e| bad_column(base, e))?,
        case_id: CaseId::parse(&case_id).map_err(|e| bad_column(base + 1, e))?,
        file_name: row.get(base + 2)?,
        media_type: row.get(base + 3)?,
        byte_size: row.get::<_, i64>(base + 4)? as u64,
        storage_path: row.get(base + 5)?,
        uploaded_at: row.get(base + 6)?,
    })
}

fn message_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChatMessage> {
    let id: String = row.get(0)?;
    let case_id: String = row.get(1)?;
    let role: String = row.get(2)?;
    Ok(ChatMessage {
        id: MessageId::parse(&id).map_err(|e| bad_column(0, e))?,
        case_id: CaseId::parse(&case_id).map_err(|e| bad_column(1, e))?,
        role: MessageRole::parse(&role).ok_or_else(|| bad_value(2, format!("role {role:?}")))?,
        content: row.get(3)?,
        is_analysis: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn extracted_from_row(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<ExtractedData> {
    let id: String = row.get(base)?;
    let document_id: String = row.get(base + 1)?;
    let parties: String = row.get(base + 3)?;
    let deadlines: String = row.get(base + 4)?;
    let key_facts: String = row.get(base + 5)?;
    Ok(ExtractedData {
        id: ExtractionId::parse(&id).map_err(|e| bad_column(base, e))?,
        document_id: DocumentId::parse(&document_id).map_err(|e| bad_column(base + 1, e))?,
        case_number: row.get(base + 2)?,
        parties: serde_json::from_str(&parties).map_err(|e| bad_column(base + 3, e))?,
        deadlines: serde_json::from_str(&deadlines).map_err(|e| bad_column(base + 4, e))?,
        key_facts: serde_json::from_str(&key_facts).map_err(|e| bad_column(base + 5, e))?,
        confidence: row.get(base + 6)?,
        extracted_at: row.get(base + 7)?,
    })
}

fn action_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SuggestedAction> {
    action_from_row_at(row, 0)
}

fn action_from_row_at(row: &rusqlite::Row<'_>, base: usize) -> rusqlite::Result<SuggestedAction> {
    let id: String = row.get(base)?;
    let extracted_data_id: String = row.get(base + 1)?;
    let priority: String = row.get(base + 5)?;
    let status: String = row.get(base + 6)?;
    Ok(SuggestedAction {
        id: ActionId::parse(&id).map_err(|e| bad_column(base, e))?,
        extracted_data_id: ExtractionId::parse(&extracted_data_id)
            .map_err(|e| bad_column(base + 1, e))?,
        title: row.get(base + 2)?,
        description: row.get(base + 3)?,
        rationale: row.get(base + 4)?,
        priority: Priority::parse(&priority)
            .ok_or_else(|| bad_value(base + 5, format!("priority {priority:?}")))?,
        status: ActionStatus::parse(&status)
            .ok_or_else(|| bad_value(base + 6, format!("status {status:?}")))?,
        created_at: row.get(base + 7)?,
        updated_at: row.get(base + 8)?,
    })
}
