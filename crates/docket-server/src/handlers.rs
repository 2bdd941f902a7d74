//! HTTP request handlers for the Docket API
//!
//! All case, document, and action endpoints require a valid session; the
//! auth endpoints establish one. Handlers stay thin: validate, call the
//! store or the intake pipeline, serialize the result.

use crate::auth;
use crate::error::ApiError;
use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json};
use axum::routing::{delete, get, patch, post};
use axum::Router as AxumRouter;
use chrono::{Duration, Utc};
use docket_analysis::AnalysisRequester;
use docket_domain::{
    ActionId, ActionStatus, Case, CaseId, ChatMessage, MessageRole, SuggestedAction, UserAccount,
    UserId,
};
use docket_intake::{IntakePipeline, UploadedFile};
use docket_store::{FileBlobStore, SqliteStore};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tower_http::services::ServeDir;
use tracing::{info, warn};
use uuid::Uuid;

/// Largest request body the upload endpoint accepts (50 MiB)
const UPLOAD_BODY_LIMIT: usize = 50 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The relational store
    pub store: Arc<Mutex<SqliteStore>>,

    /// Document blob storage
    pub blobs: FileBlobStore,

    /// The document-intake pipeline
    pub pipeline: IntakePipeline,

    /// Model access for plain chat replies
    pub requester: AnalysisRequester,

    /// Session lifetime in seconds
    pub session_ttl_secs: u64,
}

impl AppState {
    fn store(&self) -> Result<MutexGuard<'_, SqliteStore>, ApiError> {
        self.store
            .lock()
            .map_err(|_| ApiError::Internal("store lock poisoned".to_string()))
    }

    /// Open a fresh session for an account, returning its Set-Cookie value
    fn start_session(&self, user_id: UserId) -> Result<String, ApiError> {
        let token = Uuid::new_v4().to_string();
        let expires_at = Utc::now() + Duration::seconds(self.session_ttl_secs as i64);
        self.store()?.create_session(&token, user_id, expires_at)?;
        Ok(auth::session_cookie(&token, self.session_ttl_secs))
    }

    fn authenticate(&self, headers: &HeaderMap) -> Result<UserAccount, ApiError> {
        auth::authenticate(&self.store, headers)
    }
}

// ---- request/response bodies ----

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    username: String,
    full_name: String,
    email: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateCaseRequest {
    name: String,
    #[serde(default)]
    case_number: String,
    #[serde(default)]
    status: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PostMessageRequest {
    content: String,
    #[serde(default)]
    role: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UpdateActionRequest {
    status: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PostMessageResponse {
    user_message: ChatMessage,
    #[serde(skip_serializing_if = "Option::is_none")]
    ai_message: Option<ChatMessage>,
}

#[derive(Debug, Serialize)]
struct SuccessResponse {
    success: bool,
}

#[derive(Debug, Serialize)]
struct DeleteActionResponse {
    success: bool,
    action: SuggestedAction,
}

// ---- auth ----

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if request.username.trim().is_empty() {
        return Err(ApiError::Validation("Username is required".to_string()));
    }
    if request.password.len() < 8 {
        return Err(ApiError::Validation(
            "Password must be at least 8 characters".to_string(),
        ));
    }

    let password_hash = auth::hash_password(&request.password)?;
    let account = state.store()?.create_user(
        &request.username,
        request.full_name.trim(),
        request.email.trim(),
        &password_hash,
    )?;
    let cookie = state.start_session(account.id)?;

    info!(username = %account.username, "account registered");
    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(account),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let credentials = state
        .store()?
        .credentials_by_username(&request.username)?
        .ok_or(ApiError::Unauthorized)?;
    if !auth::verify_password(&credentials.password_hash, &request.password) {
        return Err(ApiError::Unauthorized);
    }

    // Fresh token on every login; the previous one ages out on its own
    let cookie = state.start_session(credentials.account.id)?;
    Ok(([(header::SET_COOKIE, cookie)], Json(credentials.account)))
}

/// POST /api/auth/logout
async fn logout(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(token) = auth::session_token(&headers) {
        state.store()?.delete_session(&token)?;
    }
    Ok((
        [(header::SET_COOKIE, auth::clear_session_cookie())],
        Json(SuccessResponse { success: true }),
    ))
}

/// GET /api/auth/user
async fn current_user(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserAccount>, ApiError> {
    Ok(Json(state.authenticate(&headers)?))
}

// ---- cases ----

/// POST /api/cases
async fn create_case(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<CreateCaseRequest>,
) -> Result<Json<Case>, ApiError> {
    let account = state.authenticate(&headers)?;
    if request.name.trim().is_empty() {
        return Err(ApiError::Validation("Case name is required".to_string()));
    }

    let status = request
        .status
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(docket_domain::case::DEFAULT_CASE_STATUS);
    let case = state.store()?.create_case(
        request.name.trim(),
        request.case_number.trim(),
        status,
        account.id,
    )?;
    Ok(Json(case))
}

/// GET /api/cases
async fn list_cases(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    state.authenticate(&headers)?;
    Ok(Json(state.store()?.list_cases()?))
}

/// DELETE /api/cases/:id
async fn delete_case(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ApiError> {
    state.authenticate(&headers)?;
    let case_id = parse_case_id(&id)?;

    let documents = state.store()?.delete_case(case_id)?;
    for document in &documents {
        if let Err(e) = state.blobs.delete(&document.storage_path) {
            warn!(
                storage_path = %document.storage_path,
                error = %e,
                "failed to delete blob for removed case"
            );
        }
    }
    Ok(Json(SuccessResponse { success: true }))
}

// ---- chat ----

/// GET /api/cases/:id/messages
async fn list_messages(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.authenticate(&headers)?;
    let case_id = parse_case_id(&id)?;
    Ok(Json(state.store()?.messages_for_case(case_id)?))
}

/// POST /api/cases/:id/messages
///
/// A plain user message (one whose content is not an upload notice) gets
/// exactly one conversational AI reply appended behind it.
async fn post_message(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<PostMessageRequest>,
) -> Result<Json<PostMessageResponse>, ApiError> {
    state.authenticate(&headers)?;
    let case_id = parse_case_id(&id)?;
    if request.content.trim().is_empty() {
        return Err(ApiError::Validation(
            "Message content is required".to_string(),
        ));
    }
    let role = match request.role.as_deref() {
        None => MessageRole::User,
        Some(role) => MessageRole::parse(role)
            .ok_or_else(|| ApiError::Validation(format!("Invalid role: {role}")))?,
    };

    let user_message = {
        let store = state.store()?;
        if store.get_case(case_id)?.is_none() {
            return Err(ApiError::NotFound(format!("case {case_id}")));
        }
        store.append_message(case_id, role, request.content.trim(), false)?
    };

    let wants_reply = role == MessageRole::User
        && !user_message.content.to_lowercase().contains("uploaded:");
    let ai_message = if wants_reply {
        let reply = state.requester.chat(&user_message.content, None).await?;
        Some(
            state
                .store()?
                .append_message(case_id, MessageRole::Assistant, &reply, false)?,
        )
    } else {
        None
    };

    Ok(Json(PostMessageResponse {
        user_message,
        ai_message,
    }))
}

// ---- intake ----

/// POST /api/cases/:id/documents
///
/// Multipart form: one or more `files` fields plus an optional
/// `userInstructions` text field. Runs the full intake pipeline.
async fn upload_documents(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    state.authenticate(&headers)?;
    let case_id = parse_case_id(&id)?;

    let mut files = Vec::new();
    let mut instructions: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Multipart read error: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("files") => {
                let file_name = field.file_name().unwrap_or("document").to_string();
                let media_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(|e| {
                    ApiError::Validation(format!("Failed to read upload body: {e}"))
                })?;
                files.push(UploadedFile {
                    file_name,
                    media_type,
                    bytes: bytes.to_vec(),
                });
            }
            Some("userInstructions") => {
                let text = field.text().await.map_err(|e| {
                    ApiError::Validation(format!("Failed to read instructions: {e}"))
                })?;
                instructions = Some(text);
            }
            _ => {}
        }
    }

    let record = state.pipeline.ingest(case_id, files, instructions).await?;
    Ok(Json(record))
}

// ---- reads ----

/// GET /api/cases/:id/extracted-data
async fn list_extracted(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.authenticate(&headers)?;
    let case_id = parse_case_id(&id)?;
    Ok(Json(state.store()?.extracted_for_case(case_id)?))
}

/// GET /api/cases/:id/actions
async fn list_actions(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    state.authenticate(&headers)?;
    let case_id = parse_case_id(&id)?;
    Ok(Json(state.store()?.actions_for_case(case_id)?))
}

/// GET /api/approvals
async fn list_approvals(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    state.authenticate(&headers)?;
    Ok(Json(state.store()?.approved_actions()?))
}

/// GET /api/deadlines
async fn list_deadlines(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    state.authenticate(&headers)?;
    Ok(Json(state.store()?.all_deadlines()?))
}

// ---- action lifecycle ----

/// PATCH /api/actions/:id
async fn update_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(request): Json<UpdateActionRequest>,
) -> Result<Json<SuggestedAction>, ApiError> {
    state.authenticate(&headers)?;
    let action_id = parse_action_id(&id)?;

    // Only the terminal states are reachable over the API
    let status = match request.status.as_str() {
        "approved" => ActionStatus::Approved,
        "rejected" => ActionStatus::Rejected,
        _ => return Err(ApiError::Validation("Invalid status".to_string())),
    };

    let action = state.store()?.set_action_status(action_id, status)?;
    Ok(Json(action))
}

/// DELETE /api/actions/:id
async fn delete_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<DeleteActionResponse>, ApiError> {
    state.authenticate(&headers)?;
    let action_id = parse_action_id(&id)?;
    let action = state.store()?.delete_action(action_id)?;
    Ok(Json(DeleteActionResponse {
        success: true,
        action,
    }))
}

// ---- misc ----

/// GET /health
async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

fn parse_case_id(id: &str) -> Result<CaseId, ApiError> {
    CaseId::parse(id).map_err(|_| ApiError::Validation(format!("Invalid case id: {id}")))
}

fn parse_action_id(id: &str) -> Result<ActionId, ApiError> {
    ActionId::parse(id).map_err(|_| ApiError::Validation(format!("Invalid action id: {id}")))
}

/// Create the axum router with all routes
pub fn create_router(state: AppState) -> AxumRouter {
    let files_dir = state.blobs.documents_dir();
    AxumRouter::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/user", get(current_user))
        .route("/api/cases", get(list_cases).post(create_case))
        .route("/api/cases/:id", delete(delete_case))
        .route(
            "/api/cases/:id/messages",
            get(list_messages).post(post_message),
        )
        .route("/api/cases/:id/documents", post(upload_documents))
        .route("/api/cases/:id/extracted-data", get(list_extracted))
        .route("/api/cases/:id/actions", get(list_actions))
        .route(
            "/api/actions/:id",
            patch(update_action).delete(delete_action),
        )
        .route("/api/approvals", get(list_approvals))
        .route("/api/deadlines", get(list_deadlines))
        .route("/health", get(health_check))
        .nest_service("/files", ServeDir::new(files_dir))
        .layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use docket_llm::MockClient;
    use tower::ServiceExt; // for oneshot

    fn test_state(dir: &tempfile::TempDir) -> AppState {
        let store = Arc::new(Mutex::new(SqliteStore::in_memory().unwrap()));
        let blobs = FileBlobStore::new(dir.path());
        let requester = AnalysisRequester::new(Arc::new(MockClient::default()));
        let pipeline =
            IntakePipeline::new(Arc::clone(&store), blobs.clone(), requester.clone());
        AppState {
            store,
            blobs,
            pipeline,
            requester,
            session_ttl_secs: 3600,
        }
    }

    #[tokio::test]
    async fn test_health_check() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let request = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_protected_routes_require_a_session() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        for uri in ["/api/cases", "/api/approvals", "/api/deadlines", "/api/auth/user"] {
            let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
        }
    }

    #[tokio::test]
    async fn test_register_sets_a_session_cookie() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/register")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"username": "Pat", "fullName": "Pat P", "email": "p@example.com", "password": "hunter2hunter2"}"#,
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap();
        assert!(cookie.starts_with("docket_session="));
        assert!(cookie.contains("HttpOnly"));
    }

    #[tokio::test]
    async fn test_short_password_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let app = create_router(test_state(&dir));

        let request = Request::builder()
            .method("POST")
            .uri("/api/auth/register")
            .header("content-type", "application/json")
            .body(Body::from(
                r#"{"username": "pat", "fullName": "Pat", "email": "p@example.com", "password": "short"}"#,
            ))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
