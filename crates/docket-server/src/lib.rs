//! Docket Server
//!
//! The HTTP surface over the Docket case-management core: cookie-session
//! auth, case and chat CRUD, the multipart document-intake endpoint, the
//! action approve/reject lifecycle, and the aggregate approval and
//! deadline views.
//!
//! Wiring happens here: the model client is built from the environment
//! credential once at startup and injected into the analysis requester and
//! intake pipeline; nothing downstream reaches for a global.

#![warn(missing_docs)]

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;

use config::ServerConfig;
use docket_analysis::{AnalysisConfig, AnalysisRequester};
use docket_intake::{IntakeConfig, IntakePipeline};
use docket_llm::{GeminiClient, LlmError};
use docket_store::{FileBlobStore, SqliteStore, StoreError};
use handlers::{create_router, AppState};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::info;

/// Server startup error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Database could not be opened
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    /// Model client could not be constructed
    #[error("model client error: {0}")]
    Llm(#[from] LlmError),

    /// Server binding error
    #[error("failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// Server error
    #[error("server error: {0}")]
    Server(String),
}

/// Build the shared application state from configuration
///
/// Reads the model credential from `GEMINI_API_KEY`; there is no other
/// source for it.
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let api_key = std::env::var(docket_llm::gemini::API_KEY_ENV)
        .ok()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            LlmError::Credential(format!("{} is not set", docket_llm::gemini::API_KEY_ENV))
        })?;

    let mut client = GeminiClient::with_timeout(
        api_key,
        Duration::from_secs(config.llm.request_timeout_secs),
    )
    .with_model(&config.llm.model)
    .with_max_attempts(config.llm.max_attempts);
    if let Some(endpoint) = &config.llm.endpoint {
        client = client.with_endpoint(endpoint);
    }

    let requester = AnalysisRequester::new(Arc::new(client)).with_config(AnalysisConfig {
        call_timeout_secs: config.llm.analysis_timeout_secs,
    });
    let store = Arc::new(Mutex::new(SqliteStore::new(&config.database_path)?));
    let blobs = FileBlobStore::new(&config.blob_root);
    let pipeline = IntakePipeline::new(Arc::clone(&store), blobs.clone(), requester.clone())
        .with_config(IntakeConfig {
            min_text_chars: config.min_text_chars,
        });

    Ok(AppState {
        store,
        blobs,
        pipeline,
        requester,
        session_ttl_secs: config.session_ttl_secs,
    })
}

/// Start the Docket HTTP server
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Docket server");
    info!("Bind address: {}", config.bind_addr());
    info!("Database: {}", config.database_path);
    info!("Blob root: {}", config.blob_root);
    info!("Model: {}", config.llm.model);

    let state = build_state(&config)?;
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Docket listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    Ok(())
}
