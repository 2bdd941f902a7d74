//! Cookie-session authentication and password hashing
//!
//! Sessions are opaque server-side tokens: a UUIDv4 handed out in an
//! HttpOnly cookie and stored with an expiry. Passwords are hashed with
//! Argon2id in PHC string format. Every protected handler validates the
//! session before touching the store or the pipeline.

use crate::error::ApiError;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::http::{header, HeaderMap};
use docket_domain::UserAccount;
use docket_store::SqliteStore;
use std::sync::Mutex;

/// Name of the session cookie
pub const SESSION_COOKIE: &str = "docket_session";

/// Hash a password with Argon2id defaults
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Check a password against a stored PHC-format hash
///
/// An unparseable stored hash verifies as false rather than erroring; the
/// caller cannot distinguish it from a wrong password, which is the point.
pub fn verify_password(hash: &str, password: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

/// Pull the session token out of the request's Cookie header
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE && !value.is_empty()).then(|| value.to_string())
    })
}

/// Build the Set-Cookie value that installs a session
pub fn session_cookie(token: &str, max_age_secs: u64) -> String {
    format!("{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={max_age_secs}")
}

/// Build the Set-Cookie value that clears the session
pub fn clear_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Resolve the calling account, or fail with 401
pub fn authenticate(
    store: &Mutex<SqliteStore>,
    headers: &HeaderMap,
) -> Result<UserAccount, ApiError> {
    let token = session_token(headers).ok_or(ApiError::Unauthorized)?;
    let store = store
        .lock()
        .map_err(|_| ApiError::Internal("store lock poisoned".to_string()))?;
    store
        .session_user(&token)?
        .ok_or(ApiError::Unauthorized)
}
