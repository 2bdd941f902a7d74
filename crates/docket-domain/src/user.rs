//! User accounts

use crate::ids::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered account, as exposed over the API (no secrets)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    /// Unique identifier
    pub id: UserId,

    /// Login name, stored lowercase
    pub username: String,

    /// Display name
    pub full_name: String,

    /// Contact email
    pub email: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// An account together with its password hash, for credential checks only
///
/// Never serialized; the hash stays inside the auth layer.
#[derive(Debug, Clone)]
pub struct UserCredentials {
    /// The public account
    pub account: UserAccount,

    /// PHC-format argon2 hash of the password
    pub password_hash: String,
}
