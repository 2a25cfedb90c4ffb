//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A storage account owner.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: i64,
    /// Unique login name.
    pub username: String,
    /// Unique email address.
    pub email: String,
    /// Human-readable display name.
    pub full_name: Option<String>,
    /// Whether the account may use the API.
    pub is_active: bool,
    /// Quota in bytes.
    pub storage_quota: i64,
    /// Bytes currently accounted to this user. Never negative.
    pub storage_used: i64,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Bytes still available under the quota.
    pub fn remaining_bytes(&self) -> i64 {
        (self.storage_quota - self.storage_used).max(0)
    }

    /// Check if adding the given number of bytes would exceed the quota.
    pub fn would_exceed(&self, additional_bytes: i64) -> bool {
        self.storage_used.saturating_add(additional_bytes) > self.storage_quota
    }
}

/// Data required to create a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    /// Desired username.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Display name (optional).
    pub full_name: Option<String>,
    /// Quota in bytes.
    pub storage_quota: i64,
}
