//! Storage quota value object.

use serde::{Deserialize, Serialize};

use crate::user::User;

/// Quota usage summary for a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageQuota {
    /// Total quota in bytes.
    pub storage_quota: i64,
    /// Currently used bytes.
    pub storage_used: i64,
    /// Remaining bytes.
    pub storage_available: i64,
    /// Usage percentage (0.0 - 100.0).
    pub usage_percent: f64,
}

impl StorageQuota {
    /// Create a quota from total and used values.
    pub fn new(storage_quota: i64, storage_used: i64) -> Self {
        let usage_percent = if storage_quota <= 0 {
            0.0
        } else {
            (storage_used as f64 / storage_quota as f64) * 100.0
        };

        Self {
            storage_quota,
            storage_used,
            storage_available: (storage_quota - storage_used).max(0),
            usage_percent,
        }
    }

    /// Check if the quota is used up.
    pub fn is_exhausted(&self) -> bool {
        self.storage_used >= self.storage_quota
    }
}

impl From<&User> for StorageQuota {
    fn from(user: &User) -> Self {
        Self::new(user.storage_quota, user.storage_used)
    }
}
