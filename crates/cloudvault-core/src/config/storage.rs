//! Storage provider configuration.

use serde::{Deserialize, Serialize};

/// Top-level storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage provider to use.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Root directory; each user gets a `user_<id>` subdirectory.
    #[serde(default = "default_upload_dir")]
    pub upload_dir: String,
    /// Maximum size of a single uploaded file in bytes (default 100 MiB).
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: u64,
    /// Request body cap for bulk uploads (default 1 GiB).
    ///
    /// Single items above `max_file_size_bytes` are still refused one by one.
    #[serde(default = "default_max_batch_request")]
    pub max_batch_request_bytes: u64,
    /// Quota assigned to newly created users (default 5 GiB).
    #[serde(default = "default_quota")]
    pub default_quota_bytes: i64,
    /// Upper bound for `limit` on list and search endpoints.
    #[serde(default = "default_max_page_size")]
    pub max_page_size: u64,
    /// `limit` used when the caller does not send one.
    #[serde(default = "default_page_size")]
    pub default_page_size: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            upload_dir: default_upload_dir(),
            max_file_size_bytes: default_max_file_size(),
            max_batch_request_bytes: default_max_batch_request(),
            default_quota_bytes: default_quota(),
            max_page_size: default_max_page_size(),
            default_page_size: default_page_size(),
        }
    }
}

fn default_provider() -> String {
    "local".to_string()
}

fn default_upload_dir() -> String {
    "./uploads".to_string()
}

fn default_max_file_size() -> u64 {
    104_857_600 // 100 MiB
}

fn default_max_batch_request() -> u64 {
    1_073_741_824 // 1 GiB
}

fn default_quota() -> i64 {
    5_368_709_120 // 5 GiB
}

fn default_max_page_size() -> u64 {
    100
}

fn default_page_size() -> u64 {
    50
}
