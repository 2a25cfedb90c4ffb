//! Pagination query parameter extractor.

use serde::{Deserialize, Serialize};

use cloudvault_core::config::StorageConfig;
use cloudvault_core::types::PageRequest;

/// `skip`/`limit` query parameters for list and search endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaginationParams {
    /// Rows to skip (default 0).
    pub skip: Option<u64>,
    /// Rows to return (default and cap from configuration).
    pub limit: Option<u64>,
}

impl PaginationParams {
    /// Converts to a `PageRequest`, applying the configured default and cap.
    pub fn into_page_request(self, storage: &StorageConfig) -> PageRequest {
        PageRequest::capped(
            self.skip.unwrap_or(0),
            self.limit.unwrap_or(storage.default_page_size),
            storage.max_page_size,
        )
    }
}
