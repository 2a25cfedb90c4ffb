//! Storage manager: provider selection and the on-disk layout of user files.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use cloudvault_core::config::StorageConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_core::traits::storage::{ByteStream, StorageProvider};
use cloudvault_entity::file::model::extension_of;

use crate::providers::LocalStorageProvider;

/// Front for the configured provider.
///
/// Every user owns the prefix `user_<id>/`; objects inside it are named
/// `<uuid v4><original extension>` so uploads never collide.
#[derive(Debug, Clone)]
pub struct StorageManager {
    provider: Arc<dyn StorageProvider>,
}

impl StorageManager {
    /// Build the provider named by `config.provider`.
    pub async fn from_config(config: &StorageConfig) -> AppResult<Self> {
        let provider: Arc<dyn StorageProvider> = match config.provider.as_str() {
            "local" => {
                info!(root = %config.upload_dir, "Initializing local storage provider");
                Arc::new(LocalStorageProvider::new(&config.upload_dir).await?)
            }
            other => {
                return Err(AppError::configuration(format!(
                    "Unknown storage provider: '{other}'. Supported: local"
                )));
            }
        };
        Ok(Self { provider })
    }

    /// Wrap an existing provider (for testing).
    pub fn from_provider(provider: Arc<dyn StorageProvider>) -> Self {
        Self { provider }
    }

    /// The active provider.
    pub fn provider(&self) -> &dyn StorageProvider {
        self.provider.as_ref()
    }

    /// Fresh collision-free name that keeps the original extension.
    pub fn generate_stored_name(original_filename: &str) -> String {
        let ext = extension_of(original_filename).unwrap_or_default();
        format!("{}{ext}", Uuid::new_v4())
    }

    /// Object key of `stored_name` inside the owner's directory.
    pub fn object_key(owner_id: i64, stored_name: &str) -> String {
        format!("user_{owner_id}/{stored_name}")
    }

    /// Store `data` under `key`.
    pub async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        self.provider.write(key, data).await
    }

    /// Stream the object at `key`.
    pub async fn open(&self, key: &str) -> AppResult<ByteStream> {
        self.provider.read(key).await
    }

    /// Size in bytes of the object at `key`.
    pub async fn size(&self, key: &str) -> AppResult<u64> {
        self.provider.size(key).await
    }

    /// Remove the object at `key`; missing objects are ignored.
    pub async fn remove(&self, key: &str) -> AppResult<()> {
        self.provider.delete(key).await
    }

    /// Whether the provider is reachable.
    pub async fn health_check(&self) -> bool {
        self.provider.health_check().await.unwrap_or(false)
    }
}
