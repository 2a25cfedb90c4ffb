//! Backend selection.

use std::sync::Arc;

use tracing::info;

use cloudvault_core::config::DatabaseConfig;
use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;

use crate::connection::DatabasePool;
use crate::memory::MemoryDatabase;
use crate::migration::run_migrations;
use crate::repositories::{FileRepository, FolderRepository, UserRepository};
use crate::store::{FileStore, FolderStore, UserStore};

/// The configured persistence backend, exposed as trait objects.
#[derive(Debug, Clone)]
pub struct Database {
    users: Arc<dyn UserStore>,
    folders: Arc<dyn FolderStore>,
    files: Arc<dyn FileStore>,
    pool: Option<DatabasePool>,
}

impl Database {
    /// Build the backend named by `config.provider`.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        match config.provider.as_str() {
            "postgres" => {
                let pool = DatabasePool::connect(config).await?;
                if config.run_migrations {
                    run_migrations(pool.pool()).await?;
                }
                info!("Using PostgreSQL persistence backend");
                Ok(Self::postgres(pool))
            }
            "memory" => {
                info!("Using in-memory persistence backend");
                Ok(Self::in_memory())
            }
            other => Err(AppError::configuration(format!(
                "Unknown database provider: '{other}'. Supported: postgres, memory"
            ))),
        }
    }

    /// Repositories over an open PostgreSQL pool.
    pub fn postgres(pool: DatabasePool) -> Self {
        let pg = pool.pool().clone();
        Self {
            users: Arc::new(UserRepository::new(pg.clone())),
            folders: Arc::new(FolderRepository::new(pg.clone())),
            files: Arc::new(FileRepository::new(pg)),
            pool: Some(pool),
        }
    }

    /// A fresh, empty in-memory backend.
    pub fn in_memory() -> Self {
        let memory = MemoryDatabase::new();
        Self {
            users: Arc::new(memory.clone()),
            folders: Arc::new(memory.clone()),
            files: Arc::new(memory),
            pool: None,
        }
    }

    /// User store.
    pub fn users(&self) -> Arc<dyn UserStore> {
        Arc::clone(&self.users)
    }

    /// Folder store.
    pub fn folders(&self) -> Arc<dyn FolderStore> {
        Arc::clone(&self.folders)
    }

    /// File store.
    pub fn files(&self) -> Arc<dyn FileStore> {
        Arc::clone(&self.files)
    }

    /// Name of the active backend.
    pub fn provider(&self) -> &'static str {
        if self.pool.is_some() { "postgres" } else { "memory" }
    }

    /// Check that the backend can serve queries.
    pub async fn health_check(&self) -> AppResult<()> {
        match &self.pool {
            Some(pool) => pool.ping().await,
            None => Ok(()),
        }
    }

    /// Close pooled connections, if any.
    pub async fn close(&self) {
        if let Some(pool) = &self.pool {
            pool.pool().close().await;
            info!("Database pool closed");
        }
    }
}
