//! Caller identification, profile, and quota reporting.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;

use cloudvault_core::error::AppError;
use cloudvault_core::result::AppResult;
use cloudvault_database::{FileStore, FolderStore, UserStore};
use cloudvault_entity::storage::StorageQuota;
use cloudvault_entity::user::{CreateUser, User};

use crate::context::RequestContext;

/// Counts reported by the stats endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct UserStats {
    /// Number of registered users.
    pub total_users: u64,
    /// Caller's live files.
    pub total_files: u64,
    /// Caller's folders.
    pub total_folders: u64,
}

/// Handles user lookups on behalf of the HTTP layer.
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    folders: Arc<dyn FolderStore>,
    files: Arc<dyn FileStore>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        users: Arc<dyn UserStore>,
        folders: Arc<dyn FolderStore>,
        files: Arc<dyn FileStore>,
    ) -> Self {
        Self {
            users,
            folders,
            files,
        }
    }

    /// Resolves a caller id into an active user.
    pub async fn authenticate(&self, user_id: i64) -> AppResult<User> {
        match self.users.find_by_id(user_id).await? {
            Some(user) if user.is_active => Ok(user),
            Some(_) => Err(AppError::authentication("User account is disabled")),
            None => Err(AppError::authentication("Unknown user")),
        }
    }

    /// The caller's current profile.
    pub async fn profile(&self, ctx: &RequestContext) -> AppResult<User> {
        self.users
            .find_by_id(ctx.user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }

    /// The caller's quota usage.
    pub async fn quota(&self, ctx: &RequestContext) -> AppResult<StorageQuota> {
        let user = self.profile(ctx).await?;
        Ok(StorageQuota::from(&user))
    }

    /// Global user count and the caller's own file and folder counts.
    pub async fn stats(&self, ctx: &RequestContext) -> AppResult<UserStats> {
        Ok(UserStats {
            total_users: self.users.count().await?,
            total_files: self.files.count_by_owner(ctx.user_id).await?,
            total_folders: self.folders.count_by_owner(ctx.user_id).await?,
        })
    }

    /// Returns the user with this username, creating it when absent.
    pub async fn ensure_user(&self, data: CreateUser) -> AppResult<User> {
        if let Some(existing) = self.users.find_by_username(&data.username).await? {
            return Ok(existing);
        }
        let user = self.users.create(&data).await?;
        info!(
            user_id = user.id,
            username = %user.username,
            quota = user.storage_quota,
            "User created"
        );
        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;
    use cloudvault_core::error::ErrorKind;

    #[tokio::test]
    async fn test_authenticate_known_and_unknown() {
        let h = Harness::new(100).await;
        let user = h.users.authenticate(h.ctx.user_id).await.unwrap();
        assert_eq!(user.username, "alice");

        let err = h.users.authenticate(9_999).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Authentication);
    }

    #[tokio::test]
    async fn test_quota_reflects_usage() {
        let h = Harness::new(200).await;
        h.db.users().try_reserve_storage(h.ctx.user_id, 50).await.unwrap();

        let quota = h.users.quota(&h.ctx).await.unwrap();
        assert_eq!(quota.storage_used, 50);
        assert_eq!(quota.storage_available, 150);
        assert!((quota.usage_percent - 25.0).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_ensure_user_is_idempotent() {
        let h = Harness::new(100).await;
        let data = CreateUser {
            username: "carol".into(),
            email: "carol@example.com".into(),
            full_name: None,
            storage_quota: 10,
        };
        let first = h.users.ensure_user(data.clone()).await.unwrap();
        let second = h.users.ensure_user(data).await.unwrap();
        assert_eq!(first.id, second.id);
    }

    #[tokio::test]
    async fn test_stats_counts_only_caller_content() {
        let h = Harness::new(100).await;
        h.folders.create(&h.ctx, "Mine", None).await.unwrap();
        let other = h.other_user().await;
        h.folders.create(&other, "Theirs", None).await.unwrap();

        let stats = h.users.stats(&h.ctx).await.unwrap();
        assert_eq!(stats.total_users, 2);
        assert_eq!(stats.total_folders, 1);
        assert_eq!(stats.total_files, 0);
    }
}
