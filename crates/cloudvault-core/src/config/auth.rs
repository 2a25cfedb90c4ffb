//! Caller identity configuration.

use serde::{Deserialize, Serialize};

/// How the API resolves the calling user.
///
/// Credentials are verified by an upstream proxy; CloudVault only trusts
/// the user id it forwards in `user_header`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Header carrying the authenticated user id.
    #[serde(default = "default_user_header")]
    pub user_header: String,
    /// User created on startup when no user with that name exists.
    #[serde(default)]
    pub bootstrap_user: Option<BootstrapUserConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            user_header: default_user_header(),
            bootstrap_user: None,
        }
    }
}

/// Account provisioned at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BootstrapUserConfig {
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Quota override; falls back to `storage.default_quota_bytes`.
    #[serde(default)]
    pub storage_quota_bytes: Option<i64>,
}

fn default_user_header() -> String {
    "x-user-id".to_string()
}
