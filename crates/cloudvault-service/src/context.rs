//! Request context carrying the identified caller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who is acting in the current request.
///
/// Built by the HTTP layer once the caller has been identified and passed
/// into every service method, so ownership checks never guess the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestContext {
    /// The caller's user ID.
    pub user_id: i64,
    /// The caller's username.
    pub username: String,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a context stamped with the current time.
    pub fn new(user_id: i64, username: impl Into<String>) -> Self {
        Self {
            user_id,
            username: username.into(),
            request_time: Utc::now(),
        }
    }
}
