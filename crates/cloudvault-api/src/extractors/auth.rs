//! `AuthUser` extractor: resolves the caller from the trusted identity header.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use cloudvault_core::error::AppError;
use cloudvault_service::context::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Extracted caller context available in handlers.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = state.config.auth.user_header.as_str();

        // Set by the authenticating proxy in front of the service
        let raw = parts
            .headers
            .get(header)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication(format!("Missing {header} header")))?;

        let user_id = raw
            .trim()
            .parse::<i64>()
            .map_err(|_| AppError::authentication(format!("Invalid {header} header")))?;

        let user = state.user_service.authenticate(user_id).await?;

        Ok(AuthUser(RequestContext::new(user.id, user.username)))
    }
}
