use std::sync::Arc;

use axum::{extract::FromRequestParts, http::request::Parts};

use crate::error::CatalogError;
use crate::http_server::{error::ApiError, state::AppState};

pub const USER_ID_HEADER: &str = "x-user-id";

/// The caller, as identified by the upstream authentication proxy.
///
/// The id must belong to a registered user; anything else is rejected with
/// 401 before a handler runs.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

impl FromRequestParts<Arc<AppState>> for AuthenticatedUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Missing authentication".to_string()))?;

        match state.user_service().verify_user_exists(user_id).await {
            Ok(()) => {}
            Err(CatalogError::NotFound(_)) => {
                tracing::debug!(%user_id, "Rejected unknown user id");
                return Err(ApiError::Unauthorized("Unknown user".to_string()));
            }
            Err(e) => return Err(e.into()),
        }

        Ok(Self {
            user_id: user_id.to_string(),
        })
    }
}
