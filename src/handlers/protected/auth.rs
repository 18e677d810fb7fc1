use axum::{extract::State, http::HeaderMap, Extension};

use crate::auth::Identity;
use crate::error::ApiError;
use crate::handlers::AppState;
use crate::middleware::auth::extract_bearer_token;
use crate::middleware::{ApiResponse, ApiResult};
use crate::users::UserProfile;

/// GET /api/auth/profile - Fresh profile of the token's subject
///
/// The identity comes from the token but the record is re-read from the
/// store, so a deleted account yields 404 even with a valid token.
pub async fn profile_get(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
) -> ApiResult<UserProfile> {
    let user = state
        .users
        .find_by_id(identity.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(user.profile(), "Profile retrieved successfully"))
}

/// POST /api/auth/logout
pub async fn logout_post(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<()> {
    if let Some(token) = extract_bearer_token(&headers) {
        state.tokens.revoke(token);
    }
    Ok(ApiResponse::message_only("Logout successful"))
}
