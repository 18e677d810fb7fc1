use axum::{extract::State, http::HeaderMap};

use super::{TokenPayload, TOKEN_TYPE};
use crate::auth::TokenError;
use crate::error::ApiError;
use crate::handlers::AppState;
use crate::middleware::auth::extract_bearer_token;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/auth/refresh - Reissue a still-valid token with a fresh window
///
/// The token comes from `Authorization: Bearer <token>`, not the body.
pub async fn refresh_post(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<TokenPayload> {
    let token = extract_bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("Token not provided"))?;

    let token = state.tokens.refresh(token).map_err(|err| match err {
        TokenError::Encoding(_) => ApiError::from(err),
        other => {
            tracing::warn!(reason = other.reason(), "token refresh rejected");
            ApiError::unauthorized("Token refresh failed")
        }
    })?;

    Ok(ApiResponse::success(
        TokenPayload {
            token,
            token_type: TOKEN_TYPE,
            expires_in: state.tokens.expiration_secs(),
        },
        "Token refreshed successfully",
    ))
}
