use axum::Extension;
use chrono::Utc;
use serde::Serialize;

use crate::auth::Identity;
use crate::middleware::{ApiResponse, ApiResult, MaybeIdentity};

#[derive(Debug, Serialize)]
pub struct ProtectedPayload {
    pub user: Identity,
    pub timestamp: String,
}

/// GET /api/protected - Echo the authenticated identity
pub async fn protected_get(Extension(identity): Extension<Identity>) -> ApiResult<ProtectedPayload> {
    Ok(ApiResponse::success(
        ProtectedPayload {
            user: identity,
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        },
        "This is a protected route",
    ))
}

#[derive(Debug, Serialize)]
pub struct WhoamiPayload {
    pub authenticated: bool,
    pub user: Option<Identity>,
}

/// GET /api/whoami - Behind the optional gate; never rejects
///
/// Bad or missing tokens simply report `authenticated: false`.
pub async fn whoami_get(Extension(MaybeIdentity(identity)): Extension<MaybeIdentity>) -> ApiResult<WhoamiPayload> {
    Ok(ApiResponse::success(
        WhoamiPayload {
            authenticated: identity.is_some(),
            user: identity,
        },
        "Identity resolved",
    ))
}
