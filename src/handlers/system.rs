use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use super::AppState;
use crate::database::DatabaseManager;
use crate::middleware::ApiResponse;

/// GET / - Service information
pub async fn root() -> impl IntoResponse {
    ApiResponse::success(
        json!({
            "name": "Axion API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "JWT-authenticated JSON API with versioned schema migrations",
            "endpoints": {
                "GET /": "Service information",
                "GET /health": "Health check",
                "POST /api/auth/register": "User registration",
                "POST /api/auth/login": "User login",
                "POST /api/auth/refresh": "Refresh token (Authorization header)",
                "GET /api/auth/profile": "Current user profile (requires token)",
                "POST /api/auth/logout": "Logout (requires token)",
                "/api/demo/*": "Same auth endpoints over an in-memory store, plus GET /api/demo/users",
                "GET /api/user": "Current user profile (requires token)",
                "GET /api/protected": "Example protected route (requires token)",
                "GET /api/whoami": "Identity if a valid token is present",
            }
        }),
        "Welcome to Axion API",
    )
}

/// GET /health
///
/// 503 only when a database is configured and does not answer.
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let now = chrono::Utc::now();

    let database = match &state.database {
        None => Ok("disabled"),
        Some(pool) => DatabaseManager::health_check(pool).await.map(|_| "ok"),
    };

    match database {
        Ok(database) => ApiResponse::success(
            json!({
                "status": "healthy",
                "timestamp": now,
                "environment": state.environment,
                "database": database,
            }),
            "System is healthy",
        )
        .into_response(),
        Err(e) => {
            tracing::error!("health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "message": "Database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "environment": state.environment,
                        "database_error": e.to_string(),
                    }
                })),
            )
                .into_response()
        }
    }
}
