use axum::extract::State;

use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::users::UserProfile;

/// GET /api/demo/users - List every account in the demo store
pub async fn users_get(State(state): State<AppState>) -> ApiResult<Vec<UserProfile>> {
    let users = state.users.all().await?;
    Ok(ApiResponse::success(
        users.iter().map(|u| u.profile()).collect(),
        "Users retrieved successfully",
    ))
}
