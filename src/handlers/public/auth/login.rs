use axum::{body::Bytes, extract::State};

use super::{AuthPayload, TOKEN_TYPE};
use crate::error::ApiError;
use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::validation::{parse_body, require_valid, text_field, Rule};

const RULES: &[(&str, &[Rule])] = &[
    ("email", &[Rule::Required, Rule::String, Rule::Email]),
    ("password", &[Rule::Required, Rule::String]),
];

/// POST /api/auth/login - Exchange credentials for a token
///
/// Unknown email and wrong password produce the same 401.
pub async fn login_post(State(state): State<AppState>, body: Bytes) -> ApiResult<AuthPayload> {
    let data = parse_body(&body);
    require_valid(&data, RULES)?;

    let user = match state.users.find_by_email(text_field(&data, "email")).await? {
        Some(user) if user.verify_password(text_field(&data, "password")) => user,
        _ => {
            tracing::warn!("login rejected: invalid credentials");
            return Err(ApiError::unauthorized("Invalid credentials"));
        }
    };

    let token = state.tokens.issue(&user.identity())?;

    Ok(ApiResponse::success(
        AuthPayload {
            user: user.profile(),
            token,
            token_type: TOKEN_TYPE,
            expires_in: state.tokens.expiration_secs(),
        },
        "Login successful",
    ))
}
