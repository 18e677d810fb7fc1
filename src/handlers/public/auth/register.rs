use axum::{body::Bytes, extract::State};

use super::{AuthPayload, TOKEN_TYPE};
use crate::auth::hash_password;
use crate::error::ApiError;
use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult};
use crate::users::NewUser;
use crate::validation::{parse_body, require_valid, text_field, Rule};

const RULES: &[(&str, &[Rule])] = &[
    ("name", &[Rule::Required, Rule::String, Rule::Min(2), Rule::Max(255)]),
    ("email", &[Rule::Required, Rule::String, Rule::Email, Rule::Max(255)]),
    ("password", &[Rule::Required, Rule::String, Rule::Min(6), Rule::Max(255)]),
];

/// POST /api/auth/register - Create an account and receive a token
///
/// Expected Input:
/// ```json
/// { "name": "Ada", "email": "ada@example.com", "password": "secret123" }
/// ```
///
/// Responds 201 with `{user, token, token_type, expires_in}`, 422 when a
/// field fails validation and 409 when the email is taken.
pub async fn register_post(State(state): State<AppState>, body: Bytes) -> ApiResult<AuthPayload> {
    let data = parse_body(&body);
    require_valid(&data, RULES)?;

    let email = text_field(&data, "email");
    if state.users.find_by_email(email).await?.is_some() {
        return Err(ApiError::conflict("User with this email already exists"));
    }

    let user = state
        .users
        .save(NewUser {
            name: text_field(&data, "name").to_string(),
            email: email.to_string(),
            password_hash: hash_password(text_field(&data, "password"))?,
        })
        .await?;

    let token = state.tokens.issue(&user.identity())?;
    tracing::info!(user_id = user.id, "registered user");

    Ok(ApiResponse::created(
        AuthPayload {
            user: user.profile(),
            token,
            token_type: TOKEN_TYPE,
            expires_in: state.tokens.expiration_secs(),
        },
        "User registered successfully",
    ))
}
