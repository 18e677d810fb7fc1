// handlers/public/auth/mod.rs - Token acquisition

use serde::Serialize;

use crate::users::UserProfile;

pub mod login;
pub mod refresh;
pub mod register;
pub mod users;

pub use login::login_post;
pub use refresh::refresh_post;
pub use register::register_post;
pub use users::users_get;

pub const TOKEN_TYPE: &str = "Bearer";

/// `data` of a successful register or login.
#[derive(Debug, Serialize)]
pub struct AuthPayload {
    pub user: UserProfile,
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// `data` of a successful refresh.
#[derive(Debug, Serialize)]
pub struct TokenPayload {
    pub token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}
