pub mod auth;
pub mod response;

pub use auth::{optional_auth, require_auth, AuthGate, MaybeIdentity, Rejection};
pub use response::{ApiResponse, ApiResult};
