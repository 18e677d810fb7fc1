// handlers/protected/mod.rs - Handlers behind the bearer-token gate
//
// The gate inserts the verified `Identity` into request extensions before
// any handler here runs.

pub mod auth;
pub mod session;

pub use auth::*;
pub use session::*;
