// handlers/public/mod.rs - Handlers reachable without a token
//
// Token acquisition and refresh. Refresh reads the token itself and does not
// sit behind the gate.

pub mod auth;

pub use auth::*;
