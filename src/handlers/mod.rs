// handlers/mod.rs - Request handlers grouped by access tier
//
// Public (no auth) → Protected (bearer token required)
// System endpoints (/, /health) live beside them.

pub mod protected;
pub mod public;
pub mod system;

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::TokenService;
use crate::config::Environment;
use crate::users::UserStore;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub tokens: Arc<TokenService>,
    pub database: Option<PgPool>,
    pub environment: Environment,
}

impl AppState {
    pub fn new(users: Arc<dyn UserStore>, tokens: Arc<TokenService>, environment: Environment) -> Self {
        Self {
            users,
            tokens,
            database: None,
            environment,
        }
    }

    pub fn with_database(mut self, pool: PgPool) -> Self {
        self.database = Some(pool);
        self
    }

    /// Same tokens, different store. Used for the demo routes.
    pub fn with_users(&self, users: Arc<dyn UserStore>) -> Self {
        Self {
            users,
            ..self.clone()
        }
    }
}
