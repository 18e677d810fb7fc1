use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use anyhow::Context;
use tracing::info;

use crate::auth::TokenService;
use crate::config::{AppConfig, UserStoreBackend};
use crate::database::{DatabaseManager, PgUserStore};
use crate::handlers::{protected, public, system, AppState};
use crate::middleware::{optional_auth, require_auth, AuthGate};
use crate::users::{FileUserStore, MemoryUserStore, UserStore};

/// Resolve the user store backend and token service from configuration.
///
/// A database pool is only opened for the `database` backend.
pub async fn build_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let tokens = Arc::new(TokenService::new(config.jwt.clone()));

    let state = match &config.storage.users {
        UserStoreBackend::Memory => {
            info!("User store: memory");
            AppState::new(Arc::new(MemoryUserStore::new()), tokens, config.environment)
        }
        UserStoreBackend::File(path) => {
            info!("User store: file ({})", path.display());
            let store = FileUserStore::open(path)
                .await
                .with_context(|| format!("failed to open user store at {}", path.display()))?;
            AppState::new(Arc::new(store), tokens, config.environment)
        }
        UserStoreBackend::Database => {
            info!("User store: database");
            let pool = DatabaseManager::connect(&config.database)
                .await
                .context("failed to connect user store database")?;
            let store: Arc<dyn UserStore> = Arc::new(PgUserStore::new(pool.clone()));
            AppState::new(store, tokens, config.environment).with_database(pool)
        }
    };

    Ok(state)
}

/// Build the full router. The demo routes get their own in-memory store.
pub fn app(state: AppState, enable_cors: bool) -> Router {
    let gate = AuthGate::new(state.tokens.clone());
    let demo_state = state.with_users(Arc::new(MemoryUserStore::new()));

    let router = Router::new()
        // Public
        .route("/", get(system::root))
        .route("/health", get(system::health))
        .with_state(state.clone())
        .nest("/api/auth", auth_routes(state.clone(), gate.clone()))
        .nest(
            "/api/demo",
            auth_routes(demo_state.clone(), gate.clone())
                .merge(Router::new().route("/users", get(public::users_get)).with_state(demo_state)),
        )
        .nest("/api", api_routes(state, gate))
        .layer(TraceLayer::new_for_http());

    if enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

fn auth_routes(state: AppState, gate: AuthGate) -> Router {
    let protected = Router::new()
        .route("/profile", get(protected::profile_get))
        .route("/logout", post(protected::logout_post))
        .route_layer(middleware::from_fn_with_state(gate, require_auth));

    Router::new()
        .route("/register", post(public::register_post))
        .route("/login", post(public::login_post))
        .route("/refresh", post(public::refresh_post))
        .merge(protected)
        .with_state(state)
}

fn api_routes(state: AppState, gate: AuthGate) -> Router {
    let protected = Router::new()
        .route("/user", get(protected::profile_get))
        .route("/protected", get(protected::protected_get))
        .route_layer(middleware::from_fn_with_state(gate.clone(), require_auth));

    let optional = Router::new()
        .route("/whoami", get(protected::whoami_get))
        .route_layer(middleware::from_fn_with_state(gate, optional_auth));

    Router::new().merge(protected).merge(optional).with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Environment, JwtConfig};
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use jsonwebtoken::Algorithm;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn router() -> Router {
        let tokens = Arc::new(TokenService::new(JwtConfig::new("app-secret", Algorithm::HS256, 3600)));
        let state = AppState::new(Arc::new(MemoryUserStore::new()), tokens, Environment::Development);
        app(state, false)
    }

    async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, body)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn with_token(method: &str, uri: &str, token: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .body(Body::empty())
            .unwrap()
    }

    async fn register(router: &Router, prefix: &str, email: &str) -> String {
        let (status, body) = send(
            router,
            post_json(
                &format!("{}/register", prefix),
                json!({"name": "Ada", "email": email, "password": "secret123"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn register_login_profile_logout() {
        let router = router();
        let token = register(&router, "/api/auth", "ada@example.com").await;

        let (status, body) = send(
            &router,
            post_json("/api/auth/login", json!({"email": "ada@example.com", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["token_type"], "Bearer");
        assert_eq!(body["data"]["expires_in"], 3600);
        assert!(body["data"]["user"].get("password").is_none());

        let (status, body) = send(&router, with_token("GET", "/api/auth/profile", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "ada@example.com");

        let (status, body) = send(&router, with_token("GET", "/api/user", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Ada");

        let (status, body) = send(&router, with_token("POST", "/api/auth/logout", &token)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"success": true, "message": "Logout successful"}));

        // revoke is a no-op, so the token keeps working
        let (status, _) = send(&router, with_token("GET", "/api/protected", &token)).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn register_rejects_invalid_and_duplicate() {
        let router = router();

        let (status, body) = send(&router, post_json("/api/auth/register", json!({"email": "nope"}))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["success"], false);
        assert_eq!(body["message"], "Validation failed");
        assert!(body["errors"]["name"].is_array());
        assert!(body["errors"]["password"].is_array());

        register(&router, "/api/auth", "ada@example.com").await;
        let (status, body) = send(
            &router,
            post_json(
                "/api/auth/register",
                json!({"name": "Ada", "email": "ada@example.com", "password": "secret123"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["message"], "User with this email already exists");
    }

    #[tokio::test]
    async fn garbage_body_is_a_validation_failure() {
        let router = router();
        let request = Request::post("/api/auth/login").body(Body::from("{{{")).unwrap();
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["errors"]["email"].is_array());
    }

    #[tokio::test]
    async fn wrong_password_is_invalid_credentials() {
        let router = router();
        register(&router, "/api/auth", "ada@example.com").await;

        for payload in [
            json!({"email": "ada@example.com", "password": "wrong-password"}),
            json!({"email": "nobody@example.com", "password": "secret123"}),
        ] {
            let (status, body) = send(&router, post_json("/api/auth/login", payload)).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["message"], "Invalid credentials");
        }
    }

    #[tokio::test]
    async fn non_string_credentials_are_rejected() {
        let router = router();

        let (status, body) = send(
            &router,
            post_json(
                "/api/auth/register",
                json!({"name": 12345, "email": "n@example.com", "password": 1234567}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["password"][0], "The password field must be a string.");
        assert_eq!(body["errors"]["name"][0], "The name field must be a string.");

        register(&router, "/api/auth", "n@example.com").await;
        let (status, body) = send(
            &router,
            post_json("/api/auth/login", json!({"email": "n@example.com", "password": 9})),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["errors"]["password"], json!(["The password field must be a string."]));
    }

    #[tokio::test]
    async fn protected_routes_require_a_token() {
        let router = router();

        let request = Request::get("/api/auth/profile").body(Body::empty()).unwrap();
        let (status, body) = send(&router, request).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"success": false, "message": "Authorization token is required"}));

        let (status, body) = send(&router, with_token("GET", "/api/protected", "not.a.token")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid or expired token");
    }

    #[tokio::test]
    async fn refresh_reads_the_header() {
        let router = router();
        let token = register(&router, "/api/auth", "ada@example.com").await;

        let (status, body) = send(&router, Request::post("/api/auth/refresh").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token not provided");

        let (status, body) = send(&router, with_token("POST", "/api/auth/refresh", "garbage")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Token refresh failed");

        let (status, body) = send(&router, with_token("POST", "/api/auth/refresh", &token)).await;
        assert_eq!(status, StatusCode::OK);
        let refreshed = body["data"]["token"].as_str().unwrap();

        let (status, body) = send(&router, with_token("GET", "/api/auth/profile", refreshed)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn demo_routes_use_a_separate_store() {
        let router = router();
        register(&router, "/api/demo", "demo@example.com").await;

        let (status, body) = send(&router, Request::get("/api/demo/users").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["data"][0]["email"], "demo@example.com");

        // the main store never saw the demo account
        let (status, _) = send(
            &router,
            post_json("/api/auth/login", json!({"email": "demo@example.com", "password": "secret123"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn profile_of_unknown_subject_is_404() {
        let router = router();
        // token from the demo store points at an id the main store does not have
        let token = register(&router, "/api/demo", "demo@example.com").await;
        let (status, body) = send(&router, with_token("GET", "/api/auth/profile", &token)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["message"], "User not found");
    }

    #[tokio::test]
    async fn whoami_never_rejects() {
        let router = router();

        let (status, body) = send(&router, Request::get("/api/whoami").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"], json!({"authenticated": false, "user": null}));

        let (status, body) = send(&router, with_token("GET", "/api/whoami", "broken")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["authenticated"], false);

        let token = register(&router, "/api/auth", "ada@example.com").await;
        let (_, body) = send(&router, with_token("GET", "/api/whoami", &token)).await;
        assert_eq!(body["data"]["authenticated"], true);
        assert_eq!(body["data"]["user"]["email"], "ada@example.com");
    }

    #[tokio::test]
    async fn health_without_database() {
        let router = router();
        let (status, body) = send(&router, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["database"], "disabled");
        assert_eq!(body["data"]["environment"], "development");
    }

    #[tokio::test]
    async fn builds_file_backed_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");
        let mut config = AppConfig::from_lookup(|_| None).unwrap();
        config.storage.users = UserStoreBackend::File(path.clone());

        let state = build_state(&config).await.unwrap();
        assert!(state.database.is_none());

        let router = app(state, true);
        register(&router, "/api/auth", "file@example.com").await;
        assert!(path.exists());
    }
}
