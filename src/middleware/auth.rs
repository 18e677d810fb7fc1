use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

use crate::auth::{Identity, TokenError, TokenService};

/// Identity slot filled by the optional gate; `None` means unauthenticated.
#[derive(Clone, Debug)]
pub struct MaybeIdentity(pub Option<Identity>);

/// Authentication failure returned by the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub reason: TokenError,
    pub status: StatusCode,
}

impl Rejection {
    fn unauthorized(reason: TokenError) -> Self {
        Self {
            reason,
            status: StatusCode::UNAUTHORIZED,
        }
    }

    /// User-facing message; the specific reason only goes to the log.
    pub fn message(&self) -> &'static str {
        match self.reason {
            TokenError::Missing => "Authorization token is required",
            _ => "Invalid or expired token",
        }
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({
                "success": false,
                "message": self.message(),
            })),
        )
            .into_response()
    }
}

/// Bearer-token gate in front of protected routes.
#[derive(Clone)]
pub struct AuthGate {
    tokens: Arc<TokenService>,
}

impl AuthGate {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    pub fn authenticate(&self, headers: &HeaderMap) -> Result<Identity, Rejection> {
        let token = extract_bearer_token(headers).ok_or_else(|| Rejection::unauthorized(TokenError::Missing))?;

        self.tokens.verify(token).map_err(|reason| {
            tracing::warn!(reason = reason.reason(), "rejecting request: {}", reason);
            Rejection::unauthorized(reason)
        })
    }

    pub fn authenticate_optional(&self, headers: &HeaderMap) -> Option<Identity> {
        let token = extract_bearer_token(headers)?;
        match self.tokens.verify(token) {
            Ok(identity) => Some(identity),
            Err(reason) => {
                tracing::debug!(reason = reason.reason(), "ignoring invalid optional token");
                None
            }
        }
    }
}

/// Middleware that rejects the request unless a valid bearer token is present.
pub async fn require_auth(State(gate): State<AuthGate>, mut request: Request, next: Next) -> Response {
    match gate.authenticate(request.headers()) {
        Ok(identity) => {
            request.extensions_mut().insert(identity);
            next.run(request).await
        }
        Err(rejection) => rejection.into_response(),
    }
}

/// Middleware that attaches an identity when one can be verified and never rejects.
pub async fn optional_auth(State(gate): State<AuthGate>, mut request: Request, next: Next) -> Response {
    let identity = gate.authenticate_optional(request.headers());
    request.extensions_mut().insert(MaybeIdentity(identity));
    next.run(request).await
}

/// Extract the token from `Authorization: Bearer <token>`.
///
/// Header lookup is case-insensitive through `HeaderMap`; the scheme match is
/// case-insensitive too. Anything other than a non-empty bearer token counts
/// as absent.
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?.trim();
    let (scheme, token) = value.split_once(char::is_whitespace)?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}
