use chrono::Utc;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::JwtConfig;

/// Identity carried inside a token and attached to authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: i64,
    pub name: String,
    pub email: String,
}

/// Token claims: issue time, expiry and the nested identity payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub iat: i64,
    pub exp: i64,
    pub data: Identity,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("Token not provided")]
    Missing,

    #[error("Token is malformed: {0}")]
    Malformed(String),

    #[error("Invalid token signature")]
    SignatureInvalid,

    #[error("Token has expired")]
    Expired,

    #[error("Token could not be signed: {0}")]
    Encoding(String),
}

impl TokenError {
    /// Stable reason code used in logs.
    pub fn reason(&self) -> &'static str {
        match self {
            TokenError::Missing => "token_missing",
            TokenError::Malformed(_) => "token_malformed",
            TokenError::SignatureInvalid => "signature_invalid",
            TokenError::Expired => "token_expired",
            TokenError::Encoding(_) => "token_encoding",
        }
    }
}

/// Issues and verifies signed, time-bound identity tokens.
///
/// Stateless: every verification is a pure function of the token, the
/// configuration this service was built from, and the current time.
pub struct TokenService {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        // Expiry is checked by hand so that `now >= exp` is rejected with no leeway.
        let mut validation = Validation::new(config.algorithm);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            config,
            encoding_key,
            decoding_key,
            validation,
        }
    }

    /// Configured token lifetime in seconds.
    pub fn expiration_secs(&self) -> u64 {
        self.config.expiration_secs
    }

    pub fn issue(&self, identity: &Identity) -> Result<String, TokenError> {
        self.issue_at(identity, now())
    }

    pub fn issue_at(&self, identity: &Identity, issued_at: i64) -> Result<String, TokenError> {
        let exp = i64::try_from(self.config.expiration_secs)
            .ok()
            .and_then(|secs| issued_at.checked_add(secs))
            .ok_or_else(|| TokenError::Encoding("token lifetime out of range".to_string()))?;
        let claims = Claims {
            iat: issued_at,
            exp,
            data: identity.clone(),
        };
        self.encode_claims(&claims)
    }

    /// Signs arbitrary claims with the configured secret and algorithm.
    pub fn encode_claims(&self, claims: &Claims) -> Result<String, TokenError> {
        let header = Header::new(self.config.algorithm);
        encode(&header, claims, &self.encoding_key).map_err(|e| TokenError::Encoding(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Identity, TokenError> {
        self.verify_claims_at(token, now()).map(|claims| claims.data)
    }

    pub fn verify_at(&self, token: &str, at: i64) -> Result<Identity, TokenError> {
        self.verify_claims_at(token, at).map(|claims| claims.data)
    }

    pub fn verify_claims(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_claims_at(token, now())
    }

    /// Checks the signature first, then the claims shape, then expiry.
    pub fn verify_claims_at(&self, token: &str, at: i64) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::SignatureInvalid,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed(e.to_string()),
            }
        })?;

        let claims = data.claims;
        if claims.exp <= claims.iat {
            return Err(TokenError::Malformed("expiry must be after issued-at".to_string()));
        }
        if at >= claims.exp {
            return Err(TokenError::Expired);
        }
        Ok(claims)
    }

    /// Re-issues a still-valid token with fresh timing and the same payload.
    pub fn refresh(&self, token: &str) -> Result<String, TokenError> {
        self.refresh_at(token, now())
    }

    pub fn refresh_at(&self, token: &str, at: i64) -> Result<String, TokenError> {
        let identity = self.verify_at(token, at)?;
        self.issue_at(&identity, at)
    }

    /// Always reports success: there is no server-side denylist, so a revoked
    /// token stays usable until it expires.
    pub fn revoke(&self, _token: &str) -> bool {
        tracing::debug!("token revocation requested; tokens remain valid until expiry");
        true
    }
}

fn now() -> i64 {
    Utc::now().timestamp()
}
