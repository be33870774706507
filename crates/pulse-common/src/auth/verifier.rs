//! Bearer credential verification
//!
//! The identity verifier resolves an opaque bearer token (HS256 JWT,
//! issued by the out-of-scope auth service) to a stable user identity.
//! Verification happens once, at connection time, before any registry
//! mutation.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use pulse_core::Snowflake;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username, carried so presence events need no directory lookup
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Verified identity bound to a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: Snowflake,
    pub username: String,
}

/// Verifies bearer credentials presented at connection time
#[derive(Clone)]
pub struct TokenVerifier {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl TokenVerifier {
    /// Create a new verifier over a shared HS256 secret
    #[must_use]
    pub fn new(secret: &str) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Verify a credential and resolve it to an identity.
    ///
    /// Accepts the raw token with or without a `Bearer ` prefix. An
    /// empty credential is `MissingAuth`; an expired one `TokenExpired`;
    /// anything else that fails to decode is `InvalidToken`.
    pub fn verify(&self, credential: &str) -> Result<Identity, AppError> {
        let token = credential.strip_prefix("Bearer ").unwrap_or(credential);
        if token.is_empty() {
            return Err(AppError::MissingAuth);
        }

        let data = decode::<Claims>(token, &self.decoding_key, &Validation::default()).map_err(
            |e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::TokenExpired,
                _ => AppError::InvalidToken,
            },
        )?;

        let user_id = data
            .claims
            .sub
            .parse::<i64>()
            .map(Snowflake::new)
            .map_err(|_| AppError::InvalidToken)?;

        Ok(Identity {
            user_id,
            username: data.claims.username,
        })
    }

    /// Issue a token for an identity. Used by tests and local tooling;
    /// production tokens come from the auth service.
    pub fn issue(&self, user_id: Snowflake, username: &str, ttl_secs: i64) -> Result<String, AppError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_secs)).timestamp(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))
    }
}
