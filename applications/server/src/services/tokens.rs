/// Bearer token service - issues and verifies signed JWTs
use crate::error::{Result, ServerError};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use shelf_core::UserId;
use thiserror::Error;

#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration: Duration,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub exp: i64,    // Expiration time
    pub iat: i64,    // Issued at
}

/// Why a token was rejected
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid token")]
    Invalid,

    #[error("token expired")]
    Expired,
}

/// Longest token lifetime accepted from configuration
pub const MAX_TOKEN_EXPIRATION_DAYS: u64 = 3650;

impl TokenService {
    /// Lifetimes above [`MAX_TOKEN_EXPIRATION_DAYS`] are clamped to it
    pub fn new(secret: &str, expiration_days: u64) -> Self {
        let days = expiration_days.min(MAX_TOKEN_EXPIRATION_DAYS) as i64;
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiration: Duration::try_days(days).unwrap_or_else(Duration::zero),
        }
    }

    /// Issue a token for `user_id`, valid for the configured lifetime
    pub fn issue(&self, user_id: &UserId) -> Result<String> {
        self.issue_at(user_id, Utc::now().timestamp())
    }

    fn issue_at(&self, user_id: &UserId, issued_at: i64) -> Result<String> {
        let claims = Claims {
            sub: user_id.as_str().to_string(),
            exp: issued_at + self.expiration.num_seconds(),
            iat: issued_at,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(ServerError::from)
    }

    /// Verify signature and expiry and return the subject
    pub fn verify(&self, token: &str) -> std::result::Result<UserId, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        let data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            }
        })?;

        if data.claims.sub.is_empty() {
            return Err(TokenError::Invalid);
        }

        Ok(UserId::new(data.claims.sub))
    }
}
