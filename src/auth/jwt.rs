//! Session token issuance and validation
//! HS256 only; the verifier never trusts the token's `alg` header

use crate::config::AppConfig;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// The only token type this service issues
pub const TOKEN_TYPE: &str = "refresh";

/// Scheme reported to clients alongside the token
pub const TOKEN_SCHEME: &str = "Bearer";

const ALGORITHM: Algorithm = Algorithm::HS256;

/// Token errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("token signature or structure invalid")]
    Invalid,

    #[error("token expired")]
    Expired,

    #[error("token claims missing or malformed")]
    Malformed,

    #[error("token signing failed: {0}")]
    Signing(String),
}

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Unique token identifier, key of the session record
    pub token_id: Uuid,

    /// Subject (user ID)
    pub sub: Uuid,

    /// Role at issuance time
    pub role: String,

    /// Token type, always "refresh"
    #[serde(rename = "type")]
    pub token_type: String,

    /// Issued at
    pub iat: i64,

    /// Expiration
    pub exp: i64,
}

/// A freshly signed token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: Claims,
}

/// Token service
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenService {
    /// Create token service from a raw signing secret
    pub fn new(secret: &[u8]) -> Result<Self, TokenError> {
        // Ensure secret is at least 32 bytes for HS256
        if secret.len() < 32 {
            return Err(TokenError::Signing("signing key absent or too short (min 32 bytes)".to_string()));
        }

        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "iat", "sub"]);

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        })
    }

    /// Create token service from config
    pub fn from_config(config: &AppConfig) -> Result<Self, TokenError> {
        Self::new(config.security.jwt_secret.expose_secret().as_bytes())
    }

    /// Issue a signed token for the given user and role
    pub fn issue(&self, user_id: Uuid, role: &str, ttl: Duration) -> Result<IssuedToken, TokenError> {
        let now = Utc::now();
        let expiration = now + ttl;

        let claims = Claims {
            token_id: Uuid::new_v4(),
            sub: user_id,
            role: role.to_string(),
            token_type: TOKEN_TYPE.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
        };

        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding_key).map_err(|e| {
            tracing::error!("Failed to encode session token: {:?}", e);
            TokenError::Signing(e.to_string())
        })?;

        Ok(IssuedToken { token, claims })
    }

    /// Verify signature and expiry, then decode claims
    pub fn parse(&self, token: &str) -> Result<Claims, TokenError> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                match e.kind() {
                    ErrorKind::ExpiredSignature => TokenError::Expired,
                    ErrorKind::Json(_) | ErrorKind::MissingRequiredClaim(_) => TokenError::Malformed,
                    _ => TokenError::Invalid,
                }
            })?
            .claims;

        if claims.token_type != TOKEN_TYPE {
            tracing::debug!("Token type mismatch: expected '{}', got '{}'", TOKEN_TYPE, claims.token_type);
            return Err(TokenError::Malformed);
        }

        Ok(claims)
    }
}
