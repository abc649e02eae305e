//! Signed session credentials.
//!
//! # Responsibility
//! - Issue and verify HS256 access/refresh tokens bound to an admin id.
//!
//! # Invariants
//! - Access and refresh tokens are signed with different keys; a token of
//!   one kind never verifies as the other.
//! - Expiry is checked with zero leeway.
//! - Every token carries a fresh `jti`, so two tokens issued for the same
//!   admin within one second still differ.

use crate::config::{SessionConfig, ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL};
use crate::model::admin::AdminId;
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind as JwtErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    Expired,
    Invalid(String),
    Encode(String),
}

impl Display for TokenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Expired => write!(f, "token expired"),
            Self::Invalid(reason) => write!(f, "invalid token: {reason}"),
            Self::Encode(reason) => write!(f, "failed to sign token: {reason}"),
        }
    }
}

impl Error for TokenError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn ttl(self) -> Duration {
        match self {
            Self::Access => ACCESS_TOKEN_TTL,
            Self::Refresh => REFRESH_TOKEN_TTL,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    jti: String,
    iat: i64,
    exp: i64,
}

/// A freshly signed token with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    /// Expiry in epoch milliseconds.
    pub expires_at: i64,
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl KeyPair {
    fn from_secret(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Signs and verifies both credential kinds.
pub struct TokenCodec {
    access: KeyPair,
    refresh: KeyPair,
    validation: Validation,
}

impl TokenCodec {
    pub fn new(config: &SessionConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);
        Self {
            access: KeyPair::from_secret(&config.access_secret),
            refresh: KeyPair::from_secret(&config.refresh_secret),
            validation,
        }
    }

    /// Signs a token of `kind` for `admin`, valid from `now` for the kind's TTL.
    pub fn issue(
        &self,
        kind: TokenKind,
        admin: AdminId,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, TokenError> {
        let iat = now.timestamp();
        let exp = iat + kind.ttl().as_secs() as i64;
        let claims = Claims {
            sub: admin.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat,
            exp,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.keys(kind).encoding,
        )
        .map_err(|err| TokenError::Encode(err.to_string()))?;
        Ok(IssuedToken {
            token,
            expires_at: exp * 1000,
        })
    }

    /// Verifies signature and expiry and returns the bound admin id.
    pub fn verify(&self, kind: TokenKind, token: &str) -> Result<AdminId, TokenError> {
        let data = decode::<Claims>(token, &self.keys(kind).decoding, &self.validation).map_err(
            |err| match err.kind() {
                JwtErrorKind::ExpiredSignature => TokenError::Expired,
                other => TokenError::Invalid(format!("{other:?}")),
            },
        )?;
        Uuid::parse_str(&data.claims.sub)
            .map_err(|_| TokenError::Invalid("subject is not an admin id".to_string()))
    }

    fn keys(&self, kind: TokenKind) -> &KeyPair {
        match kind {
            TokenKind::Access => &self.access,
            TokenKind::Refresh => &self.refresh,
        }
    }
}
