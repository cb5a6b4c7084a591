//! src/services/session.rs
//!
//! Resolves the current CMS user from request headers. Session tokens are
//! HS256 JWTs carried either in the `payload-token` cookie or in an
//! `Authorization: JWT <token>` / `Authorization: Bearer <token>` header.
//!
//! Tokens are signed with the first 32 hex characters of `sha256(secret)`,
//! not the raw secret, and carry either a numeric or a string user id.

use crate::models::user::SessionUser;
use async_trait::async_trait;
use axum::http::{HeaderMap, header};
use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use thiserror::Error;

pub const SESSION_COOKIE: &str = "payload-token";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid session token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),
}

/// Looks up the user behind a request, if any.
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// `Ok(None)` when the request carries no session at all.
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<SessionUser>, SessionError>;
}

/// HMAC key derived from the CMS secret.
pub fn signing_key(secret: &str) -> String {
    let digest = hex::encode(Sha256::digest(secret.as_bytes()));
    digest[..32].to_string()
}

/// User id as issued: numeric for SQL-backed users, text otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaimId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ClaimId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClaimId::Number(id) => write!(f, "{}", id),
            ClaimId::Text(id) => f.write_str(id),
        }
    }
}

/// Session token claims.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: ClaimId,
    pub email: String,
    pub collection: String,
    pub exp: usize,
}

pub struct TokenSessionResolver {
    key: DecodingKey,
    validation: Validation,
}

impl TokenSessionResolver {
    pub fn new(secret: &str) -> Self {
        Self {
            key: DecodingKey::from_secret(signing_key(secret).as_bytes()),
            validation: Validation::default(),
        }
    }
}

#[async_trait]
impl SessionResolver for TokenSessionResolver {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<SessionUser>, SessionError> {
        let Some(token) = extract_token(headers) else {
            return Ok(None);
        };
        let data = decode::<Claims>(&token, &self.key, &self.validation)?;
        Ok(Some(SessionUser {
            id: data.claims.id.to_string(),
            email: data.claims.email,
            collection: data.claims.collection,
        }))
    }
}

/// Authorization header first, then the session cookie.
fn extract_token(headers: &HeaderMap) -> Option<String> {
    let from_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| {
            v.strip_prefix("JWT ")
                .or_else(|| v.strip_prefix("Bearer "))
                .map(str::trim)
        })
        .filter(|t| !t.is_empty());
    if let Some(token) = from_header {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}
