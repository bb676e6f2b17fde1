use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{config::JwtConfig, state::AppState};

/// Distinguishes access and refresh JWTs signed with the same secret.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    #[serde(rename = "userId")]
    user_id: &'a str,
    kind: TokenKind,
    iat: i64,
    exp: i64,
    iss: &'a str,
    aud: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Identity recovered from a token that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedToken {
    pub user_id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Signature and expiry were fine but the payload has the wrong shape.
    #[error("invalid token payload: {0}")]
    Invalid(&'static str),
    #[error("token verification failed: {0}")]
    VerificationFailed(#[from] jsonwebtoken::errors::Error),
    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),
}

/// Signs and verifies stateless access/refresh tokens. There is no
/// server-side token state: a token is valid until it expires.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl FromRef<AppState> for TokenService {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl TokenService {
    pub fn new(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            access_ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64) * 60),
            refresh_ttl: Duration::from_secs((cfg.refresh_ttl_minutes.max(0) as u64) * 60),
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    fn sign_at(
        &self,
        user_id: &str,
        kind: TokenKind,
        now: OffsetDateTime,
    ) -> Result<String, TokenError> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl,
            TokenKind::Refresh => self.refresh_ttl,
        };
        let exp = now + TimeDuration::seconds(ttl.as_secs() as i64);
        let claims = Claims {
            user_id,
            kind,
            iat: now.unix_timestamp(),
            exp: exp.unix_timestamp(),
            iss: &self.issuer,
            aud: &self.audience,
        };
        let token =
            encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(TokenError::Signing)?;
        debug!(kind = ?kind, "jwt signed");
        Ok(token)
    }

    pub fn generate_tokens(&self, user_id: &str) -> Result<TokenPair, TokenError> {
        let now = OffsetDateTime::now_utc();
        Ok(TokenPair {
            access_token: self.sign_at(user_id, TokenKind::Access, now)?,
            refresh_token: self.sign_at(user_id, TokenKind::Refresh, now)?,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        self.verify_kind(token, TokenKind::Access)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<VerifiedToken, TokenError> {
        self.verify_kind(token, TokenKind::Refresh)
    }

    fn validation(&self) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        validation
    }

    // The payload is decoded untyped and each field checked before use.
    fn verify_kind(&self, token: &str, expected: TokenKind) -> Result<VerifiedToken, TokenError> {
        let data = decode::<Value>(token, &self.decoding, &self.validation())?;
        let payload = data
            .claims
            .as_object()
            .ok_or(TokenError::Invalid("payload is not an object"))?;

        let user_id = payload
            .get("userId")
            .and_then(Value::as_str)
            .ok_or(TokenError::Invalid("missing userId"))?;

        let kind = payload
            .get("kind")
            .cloned()
            .and_then(|v| serde_json::from_value::<TokenKind>(v).ok());
        if kind != Some(expected) {
            return Err(TokenError::Invalid("unexpected token kind"));
        }

        debug!(kind = ?expected, "jwt verified");
        Ok(VerifiedToken {
            user_id: user_id.to_owned(),
        })
    }
}
