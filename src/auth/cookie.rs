//! Session cookies carrying the access and refresh tokens.

use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue};

use crate::{
    auth::tokens::{TokenPair, TokenService},
    config::{CookieConfig, SameSite},
};

pub const ACCESS_COOKIE_NAME: &str = "accessToken";
pub const REFRESH_COOKIE_NAME: &str = "refreshToken";

/// Extract a cookie value from the Cookie header.
pub fn get_cookie<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|part| part.split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(_, value)| value.trim())
        .filter(|value| !value.is_empty())
}

/// One cookie policy for every place that issues or clears session cookies.
#[derive(Debug, Clone)]
pub struct CookiePolicy {
    pub secure: bool,
    pub same_site: SameSite,
    pub access_max_age: Duration,
    pub refresh_max_age: Duration,
}

impl CookiePolicy {
    pub fn new(cfg: &CookieConfig, tokens: &TokenService) -> Self {
        Self {
            secure: cfg.secure,
            same_site: cfg.same_site,
            access_max_age: tokens.access_ttl(),
            refresh_max_age: tokens.refresh_ttl(),
        }
    }

    fn cookie(&self, name: &str, value: &str, max_age: Duration) -> String {
        let secure = if self.secure { "; Secure" } else { "" };
        format!(
            "{}={}; HttpOnly; SameSite={}; Path=/; Max-Age={}{}",
            name,
            value,
            self.same_site.as_str(),
            max_age.as_secs(),
            secure
        )
    }

    pub fn session_cookies(&self, pair: &TokenPair) -> [String; 2] {
        [
            self.cookie(ACCESS_COOKIE_NAME, &pair.access_token, self.access_max_age),
            self.cookie(REFRESH_COOKIE_NAME, &pair.refresh_token, self.refresh_max_age),
        ]
    }

    pub fn cleared_cookies(&self) -> [String; 2] {
        [
            self.cookie(ACCESS_COOKIE_NAME, "", Duration::ZERO),
            self.cookie(REFRESH_COOKIE_NAME, "", Duration::ZERO),
        ]
    }

    /// Appends `Set-Cookie` headers, skipping any value that is not a valid
    /// header (tokens are base64url, so this does not happen in practice).
    pub fn append(headers: &mut HeaderMap, cookies: [String; 2]) {
        for cookie in cookies {
            if let Ok(value) = HeaderValue::from_str(&cookie) {
                headers.append(header::SET_COOKIE, value);
            }
        }
    }
}
