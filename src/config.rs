use std::str::FromStr;

use anyhow::{bail, Context};
use serde::Deserialize;

/// Token lifetimes above one year are rejected at startup.
pub const MAX_TTL_MINUTES: i64 = 60 * 24 * 365;

#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub ttl_minutes: i64,
    pub refresh_ttl_minutes: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            "test" => Ok(Self::Test),
            other => bail!("unknown APP_ENV `{other}`"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum SameSite {
    Lax,
    Strict,
}

impl SameSite {
    pub fn as_str(self) -> &'static str {
        match self {
            SameSite::Lax => "Lax",
            SameSite::Strict => "Strict",
        }
    }
}

impl FromStr for SameSite {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lax" => Ok(Self::Lax),
            "strict" => Ok(Self::Strict),
            other => bail!("unsupported COOKIE_SAME_SITE `{other}`"),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CookieConfig {
    pub secure: bool,
    pub same_site: SameSite,
}

/// Argon2 cost parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct PasswordConfig {
    pub cost: u32,
    pub memory_kib: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    pub cors_origin: Option<String>,
    pub jwt: JwtConfig,
    pub cookie: CookieConfig,
    pub password: PasswordConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Unset keys fall back
    /// to defaults; set but unparsable keys are errors.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = lookup("DATABASE_URL").context("DATABASE_URL must be set")?;
        let secret = lookup("JWT_SECRET").context("JWT_SECRET must be set")?;
        if secret.trim().is_empty() {
            bail!("JWT_SECRET must not be empty");
        }

        let environment: Environment = parse_or(&lookup, "APP_ENV", Environment::Development)?;

        let jwt = JwtConfig {
            secret,
            issuer: lookup("JWT_ISSUER").unwrap_or_else(|| "ingreedy".into()),
            audience: lookup("JWT_AUDIENCE").unwrap_or_else(|| "ingreedy-users".into()),
            ttl_minutes: parse_or(&lookup, "JWT_TTL_MINUTES", 15)?,
            refresh_ttl_minutes: parse_or(&lookup, "JWT_REFRESH_TTL_MINUTES", 60 * 24 * 7)?,
        };
        for (key, minutes) in [
            ("JWT_TTL_MINUTES", jwt.ttl_minutes),
            ("JWT_REFRESH_TTL_MINUTES", jwt.refresh_ttl_minutes),
        ] {
            if !(1..=MAX_TTL_MINUTES).contains(&minutes) {
                bail!("{key} must be between 1 and {MAX_TTL_MINUTES} minutes, got {minutes}");
            }
        }

        let cookie = CookieConfig {
            secure: parse_or(&lookup, "COOKIE_SECURE", environment.is_production())?,
            same_site: parse_or(&lookup, "COOKIE_SAME_SITE", SameSite::Lax)?,
        };

        let password = PasswordConfig {
            cost: parse_or(&lookup, "PASSWORD_HASH_COST", 2)?,
            memory_kib: parse_or(&lookup, "PASSWORD_HASH_MEMORY_KIB", 19 * 1024)?,
        };

        Ok(Self {
            database_url,
            host: lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or(&lookup, "APP_PORT", 8080)?,
            environment,
            cors_origin: lookup("CORS_ORIGIN").filter(|v| !v.trim().is_empty()),
            jwt,
            cookie,
            password,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> anyhow::Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("invalid value for {key}: {e}")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const REQUIRED: [(&str, &str); 2] = [
        ("DATABASE_URL", "postgres://localhost/ingreedy"),
        ("JWT_SECRET", "dev-secret"),
    ];

    #[test]
    fn defaults_apply_when_only_required_keys_set() {
        let cfg = AppConfig::from_lookup(lookup_from(&REQUIRED)).expect("config");
        assert_eq!(cfg.environment, Environment::Development);
        assert_eq!(cfg.jwt.ttl_minutes, 15);
        assert_eq!(cfg.jwt.refresh_ttl_minutes, 7 * 24 * 60);
        assert_eq!(cfg.jwt.issuer, "ingreedy");
        assert_eq!(cfg.port, 8080);
        assert!(!cfg.cookie.secure);
        assert_eq!(cfg.cookie.same_site, SameSite::Lax);
        assert!(cfg.cors_origin.is_none());
    }

    #[test]
    fn production_turns_on_secure_cookies() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("APP_ENV", "production"));
        let cfg = AppConfig::from_lookup(lookup_from(&pairs)).expect("config");
        assert!(cfg.cookie.secure);

        pairs.push(("COOKIE_SECURE", "false"));
        let cfg = AppConfig::from_lookup(lookup_from(&pairs)).expect("config");
        assert!(!cfg.cookie.secure);
    }

    #[test]
    fn missing_secret_is_an_error() {
        let err = AppConfig::from_lookup(lookup_from(&[("DATABASE_URL", "postgres://x")]))
            .unwrap_err();
        assert!(err.to_string().contains("JWT_SECRET"));
    }

    #[test]
    fn blank_secret_is_an_error() {
        let pairs = [("DATABASE_URL", "postgres://x"), ("JWT_SECRET", "   ")];
        assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn unparsable_values_are_rejected() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("APP_PORT", "eighty"));
        let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("APP_PORT"));

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("COOKIE_SAME_SITE", "none"));
        assert!(AppConfig::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn ttl_bounds_are_enforced() {
        for (key, value) in [
            ("JWT_TTL_MINUTES", "0"),
            ("JWT_TTL_MINUTES", "-5"),
            ("JWT_TTL_MINUTES", "9223372036854775807"),
            ("JWT_REFRESH_TTL_MINUTES", "525601"),
        ] {
            let mut pairs = REQUIRED.to_vec();
            pairs.push((key, value));
            let err = AppConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
            assert!(err.to_string().contains(key), "{key}={value}: {err}");
        }

        let mut pairs = REQUIRED.to_vec();
        pairs.push(("JWT_REFRESH_TTL_MINUTES", "525600"));
        let cfg = AppConfig::from_lookup(lookup_from(&pairs)).expect("config");
        assert_eq!(cfg.jwt.refresh_ttl_minutes, MAX_TTL_MINUTES);
    }

    #[test]
    fn strict_same_site_is_accepted() {
        let mut pairs = REQUIRED.to_vec();
        pairs.push(("COOKIE_SAME_SITE", "Strict"));
        let cfg = AppConfig::from_lookup(lookup_from(&pairs)).expect("config");
        assert_eq!(cfg.cookie.same_site, SameSite::Strict);
    }
}
