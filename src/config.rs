//! Runtime configuration.
//!
//! ```rust
//! use teamward::config::{AuthConfig, RefreshConfig, RevocationFailurePolicy};
//! use teamward::JwtConfig;
//!
//! let jwt = JwtConfig::new(
//!     "access-secret-that-is-at-least-32-bytes",
//!     "refresh-secret-that-is-at-least-32-bytes",
//! )?;
//!
//! let config = AuthConfig::new(jwt).with_refresh(RefreshConfig {
//!     revocation_failure: RevocationFailurePolicy::FailClosed,
//!     rotate_refresh_tokens: true,
//! });
//! # Ok::<(), teamward::AuthError>(())
//! ```

use chrono::Duration;

use crate::crypto::Argon2Hasher;
use crate::jwt::JwtConfig;
use crate::AuthError;

/// What a refresh does when the revocation store cannot be queried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RevocationFailurePolicy {
    /// Treat the token as not revoked and log a warning. Keeps sessions alive
    /// through a store outage at the cost of honoring logged-out tokens.
    #[default]
    FailOpen,
    /// Reject the refresh with `StoreUnavailable`.
    FailClosed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RefreshConfig {
    pub revocation_failure: RevocationFailurePolicy,
    /// Revoke the presented refresh token once a new pair is issued. Off by
    /// default so several clients can refresh one session concurrently.
    pub rotate_refresh_tokens: bool,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt: JwtConfig,
    pub refresh: RefreshConfig,
    pub hasher: Argon2Hasher,
}

impl AuthConfig {
    pub fn new(jwt: JwtConfig) -> Self {
        Self {
            jwt,
            refresh: RefreshConfig::default(),
            hasher: Argon2Hasher::default(),
        }
    }

    #[must_use]
    pub fn with_refresh(mut self, refresh: RefreshConfig) -> Self {
        self.refresh = refresh;
        self
    }

    #[must_use]
    pub fn with_hasher(mut self, hasher: Argon2Hasher) -> Self {
        self.hasher = hasher;
        self
    }

    /// Reads the process environment, loading `.env` first if present.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `JWT_SECRET` | required |
    /// | `JWT_REFRESH_SECRET` | required |
    /// | `JWT_ACCESS_EXPIRY_SECS` | 900 |
    /// | `JWT_REFRESH_EXPIRY_SECS` | 604800 |
    /// | `JWT_ISSUER` | unset |
    /// | `JWT_LEEWAY_SECS` | 0 |
    /// | `REVOCATION_FAIL_CLOSED` | false |
    /// | `REFRESH_TOKEN_ROTATION` | false |
    /// | `ARGON2_PROFILE` | `default` |
    pub fn from_env() -> Result<Self, AuthError> {
        if let Err(e) = dotenvy::dotenv() {
            if !e.not_found() {
                log::warn!(target: "teamward", "msg=\"failed to load .env\", error=\"{e}\"");
            }
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`AuthConfig::from_env`] with an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AuthError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AuthError::ConfigurationError(format!("{key} is not set")))
        };

        let mut jwt = JwtConfig::new(required("JWT_SECRET")?, required("JWT_REFRESH_SECRET")?)?;

        if let Some(secs) = parse_var::<i64>(&lookup, "JWT_ACCESS_EXPIRY_SECS")? {
            jwt = jwt.with_access_expiry(Duration::seconds(positive(secs, "JWT_ACCESS_EXPIRY_SECS")?));
        }
        if let Some(secs) = parse_var::<i64>(&lookup, "JWT_REFRESH_EXPIRY_SECS")? {
            jwt = jwt.with_refresh_expiry(Duration::seconds(positive(secs, "JWT_REFRESH_EXPIRY_SECS")?));
        }
        if let Some(issuer) = lookup("JWT_ISSUER").filter(|v| !v.is_empty()) {
            jwt = jwt.with_issuer(issuer);
        }
        if let Some(leeway) = parse_var::<u64>(&lookup, "JWT_LEEWAY_SECS")? {
            jwt = jwt.with_leeway(leeway);
        }

        let fail_closed = parse_bool(&lookup, "REVOCATION_FAIL_CLOSED")?.unwrap_or(false);
        let refresh = RefreshConfig {
            revocation_failure: if fail_closed {
                RevocationFailurePolicy::FailClosed
            } else {
                RevocationFailurePolicy::FailOpen
            },
            rotate_refresh_tokens: parse_bool(&lookup, "REFRESH_TOKEN_ROTATION")?.unwrap_or(false),
        };

        let hasher = Argon2Hasher::from_profile(&lookup("ARGON2_PROFILE").unwrap_or_default())?;

        Ok(Self {
            jwt,
            refresh,
            hasher,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, AuthError> {
    match lookup(key).filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| AuthError::ConfigurationError(format!("{key} has invalid value `{raw}`"))),
    }
}

fn parse_bool(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<bool>, AuthError> {
    match lookup(key).map(|v| v.trim().to_ascii_lowercase()) {
        None => Ok(None),
        Some(v) if v.is_empty() => Ok(None),
        Some(v) => match v.as_str() {
            "1" | "true" | "yes" | "on" => Ok(Some(true)),
            "0" | "false" | "no" | "off" => Ok(Some(false)),
            _ => Err(AuthError::ConfigurationError(format!(
                "{key} must be a boolean, got `{v}`"
            ))),
        },
    }
}

fn positive(secs: i64, key: &str) -> Result<i64, AuthError> {
    if secs <= 0 {
        return Err(AuthError::ConfigurationError(format!(
            "{key} must be positive"
        )));
    }
    Ok(secs)
}
