use chrono::Duration;
use std::fmt;

use crate::{AuthError, SecretString};

/// Minimum length of each signing secret in bytes.
pub const MIN_SECRET_LENGTH: usize = 32;

/// Signing keys and lifetimes for [`TokenService`](super::TokenService).
#[derive(Clone)]
pub struct JwtConfig {
    pub(crate) access_secret: SecretString,
    pub(crate) refresh_secret: SecretString,
    pub(crate) access_expiry: Duration,
    pub(crate) refresh_expiry: Duration,
    pub(crate) issuer: Option<String>,
    /// Clock skew tolerated when checking `exp`, in seconds.
    pub(crate) leeway: u64,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig")
            .field("access_secret", &"[REDACTED]")
            .field("refresh_secret", &"[REDACTED]")
            .field("access_expiry", &self.access_expiry)
            .field("refresh_expiry", &self.refresh_expiry)
            .field("issuer", &self.issuer)
            .field("leeway", &self.leeway)
            .finish()
    }
}

impl JwtConfig {
    /// Access tokens default to 15 minutes and refresh tokens to 7 days.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ConfigurationError` if either secret is shorter than
    /// 32 bytes or both secrets are the same.
    pub fn new(
        access_secret: impl Into<String>,
        refresh_secret: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let access_secret = access_secret.into();
        let refresh_secret = refresh_secret.into();

        for (name, secret) in [("access", &access_secret), ("refresh", &refresh_secret)] {
            if secret.len() < MIN_SECRET_LENGTH {
                return Err(AuthError::ConfigurationError(format!(
                    "JWT {name} secret must be at least {MIN_SECRET_LENGTH} bytes, got {}",
                    secret.len()
                )));
            }
        }

        if access_secret == refresh_secret {
            return Err(AuthError::ConfigurationError(
                "JWT access and refresh secrets must differ".to_owned(),
            ));
        }

        Ok(Self {
            access_secret: SecretString::new(access_secret),
            refresh_secret: SecretString::new(refresh_secret),
            access_expiry: Duration::minutes(15),
            refresh_expiry: Duration::days(7),
            issuer: None,
            leeway: 0,
        })
    }

    #[must_use]
    pub fn with_access_expiry(mut self, expiry: Duration) -> Self {
        self.access_expiry = expiry;
        self
    }

    #[must_use]
    pub fn with_refresh_expiry(mut self, expiry: Duration) -> Self {
        self.refresh_expiry = expiry;
        self
    }

    #[must_use]
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = Some(issuer.into());
        self
    }

    #[must_use]
    pub fn with_leeway(mut self, seconds: u64) -> Self {
        self.leeway = seconds;
        self
    }

    pub fn access_expiry(&self) -> Duration {
        self.access_expiry
    }

    pub fn refresh_expiry(&self) -> Duration {
        self.refresh_expiry
    }

    pub fn issuer(&self) -> Option<&str> {
        self.issuer.as_deref()
    }

    pub fn leeway(&self) -> u64 {
        self.leeway
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCESS: &str = "access-secret-0123456789abcdef0123";
    const REFRESH: &str = "refresh-secret-0123456789abcdef012";

    #[test]
    fn test_defaults() {
        let config = JwtConfig::new(ACCESS, REFRESH).unwrap();
        assert_eq!(config.access_expiry(), Duration::minutes(15));
        assert_eq!(config.refresh_expiry(), Duration::days(7));
        assert_eq!(config.issuer(), None);
        assert_eq!(config.leeway(), 0);
    }

    #[test]
    fn test_short_secret_rejected() {
        let err = JwtConfig::new("short", REFRESH).unwrap_err();
        assert!(matches!(err, AuthError::ConfigurationError(ref msg) if msg.contains("access")));

        let err = JwtConfig::new(ACCESS, "short").unwrap_err();
        assert!(matches!(err, AuthError::ConfigurationError(ref msg) if msg.contains("refresh")));
    }

    #[test]
    fn test_identical_secrets_rejected() {
        assert!(matches!(
            JwtConfig::new(ACCESS, ACCESS),
            Err(AuthError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let config = JwtConfig::new(ACCESS, REFRESH).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains(ACCESS));
        assert!(!debug.contains(REFRESH));
    }
}
