use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::Serialize;

use super::{Claims, JwtConfig, TokenType};
use crate::crypto::generate_token;
use crate::repository::User;
use crate::{AuthError, SecretString};

const JTI_LENGTH: usize = 16;

/// Access and refresh token issued together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenPair {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

/// Issues and verifies token pairs.
///
/// Each token class has its own HS256 key, so a leaked access secret cannot
/// mint refresh tokens and a refresh token never verifies as an access token.
#[derive(Clone)]
pub struct TokenService {
    config: JwtConfig,
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
}

impl TokenService {
    pub fn new(config: JwtConfig) -> Self {
        let access = config.access_secret.expose_secret().as_bytes();
        let refresh = config.refresh_secret.expose_secret().as_bytes();

        Self {
            access_encoding: EncodingKey::from_secret(access),
            access_decoding: DecodingKey::from_secret(access),
            refresh_encoding: EncodingKey::from_secret(refresh),
            refresh_decoding: DecodingKey::from_secret(refresh),
            config,
        }
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }

    /// Signs a fresh access/refresh pair for `user`.
    pub fn issue(&self, user: &User, team_id: Option<i64>) -> Result<TokenPair, AuthError> {
        let access_token = self.encode(user, team_id, TokenType::Access)?;
        let refresh_token = self.encode(user, team_id, TokenType::Refresh)?;

        Ok(TokenPair {
            access_token: SecretString::new(access_token),
            refresh_token: SecretString::new(refresh_token),
            expires_in: self.config.access_expiry.num_seconds(),
        })
    }

    /// Signature and expiry only. Access tokens are not individually revocable.
    pub fn verify_access(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.decode(token, &self.access_decoding, true)?;
        if !claims.is_access_token() {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    /// Signature and expiry of a refresh token. The revocation check belongs to
    /// the caller.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims, AuthError> {
        let claims = self.decode(token, &self.refresh_decoding, true)?;
        if !claims.is_refresh_token() {
            return Err(AuthError::InvalidToken);
        }
        Ok(claims)
    }

    /// Seconds a revocation entry for `refresh_token` must live.
    ///
    /// Covers the remaining lifetime plus the verification leeway, never less
    /// than one second. Returns `None` when the token cannot be decoded, in which
    /// case callers fall back to [`TokenService::default_revocation_ttl`].
    pub fn revocation_ttl(&self, refresh_token: &str) -> Option<u64> {
        let claims = self
            .decode(refresh_token, &self.refresh_decoding, false)
            .ok()?;
        let remaining = claims.exp - Utc::now().timestamp();
        let ttl = remaining.saturating_add(self.config.leeway as i64);
        Some(u64::try_from(ttl).unwrap_or(0).max(1))
    }

    /// Full refresh lifetime, used when a token's expiry cannot be read.
    pub fn default_revocation_ttl(&self) -> u64 {
        let secs = self.config.refresh_expiry.num_seconds() + self.config.leeway as i64;
        u64::try_from(secs).unwrap_or(0).max(1)
    }

    fn encode(
        &self,
        user: &User,
        team_id: Option<i64>,
        token_type: TokenType,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let (lifetime, key) = match token_type {
            TokenType::Access => (self.config.access_expiry, &self.access_encoding),
            TokenType::Refresh => (self.config.refresh_expiry, &self.refresh_encoding),
        };

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            team_id,
            exp: (now + lifetime).timestamp(),
            iat: now.timestamp(),
            jti: generate_token(JTI_LENGTH),
            token_type,
            iss: self.config.issuer.clone(),
        };

        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, key).map_err(|e| {
            log::error!(target: "teamward", "msg=\"failed to sign token\", error=\"{e}\"");
            AuthError::Internal("failed to sign token".to_owned())
        })
    }

    fn decode(
        &self,
        token: &str,
        key: &DecodingKey,
        validate_exp: bool,
    ) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = self.config.leeway;
        validation.validate_exp = validate_exp;
        validation.set_required_spec_claims(&["exp", "sub"]);

        if let Some(ref iss) = self.config.issuer {
            validation.set_issuer(&[iss]);
        }

        jsonwebtoken::decode::<Claims>(token, key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::ExpiredToken,
                _ => AuthError::InvalidToken,
            })
    }

    pub fn access_expiry(&self) -> Duration {
        self.config.access_expiry
    }

    pub fn refresh_expiry(&self) -> Duration {
        self.config.refresh_expiry
    }
}
