use chrono::Utc;

use crate::config::{RefreshConfig, RevocationFailurePolicy};
use crate::crypto::hash_token;
use crate::events::{dispatch, AuditEvent};
use crate::jwt::{TokenPair, TokenService};
use crate::repository::UserRepository;
use crate::revocation::RevocationStore;
use crate::AuthError;

/// Exchanges a refresh token for a new pair.
///
/// By default the presented token stays usable until it expires or is logged
/// out, so concurrent clients sharing a session can all refresh. Enable
/// [`RefreshConfig::rotate_refresh_tokens`] to revoke it on every use.
pub struct RefreshTokenAction<U: UserRepository, R: RevocationStore> {
    user_repository: U,
    revocation_store: R,
    tokens: TokenService,
    config: RefreshConfig,
}

impl<U: UserRepository, R: RevocationStore> RefreshTokenAction<U, R> {
    pub fn new(user_repository: U, revocation_store: R, tokens: TokenService) -> Self {
        Self::with_config(user_repository, revocation_store, tokens, RefreshConfig::default())
    }

    pub fn with_config(
        user_repository: U,
        revocation_store: R,
        tokens: TokenService,
        config: RefreshConfig,
    ) -> Self {
        Self {
            user_repository,
            revocation_store,
            tokens,
            config,
        }
    }

    /// # Returns
    ///
    /// - `Ok(TokenPair)` - fresh pair carrying the same team claim
    /// - `Err(AuthError::RevokedToken)` - the token was logged out, checked
    ///   before its signature
    /// - `Err(AuthError::InvalidToken)` / `Err(AuthError::ExpiredToken)` - bad
    ///   signature, wrong token class or past expiry
    /// - `Err(AuthError::UserNotFound)` - the subject no longer exists
    /// - `Err(AuthError::InvalidToken)` - the subject has been deactivated
    /// - `Err(AuthError::StoreUnavailable(_))` - only under
    ///   [`RevocationFailurePolicy::FailClosed`]
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "refresh_token", skip_all, err))]
    pub async fn execute(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let token_id = hash_token(refresh_token);

        match self.revocation_store.is_revoked(&token_id).await {
            Ok(true) => {
                log::info!(target: "teamward", "msg=\"refresh rejected\", reason=revoked");
                return Err(AuthError::RevokedToken);
            }
            Ok(false) => {}
            Err(e) => match self.config.revocation_failure {
                // Accepted risk: during a store outage a logged-out token can
                // still be refreshed until it expires.
                RevocationFailurePolicy::FailOpen => {
                    log::warn!(
                        target: "teamward",
                        "msg=\"revocation check failed, treating token as not revoked\", error=\"{e}\""
                    );
                }
                RevocationFailurePolicy::FailClosed => {
                    log::error!(
                        target: "teamward",
                        "msg=\"revocation check failed, rejecting refresh\", error=\"{e}\""
                    );
                    return Err(e);
                }
            },
        }

        let claims = self.tokens.verify_refresh(refresh_token)?;
        let user_id = claims.user_id()?;

        let user = self
            .user_repository
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !user.is_active {
            log::info!(
                target: "teamward",
                "msg=\"refresh rejected\", reason=inactive, user_id={}",
                user.id
            );
            return Err(AuthError::InvalidToken);
        }

        let pair = self.tokens.issue(&user, claims.team_id)?;

        if self.config.rotate_refresh_tokens {
            let ttl = self
                .tokens
                .revocation_ttl(refresh_token)
                .unwrap_or_else(|| self.tokens.default_revocation_ttl());
            // the new pair is already signed; a failed revoke only leaves the
            // old token usable, as without rotation
            if let Err(e) = self.revocation_store.revoke(&token_id, ttl).await {
                log::warn!(
                    target: "teamward",
                    "msg=\"failed to revoke rotated refresh token\", user_id={}, error=\"{e}\"",
                    user.id
                );
            }
        }

        log::info!(target: "teamward", "msg=\"token refreshed\", user_id={}", user.id);

        dispatch(AuditEvent::TokenRefreshed {
            user_id: user.id,
            at: Utc::now(),
        })
        .await;

        Ok(pair)
    }
}
