use chrono::Utc;

use crate::crypto::hash_token;
use crate::events::{dispatch, AuditEvent};
use crate::jwt::TokenService;
use crate::revocation::RevocationStore;
use crate::AuthError;

/// Revokes a refresh token.
///
/// Always succeeds. If the revocation store is down the token stays usable
/// until it expires; this is logged and reported through
/// [`AuditEvent::LoggedOut`] with `revoked: false`.
pub struct LogoutAction<R: RevocationStore> {
    revocation_store: R,
    tokens: TokenService,
}

impl<R: RevocationStore> LogoutAction<R> {
    pub fn new(revocation_store: R, tokens: TokenService) -> Self {
        Self {
            revocation_store,
            tokens,
        }
    }

    /// The entry lives for the token's remaining lifetime plus leeway, or the
    /// full refresh lifetime when the token cannot be decoded.
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "logout", skip_all, err))]
    pub async fn execute(&self, refresh_token: &str, user_id: i64) -> Result<(), AuthError> {
        let ttl = self
            .tokens
            .revocation_ttl(refresh_token)
            .unwrap_or_else(|| self.tokens.default_revocation_ttl());

        let revoked = match self
            .revocation_store
            .revoke(&hash_token(refresh_token), ttl)
            .await
        {
            Ok(()) => {
                log::info!(target: "teamward", "msg=\"logged out\", user_id={user_id}, ttl_secs={ttl}");
                true
            }
            // Deliberately swallowed: the caller is told logout succeeded even
            // though the refresh token remains valid until it expires.
            Err(e) => {
                log::warn!(
                    target: "teamward",
                    "msg=\"refresh token revocation failed, token stays valid until expiry\", user_id={user_id}, error=\"{e}\""
                );
                false
            }
        };

        dispatch(AuditEvent::LoggedOut {
            user_id,
            revoked,
            at: Utc::now(),
        })
        .await;

        Ok(())
    }
}
