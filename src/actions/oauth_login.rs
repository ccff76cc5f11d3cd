use chrono::Utc;

use super::{primary_team_id, AuthSession};
use crate::events::{dispatch, AuditEvent};
use crate::identity::{IdentityDirectory, OAuthProfile};
use crate::jwt::TokenService;
use crate::repository::UserRepository;
use crate::teams::TeamRepository;
use crate::AuthError;

/// Signs in with a provider profile the caller already fetched and verified.
///
/// The first login for an email creates the account and its personal team.
/// Later logins merge missing profile fields into the existing account.
pub struct OAuthLoginAction<U: UserRepository, T: TeamRepository> {
    directory: IdentityDirectory<U>,
    team_repository: T,
    tokens: TokenService,
}

impl<U: UserRepository, T: TeamRepository> OAuthLoginAction<U, T> {
    pub fn new(user_repository: U, team_repository: T, tokens: TokenService) -> Self {
        Self {
            directory: IdentityDirectory::new(user_repository),
            team_repository,
            tokens,
        }
    }

    /// # Returns
    ///
    /// - `Ok(AuthSession)` - token pair scoped to the personal team on first
    ///   login, otherwise to the earliest-joined team
    /// - `Err(AuthError::InvalidCredentials)` - the account is deactivated
    /// - `Err(AuthError::DuplicateOAuthAccount)` - the provider identity is
    ///   linked to a different email
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "oauth_login", skip_all, err))]
    pub async fn execute(&self, profile: &OAuthProfile) -> Result<AuthSession, AuthError> {
        let outcome = self.directory.upsert_oauth(profile).await?;
        let created = outcome.created();
        let user = outcome.user;

        if !user.is_active {
            log::info!(
                target: "teamward",
                "msg=\"oauth login rejected\", reason=inactive, user_id={}",
                user.id
            );
            return Err(AuthError::InvalidCredentials);
        }

        let team_id = match outcome.personal_team_id {
            Some(id) => Some(id),
            None => primary_team_id(&self.team_repository, user.id).await?,
        };
        let tokens = self.tokens.issue(&user, team_id)?;

        log::info!(
            target: "teamward",
            "msg=\"oauth login succeeded\", user_id={}, provider={}, created={}",
            user.id,
            profile.provider(),
            created
        );

        dispatch(AuditEvent::OAuthLogin {
            user_id: user.id,
            provider: profile.provider(),
            created,
            at: Utc::now(),
        })
        .await;

        Ok(AuthSession {
            user,
            tokens,
            team_id,
        })
    }
}
