//! Account flows: signup, login, OAuth login, refresh, logout and profile.
//!
//! Team operations live in [`crate::teams`].

mod authenticate;
mod get_profile;
mod login;
mod logout;
mod oauth_login;
mod refresh_token;
mod signup;
mod update_profile;

pub use authenticate::AuthenticateAction;
pub use get_profile::GetProfileAction;
pub use login::LoginAction;
pub use logout::LogoutAction;
pub use oauth_login::OAuthLoginAction;
pub use refresh_token::RefreshTokenAction;
pub use signup::{SignupAction, SignupInput};
pub use update_profile::UpdateProfileAction;

use serde::Serialize;

use crate::jwt::TokenPair;
use crate::repository::User;
use crate::teams::TeamRepository;
use crate::AuthError;

/// Result of every flow that signs a user in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthSession {
    pub user: User,
    pub tokens: TokenPair,
    /// Team carried in the token claims.
    pub team_id: Option<i64>,
}

/// The team a user joined first, used as the `team_id` claim on login.
async fn primary_team_id<T: TeamRepository>(
    teams: &T,
    user_id: i64,
) -> Result<Option<i64>, AuthError> {
    let teams = teams.find_teams_for_user(user_id).await?;
    Ok(teams
        .into_iter()
        .min_by_key(|t| (t.joined_at, t.team.id))
        .map(|t| t.team.id))
}

#[cfg(all(test, feature = "mocks"))]
pub(crate) mod test_support {
    use async_trait::async_trait;

    use crate::jwt::{JwtConfig, TokenService};
    use crate::revocation::RevocationStore;
    use crate::AuthError;

    pub fn token_service() -> TokenService {
        TokenService::new(
            JwtConfig::new(
                "access-secret-0123456789abcdef0123",
                "refresh-secret-0123456789abcdef012",
            )
            .unwrap(),
        )
    }

    /// Revocation store whose every call fails.
    pub struct UnreachableStore;

    #[async_trait]
    impl RevocationStore for UnreachableStore {
        async fn revoke(&self, _token_id: &str, _ttl_secs: u64) -> Result<(), AuthError> {
            Err(AuthError::StoreUnavailable("connection refused".to_owned()))
        }

        async fn is_revoked(&self, _token_id: &str) -> Result<bool, AuthError> {
            Err(AuthError::StoreUnavailable("connection refused".to_owned()))
        }

        async fn unrevoke(&self, _token_id: &str) -> Result<(), AuthError> {
            Err(AuthError::StoreUnavailable("connection refused".to_owned()))
        }
    }
}
