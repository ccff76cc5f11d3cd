use crate::jwt::{Claims, TokenService};
use crate::repository::{User, UserRepository};
use crate::AuthError;

/// Resolves a bearer access token to an active user.
///
/// Access tokens are not checked against the revocation store. A deleted or
/// deactivated subject is reported as `InvalidToken`.
pub struct AuthenticateAction<U: UserRepository> {
    user_repository: U,
    tokens: TokenService,
}

impl<U: UserRepository> AuthenticateAction<U> {
    pub fn new(user_repository: U, tokens: TokenService) -> Self {
        Self {
            user_repository,
            tokens,
        }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(name = "authenticate", skip_all, err))]
    pub async fn execute(&self, access_token: &str) -> Result<(User, Claims), AuthError> {
        let claims = self.tokens.verify_access(access_token)?;

        let user = self
            .user_repository
            .find_user_by_id(claims.user_id()?)
            .await?
            .filter(|u| u.is_active)
            .ok_or(AuthError::InvalidToken)?;

        Ok((user, claims))
    }
}
