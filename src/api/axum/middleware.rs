use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::HeaderMap;

use super::error::AppError;
use super::routes::AppState;
use crate::actions::AuthenticateAction;
use crate::jwt::Claims;
use crate::repository::{User, UserRepository};
use crate::revocation::RevocationStore;
use crate::teams::{TeamMembershipRepository, TeamRepository};
use crate::AuthError;

/// Active user resolved from a valid `Authorization: Bearer` access token.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    user: User,
    claims: Claims,
}

impl AuthenticatedUser {
    pub fn into_inner(self) -> User {
        self.user
    }

    pub fn user(&self) -> &User {
        &self.user
    }

    pub fn claims(&self) -> &Claims {
        &self.claims
    }
}

pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(|auth| auth.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .map(ToOwned::to_owned)
}

impl<U, T, M, R> FromRequestParts<AppState<U, T, M, R>> for AuthenticatedUser
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState<U, T, M, R>,
    ) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).ok_or(AppError(AuthError::InvalidToken))?;

        let (user, claims) = AuthenticateAction::new(state.user_repo.clone(), state.tokens.clone())
            .execute(&token)
            .await?;

        Ok(AuthenticatedUser { user, claims })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_bearer_token() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer_token(&headers).as_deref(), Some("abc.def.ghi"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwYXNz"));
        assert_eq!(extract_bearer_token(&headers), None);

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer "));
        assert_eq!(extract_bearer_token(&headers), None);
    }
}
