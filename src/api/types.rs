use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::actions::AuthSession;
use crate::authorization::{Permission, SystemRole};
use crate::identity::OAuthProvider;
use crate::jwt::TokenPair;
use crate::repository::{Gender, User};
use crate::teams::TeamRole;
use crate::{AuthError, SecretString};

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: SecretString,
    pub name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub gender: Option<Gender>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub terms_accepted: bool,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: SecretString,
}

/// Body of both `/auth/refresh` and `/auth/logout`.
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: SecretString,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct InviteMemberRequest {
    pub email: String,
    #[serde(default)]
    pub role: Option<TeamRole>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: TeamRole,
}

// Response DTOs

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub role: SystemRole,
    pub avatar_url: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub oauth_provider: Option<OAuthProvider>,
    pub has_password: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        UserResponse {
            has_password: user.has_password(),
            id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
            avatar_url: user.avatar_url,
            phone_number: user.phone_number,
            gender: user.gender,
            date_of_birth: user.date_of_birth,
            oauth_provider: user.oauth_provider,
            last_login_at: user.last_login_at,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access_token: SecretString,
    pub refresh_token: SecretString,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
}

impl From<TokenPair> for TokenResponse {
    fn from(pair: TokenPair) -> Self {
        TokenResponse {
            access_token: pair.access_token,
            refresh_token: pair.refresh_token,
            token_type: "Bearer",
            expires_in: pair.expires_in,
        }
    }
}

impl std::fmt::Debug for TokenResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenResponse")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: UserResponse,
    #[serde(flatten)]
    pub tokens: TokenResponse,
    pub team_id: Option<i64>,
}

impl From<AuthSession> for AuthResponse {
    fn from(session: AuthSession) -> Self {
        AuthResponse {
            user: UserResponse::from(session.user),
            tokens: TokenResponse::from(session.tokens),
            team_id: session.team_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PermissionsResponse {
    pub role: SystemRole,
    pub permissions: Vec<Permission>,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl From<AuthError> for ErrorResponse {
    fn from(err: AuthError) -> Self {
        let code = match &err {
            AuthError::Validation(_) => "VALIDATION_ERROR",
            AuthError::DuplicateEmail => "DUPLICATE_EMAIL",
            AuthError::DuplicateOAuthAccount => "DUPLICATE_OAUTH_ACCOUNT",
            AuthError::InvalidCredentials => "INVALID_CREDENTIALS",
            // token failures share one code
            AuthError::InvalidToken | AuthError::ExpiredToken | AuthError::RevokedToken => {
                "UNAUTHENTICATED"
            }
            AuthError::UserNotFound => "USER_NOT_FOUND",
            AuthError::TeamNotFound => "TEAM_NOT_FOUND",
            AuthError::MemberNotFound => "MEMBER_NOT_FOUND",
            AuthError::AlreadyMember => "ALREADY_MEMBER",
            AuthError::Forbidden(_) => "FORBIDDEN",
            AuthError::InvalidOperation(_) => "INVALID_OPERATION",
            AuthError::InvalidRole(_) => "INVALID_ROLE",
            AuthError::CorruptCredential
            | AuthError::PasswordHashError
            | AuthError::ConfigurationError(_)
            | AuthError::DatabaseError(_)
            | AuthError::StoreUnavailable(_)
            | AuthError::Internal(_) => "INTERNAL_ERROR",
        };

        ErrorResponse {
            error: err.public_message(),
            code: code.to_owned(),
        }
    }
}
