//! Identity and team membership core.
//!
//! `teamward` covers the stateful part of a multi-tenant account backend:
//!
//! - password and OAuth (GitHub, Google) sign-in through [`identity::IdentityDirectory`]
//! - signed access/refresh token pairs through [`jwt::TokenService`]
//! - refresh-token revocation through a [`revocation::RevocationStore`]
//! - the system role → permission table in [`authorization`]
//! - team creation, invitation and membership rules in [`teams`]
//!
//! Storage is reached only through the repository traits in [`repository`] and
//! [`teams`]. Enable `mocks` for in-memory implementations, `postgres` for `sqlx`
//! implementations, `redis` for a Redis revocation store and `axum` for HTTP routes.

pub mod actions;
pub mod authorization;
pub mod config;
pub mod crypto;
pub mod events;
pub mod identity;
pub mod jwt;
pub mod repository;
pub mod revocation;
mod secret;
pub mod teams;
pub mod validators;

#[cfg(feature = "axum")]
pub mod api;
#[cfg(feature = "postgres")]
pub mod postgres;

pub use actions::AuthSession;
pub use authorization::{AuthorizationModel, Permission, RolePermissions, SystemRole};
pub use config::AuthConfig;
pub use events::register_event_listeners;
pub use identity::{IdentityDirectory, OAuthProfile, OAuthProvider};
pub use jwt::{Claims, JwtConfig, TokenPair, TokenService};
pub use repository::{NewUser, ProfileFields, ProvisionedUser, User, UserRepository, UserUpdate};
pub use revocation::{InMemoryRevocationStore, RevocationStore};
pub use secret::SecretString;
pub use validators::ValidationError;

#[cfg(any(test, feature = "mocks"))]
pub use repository::MockDatabase;

/// Errors returned by every operation in this crate.
///
/// Token and credential failures are kept distinct here so they can be logged
/// precisely. Use [`AuthError::public_message`] when rendering them to callers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("a user with this email already exists")]
    DuplicateEmail,
    #[error("this OAuth account is already linked to another user")]
    DuplicateOAuthAccount,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("token has expired")]
    ExpiredToken,
    #[error("token has been revoked")]
    RevokedToken,
    #[error("user not found")]
    UserNotFound,
    #[error("team not found")]
    TeamNotFound,
    #[error("member not found in this team")]
    MemberNotFound,
    #[error("user is already a team member")]
    AlreadyMember,
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("invalid operation: {0}")]
    InvalidOperation(&'static str),
    #[error("invalid role: {0}")]
    InvalidRole(String),
    #[error("stored credential is corrupt")]
    CorruptCredential,
    #[error("failed to hash password")]
    PasswordHashError,
    #[error("configuration error: {0}")]
    ConfigurationError(String),
    #[error("database error: {0}")]
    DatabaseError(String),
    #[error("revocation store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// True for failures that must be reported to callers as plain "unauthenticated".
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::InvalidCredentials | Self::InvalidToken | Self::ExpiredToken | Self::RevokedToken
        )
    }

    /// True for collaborator outages and other faults the caller cannot fix.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Self::CorruptCredential
                | Self::PasswordHashError
                | Self::ConfigurationError(_)
                | Self::DatabaseError(_)
                | Self::StoreUnavailable(_)
                | Self::Internal(_)
        )
    }

    /// Message safe to show outside the process.
    ///
    /// All token failures collapse to the same text so an attacker cannot learn
    /// whether a token was forged, expired or revoked.
    pub fn public_message(&self) -> String {
        match self {
            Self::InvalidToken | Self::ExpiredToken | Self::RevokedToken => {
                "unauthenticated".to_owned()
            }
            Self::InvalidCredentials => "invalid email or password".to_owned(),
            e if e.is_internal() => "internal server error".to_owned(),
            e => e.to_string(),
        }
    }
}
