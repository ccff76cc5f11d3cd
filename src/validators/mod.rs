//! Input validation applied before any core logic runs.

mod email;
mod name;
mod password;

pub use email::validate_email;
pub use name::{validate_display_name, validate_team_name};
pub use password::{validate_password, MAX_PASSWORD_LENGTH, MIN_PASSWORD_LENGTH};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ValidationError {
    #[error("email cannot be empty")]
    EmailEmpty,
    #[error("email is too long (max 254 characters)")]
    EmailTooLong,
    #[error("invalid email format")]
    EmailInvalidFormat,
    #[error("password cannot be empty")]
    PasswordEmpty,
    #[error("password must be at least {MIN_PASSWORD_LENGTH} characters")]
    PasswordTooShort,
    #[error("password is too long (max {MAX_PASSWORD_LENGTH} characters)")]
    PasswordTooLong,
    #[error("name cannot be empty")]
    NameEmpty,
    #[error("name is too long (max 100 characters)")]
    NameTooLong,
    #[error("team name cannot be empty")]
    TeamNameEmpty,
    #[error("team name is too long (max 100 characters)")]
    TeamNameTooLong,
    #[error("terms of service must be accepted")]
    TermsNotAccepted,
    #[error("OAuth provider did not supply an email address")]
    OAuthEmailMissing,
    #[error("OAuth provider did not supply an account id")]
    OAuthIdMissing,
}
