use chrono::{NaiveDate, Utc};

use super::AuthSession;
use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::events::{dispatch, AuditEvent};
use crate::identity::IdentityDirectory;
use crate::jwt::TokenService;
use crate::repository::{Gender, ProfileFields, UserRepository};
use crate::validators::{validate_display_name, validate_email, validate_password, ValidationError};
use crate::{AuthError, SecretString};

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub email: String,
    pub password: SecretString,
    pub name: String,
    pub phone_number: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub terms_accepted: bool,
}

impl SignupInput {
    /// Minimal input with terms accepted and no optional profile data.
    pub fn new(email: impl Into<String>, password: &str, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: SecretString::new(password),
            name: name.into(),
            phone_number: None,
            gender: None,
            date_of_birth: None,
            terms_accepted: true,
        }
    }
}

/// Registers a password account together with its personal team.
pub struct SignupAction<U: UserRepository, H: PasswordHasher = Argon2Hasher> {
    directory: IdentityDirectory<U>,
    tokens: TokenService,
    hasher: H,
}

impl<U: UserRepository> SignupAction<U, Argon2Hasher> {
    pub fn new(user_repository: U, tokens: TokenService) -> Self {
        Self::with_hasher(user_repository, tokens, Argon2Hasher::default())
    }
}

impl<U: UserRepository, H: PasswordHasher> SignupAction<U, H> {
    pub fn with_hasher(user_repository: U, tokens: TokenService, hasher: H) -> Self {
        Self {
            directory: IdentityDirectory::new(user_repository),
            tokens,
            hasher,
        }
    }

    /// # Returns
    ///
    /// - `Ok(AuthSession)` - the new user, a token pair scoped to their personal team
    /// - `Err(AuthError::Validation(_))` - malformed email, password or name, or terms not accepted
    /// - `Err(AuthError::DuplicateEmail)` - the email is taken
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "signup", skip_all, err))]
    pub async fn execute(&self, input: SignupInput) -> Result<AuthSession, AuthError> {
        validate_email(&input.email)?;
        validate_password(input.password.expose_secret())?;
        validate_display_name(&input.name)?;
        if !input.terms_accepted {
            return Err(ValidationError::TermsNotAccepted.into());
        }

        let digest = self.hasher.hash(input.password.expose_secret())?;
        let profile = ProfileFields {
            name: Some(input.name.trim().to_owned()),
            avatar_url: None,
            phone_number: input.phone_number,
            gender: input.gender,
            date_of_birth: input.date_of_birth,
        };

        let provisioned = self
            .directory
            .create_local(&input.email, SecretString::new(digest), profile)
            .await?;

        let tokens = self.tokens.issue(&provisioned.user, Some(provisioned.team.id))?;

        log::info!(
            target: "teamward",
            "msg=\"user signed up\", user_id={}, team_id={}",
            provisioned.user.id,
            provisioned.team.id
        );

        dispatch(AuditEvent::SignedUp {
            user_id: provisioned.user.id,
            email: provisioned.user.email.clone(),
            team_id: provisioned.team.id,
            at: Utc::now(),
        })
        .await;

        Ok(AuthSession {
            user: provisioned.user,
            tokens,
            team_id: Some(provisioned.team.id),
        })
    }
}
