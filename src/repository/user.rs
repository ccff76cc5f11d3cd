use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::authorization::SystemRole;
use crate::identity::OAuthProvider;
use crate::teams::{Team, TeamMembership};
use crate::{AuthError, SecretString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
    PreferNotToSay,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "MALE",
            Self::Female => "FEMALE",
            Self::Other => "OTHER",
            Self::PreferNotToSay => "PREFER_NOT_TO_SAY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MALE" => Some(Self::Male),
            "FEMALE" => Some(Self::Female),
            "OTHER" => Some(Self::Other),
            "PREFER_NOT_TO_SAY" => Some(Self::PreferNotToSay),
            _ => None,
        }
    }
}

/// Optional profile data collected at signup or from an OAuth provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileFields {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    /// Unique and compared exactly as stored.
    pub email: String,
    pub name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: Option<SecretString>,
    pub role: SystemRole,
    pub avatar_url: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub oauth_provider: Option<OAuthProvider>,
    #[serde(skip_serializing)]
    pub oauth_id: Option<String>,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn has_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Name for display, falling back to the local part of the email.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => self.email.split('@').next().unwrap_or(&self.email),
        }
    }

    /// Name given to the team provisioned with a new account.
    pub fn personal_team_name(name: Option<&str>, email: &str) -> String {
        let owner = match name {
            Some(n) if !n.trim().is_empty() => n.trim(),
            _ => email.split('@').next().unwrap_or(email),
        };
        format!("{owner}'s Team")
    }
}

#[cfg(any(test, feature = "mocks"))]
impl User {
    pub fn mock() -> Self {
        Self::mock_from_email("test@example.com")
    }

    pub fn mock_from_email(email: &str) -> Self {
        let now = Utc::now();
        User {
            id: 1,
            email: email.to_owned(),
            name: Some("Test User".to_owned()),
            password_hash: None,
            role: SystemRole::Member,
            avatar_url: None,
            phone_number: None,
            gender: None,
            date_of_birth: None,
            oauth_provider: None,
            oauth_id: None,
            is_active: true,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Fields for a user row about to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub password_hash: Option<SecretString>,
    pub role: SystemRole,
    pub oauth_provider: Option<OAuthProvider>,
    pub oauth_id: Option<String>,
    pub profile: ProfileFields,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl NewUser {
    pub fn local(email: impl Into<String>, password_hash: SecretString) -> Self {
        Self {
            email: email.into(),
            password_hash: Some(password_hash),
            role: SystemRole::default(),
            oauth_provider: None,
            oauth_id: None,
            profile: ProfileFields::default(),
            last_login_at: None,
        }
    }

    pub fn oauth(
        email: impl Into<String>,
        provider: OAuthProvider,
        provider_id: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password_hash: None,
            role: SystemRole::default(),
            oauth_provider: Some(provider),
            oauth_id: Some(provider_id.into()),
            profile: ProfileFields::default(),
            last_login_at: None,
        }
    }

    #[must_use]
    pub fn with_profile(mut self, profile: ProfileFields) -> Self {
        self.profile = profile;
        self
    }
}

/// Partial update. `None` leaves a column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub phone_number: Option<String>,
    pub gender: Option<Gender>,
    pub date_of_birth: Option<NaiveDate>,
    pub oauth_provider: Option<OAuthProvider>,
    pub oauth_id: Option<String>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl UserUpdate {
    pub fn login_at(at: DateTime<Utc>) -> Self {
        Self {
            last_login_at: Some(at),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A user created together with their personal team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionedUser {
    pub user: User,
    pub team: Team,
    pub membership: TeamMembership,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AuthError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError>;

    async fn find_user_by_oauth(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> Result<Option<User>, AuthError>;

    /// Inserts the user, a team named `team_name` owned by them and their OWNER
    /// membership as one unit. Nothing is written if any step fails.
    ///
    /// # Errors
    ///
    /// `DuplicateEmail` or `DuplicateOAuthAccount` when a unique constraint is hit.
    async fn create_user_with_team(
        &self,
        user: NewUser,
        team_name: &str,
    ) -> Result<ProvisionedUser, AuthError>;

    /// # Errors
    ///
    /// `UserNotFound` for an unknown id, `DuplicateOAuthAccount` when the
    /// provider identity already belongs to someone else.
    async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User, AuthError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_name_fallback() {
        let mut user = User::mock_from_email("grace@navy.mil");
        assert_eq!(user.display_name(), "Test User");
        user.name = None;
        assert_eq!(user.display_name(), "grace");
        user.name = Some("  ".to_owned());
        assert_eq!(user.display_name(), "grace");
    }

    #[test]
    fn test_personal_team_name() {
        assert_eq!(User::personal_team_name(Some("Ada"), "ada@x.io"), "Ada's Team");
        assert_eq!(User::personal_team_name(None, "ada@x.io"), "ada's Team");
        assert_eq!(User::personal_team_name(Some(""), "ada@x.io"), "ada's Team");
    }

    #[test]
    fn test_serialized_user_hides_credentials() {
        let mut user = User::mock();
        user.password_hash = Some(SecretString::new("$argon2id$v=19$..."));
        user.oauth_id = Some("123".to_owned());

        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password_hash").is_none());
        assert!(json.get("oauth_id").is_none());
        assert_eq!(json["role"], "MEMBER");
    }

    #[test]
    fn test_login_update() {
        let now = Utc::now();
        let update = UserUpdate::login_at(now);
        assert!(!update.is_empty());
        assert_eq!(update.last_login_at, Some(now));
        assert!(UserUpdate::default().is_empty());
    }
}
