use chrono::Utc;

use super::OAuthProfile;
use crate::repository::{
    NewUser, ProfileFields, ProvisionedUser, User, UserRepository, UserUpdate,
};
use crate::{AuthError, SecretString};

/// Result of [`IdentityDirectory::upsert_oauth`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OAuthOutcome {
    pub user: User,
    /// Set when the account was created by this call.
    pub personal_team_id: Option<i64>,
}

impl OAuthOutcome {
    pub fn created(&self) -> bool {
        self.personal_team_id.is_some()
    }
}

/// Finds and provisions user accounts.
///
/// Every account created here gets a personal team it owns, written in the
/// same unit as the user row.
#[derive(Clone)]
pub struct IdentityDirectory<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> IdentityDirectory<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    pub fn repository(&self) -> &U {
        &self.users
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        self.users.find_user_by_email(email).await
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        self.users.find_user_by_id(id).await
    }

    /// Creates a password account and its personal team.
    ///
    /// Uniqueness of `email` is enforced by the repository in the same unit as
    /// the insert, so two concurrent signups cannot both succeed.
    pub async fn create_local(
        &self,
        email: &str,
        password_hash: SecretString,
        profile: ProfileFields,
    ) -> Result<ProvisionedUser, AuthError> {
        let team_name = User::personal_team_name(profile.name.as_deref(), email);
        let new_user = NewUser::local(email, password_hash).with_profile(profile);

        self.users.create_user_with_team(new_user, &team_name).await
    }

    /// Find-or-create for an OAuth sign-in, matched first by provider identity
    /// and then by email.
    ///
    /// An existing account only gains provider fields it does not have yet and
    /// always gets its last-login refreshed. Its password and email are never
    /// touched.
    pub async fn upsert_oauth(&self, profile: &OAuthProfile) -> Result<OAuthOutcome, AuthError> {
        if let Some(linked) = self
            .users
            .find_user_by_oauth(profile.provider(), profile.provider_id())
            .await?
        {
            return self.merge_oauth(linked, profile).await;
        }

        if let Some(existing) = self.users.find_user_by_email(profile.email()).await? {
            return self.merge_oauth(existing, profile).await;
        }

        let fields = profile.profile_fields();
        let team_name = User::personal_team_name(fields.name.as_deref(), profile.email());
        let mut new_user =
            NewUser::oauth(profile.email(), profile.provider(), profile.provider_id())
                .with_profile(fields);
        new_user.last_login_at = Some(Utc::now());

        match self.users.create_user_with_team(new_user, &team_name).await {
            Ok(provisioned) => {
                log::info!(
                    target: "teamward",
                    "msg=\"oauth account created\", user_id={}, provider={}, team_id={}",
                    provisioned.user.id,
                    profile.provider(),
                    provisioned.team.id
                );
                Ok(OAuthOutcome {
                    user: provisioned.user,
                    personal_team_id: Some(provisioned.team.id),
                })
            }
            // lost a race with a concurrent first login for the same email
            Err(AuthError::DuplicateEmail) => {
                let existing = self
                    .users
                    .find_user_by_email(profile.email())
                    .await?
                    .ok_or(AuthError::UserNotFound)?;
                self.merge_oauth(existing, profile).await
            }
            Err(e) => Err(e),
        }
    }

    async fn merge_oauth(
        &self,
        existing: User,
        profile: &OAuthProfile,
    ) -> Result<OAuthOutcome, AuthError> {
        let fields = profile.profile_fields();
        let mut update = UserUpdate::login_at(Utc::now());

        if existing.oauth_provider.is_none() && existing.oauth_id.is_none() {
            update.oauth_provider = Some(profile.provider());
            update.oauth_id = Some(profile.provider_id().to_owned());
        }
        if existing.name.is_none() {
            update.name = fields.name;
        }
        if existing.avatar_url.is_none() {
            update.avatar_url = fields.avatar_url;
        }
        if existing.phone_number.is_none() {
            update.phone_number = fields.phone_number;
        }
        if existing.gender.is_none() {
            update.gender = fields.gender;
        }
        if existing.date_of_birth.is_none() {
            update.date_of_birth = fields.date_of_birth;
        }

        let user = self.users.update_user(existing.id, &update).await?;

        Ok(OAuthOutcome {
            user,
            personal_team_id: None,
        })
    }

    pub async fn record_login(&self, user_id: i64) -> Result<User, AuthError> {
        self.users
            .update_user(user_id, &UserUpdate::login_at(Utc::now()))
            .await
    }

    /// Overwrites the given profile fields. Omitted fields are kept.
    pub async fn update_profile(
        &self,
        user_id: i64,
        profile: ProfileFields,
    ) -> Result<User, AuthError> {
        let update = UserUpdate {
            name: profile.name,
            avatar_url: profile.avatar_url,
            phone_number: profile.phone_number,
            gender: profile.gender,
            date_of_birth: profile.date_of_birth,
            ..UserUpdate::default()
        };

        if update.is_empty() {
            return self
                .users
                .find_user_by_id(user_id)
                .await?
                .ok_or(AuthError::UserNotFound);
        }

        self.users.update_user(user_id, &update).await
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::identity::OAuthProvider;
    use crate::repository::MockDatabase;
    use crate::teams::{TeamRepository, TeamRole};

    fn github(id: &str, email: &str) -> OAuthProfile {
        OAuthProfile::new(OAuthProvider::GitHub, id, email)
            .unwrap()
            .with_display_name(Some("Octo Cat".to_owned()))
            .with_avatar_url(Some("https://img/octo.png".to_owned()))
    }

    #[tokio::test]
    async fn test_create_local_provisions_personal_team() {
        let db = MockDatabase::new();
        let directory = IdentityDirectory::new(db.clone());

        let profile = ProfileFields {
            name: Some("Ada".to_owned()),
            ..ProfileFields::default()
        };
        let provisioned = directory
            .create_local("ada@example.com", SecretString::new("hash"), profile)
            .await
            .unwrap();

        assert_eq!(provisioned.team.name, "Ada's Team");
        assert_eq!(provisioned.membership.role, TeamRole::Owner);

        let err = directory
            .create_local("ada@example.com", SecretString::new("hash"), ProfileFields::default())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::DuplicateEmail);
    }

    #[tokio::test]
    async fn test_upsert_oauth_creates_once() {
        let db = MockDatabase::new();
        let directory = IdentityDirectory::new(db.clone());

        let first = directory.upsert_oauth(&github("1", "octo@example.com")).await.unwrap();
        assert!(first.created());
        assert!(first.user.last_login_at.is_some());
        assert_eq!(first.user.oauth_provider, Some(OAuthProvider::GitHub));

        let second = directory.upsert_oauth(&github("1", "octo@example.com")).await.unwrap();
        assert!(!second.created());
        assert_eq!(second.user.id, first.user.id);
        assert!(second.user.last_login_at >= first.user.last_login_at);

        let teams = db.find_teams_for_user(first.user.id).await.unwrap();
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].role, TeamRole::Owner);
        assert_eq!(teams[0].team.name, "Octo Cat's Team");
    }

    #[tokio::test]
    async fn test_merge_only_fills_unset_fields() {
        let db = MockDatabase::new();
        let directory = IdentityDirectory::new(db.clone());

        let profile = ProfileFields {
            name: Some("Original".to_owned()),
            ..ProfileFields::default()
        };
        let local = directory
            .create_local("octo@example.com", SecretString::new("pw-hash"), profile)
            .await
            .unwrap();

        let merged = directory.upsert_oauth(&github("77", "octo@example.com")).await.unwrap();
        assert_eq!(merged.user.id, local.user.id);
        assert_eq!(merged.user.name.as_deref(), Some("Original"));
        assert_eq!(merged.user.avatar_url.as_deref(), Some("https://img/octo.png"));
        assert_eq!(merged.user.oauth_id.as_deref(), Some("77"));
        assert_eq!(merged.user.password_hash, Some(SecretString::new("pw-hash")));

        // an already linked provider is not replaced
        let google = OAuthProfile::new(OAuthProvider::Google, "g-1", "octo@example.com").unwrap();
        let again = directory.upsert_oauth(&google).await.unwrap();
        assert_eq!(again.user.oauth_provider, Some(OAuthProvider::GitHub));
        assert_eq!(again.user.oauth_id.as_deref(), Some("77"));
    }

    #[tokio::test]
    async fn test_returning_identity_with_changed_email() {
        let db = MockDatabase::new();
        let directory = IdentityDirectory::new(db.clone());

        let first = directory.upsert_oauth(&github("5", "old@example.com")).await.unwrap();
        let returning = directory.upsert_oauth(&github("5", "new@example.com")).await.unwrap();

        assert!(!returning.created());
        assert_eq!(returning.user.id, first.user.id);
        assert_eq!(returning.user.email, "old@example.com");
        assert_eq!(db.find_teams_for_user(first.user.id).await.unwrap().len(), 1);
        assert!(directory.find_by_email("new@example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_profile() {
        let db = MockDatabase::new();
        let directory = IdentityDirectory::new(db.clone());
        let created = directory
            .create_local("u@example.com", SecretString::new("h"), ProfileFields::default())
            .await
            .unwrap();

        let unchanged = directory
            .update_profile(created.user.id, ProfileFields::default())
            .await
            .unwrap();
        assert_eq!(unchanged, created.user);

        let updated = directory
            .update_profile(
                created.user.id,
                ProfileFields {
                    phone_number: Some("+15555550100".to_owned()),
                    ..ProfileFields::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.phone_number.as_deref(), Some("+15555550100"));

        assert_eq!(
            directory.update_profile(404, ProfileFields::default()).await,
            Err(AuthError::UserNotFound)
        );
    }
}
