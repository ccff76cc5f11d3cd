use chrono::Utc;

use super::{primary_team_id, AuthSession};
use crate::crypto::{Argon2Hasher, PasswordHasher};
use crate::events::{dispatch, AuditEvent};
use crate::identity::IdentityDirectory;
use crate::jwt::TokenService;
use crate::repository::UserRepository;
use crate::teams::TeamRepository;
use crate::AuthError;

/// Email and password login.
///
/// Every rejection is `InvalidCredentials`, whether the email is unknown, the
/// account has no password, is deactivated, or the password is wrong.
pub struct LoginAction<U, T, H = Argon2Hasher>
where
    U: UserRepository,
    T: TeamRepository,
    H: PasswordHasher,
{
    directory: IdentityDirectory<U>,
    team_repository: T,
    tokens: TokenService,
    hasher: H,
}

impl<U: UserRepository, T: TeamRepository> LoginAction<U, T, Argon2Hasher> {
    pub fn new(user_repository: U, team_repository: T, tokens: TokenService) -> Self {
        Self::with_hasher(user_repository, team_repository, tokens, Argon2Hasher::default())
    }
}

impl<U, T, H> LoginAction<U, T, H>
where
    U: UserRepository,
    T: TeamRepository,
    H: PasswordHasher,
{
    pub fn with_hasher(user_repository: U, team_repository: T, tokens: TokenService, hasher: H) -> Self {
        Self {
            directory: IdentityDirectory::new(user_repository),
            team_repository,
            tokens,
            hasher,
        }
    }

    /// # Returns
    ///
    /// - `Ok(AuthSession)` - token pair scoped to the user's earliest team
    /// - `Err(AuthError::InvalidCredentials)` - for any credential failure
    /// - `Err(AuthError::DatabaseError(_))` - persistence unavailable
    #[cfg_attr(feature = "tracing", tracing::instrument(name = "login", skip_all, err))]
    pub async fn execute(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let Some(user) = self.directory.find_by_email(email).await? else {
            self.verify_decoy(password);
            return self.reject(email, "unknown_email").await;
        };

        let Some(digest) = user.password_hash.as_ref() else {
            self.verify_decoy(password);
            return self.reject(email, "no_password").await;
        };

        match self.hasher.verify(password, digest.expose_secret()) {
            Ok(true) => {}
            Ok(false) => return self.reject(email, "wrong_password").await,
            Err(_) => {
                log::error!(
                    target: "teamward",
                    "msg=\"stored password digest is unreadable\", user_id={}",
                    user.id
                );
                return self.reject(email, "corrupt_credential").await;
            }
        }

        if !user.is_active {
            return self.reject(email, "inactive").await;
        }

        let user = self.directory.record_login(user.id).await?;
        let team_id = primary_team_id(&self.team_repository, user.id).await?;
        let tokens = self.tokens.issue(&user, team_id)?;

        log::info!(
            target: "teamward",
            "msg=\"login succeeded\", user_id={}, team_id={:?}",
            user.id,
            team_id
        );

        dispatch(AuditEvent::LoggedIn {
            user_id: user.id,
            email: user.email.clone(),
            at: Utc::now(),
        })
        .await;

        Ok(AuthSession {
            user,
            tokens,
            team_id,
        })
    }

    // Pays one verify on paths that have no digest, so response time does not
    // reveal whether the email is registered.
    fn verify_decoy(&self, password: &str) {
        let _ = self.hasher.verify(password, &self.hasher.decoy_digest());
    }

    async fn reject(&self, email: &str, reason: &'static str) -> Result<AuthSession, AuthError> {
        log::info!(target: "teamward", "msg=\"login failed\", reason={reason}");

        dispatch(AuditEvent::LoginFailed {
            email: email.to_owned(),
            reason,
            at: Utc::now(),
        })
        .await;

        Err(AuthError::InvalidCredentials)
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::actions::test_support::token_service;
    use crate::repository::{MockDatabase, NewUser};
    use crate::teams::{NewMembership, TeamMembershipRepository, TeamRole};
    use crate::SecretString;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn seed(db: &MockDatabase, email: &str, password: &str) -> crate::ProvisionedUser {
        let digest = Argon2Hasher::fast().hash(password).unwrap();
        db.create_user_with_team(
            NewUser::local(email, SecretString::new(digest)),
            &format!("{email} team"),
        )
        .await
        .unwrap()
    }

    fn action(db: &MockDatabase) -> LoginAction<MockDatabase, MockDatabase> {
        LoginAction::with_hasher(db.clone(), db.clone(), token_service(), Argon2Hasher::fast())
    }

    #[tokio::test]
    async fn test_login_success() {
        let db = MockDatabase::new();
        let seeded = seed(&db, "ada@example.com", "analytical").await;

        let session = action(&db).execute("ada@example.com", "analytical").await.unwrap();

        assert_eq!(session.user.id, seeded.user.id);
        assert!(session.user.last_login_at.is_some());
        assert_eq!(session.team_id, Some(seeded.team.id));

        let claims = token_service()
            .verify_access(session.tokens.access_token.expose_secret())
            .unwrap();
        assert_eq!(claims.user_id().unwrap(), seeded.user.id);
        assert_eq!(claims.team_id, Some(seeded.team.id));
    }

    #[tokio::test]
    async fn test_failures_are_indistinguishable() {
        let db = MockDatabase::new();
        seed(&db, "ada@example.com", "analytical").await;
        let login = action(&db);

        let wrong_password = login.execute("ada@example.com", "wrong-pass").await.unwrap_err();
        let unknown_email = login.execute("nobody@example.com", "analytical").await.unwrap_err();
        let wrong_case = login.execute("ADA@example.com", "analytical").await.unwrap_err();

        assert_eq!(wrong_password, AuthError::InvalidCredentials);
        assert_eq!(wrong_password, unknown_email);
        assert_eq!(wrong_password, wrong_case);
        assert_eq!(wrong_password.public_message(), unknown_email.public_message());
    }

    #[tokio::test]
    async fn test_oauth_only_account_cannot_password_login() {
        let db = MockDatabase::new();
        db.create_user_with_team(
            NewUser::oauth("octo@example.com", crate::OAuthProvider::GitHub, "42"),
            "octo team",
        )
        .await
        .unwrap();

        let err = action(&db).execute("octo@example.com", "anything").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_inactive_account_rejected() {
        let db = MockDatabase::new();
        let seeded = seed(&db, "ada@example.com", "analytical").await;
        db.set_active(seeded.user.id, false);

        let err = action(&db).execute("ada@example.com", "analytical").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[derive(Clone)]
    struct CountingHasher {
        inner: Argon2Hasher,
        verifies: Arc<AtomicUsize>,
    }

    impl CountingHasher {
        fn new() -> Self {
            Self {
                inner: Argon2Hasher::fast(),
                verifies: Arc::default(),
            }
        }

        fn take(&self) -> usize {
            self.verifies.swap(0, Ordering::SeqCst)
        }
    }

    impl PasswordHasher for CountingHasher {
        fn hash(&self, password: &str) -> Result<String, AuthError> {
            self.inner.hash(password)
        }

        fn verify(&self, password: &str, digest: &str) -> Result<bool, AuthError> {
            self.verifies.fetch_add(1, Ordering::SeqCst);
            self.inner.verify(password, digest)
        }

        fn decoy_digest(&self) -> String {
            self.inner.decoy_digest()
        }
    }

    #[tokio::test]
    async fn test_every_rejection_runs_one_verify() {
        let db = MockDatabase::new();
        seed(&db, "ada@example.com", "analytical").await;
        let inactive = seed(&db, "idle@example.com", "analytical").await;
        db.set_active(inactive.user.id, false);
        db.create_user_with_team(
            NewUser::oauth("octo@example.com", crate::OAuthProvider::GitHub, "42"),
            "octo team",
        )
        .await
        .unwrap();
        db.create_user_with_team(
            NewUser::local("broken@example.com", SecretString::new("not-a-phc-string")),
            "broken team",
        )
        .await
        .unwrap();

        let hasher = CountingHasher::new();
        let login = LoginAction::with_hasher(db.clone(), db.clone(), token_service(), hasher.clone());

        for (email, password) in [
            ("nobody@example.com", "analytical"),
            ("octo@example.com", "analytical"),
            ("ada@example.com", "wrong-pass"),
            ("idle@example.com", "analytical"),
            ("broken@example.com", "analytical"),
        ] {
            let err = login.execute(email, password).await.unwrap_err();
            assert_eq!(err, AuthError::InvalidCredentials, "{email}");
            assert_eq!(hasher.take(), 1, "{email}");
        }

        login.execute("ada@example.com", "analytical").await.unwrap();
        assert_eq!(hasher.take(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_digest_is_invalid_credentials() {
        let db = MockDatabase::new();
        db.create_user_with_team(
            NewUser::local("ada@example.com", SecretString::new("not-a-phc-string")),
            "team",
        )
        .await
        .unwrap();

        let err = action(&db).execute("ada@example.com", "analytical").await.unwrap_err();
        assert_eq!(err, AuthError::InvalidCredentials);
    }

    #[tokio::test]
    async fn test_primary_team_is_earliest_joined() {
        let db = MockDatabase::new();
        let other = seed(&db, "other@example.com", "password1").await;
        let ada = seed(&db, "ada@example.com", "analytical").await;

        db.add_member(NewMembership {
            team_id: other.team.id,
            user_id: ada.user.id,
            role: TeamRole::Developer,
            assigned_by: Some(other.user.id),
        })
        .await
        .unwrap();

        let session = action(&db).execute("ada@example.com", "analytical").await.unwrap();
        assert_eq!(session.team_id, Some(ada.team.id));
    }

    #[tokio::test]
    async fn test_login_updates_last_login() {
        let db = MockDatabase::new();
        let seeded = seed(&db, "ada@example.com", "analytical").await;
        assert!(seeded.user.last_login_at.is_none());

        action(&db).execute("ada@example.com", "analytical").await.unwrap();

        let stored = db.find_user_by_id(seeded.user.id).await.unwrap().unwrap();
        assert!(stored.last_login_at.is_some());
        assert_eq!(stored.password_hash, seeded.user.password_hash);
    }
}
