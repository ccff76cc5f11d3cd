use crate::repository::{User, UserRepository};
use crate::AuthError;

pub struct GetProfileAction<U: UserRepository> {
    user_repository: U,
}

impl<U: UserRepository> GetProfileAction<U> {
    pub fn new(user_repository: U) -> Self {
        Self { user_repository }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(name = "get_profile", skip_all, err))]
    pub async fn execute(&self, user_id: i64) -> Result<User, AuthError> {
        self.user_repository
            .find_user_by_id(user_id)
            .await?
            .ok_or(AuthError::UserNotFound)
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::repository::{MockDatabase, NewUser};
    use crate::SecretString;

    #[tokio::test]
    async fn test_get_profile() {
        let db = MockDatabase::new();
        let seeded = db
            .create_user_with_team(NewUser::local("ada@example.com", SecretString::new("d")), "t")
            .await
            .unwrap();

        let action = GetProfileAction::new(db);
        assert_eq!(action.execute(seeded.user.id).await.unwrap(), seeded.user);
        assert_eq!(action.execute(404).await, Err(AuthError::UserNotFound));
    }
}
