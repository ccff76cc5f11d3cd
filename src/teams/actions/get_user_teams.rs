use crate::teams::{TeamRepository, UserTeam};
use crate::AuthError;

pub struct GetUserTeamsAction<T: TeamRepository> {
    team_repository: T,
}

impl<T: TeamRepository> GetUserTeamsAction<T> {
    pub fn new(team_repository: T) -> Self {
        Self { team_repository }
    }

    /// Every team the user belongs to with their role in it, oldest first.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "get_user_teams", skip_all, err)
    )]
    pub async fn execute(&self, user_id: i64) -> Result<Vec<UserTeam>, AuthError> {
        self.team_repository.find_teams_for_user(user_id).await
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::authorization::SystemRole;
    use crate::repository::MockDatabase;
    use crate::teams::actions::test_support::seed_user;
    use crate::teams::{CreateTeamAction, TeamRole};

    #[tokio::test]
    async fn test_lists_personal_and_created_teams() {
        let db = MockDatabase::new();
        let user = seed_user(&db, "u@example.com", SystemRole::Member).await;
        CreateTeamAction::new(db.clone())
            .execute("Side Project", user.user.id)
            .await
            .unwrap();

        let teams = GetUserTeamsAction::new(db.clone())
            .execute(user.user.id)
            .await
            .unwrap();

        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].team.id, user.team.id);
        assert_eq!(teams[1].team.name, "Side Project");
        assert!(teams.iter().all(|t| t.role == TeamRole::Owner));
    }

    #[tokio::test]
    async fn test_unknown_user_has_no_teams() {
        let db = MockDatabase::new();
        let teams = GetUserTeamsAction::new(db).execute(42).await.unwrap();
        assert!(teams.is_empty());
    }
}
