use async_trait::async_trait;

use super::types::{Team, TeamMembership, TeamRole, UserTeam};
use crate::AuthError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMembership {
    pub team_id: i64,
    pub user_id: i64,
    pub role: TeamRole,
    pub assigned_by: Option<i64>,
}

#[async_trait]
pub trait TeamRepository: Send + Sync {
    /// Inserts the team and its owner's OWNER membership as one unit.
    async fn create_team(
        &self,
        name: &str,
        owner_id: i64,
    ) -> Result<(Team, TeamMembership), AuthError>;

    async fn find_team_by_id(&self, id: i64) -> Result<Option<Team>, AuthError>;

    /// Every team `user_id` belongs to, oldest membership first.
    async fn find_teams_for_user(&self, user_id: i64) -> Result<Vec<UserTeam>, AuthError>;
}

/// Membership rows. `(team_id, user_id)` is unique and a team holds at most one
/// OWNER row.
#[async_trait]
pub trait TeamMembershipRepository: Send + Sync {
    /// # Errors
    ///
    /// `AlreadyMember` if the pair exists, `TeamNotFound`/`UserNotFound` for
    /// dangling references, `InvalidOperation` if it would add a second owner.
    async fn add_member(&self, data: NewMembership) -> Result<TeamMembership, AuthError>;

    async fn find_membership(
        &self,
        team_id: i64,
        user_id: i64,
    ) -> Result<Option<TeamMembership>, AuthError>;

    async fn list_memberships(&self, team_id: i64) -> Result<Vec<TeamMembership>, AuthError>;

    async fn find_memberships_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<TeamMembership>, AuthError>;

    async fn update_member_role(
        &self,
        team_id: i64,
        user_id: i64,
        role: TeamRole,
        assigned_by: i64,
    ) -> Result<TeamMembership, AuthError>;

    async fn remove_member(&self, team_id: i64, user_id: i64) -> Result<(), AuthError>;
}
