use chrono::Utc;

use crate::authorization::Role;
use crate::events::{dispatch, AuditEvent};
use crate::teams::{TeamMembership, TeamMembershipRepository, TeamRole};
use crate::AuthError;

#[derive(Debug, Clone)]
pub struct UpdateMemberRoleInput {
    pub team_id: i64,
    pub target_user_id: i64,
    pub new_role: TeamRole,
    pub requester_id: i64,
}

pub struct UpdateMemberRoleAction<M: TeamMembershipRepository> {
    membership_repository: M,
}

impl<M: TeamMembershipRepository> UpdateMemberRoleAction<M> {
    pub fn new(membership_repository: M) -> Self {
        Self {
            membership_repository,
        }
    }

    /// Only the team's owner may change roles, and the OWNER role can neither
    /// be taken away nor handed out.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "update_member_role", skip_all, err)
    )]
    pub async fn execute(&self, input: UpdateMemberRoleInput) -> Result<TeamMembership, AuthError> {
        let requester = self
            .membership_repository
            .find_membership(input.team_id, input.requester_id)
            .await?;

        if !requester.as_ref().is_some_and(TeamMembership::is_owner) {
            return Err(AuthError::Forbidden("only team owners can change member roles"));
        }

        let target = self
            .membership_repository
            .find_membership(input.team_id, input.target_user_id)
            .await?
            .ok_or(AuthError::MemberNotFound)?;

        if target.is_owner() {
            return Err(AuthError::InvalidOperation("cannot change the owner's role"));
        }
        if input.new_role == TeamRole::Owner {
            return Err(AuthError::InvalidOperation(
                "cannot assign OWNER, a team has exactly one owner",
            ));
        }

        let updated = self
            .membership_repository
            .update_member_role(
                input.team_id,
                input.target_user_id,
                input.new_role,
                input.requester_id,
            )
            .await?;

        log::info!(
            target: "teamward",
            "msg=\"member role changed\", team_id={}, user_id={}, from={}, to={}",
            input.team_id,
            input.target_user_id,
            target.role.as_str(),
            updated.role.as_str()
        );

        dispatch(AuditEvent::RoleChanged {
            team_id: input.team_id,
            user_id: input.target_user_id,
            changed_by: input.requester_id,
            from: target.role,
            to: updated.role,
            at: Utc::now(),
        })
        .await;

        Ok(updated)
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::authorization::SystemRole;
    use crate::repository::MockDatabase;
    use crate::teams::actions::test_support::seed_user;
    use crate::teams::NewMembership;

    async fn team_with_member(db: &MockDatabase, role: TeamRole) -> (i64, i64, i64) {
        let owner = seed_user(db, "owner@example.com", SystemRole::Owner).await;
        let member = seed_user(db, "member@example.com", SystemRole::Member).await;
        db.add_member(NewMembership {
            team_id: owner.team.id,
            user_id: member.user.id,
            role,
            assigned_by: Some(owner.user.id),
        })
        .await
        .unwrap();
        (owner.team.id, owner.user.id, member.user.id)
    }

    fn input(team_id: i64, target: i64, role: TeamRole, requester: i64) -> UpdateMemberRoleInput {
        UpdateMemberRoleInput {
            team_id,
            target_user_id: target,
            new_role: role,
            requester_id: requester,
        }
    }

    #[tokio::test]
    async fn test_owner_changes_role() {
        let db = MockDatabase::new();
        let (team, owner, member) = team_with_member(&db, TeamRole::Member).await;
        let action = UpdateMemberRoleAction::new(db.clone());

        let updated = action
            .execute(input(team, member, TeamRole::Developer, owner))
            .await
            .unwrap();
        assert_eq!(updated.role, TeamRole::Developer);
        assert_eq!(updated.assigned_by, Some(owner));
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden() {
        let db = MockDatabase::new();
        let (team, owner, member) = team_with_member(&db, TeamRole::Admin).await;
        let action = UpdateMemberRoleAction::new(db.clone());

        // even a team ADMIN cannot change roles
        let err = action
            .execute(input(team, owner, TeamRole::Member, member))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));

        let err = action
            .execute(input(team, member, TeamRole::Member, 999))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_owner_role_is_immutable() {
        let db = MockDatabase::new();
        let (team, owner, member) = team_with_member(&db, TeamRole::Member).await;
        let action = UpdateMemberRoleAction::new(db.clone());

        let err = action
            .execute(input(team, owner, TeamRole::Admin, owner))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidOperation(_)));

        let err = action
            .execute(input(team, member, TeamRole::Owner, owner))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidOperation(_)));
    }

    #[tokio::test]
    async fn test_unknown_target() {
        let db = MockDatabase::new();
        let (team, owner, _) = team_with_member(&db, TeamRole::Member).await;
        let err = UpdateMemberRoleAction::new(db.clone())
            .execute(input(team, 12345, TeamRole::Tester, owner))
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::MemberNotFound);
    }
}
