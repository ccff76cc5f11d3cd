use chrono::Utc;

use crate::events::{dispatch, AuditEvent};
use crate::teams::TeamMembershipRepository;
use crate::AuthError;

#[derive(Debug, Clone)]
pub struct RemoveMemberInput {
    pub team_id: i64,
    pub target_user_id: i64,
    pub requester_id: i64,
}

/// Removes a member, or lets a member leave.
///
/// The owner can remove anyone but themself. Everyone else can only remove
/// their own membership.
pub struct RemoveMemberAction<M: TeamMembershipRepository> {
    membership_repository: M,
}

impl<M: TeamMembershipRepository> RemoveMemberAction<M> {
    pub fn new(membership_repository: M) -> Self {
        Self {
            membership_repository,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "remove_member", skip_all, err)
    )]
    pub async fn execute(&self, input: RemoveMemberInput) -> Result<(), AuthError> {
        let requester = self
            .membership_repository
            .find_membership(input.team_id, input.requester_id)
            .await?
            .ok_or(AuthError::Forbidden("you are not a member of this team"))?;

        let target = self
            .membership_repository
            .find_membership(input.team_id, input.target_user_id)
            .await?
            .ok_or(AuthError::MemberNotFound)?;

        if target.is_owner() {
            return Err(AuthError::InvalidOperation("cannot remove the team owner"));
        }

        let leaving = input.target_user_id == input.requester_id;
        if !requester.is_owner() && !leaving {
            return Err(AuthError::Forbidden(
                "only team owners can remove other members",
            ));
        }

        self.membership_repository
            .remove_member(input.team_id, input.target_user_id)
            .await?;

        let at = Utc::now();
        if leaving {
            log::info!(
                target: "teamward",
                "msg=\"member left team\", team_id={}, user_id={}",
                input.team_id,
                input.target_user_id
            );
            dispatch(AuditEvent::LeftTeam {
                team_id: input.team_id,
                user_id: input.target_user_id,
                at,
            })
            .await;
        } else {
            log::info!(
                target: "teamward",
                "msg=\"member removed\", team_id={}, user_id={}, removed_by={}",
                input.team_id,
                input.target_user_id,
                input.requester_id
            );
            dispatch(AuditEvent::MemberRemoved {
                team_id: input.team_id,
                user_id: input.target_user_id,
                removed_by: input.requester_id,
                at,
            })
            .await;
        }

        Ok(())
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::authorization::SystemRole;
    use crate::repository::MockDatabase;
    use crate::teams::actions::test_support::seed_user;
    use crate::teams::{NewMembership, TeamRole};

    struct Fixture {
        db: MockDatabase,
        team: i64,
        owner: i64,
        alice: i64,
        bob: i64,
    }

    async fn fixture() -> Fixture {
        let db = MockDatabase::new();
        let owner = seed_user(&db, "owner@example.com", SystemRole::Owner).await;
        let mut ids = Vec::new();
        for email in ["alice@example.com", "bob@example.com"] {
            let user = seed_user(&db, email, SystemRole::Member).await;
            db.add_member(NewMembership {
                team_id: owner.team.id,
                user_id: user.user.id,
                role: TeamRole::Admin,
                assigned_by: Some(owner.user.id),
            })
            .await
            .unwrap();
            ids.push(user.user.id);
        }
        Fixture {
            db,
            team: owner.team.id,
            owner: owner.user.id,
            alice: ids[0],
            bob: ids[1],
        }
    }

    fn input(team_id: i64, target: i64, requester: i64) -> RemoveMemberInput {
        RemoveMemberInput {
            team_id,
            target_user_id: target,
            requester_id: requester,
        }
    }

    #[tokio::test]
    async fn test_owner_removes_member() {
        let f = fixture().await;
        let action = RemoveMemberAction::new(f.db.clone());

        action.execute(input(f.team, f.alice, f.owner)).await.unwrap();
        assert!(f.db.find_membership(f.team, f.alice).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_member_can_leave() {
        let f = fixture().await;
        RemoveMemberAction::new(f.db.clone())
            .execute(input(f.team, f.bob, f.bob))
            .await
            .unwrap();
        assert!(f.db.find_membership(f.team, f.bob).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_admin_cannot_remove_others() {
        let f = fixture().await;
        let err = RemoveMemberAction::new(f.db.clone())
            .execute(input(f.team, f.bob, f.alice))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_owner_cannot_be_removed() {
        let f = fixture().await;
        let action = RemoveMemberAction::new(f.db.clone());

        for requester in [f.owner, f.alice] {
            let err = action.execute(input(f.team, f.owner, requester)).await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidOperation(_)));
        }
    }

    #[tokio::test]
    async fn test_outsider_and_missing_target() {
        let f = fixture().await;
        let action = RemoveMemberAction::new(f.db.clone());

        let err = action.execute(input(f.team, f.alice, 999)).await.unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));

        let err = action.execute(input(f.team, 999, f.owner)).await.unwrap_err();
        assert_eq!(err, AuthError::MemberNotFound);
    }
}
