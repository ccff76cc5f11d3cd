use crate::repository::UserRepository;
use crate::teams::{MemberProfile, TeamMember, TeamMembershipRepository};
use crate::AuthError;

/// Lists a team's members for one of its members.
///
/// Ordering is part of the contract: by team role (OWNER first), then by join
/// time, then by membership id so ties are stable across calls.
pub struct ListMembersAction<M, U>
where
    M: TeamMembershipRepository,
    U: UserRepository,
{
    membership_repository: M,
    user_repository: U,
}

impl<M: TeamMembershipRepository, U: UserRepository> ListMembersAction<M, U> {
    pub fn new(membership_repository: M, user_repository: U) -> Self {
        Self {
            membership_repository,
            user_repository,
        }
    }

    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "list_members", skip_all, err)
    )]
    pub async fn execute(&self, team_id: i64, requester_id: i64) -> Result<Vec<TeamMember>, AuthError> {
        if self
            .membership_repository
            .find_membership(team_id, requester_id)
            .await?
            .is_none()
        {
            return Err(AuthError::Forbidden("you are not a member of this team"));
        }

        let mut memberships = self.membership_repository.list_memberships(team_id).await?;
        memberships.sort_by_key(|m| (m.role, m.joined_at, m.id));

        let mut members = Vec::with_capacity(memberships.len());
        for membership in memberships {
            match self.user_repository.find_user_by_id(membership.user_id).await? {
                Some(user) => members.push(TeamMember {
                    user: MemberProfile::from(&user),
                    membership,
                }),
                None => log::warn!(
                    target: "teamward",
                    "msg=\"membership references missing user\", team_id={}, user_id={}",
                    team_id,
                    membership.user_id
                ),
            }
        }

        Ok(members)
    }
}

#[cfg(all(test, feature = "mocks"))]
mod tests {
    use super::*;
    use crate::authorization::SystemRole;
    use crate::repository::MockDatabase;
    use crate::teams::actions::test_support::seed_user;
    use crate::teams::{NewMembership, TeamRole};

    #[tokio::test]
    async fn test_members_ordered_by_role_then_join_time() {
        let db = MockDatabase::new();
        let owner = seed_user(&db, "owner@example.com", SystemRole::Owner).await;

        let joins = [
            ("m1@example.com", TeamRole::Member),
            ("a1@example.com", TeamRole::Admin),
            ("m2@example.com", TeamRole::Member),
            ("d1@example.com", TeamRole::Developer),
        ];
        for (email, role) in joins {
            let user = seed_user(&db, email, SystemRole::Member).await;
            db.add_member(NewMembership {
                team_id: owner.team.id,
                user_id: user.user.id,
                role,
                assigned_by: Some(owner.user.id),
            })
            .await
            .unwrap();
        }

        let action = ListMembersAction::new(db.clone(), db.clone());
        let members = action.execute(owner.team.id, owner.user.id).await.unwrap();
        let emails: Vec<&str> = members.iter().map(|m| m.user.email.as_str()).collect();

        assert_eq!(
            emails,
            vec![
                "owner@example.com",
                "a1@example.com",
                "d1@example.com",
                "m1@example.com",
                "m2@example.com",
            ]
        );

        // idempotent without mutation
        let again = action.execute(owner.team.id, owner.user.id).await.unwrap();
        assert_eq!(members, again);
    }

    #[tokio::test]
    async fn test_non_member_is_forbidden() {
        let db = MockDatabase::new();
        let owner = seed_user(&db, "owner@example.com", SystemRole::Owner).await;
        let outsider = seed_user(&db, "out@example.com", SystemRole::Owner).await;

        let err = ListMembersAction::new(db.clone(), db.clone())
            .execute(owner.team.id, outsider.user.id)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Forbidden(_)));
    }
}
