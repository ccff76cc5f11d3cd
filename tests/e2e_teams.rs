//! Team membership workflows end to end.
//!
//! Run with: `cargo test --features mocks --test e2e_teams`

#![cfg(feature = "mocks")]
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]

use teamward::teams::{
    CreateTeamAction, GetUserTeamsAction, InviteMemberAction, InviteMemberInput,
    ListMembersAction, NewMembership, RemoveMemberAction, RemoveMemberInput,
    TeamMembershipRepository, TeamRole, UpdateMemberRoleAction, UpdateMemberRoleInput,
};
use teamward::{AuthError, MockDatabase, NewUser, SecretString, SystemRole, UserRepository};

async fn user(db: &MockDatabase, email: &str, role: SystemRole) -> i64 {
    let mut new_user = NewUser::local(email, SecretString::new("digest"));
    new_user.role = role;
    db.create_user_with_team(new_user, &format!("{email} personal"))
        .await
        .unwrap()
        .user
        .id
}

fn invite(team_id: i64, inviter_id: i64, email: &str, role: Option<TeamRole>) -> InviteMemberInput {
    InviteMemberInput {
        team_id,
        inviter_id,
        invitee_email: email.to_owned(),
        role,
    }
}

fn owner_count(members: &[teamward::teams::TeamMember]) -> usize {
    members
        .iter()
        .filter(|m| m.membership.role == TeamRole::Owner)
        .count()
}

#[tokio::test]
async fn test_team_lifecycle() {
    let db = MockDatabase::new();
    let lead = user(&db, "lead@example.com", SystemRole::TeamLead).await;
    let dev = user(&db, "dev@example.com", SystemRole::Developer).await;
    let qa = user(&db, "qa@example.com", SystemRole::Tester).await;

    let created = CreateTeamAction::new(db.clone())
        .execute("  Platform ", lead)
        .await
        .unwrap();
    let team = created.team.id;
    assert_eq!(created.team.name, "Platform");
    assert_eq!(created.membership.role, TeamRole::Owner);

    let inviter = InviteMemberAction::new(db.clone(), db.clone());
    let dev_membership = inviter
        .execute(invite(team, lead, "dev@example.com", Some(TeamRole::Developer)))
        .await
        .unwrap();
    assert_eq!(dev_membership.assigned_by, Some(lead));
    inviter
        .execute(invite(team, lead, "qa@example.com", None))
        .await
        .unwrap();

    let promoted = UpdateMemberRoleAction::new(db.clone())
        .execute(UpdateMemberRoleInput {
            team_id: team,
            target_user_id: qa,
            new_role: TeamRole::Tester,
            requester_id: lead,
        })
        .await
        .unwrap();
    assert_eq!(promoted.role, TeamRole::Tester);

    let list = ListMembersAction::new(db.clone(), db.clone());
    let members = list.execute(team, dev).await.unwrap();
    assert_eq!(members.len(), 3);
    assert_eq!(members[0].membership.user_id, lead);
    assert_eq!(owner_count(&members), 1);

    let remove = RemoveMemberAction::new(db.clone());
    remove
        .execute(RemoveMemberInput {
            team_id: team,
            target_user_id: qa,
            requester_id: lead,
        })
        .await
        .unwrap();
    remove
        .execute(RemoveMemberInput {
            team_id: team,
            target_user_id: dev,
            requester_id: dev,
        })
        .await
        .unwrap();

    let members = list.execute(team, lead).await.unwrap();
    assert_eq!(members.len(), 1);
    assert_eq!(members[0].membership.role, TeamRole::Owner);

    // the leaver keeps their personal team only
    let dev_teams = GetUserTeamsAction::new(db.clone()).execute(dev).await.unwrap();
    assert_eq!(dev_teams.len(), 1);
    assert_eq!(dev_teams[0].team.owner_id, dev);
}

#[tokio::test]
async fn test_invite_requires_both_role_tiers() {
    let db = MockDatabase::new();
    let owner = user(&db, "owner@example.com", SystemRole::Admin).await;
    let member_admin = user(&db, "member-admin@example.com", SystemRole::Member).await;
    user(&db, "target@example.com", SystemRole::Member).await;

    let team = CreateTeamAction::new(db.clone())
        .execute("Core", owner)
        .await
        .unwrap()
        .team
        .id;
    db.add_member(NewMembership {
        team_id: team,
        user_id: member_admin,
        role: TeamRole::Admin,
        assigned_by: Some(owner),
    })
    .await
    .unwrap();

    let inviter = InviteMemberAction::new(db.clone(), db.clone());

    // team ADMIN, but only a MEMBER system-wide
    let err = inviter
        .execute(invite(team, member_admin, "target@example.com", None))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Forbidden(_)));

    inviter
        .execute(invite(team, owner, "target@example.com", None))
        .await
        .unwrap();
    assert_eq!(
        inviter
            .execute(invite(team, owner, "target@example.com", None))
            .await,
        Err(AuthError::AlreadyMember)
    );
}

#[tokio::test]
async fn test_invite_edge_cases() {
    let db = MockDatabase::new();
    let owner = user(&db, "owner@example.com", SystemRole::Owner).await;
    let outsider = user(&db, "outsider@example.com", SystemRole::Owner).await;
    user(&db, "target@example.com", SystemRole::Member).await;
    let team = CreateTeamAction::new(db.clone())
        .execute("Ops", owner)
        .await
        .unwrap()
        .team
        .id;
    let inviter = InviteMemberAction::new(db.clone(), db.clone());

    let as_owner = inviter
        .execute(invite(team, owner, "target@example.com", Some(TeamRole::Owner)))
        .await
        .unwrap_err();
    assert!(matches!(as_owner, AuthError::InvalidRole(_)));

    let by_outsider = inviter
        .execute(invite(team, outsider, "target@example.com", None))
        .await
        .unwrap_err();
    assert!(matches!(by_outsider, AuthError::Forbidden(_)));

    assert_eq!(
        inviter
            .execute(invite(team, owner, "ghost@example.com", None))
            .await,
        Err(AuthError::UserNotFound)
    );
}

#[tokio::test]
async fn test_single_owner_is_never_lost() {
    let db = MockDatabase::new();
    let owner = user(&db, "owner@example.com", SystemRole::Owner).await;
    let admin = user(&db, "admin@example.com", SystemRole::Admin).await;
    let team = CreateTeamAction::new(db.clone())
        .execute("Guarded", owner)
        .await
        .unwrap()
        .team
        .id;
    InviteMemberAction::new(db.clone(), db.clone())
        .execute(invite(team, owner, "admin@example.com", Some(TeamRole::Admin)))
        .await
        .unwrap();

    let roles = UpdateMemberRoleAction::new(db.clone());
    let promote = roles
        .execute(UpdateMemberRoleInput {
            team_id: team,
            target_user_id: admin,
            new_role: TeamRole::Owner,
            requester_id: owner,
        })
        .await
        .unwrap_err();
    assert!(matches!(promote, AuthError::InvalidOperation(_)));

    let demote = roles
        .execute(UpdateMemberRoleInput {
            team_id: team,
            target_user_id: owner,
            new_role: TeamRole::Member,
            requester_id: owner,
        })
        .await
        .unwrap_err();
    assert!(matches!(demote, AuthError::InvalidOperation(_)));

    let by_admin = roles
        .execute(UpdateMemberRoleInput {
            team_id: team,
            target_user_id: admin,
            new_role: TeamRole::Developer,
            requester_id: admin,
        })
        .await
        .unwrap_err();
    assert!(matches!(by_admin, AuthError::Forbidden(_)));

    let remove = RemoveMemberAction::new(db.clone());
    for requester in [owner, admin] {
        let err = remove
            .execute(RemoveMemberInput {
                team_id: team,
                target_user_id: owner,
                requester_id: requester,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidOperation(_)));
    }

    // the repository refuses a second owner even when the action layer is bypassed
    let direct = db
        .add_member(NewMembership {
            team_id: team,
            user_id: user(&db, "sneaky@example.com", SystemRole::Owner).await,
            role: TeamRole::Owner,
            assigned_by: None,
        })
        .await
        .unwrap_err();
    assert!(matches!(direct, AuthError::InvalidOperation(_)));

    let members = ListMembersAction::new(db.clone(), db.clone())
        .execute(team, owner)
        .await
        .unwrap();
    assert_eq!(owner_count(&members), 1);
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn test_non_members_cannot_see_team() {
    let db = MockDatabase::new();
    let owner = user(&db, "owner@example.com", SystemRole::Owner).await;
    let stranger = user(&db, "stranger@example.com", SystemRole::Owner).await;
    let team = CreateTeamAction::new(db.clone())
        .execute("Private", owner)
        .await
        .unwrap()
        .team
        .id;

    let err = ListMembersAction::new(db.clone(), db.clone())
        .execute(team, stranger)
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Forbidden(_)));
}
