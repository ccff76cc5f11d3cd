use chrono::Utc;

use crate::authorization::{can_invite_members, Role};
use crate::events::{dispatch, AuditEvent};
use crate::repository::UserRepository;
use crate::teams::{NewMembership, TeamMembership, TeamMembershipRepository, TeamRole};
use crate::AuthError;

#[derive(Debug, Clone)]
pub struct InviteMemberInput {
    pub team_id: i64,
    pub inviter_id: i64,
    pub invitee_email: String,
    /// Defaults to MEMBER.
    pub role: Option<TeamRole>,
}

/// Adds an existing user to a team.
///
/// Membership is granted immediately; delivering any notification is up to
/// the caller.
pub struct InviteMemberAction<U, M>
where
    U: UserRepository,
    M: TeamMembershipRepository,
{
    user_repository: U,
    membership_repository: M,
}

impl<U: UserRepository, M: TeamMembershipRepository> InviteMemberAction<U, M> {
    pub fn new(user_repository: U, membership_repository: M) -> Self {
        Self {
            user_repository,
            membership_repository,
        }
    }

    /// # Returns
    ///
    /// - `Err(AuthError::InvalidRole(_))` - OWNER was requested
    /// - `Err(AuthError::Forbidden(_))` - inviter is not a member, or fails the
    ///   system role / team role gate
    /// - `Err(AuthError::UserNotFound)` - inviter or invitee does not exist
    /// - `Err(AuthError::AlreadyMember)` - invitee is already in the team
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "invite_member", skip_all, err)
    )]
    pub async fn execute(&self, input: InviteMemberInput) -> Result<TeamMembership, AuthError> {
        let role = input.role.unwrap_or(TeamRole::Member);
        if role == TeamRole::Owner {
            return Err(AuthError::InvalidRole(role.as_str().to_owned()));
        }

        let inviter_membership = self
            .membership_repository
            .find_membership(input.team_id, input.inviter_id)
            .await?
            .ok_or(AuthError::Forbidden("you are not a member of this team"))?;

        let inviter = self
            .user_repository
            .find_user_by_id(input.inviter_id)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !can_invite_members(inviter_membership.role, inviter.role) {
            log::warn!(
                target: "teamward",
                "msg=\"invite denied\", team_id={}, inviter_id={}, team_role={}, system_role={}",
                input.team_id,
                inviter.id,
                inviter_membership.role.as_str(),
                inviter.role
            );
            return Err(AuthError::Forbidden(
                "only team owners and admins with a leading system role can invite members",
            ));
        }

        let invitee = self
            .user_repository
            .find_user_by_email(&input.invitee_email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if self
            .membership_repository
            .find_membership(input.team_id, invitee.id)
            .await?
            .is_some()
        {
            return Err(AuthError::AlreadyMember);
        }

        // the unique (team, user) constraint still decides a concurrent invite
        let membership = self
            .membership_repository
            .add_member(NewMembership {
                team_id: input.team_id,
                user_id: invitee.id,
                role,
                assigned_by: Some(inviter.id),
            })
            .await?;

        log::info!(
            target: "teamward",
            "msg=\"member invited\", team_id={}, user_id={}, role={}, invited_by={}",
            membership.team_id,
            membership.user_id,
            role.as_str(),
            inviter.id
        );

        dispatch(AuditEvent::MemberInvited {
            team_id: membership.team_id,
            user_id: membership.user_id,
            invited_by: inviter.id,
            role,
            at: Utc::now(),
        })
        .await;

        Ok(membership)
    }
}
