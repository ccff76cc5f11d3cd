//! Teams and team-scoped membership rules.
//!
//! Every mutating action checks the requester's membership first. A team has
//! exactly one OWNER membership, created with the team and never reassigned
//! or removed.

mod actions;
mod repository;
mod types;

pub use actions::{
    CreateTeamAction, CreateTeamOutput, GetUserTeamsAction, InviteMemberAction,
    InviteMemberInput, ListMembersAction, RemoveMemberAction, RemoveMemberInput,
    UpdateMemberRoleAction, UpdateMemberRoleInput,
};
pub use repository::{NewMembership, TeamMembershipRepository, TeamRepository};
pub use types::{MemberProfile, Team, TeamMember, TeamMembership, TeamRole, UserTeam};
