mod create_team;
mod get_user_teams;
mod invite_member;
mod list_members;
mod remove_member;
mod update_member_role;

pub use create_team::{CreateTeamAction, CreateTeamOutput};
pub use get_user_teams::GetUserTeamsAction;
pub use invite_member::{InviteMemberAction, InviteMemberInput};
pub use list_members::ListMembersAction;
pub use remove_member::{RemoveMemberAction, RemoveMemberInput};
pub use update_member_role::{UpdateMemberRoleAction, UpdateMemberRoleInput};
