use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::api::axum::{AppError, AppState, AuthenticatedUser};
use crate::api::{CreateTeamRequest, InviteMemberRequest, MessageResponse, UpdateMemberRoleRequest};
use crate::repository::UserRepository;
use crate::revocation::RevocationStore;
use crate::teams::{
    CreateTeamAction, CreateTeamOutput, GetUserTeamsAction, InviteMemberAction, InviteMemberInput,
    ListMembersAction, RemoveMemberAction, RemoveMemberInput, TeamMember, TeamMembership,
    TeamMembershipRepository, TeamRepository, UpdateMemberRoleAction, UpdateMemberRoleInput,
    UserTeam,
};

/// POST /teams
pub async fn create_team<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    user: AuthenticatedUser,
    Json(body): Json<CreateTeamRequest>,
) -> Result<(StatusCode, Json<CreateTeamOutput>), AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    let output = CreateTeamAction::new(state.team_repo)
        .execute(&body.name, user.user().id)
        .await?;
    Ok((StatusCode::CREATED, Json(output)))
}

/// GET /teams
pub async fn list_user_teams<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    user: AuthenticatedUser,
) -> Result<Json<Vec<UserTeam>>, AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    let teams = GetUserTeamsAction::new(state.team_repo)
        .execute(user.user().id)
        .await?;
    Ok(Json(teams))
}

/// GET /teams/{id}/members
pub async fn list_members<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    user: AuthenticatedUser,
    Path(team_id): Path<i64>,
) -> Result<Json<Vec<TeamMember>>, AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    let members = ListMembersAction::new(state.membership_repo, state.user_repo)
        .execute(team_id, user.user().id)
        .await?;
    Ok(Json(members))
}

/// POST /teams/{id}/members
///
/// Adds an existing account by email. Defaults to MEMBER.
pub async fn invite_member<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    user: AuthenticatedUser,
    Path(team_id): Path<i64>,
    Json(body): Json<InviteMemberRequest>,
) -> Result<(StatusCode, Json<TeamMembership>), AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    let membership = InviteMemberAction::new(state.user_repo, state.membership_repo)
        .execute(InviteMemberInput {
            team_id,
            inviter_id: user.user().id,
            invitee_email: body.email,
            role: body.role,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(membership)))
}

/// PUT /teams/{id}/members/{user_id}
pub async fn update_member_role<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    user: AuthenticatedUser,
    Path((team_id, target_user_id)): Path<(i64, i64)>,
    Json(body): Json<UpdateMemberRoleRequest>,
) -> Result<Json<TeamMembership>, AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    let membership = UpdateMemberRoleAction::new(state.membership_repo)
        .execute(UpdateMemberRoleInput {
            team_id,
            target_user_id,
            new_role: body.role,
            requester_id: user.user().id,
        })
        .await?;
    Ok(Json(membership))
}

/// DELETE /teams/{id}/members/{user_id}
pub async fn remove_member<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    user: AuthenticatedUser,
    Path((team_id, target_user_id)): Path<(i64, i64)>,
) -> Result<Json<MessageResponse>, AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    RemoveMemberAction::new(state.membership_repo)
        .execute(RemoveMemberInput {
            team_id,
            target_user_id,
            requester_id: user.user().id,
        })
        .await?;
    Ok(Json(MessageResponse {
        message: "member removed".to_owned(),
    }))
}
