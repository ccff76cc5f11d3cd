//! HTTP handlers for `/auth` endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;

use super::error::AppError;
use super::middleware::AuthenticatedUser;
use super::routes::AppState;
use crate::actions::{
    GetProfileAction, LoginAction, LogoutAction, OAuthLoginAction, RefreshTokenAction,
    SignupAction, SignupInput, UpdateProfileAction,
};
use crate::api::{
    AuthResponse, LoginRequest, MessageResponse, PermissionsResponse, RefreshTokenRequest,
    SignupRequest, TokenResponse, UpdateProfileRequest, UserResponse,
};
use crate::identity::{GitHubProfile, GoogleProfile, OAuthProfile};
use crate::repository::{ProfileFields, UserRepository};
use crate::revocation::RevocationStore;
use crate::teams::{TeamMembershipRepository, TeamRepository};
use crate::AuthError;

/// POST /auth/signup
pub async fn signup<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    Json(body): Json<SignupRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    let action = SignupAction::with_hasher(state.user_repo, state.tokens, state.hasher);
    let input = SignupInput {
        email: body.email,
        password: body.password,
        name: body.name,
        phone_number: body.phone_number,
        gender: body.gender,
        date_of_birth: body.date_of_birth,
        terms_accepted: body.terms_accepted,
    };

    let session = action.execute(input).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse::from(session))))
}

/// POST /auth/login
pub async fn login<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    let action =
        LoginAction::with_hasher(state.user_repo, state.team_repo, state.tokens, state.hasher);

    let session = action
        .execute(&body.email, body.password.expose_secret())
        .await?;
    Ok(Json(AuthResponse::from(session)))
}

/// POST /auth/refresh
pub async fn refresh_token<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<TokenResponse>, AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    let action = RefreshTokenAction::with_config(
        state.user_repo,
        state.revocation_store,
        state.tokens,
        state.refresh,
    );

    match action.execute(body.refresh_token.expose_secret()).await {
        Ok(pair) => Ok(Json(TokenResponse::from(pair))),
        // a token for a deleted account is just an invalid token to the client
        Err(AuthError::UserNotFound) => Err(AppError(AuthError::InvalidToken)),
        Err(e) => Err(AppError(e)),
    }
}

/// POST /auth/logout
///
/// Responds 200 even when the revocation store is unreachable.
pub async fn logout<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    user: AuthenticatedUser,
    Json(body): Json<RefreshTokenRequest>,
) -> Result<Json<MessageResponse>, AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    LogoutAction::new(state.revocation_store, state.tokens)
        .execute(body.refresh_token.expose_secret(), user.user().id)
        .await?;

    Ok(Json(MessageResponse {
        message: "logged out".to_owned(),
    }))
}

/// POST /auth/oauth/github
///
/// Takes the profile the caller obtained from GitHub.
pub async fn github_login<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    Json(body): Json<GitHubProfile>,
) -> Result<Json<AuthResponse>, AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    let profile = OAuthProfile::try_from(body).map_err(AuthError::from)?;
    oauth_login(state, profile).await
}

/// POST /auth/oauth/google
pub async fn google_login<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    Json(body): Json<GoogleProfile>,
) -> Result<Json<AuthResponse>, AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    let profile = OAuthProfile::try_from(body).map_err(AuthError::from)?;
    oauth_login(state, profile).await
}

async fn oauth_login<U, T, M, R>(
    state: AppState<U, T, M, R>,
    profile: OAuthProfile,
) -> Result<Json<AuthResponse>, AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
{
    let session = OAuthLoginAction::new(state.user_repo, state.team_repo, state.tokens)
        .execute(&profile)
        .await?;
    Ok(Json(AuthResponse::from(session)))
}

/// GET /auth/me
pub async fn get_profile<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    let profile = GetProfileAction::new(state.user_repo)
        .execute(user.user().id)
        .await?;
    Ok(Json(UserResponse::from(profile)))
}

/// PUT /auth/me
pub async fn update_profile<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    user: AuthenticatedUser,
    Json(body): Json<UpdateProfileRequest>,
) -> Result<Json<UserResponse>, AppError>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    let fields = ProfileFields {
        name: body.name,
        avatar_url: body.avatar_url,
        phone_number: body.phone_number,
        gender: body.gender,
        date_of_birth: body.date_of_birth,
    };

    let updated = UpdateProfileAction::new(state.user_repo)
        .execute(user.user().id, fields)
        .await?;
    Ok(Json(UserResponse::from(updated)))
}

/// GET /auth/me/permissions
pub async fn get_permissions<U, T, M, R>(
    State(state): State<AppState<U, T, M, R>>,
    user: AuthenticatedUser,
) -> Json<PermissionsResponse>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    let role = user.user().role;
    Json(PermissionsResponse {
        role,
        permissions: state.authorization.permissions_for(role).iter().collect(),
    })
}
