use axum::routing::{get, post, put};
use axum::Router;

use super::handlers;
use crate::api::axum::AppState;
use crate::repository::UserRepository;
use crate::revocation::RevocationStore;
use crate::teams::{TeamMembershipRepository, TeamRepository};

/// Every route requires a bearer access token.
///
/// - `POST /`, `GET /`
/// - `GET /{id}/members`, `POST /{id}/members`
/// - `PUT /{id}/members/{user_id}`, `DELETE /{id}/members/{user_id}`
pub fn team_routes<U, T, M, R>() -> Router<AppState<U, T, M, R>>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    Router::new()
        .route(
            "/",
            post(handlers::create_team::<U, T, M, R>)
                .get(handlers::list_user_teams::<U, T, M, R>),
        )
        .route(
            "/{id}/members",
            get(handlers::list_members::<U, T, M, R>).post(handlers::invite_member::<U, T, M, R>),
        )
        .route(
            "/{id}/members/{user_id}",
            put(handlers::update_member_role::<U, T, M, R>)
                .delete(handlers::remove_member::<U, T, M, R>),
        )
}
