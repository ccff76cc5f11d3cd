use axum::routing::{get, post};
use axum::Router;

use super::handlers;
use super::teams::team_routes;
use crate::authorization::AuthorizationModel;
use crate::config::{AuthConfig, RefreshConfig};
use crate::crypto::Argon2Hasher;
use crate::jwt::TokenService;
use crate::repository::UserRepository;
use crate::revocation::RevocationStore;
use crate::teams::{TeamMembershipRepository, TeamRepository};

#[derive(Clone)]
pub struct AppState<U, T, M, R> {
    pub user_repo: U,
    pub team_repo: T,
    pub membership_repo: M,
    pub revocation_store: R,
    pub tokens: TokenService,
    pub refresh: RefreshConfig,
    pub hasher: Argon2Hasher,
    pub authorization: AuthorizationModel,
}

impl<U, T, M, R> AppState<U, T, M, R> {
    pub fn new(
        user_repo: U,
        team_repo: T,
        membership_repo: M,
        revocation_store: R,
        config: AuthConfig,
    ) -> Self {
        Self {
            user_repo,
            team_repo,
            membership_repo,
            revocation_store,
            tokens: TokenService::new(config.jwt),
            refresh: config.refresh,
            hasher: config.hasher,
            authorization: AuthorizationModel::default(),
        }
    }

    #[must_use]
    pub fn with_authorization(mut self, authorization: AuthorizationModel) -> Self {
        self.authorization = authorization;
        self
    }
}

/// `/auth/*` and `/teams/*` in one router.
pub fn app_routes<U, T, M, R>() -> Router<AppState<U, T, M, R>>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    Router::new()
        .nest("/auth", auth_routes())
        .nest("/teams", team_routes())
}

/// - `POST /signup`, `POST /login`, `POST /refresh`, `POST /logout`
/// - `POST /oauth/github`, `POST /oauth/google`
/// - `GET /me`, `PUT /me`, `GET /me/permissions`
pub fn auth_routes<U, T, M, R>() -> Router<AppState<U, T, M, R>>
where
    U: UserRepository + Clone + 'static,
    T: TeamRepository + Clone + 'static,
    M: TeamMembershipRepository + Clone + 'static,
    R: RevocationStore + Clone + 'static,
{
    Router::new()
        .route("/signup", post(handlers::signup::<U, T, M, R>))
        .route("/login", post(handlers::login::<U, T, M, R>))
        .route("/refresh", post(handlers::refresh_token::<U, T, M, R>))
        .route("/logout", post(handlers::logout::<U, T, M, R>))
        .route("/oauth/github", post(handlers::github_login::<U, T, M, R>))
        .route("/oauth/google", post(handlers::google_login::<U, T, M, R>))
        .route(
            "/me",
            get(handlers::get_profile::<U, T, M, R>).put(handlers::update_profile::<U, T, M, R>),
        )
        .route("/me/permissions", get(handlers::get_permissions::<U, T, M, R>))
}
