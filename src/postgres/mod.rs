//! `sqlx` Postgres implementations of the repository traits.
//!
//! Run [`migrations::run_all`] before use. Writes that touch several tables
//! run in one transaction, and unique or foreign-key violations are mapped to
//! domain errors by constraint name.

pub mod migrations;
mod membership;
mod team;
mod user;

pub use membership::PostgresTeamMembershipRepository;
pub use team::PostgresTeamRepository;
pub use user::PostgresUserRepository;

use sqlx::PgPool;

use crate::AuthError;

/// Creates all Postgres repository instances from a connection pool.
pub fn create_repositories(
    pool: PgPool,
) -> (
    PostgresUserRepository,
    PostgresTeamRepository,
    PostgresTeamMembershipRepository,
) {
    (
        PostgresUserRepository::new(pool.clone()),
        PostgresTeamRepository::new(pool.clone()),
        PostgresTeamMembershipRepository::new(pool),
    )
}

/// Maps a `sqlx` error to the domain error for the violated constraint, or
/// logs it and wraps it as `DatabaseError`.
pub(crate) fn map_db_error(operation: &str, e: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(ref db_err) = e {
        match db_err.constraint() {
            Some("users_email_key") => return AuthError::DuplicateEmail,
            Some("users_oauth_identity_key") => return AuthError::DuplicateOAuthAccount,
            Some("team_memberships_team_user_key") => return AuthError::AlreadyMember,
            Some("team_memberships_one_owner") => {
                return AuthError::InvalidOperation("team already has an owner")
            }
            Some("team_memberships_team_id_fkey") => return AuthError::TeamNotFound,
            Some("team_memberships_user_id_fkey" | "teams_owner_id_fkey") => {
                return AuthError::UserNotFound
            }
            _ => {}
        }
    }

    log::error!(
        target: "teamward",
        "msg=\"database error\", operation=\"{operation}\", error=\"{e}\""
    );
    AuthError::DatabaseError(e.to_string())
}

/// Error for a stored enum value this build does not know.
pub(crate) fn unknown_value(column: &str, value: &str) -> AuthError {
    log::error!(
        target: "teamward",
        "msg=\"unexpected column value\", column=\"{column}\", value=\"{value}\""
    );
    AuthError::DatabaseError(format!("unexpected {column} value `{value}`"))
}
