//! Embedded schema migrations.
//!
//! Both sets share sqlx's bookkeeping table, so each ignores versions applied
//! by the other.
//!
//! ```rust,ignore
//! use teamward::postgres::migrations;
//!
//! let pool = sqlx::PgPool::connect(&database_url).await?;
//! migrations::run_all(&pool).await?;
//! ```

use sqlx::PgPool;

/// Creates the `users` table.
pub async fn run_core(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    let mut migrator = sqlx::migrate!("./migrations/core");
    migrator.set_ignore_missing(true);
    migrator.run(pool).await
}

/// Creates `teams` and `team_memberships`. Requires [`run_core`] first.
pub async fn run_teams(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    let mut migrator = sqlx::migrate!("./migrations/teams");
    migrator.set_ignore_missing(true);
    migrator.run(pool).await
}

/// Runs every migration in dependency order.
pub async fn run_all(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    run_core(pool).await?;
    run_teams(pool).await
}
