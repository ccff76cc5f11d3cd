use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::membership::{MembershipRecord, MEMBERSHIP_COLUMNS_RETURNING};
use super::{map_db_error, unknown_value};
use crate::authorization::Role;
use crate::teams::{Team, TeamMembership, TeamRepository, TeamRole, UserTeam};
use crate::AuthError;

pub(super) const TEAM_COLUMNS_RETURNING: &str = "id, name, owner_id, created_at, updated_at";

#[derive(Clone)]
pub struct PostgresTeamRepository {
    pool: PgPool,
}

impl PostgresTeamRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
pub(super) struct TeamRecord {
    pub(super) id: i64,
    name: String,
    owner_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TeamRecord> for Team {
    fn from(row: TeamRecord) -> Self {
        Team {
            id: row.id,
            name: row.name,
            owner_id: row.owner_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct UserTeamRecord {
    id: i64,
    name: String,
    owner_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    role: String,
    joined_at: DateTime<Utc>,
}

impl TryFrom<UserTeamRecord> for UserTeam {
    type Error = AuthError;

    fn try_from(row: UserTeamRecord) -> Result<Self, Self::Error> {
        let role = TeamRole::parse(&row.role)
            .ok_or_else(|| unknown_value("team_memberships.role", &row.role))?;

        Ok(UserTeam {
            team: Team {
                id: row.id,
                name: row.name,
                owner_id: row.owner_id,
                created_at: row.created_at,
                updated_at: row.updated_at,
            },
            role,
            joined_at: row.joined_at,
        })
    }
}

#[async_trait]
impl TeamRepository for PostgresTeamRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn create_team(
        &self,
        name: &str,
        owner_id: i64,
    ) -> Result<(Team, TeamMembership), AuthError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("begin_transaction", e))?;

        let team: TeamRecord = sqlx::query_as(&format!(
            "INSERT INTO teams (name, owner_id) VALUES ($1, $2) RETURNING {TEAM_COLUMNS_RETURNING}"
        ))
        .bind(name)
        .bind(owner_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error("create_team", e))?;

        let membership: MembershipRecord = sqlx::query_as(&format!(
            "INSERT INTO team_memberships (team_id, user_id, role, assigned_by) \
             VALUES ($1, $2, $3, $2) RETURNING {MEMBERSHIP_COLUMNS_RETURNING}"
        ))
        .bind(team.id)
        .bind(owner_id)
        .bind(TeamRole::Owner.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error("insert_owner_membership", e))?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("commit_transaction", e))?;

        Ok((team.into(), membership.try_into()?))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_team_by_id(&self, id: i64) -> Result<Option<Team>, AuthError> {
        let row: Option<TeamRecord> = sqlx::query_as(&format!(
            "SELECT {TEAM_COLUMNS_RETURNING} FROM teams WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("find_team_by_id", e))?;

        Ok(row.map(Into::into))
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_teams_for_user(&self, user_id: i64) -> Result<Vec<UserTeam>, AuthError> {
        let rows: Vec<UserTeamRecord> = sqlx::query_as(
            r"
            SELECT t.id, t.name, t.owner_id, t.created_at, t.updated_at, m.role, m.joined_at
            FROM team_memberships m
            JOIN teams t ON t.id = m.team_id
            WHERE m.user_id = $1
            ORDER BY m.joined_at, t.id
            ",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("find_teams_for_user", e))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}
