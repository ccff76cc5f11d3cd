use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use super::{map_db_error, unknown_value};
use crate::authorization::Role;
use crate::teams::{NewMembership, TeamMembership, TeamMembershipRepository, TeamRole};
use crate::AuthError;

pub(super) const MEMBERSHIP_COLUMNS_RETURNING: &str =
    "id, team_id, user_id, role, assigned_by, joined_at, updated_at";

#[derive(Clone)]
pub struct PostgresTeamMembershipRepository {
    pool: PgPool,
}

impl PostgresTeamMembershipRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
pub(super) struct MembershipRecord {
    id: i64,
    team_id: i64,
    user_id: i64,
    role: String,
    assigned_by: Option<i64>,
    joined_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MembershipRecord> for TeamMembership {
    type Error = AuthError;

    fn try_from(row: MembershipRecord) -> Result<Self, Self::Error> {
        let role = TeamRole::parse(&row.role)
            .ok_or_else(|| unknown_value("team_memberships.role", &row.role))?;

        Ok(TeamMembership {
            id: row.id,
            team_id: row.team_id,
            user_id: row.user_id,
            role,
            assigned_by: row.assigned_by,
            joined_at: row.joined_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl TeamMembershipRepository for PostgresTeamMembershipRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn add_member(&self, data: NewMembership) -> Result<TeamMembership, AuthError> {
        if data.role == TeamRole::Owner {
            return Err(AuthError::InvalidOperation("team already has an owner"));
        }

        let row: MembershipRecord = sqlx::query_as(&format!(
            "INSERT INTO team_memberships (team_id, user_id, role, assigned_by) \
             VALUES ($1, $2, $3, $4) RETURNING {MEMBERSHIP_COLUMNS_RETURNING}"
        ))
        .bind(data.team_id)
        .bind(data.user_id)
        .bind(data.role.as_str())
        .bind(data.assigned_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error("add_member", e))?;

        row.try_into()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_membership(
        &self,
        team_id: i64,
        user_id: i64,
    ) -> Result<Option<TeamMembership>, AuthError> {
        let row: Option<MembershipRecord> = sqlx::query_as(&format!(
            "SELECT {MEMBERSHIP_COLUMNS_RETURNING} FROM team_memberships \
             WHERE team_id = $1 AND user_id = $2"
        ))
        .bind(team_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("find_membership", e))?;

        row.map(TryInto::try_into).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn list_memberships(&self, team_id: i64) -> Result<Vec<TeamMembership>, AuthError> {
        let rows: Vec<MembershipRecord> = sqlx::query_as(&format!(
            "SELECT {MEMBERSHIP_COLUMNS_RETURNING} FROM team_memberships \
             WHERE team_id = $1 ORDER BY joined_at, id"
        ))
        .bind(team_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("list_memberships", e))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_memberships_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<TeamMembership>, AuthError> {
        let rows: Vec<MembershipRecord> = sqlx::query_as(&format!(
            "SELECT {MEMBERSHIP_COLUMNS_RETURNING} FROM team_memberships \
             WHERE user_id = $1 ORDER BY joined_at, id"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error("find_memberships_for_user", e))?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn update_member_role(
        &self,
        team_id: i64,
        user_id: i64,
        role: TeamRole,
        assigned_by: i64,
    ) -> Result<TeamMembership, AuthError> {
        if role == TeamRole::Owner {
            return Err(AuthError::InvalidOperation("owner role cannot be reassigned"));
        }

        // the OWNER row is never rewritten
        let row: Option<MembershipRecord> = sqlx::query_as(&format!(
            "UPDATE team_memberships SET role = $3, assigned_by = $4, updated_at = NOW() \
             WHERE team_id = $1 AND user_id = $2 AND role <> 'OWNER' \
             RETURNING {MEMBERSHIP_COLUMNS_RETURNING}"
        ))
        .bind(team_id)
        .bind(user_id)
        .bind(role.as_str())
        .bind(assigned_by)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("update_member_role", e))?;

        match row {
            Some(row) => row.try_into(),
            None => match self.find_membership(team_id, user_id).await? {
                Some(_) => Err(AuthError::InvalidOperation("owner role cannot be reassigned")),
                None => Err(AuthError::MemberNotFound),
            },
        }
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn remove_member(&self, team_id: i64, user_id: i64) -> Result<(), AuthError> {
        let result = sqlx::query("DELETE FROM team_memberships WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_db_error("remove_member", e))?;

        if result.rows_affected() == 0 {
            return Err(AuthError::MemberNotFound);
        }

        Ok(())
    }
}
