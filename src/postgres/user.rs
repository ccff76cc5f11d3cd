use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool, Postgres, Transaction};

use super::team::{TeamRecord, TEAM_COLUMNS_RETURNING};
use super::membership::{MembershipRecord, MEMBERSHIP_COLUMNS_RETURNING};
use super::{map_db_error, unknown_value};
use crate::authorization::{Role, SystemRole};
use crate::identity::OAuthProvider;
use crate::repository::{Gender, NewUser, ProvisionedUser, User, UserRepository, UserUpdate};
use crate::teams::TeamRole;
use crate::{AuthError, SecretString};

macro_rules! user_columns {
    () => {
        "id, email, name, password_hash, role, avatar_url, phone_number, gender, date_of_birth, \
         oauth_provider, oauth_id, is_active, last_login_at, created_at, updated_at"
    };
}

#[derive(Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_user(
        tx: &mut Transaction<'_, Postgres>,
        user: &NewUser,
    ) -> Result<User, AuthError> {
        let row: UserRecord = sqlx::query_as(concat!(
            "INSERT INTO users (email, name, password_hash, role, avatar_url, phone_number, gender, \
             date_of_birth, oauth_provider, oauth_id, last_login_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) RETURNING ",
            user_columns!()
        ))
        .bind(&user.email)
        .bind(&user.profile.name)
        .bind(user.password_hash.as_ref().map(SecretString::expose_secret))
        .bind(user.role.as_str())
        .bind(&user.profile.avatar_url)
        .bind(&user.profile.phone_number)
        .bind(user.profile.gender.map(|g| g.as_str()))
        .bind(user.profile.date_of_birth)
        .bind(user.oauth_provider.map(|p| p.as_str()))
        .bind(&user.oauth_id)
        .bind(user.last_login_at)
        .fetch_one(&mut **tx)
        .await
        .map_err(|e| map_db_error("insert_user", e))?;

        row.try_into()
    }
}

#[derive(FromRow)]
struct UserRecord {
    id: i64,
    email: String,
    name: Option<String>,
    password_hash: Option<String>,
    role: String,
    avatar_url: Option<String>,
    phone_number: Option<String>,
    gender: Option<String>,
    date_of_birth: Option<NaiveDate>,
    oauth_provider: Option<String>,
    oauth_id: Option<String>,
    is_active: bool,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<UserRecord> for User {
    type Error = AuthError;

    fn try_from(row: UserRecord) -> Result<Self, Self::Error> {
        let role = SystemRole::parse(&row.role).ok_or_else(|| unknown_value("users.role", &row.role))?;
        let gender = row
            .gender
            .as_deref()
            .map(|g| Gender::parse(g).ok_or_else(|| unknown_value("users.gender", g)))
            .transpose()?;
        let oauth_provider = row
            .oauth_provider
            .as_deref()
            .map(|p| OAuthProvider::parse(p).ok_or_else(|| unknown_value("users.oauth_provider", p)))
            .transpose()?;

        Ok(User {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash.map(SecretString::new),
            role,
            avatar_url: row.avatar_url,
            phone_number: row.phone_number,
            gender,
            date_of_birth: row.date_of_birth,
            oauth_provider,
            oauth_id: row.oauth_id,
            is_active: row.is_active,
            last_login_at: row.last_login_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        let row: Option<UserRecord> =
            sqlx::query_as(concat!("SELECT ", user_columns!(), " FROM users WHERE id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_db_error("find_user_by_id", e))?;

        row.map(TryInto::try_into).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let row: Option<UserRecord> =
            sqlx::query_as(concat!("SELECT ", user_columns!(), " FROM users WHERE email = $1"))
                .bind(email)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| map_db_error("find_user_by_email", e))?;

        row.map(TryInto::try_into).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self), err))]
    async fn find_user_by_oauth(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> Result<Option<User>, AuthError> {
        let row: Option<UserRecord> = sqlx::query_as(concat!(
            "SELECT ",
            user_columns!(),
            " FROM users WHERE oauth_provider = $1 AND oauth_id = $2"
        ))
        .bind(provider.as_str())
        .bind(provider_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("find_user_by_oauth", e))?;

        row.map(TryInto::try_into).transpose()
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip_all, err))]
    async fn create_user_with_team(
        &self,
        new_user: NewUser,
        team_name: &str,
    ) -> Result<ProvisionedUser, AuthError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error("begin_transaction", e))?;

        let user = Self::insert_user(&mut tx, &new_user).await?;

        let team: TeamRecord = sqlx::query_as(&format!(
            "INSERT INTO teams (name, owner_id) VALUES ($1, $2) RETURNING {TEAM_COLUMNS_RETURNING}"
        ))
        .bind(team_name)
        .bind(user.id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error("insert_team", e))?;

        let membership: MembershipRecord = sqlx::query_as(&format!(
            "INSERT INTO team_memberships (team_id, user_id, role, assigned_by) \
             VALUES ($1, $2, $3, $2) RETURNING {MEMBERSHIP_COLUMNS_RETURNING}"
        ))
        .bind(team.id)
        .bind(user.id)
        .bind(TeamRole::Owner.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_db_error("insert_owner_membership", e))?;

        tx.commit()
            .await
            .map_err(|e| map_db_error("commit_transaction", e))?;

        Ok(ProvisionedUser {
            user,
            team: team.into(),
            membership: membership.try_into()?,
        })
    }

    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, update), err))]
    async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User, AuthError> {
        let row: Option<UserRecord> = sqlx::query_as(concat!(
            "UPDATE users SET \
             name = COALESCE($2, name), \
             avatar_url = COALESCE($3, avatar_url), \
             phone_number = COALESCE($4, phone_number), \
             gender = COALESCE($5, gender), \
             date_of_birth = COALESCE($6, date_of_birth), \
             oauth_provider = COALESCE($7, oauth_provider), \
             oauth_id = COALESCE($8, oauth_id), \
             last_login_at = COALESCE($9, last_login_at), \
             updated_at = NOW() \
             WHERE id = $1 RETURNING ",
            user_columns!()
        ))
        .bind(id)
        .bind(&update.name)
        .bind(&update.avatar_url)
        .bind(&update.phone_number)
        .bind(update.gender.map(|g| g.as_str()))
        .bind(update.date_of_birth)
        .bind(update.oauth_provider.map(|p| p.as_str()))
        .bind(&update.oauth_id)
        .bind(update.last_login_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error("update_user", e))?;

        row.ok_or(AuthError::UserNotFound)?.try_into()
    }
}
