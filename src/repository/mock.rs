use async_trait::async_trait;
use chrono::Utc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::user::{NewUser, ProvisionedUser, User, UserRepository, UserUpdate};
use crate::identity::OAuthProvider;
use crate::teams::{
    NewMembership, Team, TeamMembership, TeamMembershipRepository, TeamRepository, TeamRole,
    UserTeam,
};
use crate::AuthError;

#[derive(Debug, Default)]
struct State {
    users: Vec<User>,
    teams: Vec<Team>,
    memberships: Vec<TeamMembership>,
    next_user_id: i64,
    next_team_id: i64,
    next_membership_id: i64,
}

impl State {
    fn next_user_id(&mut self) -> i64 {
        self.next_user_id += 1;
        self.next_user_id
    }

    fn next_team_id(&mut self) -> i64 {
        self.next_team_id += 1;
        self.next_team_id
    }

    fn next_membership_id(&mut self) -> i64 {
        self.next_membership_id += 1;
        self.next_membership_id
    }

    fn oauth_taken(&self, provider: OAuthProvider, provider_id: &str, except: Option<i64>) -> bool {
        self.users.iter().any(|u| {
            Some(u.id) != except
                && u.oauth_provider == Some(provider)
                && u.oauth_id.as_deref() == Some(provider_id)
        })
    }

    fn insert_team(&mut self, name: &str, owner_id: i64) -> (Team, TeamMembership) {
        let now = Utc::now();
        let team = Team {
            id: self.next_team_id(),
            name: name.to_owned(),
            owner_id,
            created_at: now,
            updated_at: now,
        };
        let membership = TeamMembership {
            id: self.next_membership_id(),
            team_id: team.id,
            user_id: owner_id,
            role: TeamRole::Owner,
            assigned_by: Some(owner_id),
            joined_at: now,
            updated_at: now,
        };

        self.teams.push(team.clone());
        self.memberships.push(membership.clone());
        (team, membership)
    }
}

/// In-memory users, teams and memberships behind one lock.
///
/// Enforces the same unique constraints as the Postgres schema. Writes that
/// touch several collections validate everything before mutating, so a
/// failed call leaves no partial rows. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MockDatabase {
    state: Arc<RwLock<State>>,
    unavailable: Arc<AtomicBool>,
}

impl MockDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent call fail with `DatabaseError` until reset.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Flips the active flag, standing in for an admin deactivation.
    pub fn set_active(&self, user_id: i64, active: bool) {
        if let Ok(mut state) = self.state.write() {
            if let Some(user) = state.users.iter_mut().find(|u| u.id == user_id) {
                user.is_active = active;
                user.updated_at = Utc::now();
            }
        }
    }

    pub fn user_count(&self) -> usize {
        self.state.read().map(|s| s.users.len()).unwrap_or(0)
    }

    pub fn team_count(&self) -> usize {
        self.state.read().map(|s| s.teams.len()).unwrap_or(0)
    }

    pub fn membership_count(&self) -> usize {
        self.state.read().map(|s| s.memberships.len()).unwrap_or(0)
    }

    fn check_available(&self) -> Result<(), AuthError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AuthError::DatabaseError("mock database unavailable".to_owned()));
        }
        Ok(())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, AuthError> {
        self.check_available()?;
        self.state
            .read()
            .map_err(|_| AuthError::Internal("mock database lock poisoned".to_owned()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, AuthError> {
        self.check_available()?;
        self.state
            .write()
            .map_err(|_| AuthError::Internal("mock database lock poisoned".to_owned()))
    }
}

#[async_trait]
impl UserRepository for MockDatabase {
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, AuthError> {
        let state = self.read()?;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, AuthError> {
        let state = self.read()?;
        Ok(state.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_oauth(
        &self,
        provider: OAuthProvider,
        provider_id: &str,
    ) -> Result<Option<User>, AuthError> {
        let state = self.read()?;
        Ok(state
            .users
            .iter()
            .find(|u| u.oauth_provider == Some(provider) && u.oauth_id.as_deref() == Some(provider_id))
            .cloned())
    }

    async fn create_user_with_team(
        &self,
        new_user: NewUser,
        team_name: &str,
    ) -> Result<ProvisionedUser, AuthError> {
        let mut state = self.write()?;

        if state.users.iter().any(|u| u.email == new_user.email) {
            return Err(AuthError::DuplicateEmail);
        }
        if let (Some(provider), Some(provider_id)) =
            (new_user.oauth_provider, new_user.oauth_id.as_deref())
        {
            if state.oauth_taken(provider, provider_id, None) {
                return Err(AuthError::DuplicateOAuthAccount);
            }
        }

        let now = Utc::now();
        let user = User {
            id: state.next_user_id(),
            email: new_user.email,
            name: new_user.profile.name,
            password_hash: new_user.password_hash,
            role: new_user.role,
            avatar_url: new_user.profile.avatar_url,
            phone_number: new_user.profile.phone_number,
            gender: new_user.profile.gender,
            date_of_birth: new_user.profile.date_of_birth,
            oauth_provider: new_user.oauth_provider,
            oauth_id: new_user.oauth_id,
            is_active: true,
            last_login_at: new_user.last_login_at,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        let (team, membership) = state.insert_team(team_name, user.id);

        Ok(ProvisionedUser {
            user,
            team,
            membership,
        })
    }

    async fn update_user(&self, id: i64, update: &UserUpdate) -> Result<User, AuthError> {
        let mut state = self.write()?;

        if let (Some(provider), Some(provider_id)) =
            (update.oauth_provider, update.oauth_id.as_deref())
        {
            if state.oauth_taken(provider, provider_id, Some(id)) {
                return Err(AuthError::DuplicateOAuthAccount);
            }
        }

        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AuthError::UserNotFound)?;

        if let Some(ref name) = update.name {
            user.name = Some(name.clone());
        }
        if let Some(ref url) = update.avatar_url {
            user.avatar_url = Some(url.clone());
        }
        if let Some(ref phone) = update.phone_number {
            user.phone_number = Some(phone.clone());
        }
        if let Some(gender) = update.gender {
            user.gender = Some(gender);
        }
        if let Some(date) = update.date_of_birth {
            user.date_of_birth = Some(date);
        }
        if let Some(provider) = update.oauth_provider {
            user.oauth_provider = Some(provider);
        }
        if let Some(ref provider_id) = update.oauth_id {
            user.oauth_id = Some(provider_id.clone());
        }
        if let Some(at) = update.last_login_at {
            user.last_login_at = Some(at);
        }
        user.updated_at = Utc::now();

        Ok(user.clone())
    }
}

#[async_trait]
impl TeamRepository for MockDatabase {
    async fn create_team(
        &self,
        name: &str,
        owner_id: i64,
    ) -> Result<(Team, TeamMembership), AuthError> {
        let mut state = self.write()?;

        if !state.users.iter().any(|u| u.id == owner_id) {
            return Err(AuthError::UserNotFound);
        }

        Ok(state.insert_team(name, owner_id))
    }

    async fn find_team_by_id(&self, id: i64) -> Result<Option<Team>, AuthError> {
        let state = self.read()?;
        Ok(state.teams.iter().find(|t| t.id == id).cloned())
    }

    async fn find_teams_for_user(&self, user_id: i64) -> Result<Vec<UserTeam>, AuthError> {
        let state = self.read()?;

        let mut teams: Vec<UserTeam> = state
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .filter_map(|m| {
                state.teams.iter().find(|t| t.id == m.team_id).map(|team| UserTeam {
                    team: team.clone(),
                    role: m.role,
                    joined_at: m.joined_at,
                })
            })
            .collect();
        teams.sort_by_key(|t| (t.joined_at, t.team.id));

        Ok(teams)
    }
}

#[async_trait]
impl TeamMembershipRepository for MockDatabase {
    async fn add_member(&self, data: NewMembership) -> Result<TeamMembership, AuthError> {
        let mut state = self.write()?;

        if !state.teams.iter().any(|t| t.id == data.team_id) {
            return Err(AuthError::TeamNotFound);
        }
        if !state.users.iter().any(|u| u.id == data.user_id) {
            return Err(AuthError::UserNotFound);
        }
        if state
            .memberships
            .iter()
            .any(|m| m.team_id == data.team_id && m.user_id == data.user_id)
        {
            return Err(AuthError::AlreadyMember);
        }
        if data.role == TeamRole::Owner {
            return Err(AuthError::InvalidOperation("team already has an owner"));
        }

        let now = Utc::now();
        let membership = TeamMembership {
            id: state.next_membership_id(),
            team_id: data.team_id,
            user_id: data.user_id,
            role: data.role,
            assigned_by: data.assigned_by,
            joined_at: now,
            updated_at: now,
        };
        state.memberships.push(membership.clone());

        Ok(membership)
    }

    async fn find_membership(
        &self,
        team_id: i64,
        user_id: i64,
    ) -> Result<Option<TeamMembership>, AuthError> {
        let state = self.read()?;
        Ok(state
            .memberships
            .iter()
            .find(|m| m.team_id == team_id && m.user_id == user_id)
            .cloned())
    }

    async fn list_memberships(&self, team_id: i64) -> Result<Vec<TeamMembership>, AuthError> {
        let state = self.read()?;
        Ok(state
            .memberships
            .iter()
            .filter(|m| m.team_id == team_id)
            .cloned()
            .collect())
    }

    async fn find_memberships_for_user(
        &self,
        user_id: i64,
    ) -> Result<Vec<TeamMembership>, AuthError> {
        let state = self.read()?;
        Ok(state
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn update_member_role(
        &self,
        team_id: i64,
        user_id: i64,
        role: TeamRole,
        assigned_by: i64,
    ) -> Result<TeamMembership, AuthError> {
        let mut state = self.write()?;

        let membership = state
            .memberships
            .iter_mut()
            .find(|m| m.team_id == team_id && m.user_id == user_id)
            .ok_or(AuthError::MemberNotFound)?;

        // one-owner constraint
        if membership.role == TeamRole::Owner || role == TeamRole::Owner {
            return Err(AuthError::InvalidOperation("owner role cannot be reassigned"));
        }

        membership.role = role;
        membership.assigned_by = Some(assigned_by);
        membership.updated_at = Utc::now();

        Ok(membership.clone())
    }

    async fn remove_member(&self, team_id: i64, user_id: i64) -> Result<(), AuthError> {
        let mut state = self.write()?;

        let before = state.memberships.len();
        state
            .memberships
            .retain(|m| !(m.team_id == team_id && m.user_id == user_id));

        if state.memberships.len() < before {
            Ok(())
        } else {
            Err(AuthError::MemberNotFound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SecretString;

    fn local(email: &str) -> NewUser {
        NewUser::local(email, SecretString::new("$argon2id$fake"))
    }

    #[tokio::test]
    async fn test_create_user_with_team_is_atomic_unit() {
        let db = MockDatabase::new();
        let provisioned = db
            .create_user_with_team(local("a@example.com"), "a's Team")
            .await
            .unwrap();

        assert_eq!(provisioned.team.owner_id, provisioned.user.id);
        assert_eq!(provisioned.membership.role, TeamRole::Owner);
        assert_eq!(provisioned.membership.user_id, provisioned.user.id);

        let err = db
            .create_user_with_team(local("a@example.com"), "dup")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::DuplicateEmail);
        assert_eq!(db.user_count(), 1);
        assert_eq!(db.team_count(), 1);
        assert_eq!(db.membership_count(), 1);
    }

    #[tokio::test]
    async fn test_emails_are_case_sensitive() {
        let db = MockDatabase::new();
        db.create_user_with_team(local("a@example.com"), "t").await.unwrap();
        db.create_user_with_team(local("A@example.com"), "t").await.unwrap();
        assert_eq!(db.user_count(), 2);
    }

    #[tokio::test]
    async fn test_oauth_identity_is_unique() {
        let db = MockDatabase::new();
        db.create_user_with_team(
            NewUser::oauth("a@example.com", OAuthProvider::GitHub, "1"),
            "t",
        )
        .await
        .unwrap();

        let err = db
            .create_user_with_team(NewUser::oauth("b@example.com", OAuthProvider::GitHub, "1"), "t")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::DuplicateOAuthAccount);

        // same id at another provider is a different identity
        db.create_user_with_team(NewUser::oauth("c@example.com", OAuthProvider::Google, "1"), "t")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_membership_constraints() {
        let db = MockDatabase::new();
        let owner = db.create_user_with_team(local("o@example.com"), "t").await.unwrap();
        let other = db.create_user_with_team(local("m@example.com"), "t2").await.unwrap();
        let team_id = owner.team.id;

        let add = |role| NewMembership {
            team_id,
            user_id: other.user.id,
            role,
            assigned_by: Some(owner.user.id),
        };

        assert!(matches!(
            db.add_member(add(TeamRole::Owner)).await,
            Err(AuthError::InvalidOperation(_))
        ));
        db.add_member(add(TeamRole::Developer)).await.unwrap();
        assert_eq!(db.add_member(add(TeamRole::Member)).await, Err(AuthError::AlreadyMember));

        assert!(matches!(
            db.update_member_role(team_id, owner.user.id, TeamRole::Admin, owner.user.id)
                .await,
            Err(AuthError::InvalidOperation(_))
        ));
        let updated = db
            .update_member_role(team_id, other.user.id, TeamRole::Tester, owner.user.id)
            .await
            .unwrap();
        assert_eq!(updated.role, TeamRole::Tester);
        assert_eq!(updated.assigned_by, Some(owner.user.id));

        db.remove_member(team_id, other.user.id).await.unwrap();
        assert_eq!(
            db.remove_member(team_id, other.user.id).await,
            Err(AuthError::MemberNotFound)
        );
    }

    #[tokio::test]
    async fn test_update_user_merges_fields() {
        let db = MockDatabase::new();
        let created = db.create_user_with_team(local("u@example.com"), "t").await.unwrap();

        let update = UserUpdate {
            name: Some("Updated".to_owned()),
            ..UserUpdate::default()
        };
        let user = db.update_user(created.user.id, &update).await.unwrap();
        assert_eq!(user.name.as_deref(), Some("Updated"));
        assert!(user.has_password());

        assert_eq!(
            db.update_user(999, &update).await,
            Err(AuthError::UserNotFound)
        );
    }

    #[tokio::test]
    async fn test_unavailable_database() {
        let db = MockDatabase::new();
        db.set_unavailable(true);
        assert!(matches!(
            db.find_user_by_email("x@example.com").await,
            Err(AuthError::DatabaseError(_))
        ));
        db.set_unavailable(false);
        assert_eq!(db.find_user_by_email("x@example.com").await, Ok(None));
    }
}
