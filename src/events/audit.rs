use chrono::{DateTime, Utc};

use crate::identity::OAuthProvider;
use crate::teams::TeamRole;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuditEvent {
    SignedUp {
        user_id: i64,
        email: String,
        team_id: i64,
        at: DateTime<Utc>,
    },
    LoggedIn {
        user_id: i64,
        email: String,
        at: DateTime<Utc>,
    },
    LoginFailed {
        email: String,
        reason: &'static str,
        at: DateTime<Utc>,
    },
    OAuthLogin {
        user_id: i64,
        provider: OAuthProvider,
        /// Whether this login created the account.
        created: bool,
        at: DateTime<Utc>,
    },
    TokenRefreshed {
        user_id: i64,
        at: DateTime<Utc>,
    },
    LoggedOut {
        user_id: i64,
        /// False when the revocation store could not be reached.
        revoked: bool,
        at: DateTime<Utc>,
    },
    ProfileUpdated {
        user_id: i64,
        at: DateTime<Utc>,
    },
    TeamCreated {
        team_id: i64,
        owner_id: i64,
        at: DateTime<Utc>,
    },
    MemberInvited {
        team_id: i64,
        user_id: i64,
        invited_by: i64,
        role: TeamRole,
        at: DateTime<Utc>,
    },
    RoleChanged {
        team_id: i64,
        user_id: i64,
        changed_by: i64,
        from: TeamRole,
        to: TeamRole,
        at: DateTime<Utc>,
    },
    MemberRemoved {
        team_id: i64,
        user_id: i64,
        removed_by: i64,
        at: DateTime<Utc>,
    },
    LeftTeam {
        team_id: i64,
        user_id: i64,
        at: DateTime<Utc>,
    },
}

impl AuditEvent {
    /// Audit action code, as stored in an audit trail.
    pub fn action(&self) -> &'static str {
        match self {
            Self::SignedUp { .. } => "SIGNUP",
            Self::LoggedIn { .. } => "LOGIN",
            Self::LoginFailed { .. } => "LOGIN_FAILED",
            Self::OAuthLogin { .. } => "OAUTH_LOGIN",
            Self::TokenRefreshed { .. } => "TOKEN_REFRESHED",
            Self::LoggedOut { .. } => "LOGOUT",
            Self::ProfileUpdated { .. } => "UPDATE_PROFILE",
            Self::TeamCreated { .. } => "TEAM_CREATED",
            Self::MemberInvited { .. } => "INVITE",
            Self::RoleChanged { .. } => "ROLE_CHANGED",
            Self::MemberRemoved { .. } => "MEMBER_REMOVED",
            Self::LeftTeam { .. } => "LEAVE_TEAM",
        }
    }

    /// User who performed the action, when known.
    pub fn actor_id(&self) -> Option<i64> {
        match self {
            Self::LoginFailed { .. } => None,
            Self::SignedUp { user_id, .. }
            | Self::LoggedIn { user_id, .. }
            | Self::OAuthLogin { user_id, .. }
            | Self::TokenRefreshed { user_id, .. }
            | Self::LoggedOut { user_id, .. }
            | Self::ProfileUpdated { user_id, .. }
            | Self::LeftTeam { user_id, .. } => Some(*user_id),
            Self::TeamCreated { owner_id, .. } => Some(*owner_id),
            Self::MemberInvited { invited_by, .. } => Some(*invited_by),
            Self::RoleChanged { changed_by, .. } => Some(*changed_by),
            Self::MemberRemoved { removed_by, .. } => Some(*removed_by),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::SignedUp { at, .. }
            | Self::LoggedIn { at, .. }
            | Self::LoginFailed { at, .. }
            | Self::OAuthLogin { at, .. }
            | Self::TokenRefreshed { at, .. }
            | Self::LoggedOut { at, .. }
            | Self::ProfileUpdated { at, .. }
            | Self::TeamCreated { at, .. }
            | Self::MemberInvited { at, .. }
            | Self::RoleChanged { at, .. }
            | Self::MemberRemoved { at, .. }
            | Self::LeftTeam { at, .. } => *at,
        }
    }
}
