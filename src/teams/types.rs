use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::authorization::Role;
use crate::repository::User;

/// Role a user holds inside one team. Independent of [`SystemRole`].
///
/// Declaration order is the listing order for members.
///
/// [`SystemRole`]: crate::authorization::SystemRole
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TeamRole {
    Owner,
    Admin,
    TeamLead,
    Developer,
    Tester,
    Member,
}

impl TeamRole {
    pub const ALL: [TeamRole; 6] = [
        Self::Owner,
        Self::Admin,
        Self::TeamLead,
        Self::Developer,
        Self::Tester,
        Self::Member,
    ];
}

impl Role for TeamRole {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Owner => "OWNER",
            Self::Admin => "ADMIN",
            Self::TeamLead => "TEAM_LEAD",
            Self::Developer => "DEVELOPER",
            Self::Tester => "TESTER",
            Self::Member => "MEMBER",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|role| role.as_str() == s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    /// Fixed at creation. Always matches the team's OWNER membership.
    pub owner_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamMembership {
    pub id: i64,
    pub team_id: i64,
    pub user_id: i64,
    pub role: TeamRole,
    /// Who granted the current role. `None` for the creator's own membership.
    pub assigned_by: Option<i64>,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TeamMembership {
    pub fn is_owner(&self) -> bool {
        self.role == TeamRole::Owner
    }
}

/// Public part of a member's account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberProfile {
    pub id: i64,
    pub email: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
}

impl From<&User> for MemberProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            avatar_url: user.avatar_url.clone(),
        }
    }
}

/// Membership joined with the member's profile, as returned by member listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TeamMember {
    pub membership: TeamMembership,
    pub user: MemberProfile,
}

/// A team seen from one of its members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserTeam {
    pub team: Team,
    pub role: TeamRole,
    pub joined_at: DateTime<Utc>,
}
