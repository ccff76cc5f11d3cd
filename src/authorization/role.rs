use serde::{Deserialize, Serialize};

/// Role enums stored as text columns.
///
/// ```rust
/// use teamward::authorization::{Role, SystemRole};
///
/// assert_eq!(SystemRole::TeamLead.as_str(), "TEAM_LEAD");
/// assert_eq!(SystemRole::parse("TESTER"), Some(SystemRole::Tester));
/// assert_eq!(SystemRole::parse("tester"), None);
/// ```
pub trait Role: Copy + Send + Sync + 'static {
    fn as_str(&self) -> &'static str;

    fn parse(s: &str) -> Option<Self>;
}

/// Account-wide privilege tier.
///
/// Declaration order runs from most to least privileged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemRole {
    Owner,
    Admin,
    TeamLead,
    Developer,
    Tester,
    #[default]
    Member,
}

impl SystemRole {
    pub const ALL: [SystemRole; 6] = [
        Self::Owner,
        Self::Admin,
        Self::TeamLead,
        Self::Developer,
        Self::Tester,
        Self::Member,
    ];

    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

impl Role for SystemRole {
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

impl std::fmt::Display for SystemRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
