//! System roles, permissions and the team-management gate.

mod permissions;
mod role;

pub use permissions::{Permission, PermissionSet, RolePermissions, RolePermissionsBuilder};
pub use role::{Role, SystemRole};

use std::sync::Arc;

use crate::teams::TeamRole;

/// Read-only permission lookups over a shared [`RolePermissions`] table.
///
/// Cloning is cheap; every clone points at the same table.
#[derive(Debug, Clone)]
pub struct AuthorizationModel {
    table: Arc<RolePermissions>,
}

impl Default for AuthorizationModel {
    fn default() -> Self {
        Self::new(RolePermissions::seeded())
    }
}

impl AuthorizationModel {
    pub fn new(table: RolePermissions) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    pub fn has_permission(&self, role: SystemRole, permission: Permission) -> bool {
        self.table.get(role).contains(permission)
    }

    pub fn permissions_for(&self, role: SystemRole) -> PermissionSet {
        self.table.get(role)
    }

    pub fn table(&self) -> &RolePermissions {
        &self.table
    }
}

/// Two-tier gate for inviting members into a team.
///
/// The caller must already have established that the inviter is a member of
/// the team; this only checks the role pair.
pub fn can_invite_members(team_role: TeamRole, system_role: SystemRole) -> bool {
    matches!(
        system_role,
        SystemRole::Owner | SystemRole::Admin | SystemRole::TeamLead
    ) && matches!(team_role, TeamRole::Owner | TeamRole::Admin)
}
