use serde::{Deserialize, Serialize};

use super::{Role, SystemRole};

/// Named capability granted to a system role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    CreateProject,
    DeleteProject,
    ManageUsers,
    AssignTasks,
    ReassignTasks,
    UpdateTaskStatus,
    DeleteTasks,
    ViewAllTasks,
    ViewAssignedTasks,
    CreateTasks,
    EditTaskDetails,
    ManageTeamSettings,
    ViewAnalytics,
    BillingManagement,
    InviteUsers,
    RemoveUsers,
    ChangeUserRoles,
}

impl Permission {
    pub const ALL: [Permission; 17] = [
        Self::CreateProject,
        Self::DeleteProject,
        Self::ManageUsers,
        Self::AssignTasks,
        Self::ReassignTasks,
        Self::UpdateTaskStatus,
        Self::DeleteTasks,
        Self::ViewAllTasks,
        Self::ViewAssignedTasks,
        Self::CreateTasks,
        Self::EditTaskDetails,
        Self::ManageTeamSettings,
        Self::ViewAnalytics,
        Self::BillingManagement,
        Self::InviteUsers,
        Self::RemoveUsers,
        Self::ChangeUserRoles,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateProject => "create_project",
            Self::DeleteProject => "delete_project",
            Self::ManageUsers => "manage_users",
            Self::AssignTasks => "assign_tasks",
            Self::ReassignTasks => "reassign_tasks",
            Self::UpdateTaskStatus => "update_task_status",
            Self::DeleteTasks => "delete_tasks",
            Self::ViewAllTasks => "view_all_tasks",
            Self::ViewAssignedTasks => "view_assigned_tasks",
            Self::CreateTasks => "create_tasks",
            Self::EditTaskDetails => "edit_task_details",
            Self::ManageTeamSettings => "manage_team_settings",
            Self::ViewAnalytics => "view_analytics",
            Self::BillingManagement => "billing_management",
            Self::InviteUsers => "invite_users",
            Self::RemoveUsers => "remove_users",
            Self::ChangeUserRoles => "change_user_roles",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_str() == s)
    }

    fn bit(self) -> u32 {
        1 << (self as u32)
    }
}

/// Set of permissions packed into one word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PermissionSet(u32);

impl PermissionSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, permission: Permission) {
        self.0 |= permission.bit();
    }

    pub fn remove(&mut self, permission: Permission) {
        self.0 &= !permission.bit();
    }

    pub fn contains(&self, permission: Permission) -> bool {
        self.0 & permission.bit() != 0
    }

    pub fn is_superset(&self, other: &PermissionSet) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn len(&self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Permissions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = Permission> + '_ {
        Permission::ALL.into_iter().filter(|p| self.contains(*p))
    }
}

impl FromIterator<Permission> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = Permission>>(iter: I) -> Self {
        let mut set = Self::empty();
        for permission in iter {
            set.insert(permission);
        }
        set
    }
}

impl Serialize for PermissionSet {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

/// Immutable system role → permission table.
///
/// Built once at startup and shared through
/// [`AuthorizationModel`](super::AuthorizationModel).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RolePermissions {
    table: [PermissionSet; 6],
}

impl RolePermissions {
    /// The table every deployment starts with.
    pub fn seeded() -> Self {
        use Permission::*;

        Self::builder()
            .grant(
                SystemRole::Owner,
                [
                    CreateProject,
                    DeleteProject,
                    ManageUsers,
                    AssignTasks,
                    ReassignTasks,
                    UpdateTaskStatus,
                    DeleteTasks,
                    ViewAllTasks,
                    CreateTasks,
                    EditTaskDetails,
                    ManageTeamSettings,
                    ViewAnalytics,
                    BillingManagement,
                    InviteUsers,
                    RemoveUsers,
                    ChangeUserRoles,
                ],
            )
            .grant(
                SystemRole::Admin,
                [
                    CreateProject,
                    ManageUsers,
                    AssignTasks,
                    ReassignTasks,
                    UpdateTaskStatus,
                    DeleteTasks,
                    ViewAllTasks,
                    CreateTasks,
                    EditTaskDetails,
                    ManageTeamSettings,
                    ViewAnalytics,
                    InviteUsers,
                    RemoveUsers,
                    ChangeUserRoles,
                ],
            )
            .grant(
                SystemRole::TeamLead,
                [
                    CreateProject,
                    AssignTasks,
                    UpdateTaskStatus,
                    ViewAllTasks,
                    CreateTasks,
                    EditTaskDetails,
                    ViewAnalytics,
                ],
            )
            .grant(
                SystemRole::Developer,
                [ViewAssignedTasks, EditTaskDetails, CreateTasks],
            )
            .grant(
                SystemRole::Tester,
                [ViewAssignedTasks, EditTaskDetails, UpdateTaskStatus],
            )
            .grant(SystemRole::Member, [ViewAssignedTasks])
            .build()
    }

    pub fn builder() -> RolePermissionsBuilder {
        RolePermissionsBuilder::default()
    }

    pub fn get(&self, role: SystemRole) -> PermissionSet {
        self.table[role.index()]
    }

    /// Rows as `(role, permission)` text pairs, the shape of a seed table.
    pub fn rows(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        SystemRole::ALL.into_iter().flat_map(move |role| {
            self.get(role)
                .iter()
                .map(move |p| (role.as_str(), p.as_str()))
                .collect::<Vec<_>>()
        })
    }
}

/// Builder for custom permission tables.
#[must_use]
#[derive(Debug, Default)]
pub struct RolePermissionsBuilder {
    table: [PermissionSet; 6],
}

impl RolePermissionsBuilder {
    pub fn grant(
        mut self,
        role: SystemRole,
        permissions: impl IntoIterator<Item = Permission>,
    ) -> Self {
        let set = &mut self.table[role.index()];
        for permission in permissions {
            set.insert(permission);
        }
        self
    }

    pub fn build(self) -> RolePermissions {
        RolePermissions { table: self.table }
    }
}
