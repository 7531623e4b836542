//! Role and permission queries
//!
//! Pure set lookups over a cached profile. `any` over an empty list is
//! `false`; `all` over an empty list is `true`.

use gatehouse_domain::UserProfile;

/// Permission and role checks
pub trait PermissionQuery {
    fn has_permission(&self, permission: &str) -> bool;

    fn has_role(&self, role: &str) -> bool;

    fn has_any_permission(&self, permissions: &[&str]) -> bool {
        permissions.iter().any(|p| self.has_permission(p))
    }

    fn has_all_permissions(&self, permissions: &[&str]) -> bool {
        permissions.iter().all(|p| self.has_permission(p))
    }

    fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|r| self.has_role(r))
    }

    fn has_all_roles(&self, roles: &[&str]) -> bool {
        roles.iter().all(|r| self.has_role(r))
    }
}

impl PermissionQuery for UserProfile {
    fn has_permission(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }

    fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

/// No profile means no permissions, not even the empty `all`.
impl<T: PermissionQuery> PermissionQuery for Option<T> {
    fn has_permission(&self, permission: &str) -> bool {
        self.as_ref().is_some_and(|inner| inner.has_permission(permission))
    }

    fn has_role(&self, role: &str) -> bool {
        self.as_ref().is_some_and(|inner| inner.has_role(role))
    }

    fn has_all_permissions(&self, permissions: &[&str]) -> bool {
        self.as_ref().is_some_and(|inner| inner.has_all_permissions(permissions))
    }

    fn has_all_roles(&self, roles: &[&str]) -> bool {
        self.as_ref().is_some_and(|inner| inner.has_all_roles(roles))
    }
}
