use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Roles a super-admin may simulate through a role switch. Deliberately
/// narrower than [`Role`]: there is no switching to `customer` (nothing to
/// test, customers hold no permissions) and no switching to `superadmin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwitchRole {
    Admin,
    Seller,
}

impl SwitchRole {
    pub fn as_role(&self) -> Role {
        match self {
            SwitchRole::Admin => Role::Admin,
            SwitchRole::Seller => Role::Seller,
        }
    }
}

/// Session-scoped impersonation state for a super-admin.
///
/// `test_permissions` non-empty fully replaces the simulated role's catalog
/// defaults; empty means "use the defaults". It never merges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleSwitch {
    pub active_role: SwitchRole,
    #[serde(default)]
    pub test_permissions: BTreeSet<String>,
}

impl RoleSwitch {
    pub fn new(active_role: SwitchRole) -> Self {
        Self { active_role, test_permissions: BTreeSet::new() }
    }

    pub fn with_permissions<I, S>(active_role: SwitchRole, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            active_role,
            test_permissions: permissions.into_iter().map(Into::into).collect(),
        }
    }
}

/// The authenticated principal as handed to us by the hosting application:
/// the stored account fields plus any active role switch.
///
/// Invariant: `role_switch` is only meaningful when `role` is
/// [`Role::SuperAdmin`]; for any other stored role the resolver ignores it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
    #[serde(default)]
    pub permissions: BTreeSet<String>,
    #[serde(default)]
    pub role_switch: Option<RoleSwitch>,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
            permissions: BTreeSet::new(),
            role_switch: None,
        }
    }

    pub fn with_permissions<I, S>(mut self, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.permissions = permissions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_role_switch(mut self, switch: RoleSwitch) -> Self {
        self.role_switch = Some(switch);
        self
    }

    /// Collapse the optional-field shape into the tagged view the resolver
    /// matches on. This is the single place the role/switch combination is
    /// interpreted.
    pub fn principal(&self) -> Principal<'_> {
        match (self.role, &self.role_switch) {
            (Role::SuperAdmin, Some(switch)) => Principal::Impersonating {
                simulated_role: switch.active_role,
                overrides: &switch.test_permissions,
            },
            (Role::SuperAdmin, None) => Principal::SuperAdmin,
            // A role switch on a non-super-admin row is stale state, not a
            // grant; the stored role wins.
            (role, _) => Principal::Direct { role, permissions: &self.permissions },
        }
    }
}

/// Tagged view of an [`Actor`] for exhaustive matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Principal<'a> {
    /// Ordinary account acting as its stored role.
    Direct {
        role: Role,
        permissions: &'a BTreeSet<String>,
    },
    /// Super-admin with no active switch; implicitly holds everything.
    SuperAdmin,
    /// Super-admin simulating a lower-privilege role.
    Impersonating {
        simulated_role: SwitchRole,
        overrides: &'a BTreeSet<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn super_admin_without_switch_is_super_admin_principal() {
        let actor = Actor::new("u1", Role::SuperAdmin);
        assert_eq!(actor.principal(), Principal::SuperAdmin);
    }

    #[test]
    fn switch_on_non_super_admin_is_ignored() {
        let actor = Actor::new("u2", Role::Admin)
            .with_permissions(["manage_orders"])
            .with_role_switch(RoleSwitch::new(SwitchRole::Seller));
        match actor.principal() {
            Principal::Direct { role, permissions } => {
                assert_eq!(role, Role::Admin);
                assert!(permissions.contains("manage_orders"));
            }
            other => panic!("expected Direct, got {other:?}"),
        }
    }

    #[test]
    fn switch_deserializes_without_test_permissions() {
        let switch: RoleSwitch =
            serde_json::from_str(r#"{"active_role":"seller"}"#).unwrap();
        assert_eq!(switch.active_role, SwitchRole::Seller);
        assert!(switch.test_permissions.is_empty());
    }
}
