use std::collections::BTreeSet;

use serde::Serialize;

use crate::catalog::Catalog;
use crate::principal::{Actor, Principal};
use crate::role::Role;

/// The permission set side of a grant. `All` is the sentinel for an
/// unswitched super-admin; membership is still subject to the gate's
/// unknown-id check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "kind", content = "permissions")]
pub enum PermissionSet {
    All,
    Only(BTreeSet<String>),
}

impl PermissionSet {
    pub fn contains(&self, id: &str) -> bool {
        match self {
            PermissionSet::All => true,
            PermissionSet::Only(set) => set.contains(id),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, PermissionSet::All)
    }
}

/// Effective role + permission set for one request. Computed fresh on every
/// check; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Grant {
    pub effective_role: Role,
    pub effective_permissions: PermissionSet,
}

/// Compute the effective grant for an actor.
///
/// - Ordinary account: stored role and stored permissions. Customers always
///   resolve to the empty set, whatever the row says.
/// - Super-admin, no switch: `PermissionSet::All`.
/// - Super-admin with a switch: the simulated role; its test permissions if
///   non-empty, otherwise the catalog defaults for that role. Replacement,
///   never a merge.
pub fn resolve(catalog: &Catalog, actor: &Actor) -> Grant {
    match actor.principal() {
        Principal::Direct { role: Role::Customer, .. } => Grant {
            effective_role: Role::Customer,
            effective_permissions: PermissionSet::Only(BTreeSet::new()),
        },
        Principal::Direct { role, permissions } => Grant {
            effective_role: role,
            effective_permissions: PermissionSet::Only(permissions.clone()),
        },
        Principal::SuperAdmin => Grant {
            effective_role: Role::SuperAdmin,
            effective_permissions: PermissionSet::All,
        },
        Principal::Impersonating { simulated_role, overrides } => {
            let role = simulated_role.as_role();
            let permissions = if overrides.is_empty() {
                catalog.defaults_for(role)
            } else {
                overrides.clone()
            };
            Grant {
                effective_role: role,
                effective_permissions: PermissionSet::Only(permissions),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::{RoleSwitch, SwitchRole};

    fn catalog() -> Catalog {
        Catalog::builtin()
    }

    #[test]
    fn super_admin_without_switch_resolves_to_all() {
        let grant = resolve(&catalog(), &Actor::new("u1", Role::SuperAdmin));
        assert_eq!(grant.effective_role, Role::SuperAdmin);
        assert!(grant.effective_permissions.is_all());
    }

    #[test]
    fn switch_with_test_permissions_replaces_defaults() {
        let actor = Actor::new("u1", Role::SuperAdmin).with_role_switch(
            RoleSwitch::with_permissions(SwitchRole::Seller, ["seller_view_orders"]),
        );
        let grant = resolve(&catalog(), &actor);
        assert_eq!(grant.effective_role, Role::Seller);
        assert_eq!(
            grant.effective_permissions,
            PermissionSet::Only(BTreeSet::from(["seller_view_orders".to_string()]))
        );
    }

    #[test]
    fn switch_without_test_permissions_uses_catalog_defaults() {
        let cat = catalog();
        let actor = Actor::new("u1", Role::SuperAdmin)
            .with_role_switch(RoleSwitch::new(SwitchRole::Admin));
        let grant = resolve(&cat, &actor);
        assert_eq!(grant.effective_role, Role::Admin);
        assert_eq!(
            grant.effective_permissions,
            PermissionSet::Only(cat.defaults_for(Role::Admin))
        );
    }

    #[test]
    fn customer_always_resolves_to_empty_set() {
        // Even a corrupted row with stored grants resolves empty.
        let actor = Actor::new("u1", Role::Customer).with_permissions(["manage_orders"]);
        let grant = resolve(&catalog(), &actor);
        assert_eq!(grant.effective_role, Role::Customer);
        assert_eq!(grant.effective_permissions, PermissionSet::Only(BTreeSet::new()));
    }

    #[test]
    fn stored_grants_pass_through_for_admin_and_seller() {
        let actor = Actor::new("u1", Role::Admin)
            .with_permissions(["manage_orders", "loyalty_console"]);
        let grant = resolve(&catalog(), &actor);
        assert_eq!(grant.effective_role, Role::Admin);
        assert!(grant.effective_permissions.contains("loyalty_console"));
        assert!(!grant.effective_permissions.contains("manage_sellers"));
    }
}
