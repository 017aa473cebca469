use crate::catalog::Catalog;
use crate::error::AuthzError;
use crate::principal::Actor;
use crate::resolver::resolve;

/// Whether `actor` may perform the operation guarded by `permission_id`.
///
/// Pure predicate, never errors. Ids missing from the catalog are always
/// denied, for every principal including an unswitched super-admin:
/// unrecognized capabilities are never implicitly granted.
pub fn can_perform(catalog: &Catalog, actor: &Actor, permission_id: &str) -> bool {
    if !catalog.contains(permission_id) {
        return false;
    }
    resolve(catalog, actor)
        .effective_permissions
        .contains(permission_id)
}

/// `Result` wrapper over [`can_perform`] for route layers that want to `?`
/// straight out of a handler.
pub fn require_permission(
    catalog: &Catalog,
    actor: &Actor,
    permission_id: &str,
) -> Result<(), AuthzError> {
    if can_perform(catalog, actor, permission_id) {
        Ok(())
    } else {
        Err(AuthzError::Unauthorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::principal::{RoleSwitch, SwitchRole};
    use crate::role::Role;

    #[test]
    fn customer_is_denied_every_catalog_permission() {
        let cat = Catalog::builtin();
        let actor = Actor::new("c1", Role::Customer);
        for p in cat.list(None) {
            assert!(!can_perform(&cat, &actor, p.id), "customer allowed {}", p.id);
        }
    }

    #[test]
    fn unswitched_super_admin_is_allowed_every_catalog_permission() {
        let cat = Catalog::builtin();
        let actor = Actor::new("s1", Role::SuperAdmin);
        for p in cat.list(None) {
            assert!(can_perform(&cat, &actor, p.id), "super-admin denied {}", p.id);
        }
    }

    #[test]
    fn unknown_permission_is_denied_even_for_super_admin() {
        let cat = Catalog::builtin();
        assert!(!can_perform(&cat, &Actor::new("s1", Role::SuperAdmin), "no_such_permission"));
    }

    #[test]
    fn switched_super_admin_is_bounded_by_the_simulated_grant() {
        let cat = Catalog::builtin();
        let actor = Actor::new("s1", Role::SuperAdmin).with_role_switch(
            RoleSwitch::with_permissions(SwitchRole::Seller, ["seller_view_orders"]),
        );
        assert!(can_perform(&cat, &actor, "seller_view_orders"));
        assert!(!can_perform(&cat, &actor, "seller_manage_products"));
        assert!(!can_perform(&cat, &actor, "manage_site_settings"));
    }

    #[test]
    fn admin_grant_does_not_leak_across_actors() {
        let cat = Catalog::builtin();
        let granted = Actor::new("a1", Role::Admin).with_permissions(["manage_orders"]);
        let ungranted = Actor::new("a2", Role::Admin);
        assert!(can_perform(&cat, &granted, "manage_orders"));
        assert!(!can_perform(&cat, &ungranted, "manage_orders"));
    }

    #[test]
    fn require_permission_maps_denial_to_unauthorized() {
        let cat = Catalog::builtin();
        let actor = Actor::new("c1", Role::Customer);
        assert!(matches!(
            require_permission(&cat, &actor, "manage_orders"),
            Err(AuthzError::Unauthorized)
        ));
        assert!(require_permission(&cat, &Actor::new("s1", Role::SuperAdmin), "manage_orders").is_ok());
    }
}
