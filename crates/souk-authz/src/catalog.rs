use std::collections::{BTreeSet, HashMap};

use serde::Serialize;

use crate::role::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionCategory {
    Admin,
    Seller,
    Restricted,
    Feature,
}

/// One catalog entry. `default_for` lists the roles that receive the
/// permission automatically; always empty for `Restricted` and `Feature`
/// entries, which must be granted explicitly.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Permission {
    pub id: &'static str,
    pub description: &'static str,
    pub category: PermissionCategory,
    pub default_for: &'static [Role],
    #[serde(skip)]
    super_admin_gated: bool,
}

impl Permission {
    /// True when only a super-admin may grant this permission. Derived:
    /// every `Restricted` entry is super-admin-only, plus any entry
    /// explicitly gated in the table below.
    pub fn super_admin_only(&self) -> bool {
        matches!(self.category, PermissionCategory::Restricted) || self.super_admin_gated
    }
}

const fn perm(
    id: &'static str,
    description: &'static str,
    category: PermissionCategory,
    default_for: &'static [Role],
) -> Permission {
    Permission { id, description, category, default_for, super_admin_gated: false }
}

const fn gated(
    id: &'static str,
    description: &'static str,
    category: PermissionCategory,
) -> Permission {
    Permission { id, description, category, default_for: &[], super_admin_gated: true }
}

const ADMIN: &[Role] = &[Role::Admin];
const SELLER: &[Role] = &[Role::Seller];

/// Builtin permission table. Order here is the order `list` reports.
pub const CATALOG: &[Permission] = &[
    // Admin console
    perm("manage_products", "Create, edit, and remove catalog products", PermissionCategory::Admin, ADMIN),
    perm("manage_orders", "View and update all marketplace orders", PermissionCategory::Admin, ADMIN),
    perm("manage_categories", "Manage the category tree and attributes", PermissionCategory::Admin, ADMIN),
    perm("manage_customers", "View and edit customer accounts", PermissionCategory::Admin, ADMIN),
    perm("manage_sellers", "Approve and suspend seller accounts", PermissionCategory::Admin, ADMIN),
    perm("manage_coupons", "Create and expire discount coupons", PermissionCategory::Admin, ADMIN),
    perm("manage_banners", "Manage storefront banners and campaigns", PermissionCategory::Admin, ADMIN),
    perm("manage_support_chat", "Moderate customer support chat", PermissionCategory::Admin, ADMIN),
    perm("view_reports", "View sales and traffic reports", PermissionCategory::Admin, ADMIN),
    // Seller dashboard
    perm("seller_manage_products", "Manage own product listings", PermissionCategory::Seller, SELLER),
    perm("seller_view_orders", "View orders for own products", PermissionCategory::Seller, SELLER),
    perm("seller_fulfill_orders", "Update fulfilment status on own orders", PermissionCategory::Seller, SELLER),
    perm("seller_view_earnings", "View own earnings and payout history", PermissionCategory::Seller, SELLER),
    perm("seller_manage_profile", "Edit own shop profile", PermissionCategory::Seller, SELLER),
    // Restricted: grantable by the super-admin only, never a role default
    perm("manage_admins", "Create admin accounts and edit their permissions", PermissionCategory::Restricted, &[]),
    perm("manage_payouts", "Release seller payouts", PermissionCategory::Restricted, &[]),
    perm("manage_site_settings", "Edit platform-wide settings", PermissionCategory::Restricted, &[]),
    // Feature toggles, granted per account
    perm("loyalty_console", "Operate the loyalty points console", PermissionCategory::Feature, &[]),
    perm("spin_wheel_console", "Configure the spin-wheel promotion", PermissionCategory::Feature, &[]),
    perm("ai_merchandising", "Use AI-assisted merchandising tools", PermissionCategory::Feature, &[]),
    gated("push_broadcast", "Send web push broadcasts to all shoppers", PermissionCategory::Feature),
];

/// Immutable, load-once registry over [`CATALOG`]. Construct it once at
/// startup and share it; every accessor is a read.
pub struct Catalog {
    entries: &'static [Permission],
    index: HashMap<&'static str, usize>,
}

impl Catalog {
    pub fn builtin() -> Self {
        let index = CATALOG
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect();
        Self { entries: CATALOG, index }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Permission> {
        self.index.get(id).map(|&i| &self.entries[i])
    }

    /// Entries in table order, optionally filtered by category.
    pub fn list(&self, category: Option<PermissionCategory>) -> impl Iterator<Item = &Permission> {
        self.entries
            .iter()
            .filter(move |p| category.is_none_or(|c| p.category == c))
    }

    /// True when the permission may only be granted by a super-admin.
    /// Unknown ids report false; the gate already denies them outright.
    pub fn is_restricted(&self, id: &str) -> bool {
        self.get(id).map(|p| p.super_admin_only()).unwrap_or(false)
    }

    /// Permission ids a role receives automatically. Empty for `Customer`
    /// (customers never hold catalog entries) and for `SuperAdmin` (whose
    /// grant is implicit in the resolver, not enumerated here).
    pub fn defaults_for(&self, role: Role) -> BTreeSet<String> {
        self.entries
            .iter()
            .filter(|p| p.default_for.contains(&role))
            .map(|p| p.id.to_string())
            .collect()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_restricted_entry_is_super_admin_only() {
        let cat = Catalog::builtin();
        for p in cat.list(Some(PermissionCategory::Restricted)) {
            assert!(p.super_admin_only(), "{} must be super-admin-only", p.id);
            assert!(p.default_for.is_empty(), "{} must have no role defaults", p.id);
        }
    }

    #[test]
    fn explicitly_gated_entries_report_restricted() {
        let cat = Catalog::builtin();
        assert!(cat.is_restricted("push_broadcast"));
        assert!(cat.is_restricted("manage_payouts"));
        assert!(!cat.is_restricted("seller_view_orders"));
        assert!(!cat.is_restricted("no_such_permission"));
    }

    #[test]
    fn defaults_by_role() {
        let cat = Catalog::builtin();
        let admin = cat.defaults_for(Role::Admin);
        assert!(admin.contains("manage_orders"));
        assert!(!admin.contains("seller_view_orders"));
        assert!(!admin.contains("manage_site_settings"));

        let seller = cat.defaults_for(Role::Seller);
        assert!(seller.contains("seller_view_orders"));
        assert!(!seller.contains("manage_orders"));

        assert!(cat.defaults_for(Role::Customer).is_empty());
        assert!(cat.defaults_for(Role::SuperAdmin).is_empty());
    }

    #[test]
    fn list_preserves_table_order_and_filters() {
        let cat = Catalog::builtin();
        let all: Vec<_> = cat.list(None).map(|p| p.id).collect();
        assert_eq!(all.len(), cat.len());
        assert_eq!(all[0], "manage_products");

        let features: Vec<_> = cat
            .list(Some(PermissionCategory::Feature))
            .map(|p| p.id)
            .collect();
        assert_eq!(
            features,
            vec!["loyalty_console", "spin_wheel_console", "ai_merchandising", "push_broadcast"]
        );
    }

    #[test]
    fn unknown_id_is_absent() {
        let cat = Catalog::builtin();
        assert!(cat.get("teleport_orders").is_none());
        assert!(!cat.contains("teleport_orders"));
    }
}
