//! Super-admin delegation: the two privileged mutations of the directory.
//!
//! Each call walks one pass of a small per-invocation progression: the
//! confirmation dialog collects the acting actor's password, we verify it
//! here against the stored argon2 hash, then either apply the mutation as a
//! single atomic write or reject. The password step-up is enforced at this
//! boundary, not in the caller; there is no code path that applies either
//! mutation without it.

use std::collections::BTreeSet;

use tracing::{info, warn};

use souk_authz::{AuthzError, Catalog, Role};

use crate::password::verify_password;
use crate::store::ActorStore;
use crate::types::ActorRecord;

/// Verify that `acting_id` is the stored super-admin and that `password`
/// matches its credential. Any password mismatch reports the same generic
/// [`AuthzError::AuthenticationFailed`]; the surface leaks nothing about
/// which step-up check failed.
async fn step_up(
    store: &dyn ActorStore,
    acting_id: &str,
    password: &str,
) -> Result<ActorRecord, AuthzError> {
    let acting = store.get_actor(acting_id).await?;
    // The stored role governs: an active role switch never grants (or
    // removes) delegation rights.
    if acting.role != Role::SuperAdmin {
        warn!(actor = acting_id, "delegation attempted by non-super-admin");
        return Err(AuthzError::Unauthorized);
    }
    let hash = store.get_password_hash(acting_id).await?;
    if !verify_password(password, &hash)? {
        warn!(actor = acting_id, "delegation step-up failed");
        return Err(AuthzError::AuthenticationFailed);
    }
    Ok(acting)
}

/// Move the super-admin role from `acting_id` to `target_id`.
///
/// Two-sided and atomic: the acting actor is demoted to `admin` in the same
/// transaction that promotes the target, so no read ever observes zero or
/// two super-admins across the pair. There is no undo; the former
/// super-admin keeps an admin account and nothing more.
pub async fn transfer_super_admin(
    store: &dyn ActorStore,
    acting_id: &str,
    target_id: &str,
    password: &str,
) -> Result<(), AuthzError> {
    step_up(store, acting_id, password).await?;

    if target_id == acting_id {
        return Err(AuthzError::InvalidTarget(
            "cannot transfer the super-admin role to yourself".into(),
        ));
    }
    let target = store.get_actor(target_id).await?;
    if target.role == Role::SuperAdmin {
        return Err(AuthzError::InvalidTarget(
            "target is already a super-admin".into(),
        ));
    }

    store.transfer_super_admin(acting_id, target_id).await?;
    store
        .log_audit(Some(acting_id), "superadmin.transfer", Some(target_id), None)
        .await?;
    info!(from = acting_id, to = target_id, "super-admin role transferred");
    Ok(())
}

/// Replace `target_id`'s stored permission set with `new_set`.
///
/// The target's stored role must not be `superadmin` (its grant is implicit
/// and not editable through this path) and customers never hold catalog
/// entries. Every id in `new_set` must exist in the catalog; restricted
/// entries are grantable here precisely because the verified invoker is the
/// super-admin.
pub async fn set_permissions(
    store: &dyn ActorStore,
    catalog: &Catalog,
    acting_id: &str,
    target_id: &str,
    new_set: &BTreeSet<String>,
    password: &str,
) -> Result<(), AuthzError> {
    step_up(store, acting_id, password).await?;

    let target = store.get_actor(target_id).await?;
    if target.role == Role::SuperAdmin {
        return Err(AuthzError::InvalidTarget(
            "super-admin permissions are implicit and not editable".into(),
        ));
    }
    if target.role == Role::Customer && !new_set.is_empty() {
        return Err(AuthzError::InvalidTarget(
            "customers cannot hold permissions".into(),
        ));
    }
    for id in new_set {
        if !catalog.contains(id) {
            return Err(AuthzError::UnknownPermission(id.clone()));
        }
    }

    store.set_permissions(target_id, new_set).await?;
    let detail = serde_json::to_string(new_set)
        .map_err(|e| AuthzError::Internal(format!("audit detail encode: {e}")))?;
    store
        .log_audit(Some(acting_id), "permissions.set", Some(target_id), Some(&detail))
        .await?;
    info!(
        actor = acting_id,
        target = target_id,
        count = new_set.len(),
        "permission set replaced"
    );
    Ok(())
}
