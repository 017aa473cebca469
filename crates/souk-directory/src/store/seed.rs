use souk_authz::{AuthzError, Role};

use super::ActorStore;

/// Bootstrap an empty directory with its first super-admin. A non-empty
/// directory is left untouched, so this is safe to run on every startup.
pub async fn seed_defaults(
    store: &dyn ActorStore,
    bootstrap_username: &str,
    bootstrap_password_hash: &str,
) -> Result<(), AuthzError> {
    if store.actor_count().await? > 0 {
        return Ok(());
    }

    let actor = store
        .create_actor(bootstrap_username, bootstrap_password_hash, Role::SuperAdmin)
        .await?;
    store
        .log_audit(None, "bootstrap.superadmin", Some(&actor.id), None)
        .await?;
    tracing::info!(username = bootstrap_username, "seeded bootstrap super-admin");
    Ok(())
}
