pub mod seed;
pub mod sqlite;

pub use sqlite::SqliteActorStore;

use std::collections::BTreeSet;

use async_trait::async_trait;

use souk_authz::{AuthzError, Role, RoleSwitch};

use crate::types::{ActorRecord, AuditEntry};

#[async_trait]
pub trait ActorStore: Send + Sync {
    // Actors
    async fn create_actor(
        &self,
        username: &str,
        password_hash: &str,
        role: Role,
    ) -> Result<ActorRecord, AuthzError>;
    async fn get_actor(&self, id: &str) -> Result<ActorRecord, AuthzError>;
    async fn get_actor_by_username(&self, username: &str) -> Result<ActorRecord, AuthzError>;
    async fn list_actors(&self) -> Result<Vec<ActorRecord>, AuthzError>;
    async fn delete_actor(&self, id: &str) -> Result<(), AuthzError>;
    async fn actor_count(&self) -> Result<u64, AuthzError>;

    // Credentials
    async fn get_password_hash(&self, id: &str) -> Result<String, AuthzError>;
    async fn update_password(&self, id: &str, password_hash: &str) -> Result<(), AuthzError>;

    // Role switch (super-admin impersonation; `None` clears it)
    async fn set_role_switch(
        &self,
        id: &str,
        switch: Option<RoleSwitch>,
    ) -> Result<(), AuthzError>;

    // Privileged mutations. Both are single atomic writes; policy checks
    // (step-up password, eligibility) live in `delegation`, not here.
    async fn set_permissions(
        &self,
        id: &str,
        permissions: &BTreeSet<String>,
    ) -> Result<(), AuthzError>;
    async fn transfer_super_admin(&self, from_id: &str, to_id: &str) -> Result<(), AuthzError>;

    // Audit
    async fn log_audit(
        &self,
        actor_id: Option<&str>,
        action: &str,
        target: Option<&str>,
        detail: Option<&str>,
    ) -> Result<(), AuthzError>;
    async fn list_audit(&self, limit: u32, offset: u32) -> Result<Vec<AuditEntry>, AuthzError>;

    // Lifecycle
    async fn migrate(&self) -> Result<(), AuthzError>;
    async fn seed_defaults(
        &self,
        bootstrap_username: &str,
        bootstrap_password_hash: &str,
    ) -> Result<(), AuthzError>;
}
