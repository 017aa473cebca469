use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use souk_authz::{Actor, Role, RoleSwitch};

/// A directory row: the stored account fields the authorization core
/// consumes, plus bookkeeping columns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActorRecord {
    pub id: String,
    pub username: String,
    pub role: Role,
    pub permissions: BTreeSet<String>,
    pub role_switch: Option<RoleSwitch>,
    pub created_at: String,
    pub updated_at: String,
}

impl ActorRecord {
    /// The view the resolver and gate operate on.
    pub fn actor(&self) -> Actor {
        Actor {
            id: self.id.clone(),
            role: self.role,
            permissions: self.permissions.clone(),
            role_switch: self.role_switch.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: i64,
    pub actor_id: Option<String>,
    pub action: String,
    pub target: Option<String>,
    pub detail: Option<String>,
    pub created_at: String,
}
