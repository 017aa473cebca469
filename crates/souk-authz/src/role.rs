use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AuthzError;

/// Stored account role. Exactly one per actor; `SuperAdmin` exists at most
/// once per marketplace by convention (enforced by the delegation workflow,
/// which only ever moves it, never copies it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Seller,
    Admin,
    SuperAdmin,
}

impl Role {
    pub fn all() -> &'static [Role] {
        &[Role::Customer, Role::Seller, Role::Admin, Role::SuperAdmin]
    }

    /// Canonical lowercase form, the only spelling ever written back out.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Seller => "seller",
            Role::Admin => "admin",
            Role::SuperAdmin => "superadmin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AuthzError;

    /// Accepts the legacy spellings found in older account rows
    /// (`ADMIN`, `SUPER_ADMIN`, `SuperAdmin`, ...) and canonicalizes them.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let norm: String = s
            .trim()
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match norm.as_str() {
            "customer" => Ok(Role::Customer),
            "seller" | "vendor" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            "superadmin" => Ok(Role::SuperAdmin),
            _ => Err(AuthzError::InvalidInput(format!("unknown role '{s}'"))),
        }
    }
}
