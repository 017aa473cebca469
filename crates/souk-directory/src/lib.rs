pub mod delegation;
pub mod password;
pub mod store;
pub mod types;

pub use delegation::{set_permissions, transfer_super_admin};
pub use password::{hash_password, verify_password};
pub use store::{ActorStore, SqliteActorStore};
pub use types::{ActorRecord, AuditEntry};
