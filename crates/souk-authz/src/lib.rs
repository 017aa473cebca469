pub mod catalog;
pub mod error;
pub mod gate;
pub mod principal;
pub mod resolver;
pub mod role;

pub use catalog::{Catalog, Permission, PermissionCategory};
pub use error::{AuthzError, Result};
pub use gate::{can_perform, require_permission};
pub use principal::{Actor, Principal, RoleSwitch, SwitchRole};
pub use resolver::{Grant, PermissionSet, resolve};
pub use role::Role;
