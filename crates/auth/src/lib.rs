//! `channel-auth`: consumption of permission flags.
//!
//! Nothing here authenticates anyone. The presentation layer hands over the
//! permissions it already resolved and gets back how an action should be
//! offered.

pub mod access;
pub mod permissions;

pub use access::{ActionAccess, DeniedBehavior, PermissionSet};
pub use permissions::Permission;
