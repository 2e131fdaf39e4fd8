//! Role-based access control: resolving a user's access and enforcing it.

pub mod enforcer;
pub mod resolver;

pub use enforcer::RbacEnforcer;
pub use resolver::{RbacResolver, ResolvedAccess};
