//! User domain entities.

pub mod model;
pub mod status;

pub use model::{User, UserProfile};
pub use status::UserStatus;
