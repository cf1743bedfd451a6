pub mod admin;
pub mod market;
pub mod permissionless;
pub mod user;

pub use admin::*;
pub use permissionless::*;
pub use user::*;
