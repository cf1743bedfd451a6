pub mod init_user;
pub mod deposit;
pub mod withdraw;
pub mod borrow;
pub mod repay;

pub use init_user::*;
pub use deposit::*;
pub use withdraw::*;
pub use borrow::*;
pub use repay::*;
