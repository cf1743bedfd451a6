pub mod refresh_bank;
pub mod liquidate;

pub use refresh_bank::*;
pub use liquidate::*;
