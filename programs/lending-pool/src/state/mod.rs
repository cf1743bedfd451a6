pub mod bank;
pub mod lending_market;
pub mod user;

pub use bank::*;
pub use lending_market::*;
pub use user::*;
