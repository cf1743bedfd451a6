pub mod init_bank;
pub mod init_lending_market;

pub use init_bank::*;
pub use init_lending_market::*;
