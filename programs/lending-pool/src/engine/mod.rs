//! Pure accounting engine.
//!
//! Nothing in here touches accounts or the clock: callers pass the priced
//! [`Market`], the positions and `now` explicitly, and every action either
//! commits all of its changes or none.

pub mod actions;
pub mod liquidation;
pub mod market;
pub mod risk;

pub use actions::*;
pub use liquidation::*;
pub use market::*;
pub use risk::*;

#[cfg(test)]
pub(crate) mod tests {
    use anchor_lang::prelude::*;

    use super::actions;
    use super::market::Market;
    use crate::state::bank::tests::bank_with;
    use crate::state::{BankConfig, UserPosition};

    /// $1, 6 decimals
    pub const USDC_PRICE: u64 = 1_000_000;
    /// $150, 9 decimals
    pub const SOL_PRICE: u64 = 150_000_000;

    pub fn usdc_config() -> BankConfig {
        BankConfig {
            max_ltv_bps: 8_000,
            liquidation_threshold_bps: 8_500,
            liquidation_bonus_bps: 500,
            close_factor_bps: 5_000,
            interest_rate_bps: 1_000,
        }
    }

    pub fn sol_config() -> BankConfig {
        BankConfig {
            max_ltv_bps: 7_000,
            liquidation_threshold_bps: 8_000,
            liquidation_bonus_bps: 1_000,
            close_factor_bps: 5_000,
            interest_rate_bps: 500,
        }
    }

    pub struct Fixture {
        pub market: Market,
        pub usdc: Pubkey,
        pub sol: Pubkey,
        pub now: i64,
    }

    pub fn fixture() -> Fixture {
        let usdc = Pubkey::new_unique();
        let sol = Pubkey::new_unique();
        let mut market = Market::new();
        market.insert(bank_with(usdc, 6, usdc_config()), USDC_PRICE);
        market.insert(bank_with(sol, 9, sol_config()), SOL_PRICE);
        Fixture {
            market,
            usdc,
            sol,
            now: 0,
        }
    }

    impl Fixture {
        pub fn user(&self) -> UserPosition {
            UserPosition::new(Pubkey::new_unique(), 255, self.now)
        }

        pub fn deposit(&mut self, position: &mut UserPosition, mint: Pubkey, amount: u64) {
            let owner = position.owner;
            if let Err(err) = actions::deposit(&mut self.market, position, &owner, &mint, amount, self.now) {
                panic!("deposit failed: {err:?}");
            }
        }

        pub fn borrow(&mut self, position: &mut UserPosition, mint: Pubkey, amount: u64) {
            let owner = position.owner;
            if let Err(err) = actions::borrow(&mut self.market, position, &owner, &mint, amount, self.now) {
                panic!("borrow failed: {err:?}");
            }
        }

        pub fn depositor(&mut self, mint: Pubkey, amount: u64) -> UserPosition {
            let mut position = self.user();
            self.deposit(&mut position, mint, amount);
            position
        }

        /// Move an oracle price without touching bank state
        pub fn set_price(&mut self, mint: Pubkey, price: u64) {
            let bank = match self.market.bank(&mint) {
                Ok(bank) => bank.clone(),
                Err(err) => panic!("unknown bank: {err:?}"),
            };
            self.market.insert(bank, price);
        }
    }
}
