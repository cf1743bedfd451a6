use anchor_lang::prelude::*;

use crate::constants::LENDING_MARKET_SEED;

/// Global admin record of the lending pool
/// PDA Seeds: ["lending_market"]
#[account]
#[derive(InitSpace)]
pub struct LendingMarket {
    /// Version for future upgrades
    pub version: u8,

    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Authority allowed to create banks
    pub authority: Pubkey,
}

impl LendingMarket {
    pub const SEED_PREFIX: &'static [u8] = LENDING_MARKET_SEED;

    pub fn new(authority: Pubkey, bump: u8) -> Self {
        Self {
            version: 1,
            bump,
            authority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_market_records_authority() {
        let authority = Pubkey::new_unique();
        let market = LendingMarket::new(authority, 250);
        assert_eq!(market.authority, authority);
        assert_eq!(market.bump, 250);
        assert_eq!(market.version, 1);
    }
}
