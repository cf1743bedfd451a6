use anchor_lang::prelude::*;

use crate::errors::{LendingError, LendingResult};
use crate::state::Bank;

/// A bank together with the oracle price it is valued at
#[derive(Clone)]
pub struct PricedBank {
    pub bank: Bank,
    /// USD per whole token, scaled by 10^6
    pub price: u64,
}

/// The banks and prices one operation reads, keyed by mint
#[derive(Clone, Default)]
pub struct Market {
    assets: Vec<PricedBank>,
}

impl Market {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a bank, replacing any entry for the same mint
    pub fn insert(&mut self, bank: Bank, price: u64) {
        match self.assets.iter_mut().find(|a| a.bank.mint == bank.mint) {
            Some(slot) => *slot = PricedBank { bank, price },
            None => self.assets.push(PricedBank { bank, price }),
        }
    }

    pub fn get(&self, mint: &Pubkey) -> LendingResult<&PricedBank> {
        self.assets
            .iter()
            .find(|a| &a.bank.mint == mint)
            .ok_or(LendingError::UnknownAsset)
    }

    pub fn bank(&self, mint: &Pubkey) -> LendingResult<&Bank> {
        self.get(mint).map(|a| &a.bank)
    }

    pub fn bank_mut(&mut self, mint: &Pubkey) -> LendingResult<&mut Bank> {
        self.assets
            .iter_mut()
            .find(|a| &a.bank.mint == mint)
            .map(|a| &mut a.bank)
            .ok_or(LendingError::UnknownAsset)
    }

    /// Bring every bank's interest up to `now`
    pub fn accrue_all(&mut self, now: i64) -> LendingResult<()> {
        for asset in self.assets.iter_mut() {
            asset.bank.accrue(now)?;
        }
        Ok(())
    }
}
