use anchor_lang::prelude::*;

use crate::constants::{HEALTH_FACTOR_MAX, MAX_POSITION_ASSETS, USER_SEED};
use crate::errors::{LendingError, LendingResult};

/// A user's balances across every bank
/// PDA Seeds: ["user", owner]
#[account]
#[derive(InitSpace)]
pub struct UserPosition {
    /// Version for future upgrades
    pub version: u8,

    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Owner of this position
    pub owner: Pubkey,

    /// Per-asset balances
    #[max_len(MAX_POSITION_ASSETS)]
    pub balances: Vec<AssetBalance>,

    /// Cached health factor (1.0 = 10000), refreshed by every action
    pub health_factor: u64,

    /// Unix timestamp of the last action touching this position
    pub last_updated: i64,
}

/// Deposit and borrow accounting for one asset
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, InitSpace, Default, Debug, PartialEq, Eq)]
pub struct AssetBalance {
    /// Token mint of the asset
    pub mint: Pubkey,

    /// Net deposited principal (native units, interest excluded)
    pub deposited_principal: u64,

    /// Deposit shares held in the bank
    pub deposit_shares: u64,

    /// Net borrowed principal (native units, interest excluded)
    pub borrowed_principal: u64,

    /// Borrow shares held in the bank
    pub borrow_shares: u64,
}

impl AssetBalance {
    fn new(mint: Pubkey) -> Self {
        Self {
            mint,
            ..Default::default()
        }
    }

    fn is_empty(&self) -> bool {
        self.deposit_shares == 0
            && self.borrow_shares == 0
            && self.deposited_principal == 0
            && self.borrowed_principal == 0
    }
}

impl UserPosition {
    pub const SEED_PREFIX: &'static [u8] = USER_SEED;

    pub fn new(owner: Pubkey, bump: u8, now: i64) -> Self {
        Self {
            version: 1,
            bump,
            owner,
            balances: Vec::new(),
            health_factor: HEALTH_FACTOR_MAX,
            last_updated: now,
        }
    }

    pub fn balance(&self, mint: &Pubkey) -> Option<&AssetBalance> {
        self.balances.iter().find(|b| &b.mint == mint)
    }

    pub fn deposit_shares(&self, mint: &Pubkey) -> u64 {
        self.balance(mint).map_or(0, |b| b.deposit_shares)
    }

    pub fn borrow_shares(&self, mint: &Pubkey) -> u64 {
        self.balance(mint).map_or(0, |b| b.borrow_shares)
    }

    pub fn has_borrows(&self) -> bool {
        self.balances.iter().any(|b| b.borrow_shares > 0)
    }

    pub fn credit_deposit(&mut self, mint: Pubkey, amount: u64, shares: u64) -> LendingResult<()> {
        let entry = self.entry(mint)?;
        let principal = entry
            .deposited_principal
            .checked_add(amount)
            .ok_or(LendingError::ArithmeticOverflow)?;
        let deposit_shares = entry
            .deposit_shares
            .checked_add(shares)
            .ok_or(LendingError::ArithmeticOverflow)?;
        entry.deposited_principal = principal;
        entry.deposit_shares = deposit_shares;
        Ok(())
    }

    /// Remove deposit shares; principal shrinks pro rata
    pub fn debit_deposit(&mut self, mint: &Pubkey, shares: u64) -> LendingResult<()> {
        let entry = self
            .balances
            .iter_mut()
            .find(|b| &b.mint == mint)
            .ok_or(LendingError::InsufficientBalance)?;
        if shares > entry.deposit_shares {
            return Err(LendingError::InsufficientBalance);
        }
        let released = pro_rata(entry.deposited_principal, shares, entry.deposit_shares);
        entry.deposited_principal -= released;
        entry.deposit_shares -= shares;
        self.prune();
        Ok(())
    }

    pub fn credit_borrow(&mut self, mint: Pubkey, amount: u64, shares: u64) -> LendingResult<()> {
        let entry = self.entry(mint)?;
        let principal = entry
            .borrowed_principal
            .checked_add(amount)
            .ok_or(LendingError::ArithmeticOverflow)?;
        let borrow_shares = entry
            .borrow_shares
            .checked_add(shares)
            .ok_or(LendingError::ArithmeticOverflow)?;
        entry.borrowed_principal = principal;
        entry.borrow_shares = borrow_shares;
        Ok(())
    }

    /// Remove borrow shares; principal shrinks pro rata
    pub fn debit_borrow(&mut self, mint: &Pubkey, shares: u64) -> LendingResult<()> {
        let entry = self
            .balances
            .iter_mut()
            .find(|b| &b.mint == mint)
            .ok_or(LendingError::InsufficientBalance)?;
        if shares > entry.borrow_shares {
            return Err(LendingError::InsufficientBalance);
        }
        let released = pro_rata(entry.borrowed_principal, shares, entry.borrow_shares);
        entry.borrowed_principal -= released;
        entry.borrow_shares -= shares;
        self.prune();
        Ok(())
    }

    fn entry(&mut self, mint: Pubkey) -> LendingResult<&mut AssetBalance> {
        let index = match self.balances.iter().position(|b| b.mint == mint) {
            Some(index) => index,
            None => {
                if self.balances.len() >= MAX_POSITION_ASSETS {
                    return Err(LendingError::TooManyAssets);
                }
                self.balances.push(AssetBalance::new(mint));
                self.balances.len() - 1
            }
        };
        Ok(&mut self.balances[index])
    }

    fn prune(&mut self) {
        self.balances.retain(|b| !b.is_empty());
    }
}

/// `principal * part / whole`; the last share releases everything left
fn pro_rata(principal: u64, part: u64, whole: u64) -> u64 {
    if part >= whole {
        return principal;
    }
    ((principal as u128 * part as u128) / whole as u128) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_position_is_empty_and_debt_free() {
        let owner = Pubkey::new_unique();
        let position = UserPosition::new(owner, 251, 42);
        assert!(position.balances.is_empty());
        assert_eq!(position.health_factor, HEALTH_FACTOR_MAX);
        assert_eq!(position.bump, 251);
        assert!(!position.has_borrows());
    }

    #[test]
    fn deposits_accumulate_per_asset() {
        let mut position = UserPosition::new(Pubkey::new_unique(), 255, 0);
        let sol = Pubkey::new_unique();
        let usdc = Pubkey::new_unique();

        position.credit_deposit(sol, 100, 100).unwrap();
        position.credit_deposit(sol, 50, 40).unwrap();
        position.credit_deposit(usdc, 7, 7).unwrap();

        assert_eq!(position.balances.len(), 2);
        assert_eq!(position.deposit_shares(&sol), 140);
        assert_eq!(position.balance(&sol).unwrap().deposited_principal, 150);
        assert_eq!(position.deposit_shares(&usdc), 7);
    }

    #[test]
    fn debit_beyond_held_shares_fails() {
        let mut position = UserPosition::new(Pubkey::new_unique(), 255, 0);
        let mint = Pubkey::new_unique();
        position.credit_deposit(mint, 100, 100).unwrap();

        assert!(matches!(
            position.debit_deposit(&mint, 101),
            Err(LendingError::InsufficientBalance)
        ));
        assert!(matches!(
            position.debit_borrow(&mint, 1),
            Err(LendingError::InsufficientBalance)
        ));
        assert!(matches!(
            position.debit_deposit(&Pubkey::new_unique(), 1),
            Err(LendingError::InsufficientBalance)
        ));
        assert_eq!(position.deposit_shares(&mint), 100);
    }

    #[test]
    fn partial_debit_releases_principal_pro_rata() {
        let mut position = UserPosition::new(Pubkey::new_unique(), 255, 0);
        let mint = Pubkey::new_unique();
        position.credit_borrow(mint, 1_000, 800).unwrap();

        position.debit_borrow(&mint, 200).unwrap();
        let balance = position.balance(&mint).unwrap();
        assert_eq!(balance.borrow_shares, 600);
        assert_eq!(balance.borrowed_principal, 750);
    }

    #[test]
    fn emptied_balances_are_pruned() {
        let mut position = UserPosition::new(Pubkey::new_unique(), 255, 0);
        let mint = Pubkey::new_unique();
        position.credit_deposit(mint, 100, 100).unwrap();
        position.debit_deposit(&mint, 100).unwrap();
        assert!(position.balance(&mint).is_none());
    }

    #[test]
    fn asset_slots_are_bounded() {
        let mut position = UserPosition::new(Pubkey::new_unique(), 255, 0);
        for _ in 0..MAX_POSITION_ASSETS {
            position.credit_deposit(Pubkey::new_unique(), 1, 1).unwrap();
        }
        assert!(matches!(
            position.credit_deposit(Pubkey::new_unique(), 1, 1),
            Err(LendingError::TooManyAssets)
        ));
    }
}
