use anchor_lang::prelude::*;

use crate::constants::{BANK_SEED, BPS_DENOMINATOR, SECONDS_PER_YEAR};
use crate::errors::{LendingError, LendingResult};
use crate::math::{to_amount, to_amount_ceil, to_shares, to_shares_ceil};

/// Per-asset liquidity pool
/// PDA Seeds: ["bank", mint]
#[account]
#[derive(InitSpace)]
pub struct Bank {
    /// Version for future upgrades
    pub version: u8,

    /// Bump seed for PDA derivation
    pub bump: u8,

    /// Bump seed of the token vault PDA
    pub vault_bump: u8,

    /// Administrator that created the bank
    pub authority: Pubkey,

    /// Token mint of the underlying asset
    pub mint: Pubkey,

    /// Token decimals (cached for valuation)
    pub decimals: u8,

    /// Vault holding the deposited tokens
    /// PDA Seeds: ["treasury", mint]
    pub vault: Pubkey,

    /// Pyth feed id pricing this asset in USD
    pub price_feed_id: [u8; 32],

    /// Total tokens deposited, accrued interest included (native units)
    pub total_deposited: u64,

    /// Total deposit shares outstanding
    pub total_deposit_shares: u64,

    /// Total tokens borrowed, accrued interest included (native units)
    pub total_borrowed: u64,

    /// Total borrow shares outstanding
    pub total_borrow_shares: u64,

    /// Risk parameters, fixed at creation
    pub config: BankConfig,

    /// Unix timestamp of the last interest accrual
    pub last_accrual_timestamp: i64,
}

/// Risk and rate parameters of a bank, all in BPS
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, InitSpace, Default, Debug, PartialEq, Eq)]
pub struct BankConfig {
    /// Loan-to-Value ratio (max borrow power)
    /// e.g., 8000 = 80%
    pub max_ltv_bps: u16,

    /// Collateral weight used by the health factor
    /// e.g., 8500 = 85%
    pub liquidation_threshold_bps: u16,

    /// Extra collateral a liquidator receives
    /// e.g., 500 = 5%
    pub liquidation_bonus_bps: u16,

    /// Maximum share of a debt repayable in one liquidation
    /// e.g., 5000 = 50%
    pub close_factor_bps: u16,

    /// Annualized simple interest rate charged to borrowers
    pub interest_rate_bps: u16,
}

impl BankConfig {
    pub fn validate(&self) -> LendingResult<()> {
        let max = BPS_DENOMINATOR as u16;
        let in_range = [
            self.max_ltv_bps,
            self.liquidation_threshold_bps,
            self.liquidation_bonus_bps,
            self.close_factor_bps,
            self.interest_rate_bps,
        ]
        .iter()
        .all(|bps| *bps <= max);

        if !in_range || self.max_ltv_bps >= self.liquidation_threshold_bps {
            return Err(LendingError::InvalidParameter);
        }
        Ok(())
    }
}

/// Bank and vault PDAs as resolved by the instruction context
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BankAddresses {
    pub bump: u8,
    pub vault: Pubkey,
    pub vault_bump: u8,
}

impl Bank {
    pub const SEED_PREFIX: &'static [u8] = BANK_SEED;

    /// Build a fresh bank with zeroed totals
    pub fn new(
        authority: Pubkey,
        mint: Pubkey,
        decimals: u8,
        addresses: BankAddresses,
        price_feed_id: [u8; 32],
        config: BankConfig,
        now: i64,
    ) -> LendingResult<Self> {
        config.validate()?;

        Ok(Self {
            version: 1,
            bump: addresses.bump,
            vault_bump: addresses.vault_bump,
            authority,
            mint,
            decimals,
            vault: addresses.vault,
            price_feed_id,
            total_deposited: 0,
            total_deposit_shares: 0,
            total_borrowed: 0,
            total_borrow_shares: 0,
            config,
            last_accrual_timestamp: now,
        })
    }

    /// Tokens in the vault that are not out on loan
    pub fn available_liquidity(&self) -> u64 {
        self.total_deposited.saturating_sub(self.total_borrowed)
    }

    /// Current utilization rate in BPS
    pub fn utilization_bps(&self) -> u64 {
        if self.total_deposited == 0 {
            return 0;
        }
        ((self.total_borrowed as u128 * BPS_DENOMINATOR as u128) / self.total_deposited as u128)
            as u64
    }

    /// Amount redeemable for deposit shares
    pub fn deposit_value(&self, shares: u64) -> LendingResult<u64> {
        to_amount(shares, self.total_deposited, self.total_deposit_shares)
    }

    /// Amount owed for borrow shares
    pub fn debt_value(&self, shares: u64) -> LendingResult<u64> {
        to_amount_ceil(shares, self.total_borrowed, self.total_borrow_shares)
    }

    /// Deposit shares to burn to receive `amount`
    pub fn withdraw_shares_for(&self, amount: u64) -> LendingResult<u64> {
        to_shares_ceil(amount, self.total_deposited, self.total_deposit_shares)
    }

    /// Deposit shares worth at most `amount`
    pub fn deposit_shares_for(&self, amount: u64) -> LendingResult<u64> {
        if self.total_deposit_shares == 0 {
            return Ok(0);
        }
        to_shares(amount, self.total_deposited, self.total_deposit_shares)
    }

    /// Borrow shares a repayment of `amount` retires, capped to what `held` covers.
    ///
    /// Returns `(shares, amount_owed)`; `amount_owed <= amount` unless the
    /// whole holding is retired, in which case it is the full debt.
    pub fn repay_shares_for(&self, amount: u64, held: u64) -> LendingResult<(u64, u64)> {
        let full_debt = self.debt_value(held)?;
        if amount >= full_debt {
            return Ok((held, full_debt));
        }
        let shares = to_shares(amount, self.total_borrowed, self.total_borrow_shares)?;
        Ok((shares, self.debt_value(shares)?))
    }

    /// Add `amount` to the pool and mint deposit shares
    pub fn record_deposit(&mut self, amount: u64) -> LendingResult<u64> {
        if amount == 0 {
            return Err(LendingError::InvalidAmount);
        }
        let shares = to_shares(amount, self.total_deposited, self.total_deposit_shares)?;
        if shares == 0 {
            return Err(LendingError::InvalidAmount);
        }
        let total_deposited = self
            .total_deposited
            .checked_add(amount)
            .ok_or(LendingError::ArithmeticOverflow)?;
        let total_deposit_shares = self
            .total_deposit_shares
            .checked_add(shares)
            .ok_or(LendingError::ArithmeticOverflow)?;

        self.total_deposited = total_deposited;
        self.total_deposit_shares = total_deposit_shares;
        Ok(shares)
    }

    /// Burn deposit shares and release the underlying amount
    pub fn record_withdraw(&mut self, shares: u64) -> LendingResult<u64> {
        if shares == 0 {
            return Err(LendingError::InvalidAmount);
        }
        if shares > self.total_deposit_shares {
            return Err(LendingError::InsufficientBalance);
        }
        let amount = self.deposit_value(shares)?;
        if amount > self.available_liquidity() {
            return Err(LendingError::InsufficientLiquidity);
        }

        self.total_deposited -= amount;
        self.total_deposit_shares -= shares;
        Ok(amount)
    }

    /// Lend `amount` out of the pool and mint borrow shares
    pub fn record_borrow(&mut self, amount: u64) -> LendingResult<u64> {
        if amount == 0 {
            return Err(LendingError::InvalidAmount);
        }
        if amount > self.available_liquidity() {
            return Err(LendingError::InsufficientLiquidity);
        }
        let shares = to_shares_ceil(amount, self.total_borrowed, self.total_borrow_shares)?;
        let total_borrow_shares = self
            .total_borrow_shares
            .checked_add(shares)
            .ok_or(LendingError::ArithmeticOverflow)?;

        self.total_borrowed += amount;
        self.total_borrow_shares = total_borrow_shares;
        Ok(shares)
    }

    /// Burn borrow shares against a repayment; returns the amount owed
    pub fn record_repay(&mut self, shares: u64) -> LendingResult<u64> {
        if shares == 0 {
            return Err(LendingError::InvalidAmount);
        }
        if shares > self.total_borrow_shares {
            return Err(LendingError::InsufficientBalance);
        }
        let amount = self.debt_value(shares)?;
        let total_borrowed = self
            .total_borrowed
            .checked_sub(amount)
            .ok_or(LendingError::LedgerInvariantViolated)?;

        self.total_borrowed = total_borrowed;
        self.total_borrow_shares -= shares;
        Ok(amount)
    }

    /// Accrue simple interest up to `now`; returns the interest added.
    ///
    /// interest = total_borrowed * rate_bps * elapsed / (10000 * seconds_per_year)
    ///
    /// Interest is added to both totals: borrow shares owe more and deposit
    /// shares redeem more, keeping `total_borrowed <= total_deposited`.
    pub fn accrue(&mut self, now: i64) -> LendingResult<u64> {
        let elapsed = now.saturating_sub(self.last_accrual_timestamp);
        if elapsed <= 0 {
            return Ok(0);
        }

        let interest = calculate_interest(
            self.total_borrowed,
            self.config.interest_rate_bps,
            elapsed as u64,
        )?;
        let total_borrowed = self
            .total_borrowed
            .checked_add(interest)
            .ok_or(LendingError::ArithmeticOverflow)?;
        let total_deposited = self
            .total_deposited
            .checked_add(interest)
            .ok_or(LendingError::ArithmeticOverflow)?;

        self.total_borrowed = total_borrowed;
        self.total_deposited = total_deposited;
        self.last_accrual_timestamp = now;
        Ok(interest)
    }

    /// Solvency and share-consistency check run after every settlement
    pub fn check_invariants(&self) -> LendingResult<()> {
        let solvent = self.total_borrowed <= self.total_deposited;
        let deposits_backed = self.total_deposit_shares > 0 || self.total_deposited == 0;
        let borrows_backed = self.total_borrow_shares > 0 || self.total_borrowed == 0;
        if solvent && deposits_backed && borrows_backed {
            Ok(())
        } else {
            Err(LendingError::LedgerInvariantViolated)
        }
    }
}

/// Simple interest on `principal` over `elapsed_seconds`
fn calculate_interest(principal: u64, rate_bps: u16, elapsed_seconds: u64) -> LendingResult<u64> {
    let numerator = (principal as u128)
        .checked_mul(rate_bps as u128)
        .and_then(|n| n.checked_mul(elapsed_seconds as u128))
        .ok_or(LendingError::ArithmeticOverflow)?;
    let denominator = BPS_DENOMINATOR as u128 * SECONDS_PER_YEAR as u128;

    u64::try_from(numerator / denominator).map_err(|_| LendingError::ArithmeticOverflow)
}
