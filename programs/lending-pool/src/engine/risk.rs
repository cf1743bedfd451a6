use anchor_lang::prelude::*;

use super::liquidation::{classify, PositionState};
use super::market::Market;
use crate::constants::{HEALTH_FACTOR_MAX, HEALTH_FACTOR_ONE};
use crate::errors::{LendingError, LendingResult};
use crate::math::{amount_for_value, mul_bps_u128, ratio, value_usd, value_usd_ceil};
use crate::state::UserPosition;

/// USD valuation of a position (all values scaled by 10^6)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PositionValues {
    /// Market value of all deposits
    pub collateral_usd: u128,
    /// sum(deposit_value * liquidation_threshold)
    pub weighted_collateral_usd: u128,
    /// sum(deposit_value * max_ltv)
    pub borrow_limit_usd: u128,
    /// Market value of all debt, rounded up per asset
    pub debt_usd: u128,
    /// Any borrow shares outstanding, whatever their value
    pub has_debt: bool,
}

impl PositionValues {
    /// Health factor (scaled by 10000)
    ///
    /// Formula: Health = weighted_collateral_usd / debt_usd
    ///
    /// Returns HEALTH_FACTOR_MAX only when no borrow shares are held.
    pub fn health_factor(&self) -> LendingResult<u64> {
        if !self.has_debt {
            return Ok(HEALTH_FACTOR_MAX);
        }
        ratio(self.weighted_collateral_usd, self.debt_usd.max(1), HEALTH_FACTOR_ONE)
    }

    pub fn state(&self) -> LendingResult<PositionState> {
        classify(self)
    }
}

/// Value every balance of `position` at current share prices.
///
/// Deposits and debts are read through the bank's share conversion, so
/// accrued interest is included on both sides.
pub fn position_values(position: &UserPosition, market: &Market) -> LendingResult<PositionValues> {
    let mut values = PositionValues::default();

    for balance in position.balances.iter() {
        let asset = market.get(&balance.mint)?;
        let bank = &asset.bank;

        if balance.deposit_shares > 0 {
            let amount = bank.deposit_value(balance.deposit_shares)?;
            let value = value_usd(amount, asset.price, bank.decimals)?;
            values.collateral_usd = add(values.collateral_usd, value)?;
            values.weighted_collateral_usd = add(
                values.weighted_collateral_usd,
                mul_bps_u128(value, bank.config.liquidation_threshold_bps as u64)?,
            )?;
            values.borrow_limit_usd = add(
                values.borrow_limit_usd,
                mul_bps_u128(value, bank.config.max_ltv_bps as u64)?,
            )?;
        }

        if balance.borrow_shares > 0 {
            let amount = bank.debt_value(balance.borrow_shares)?;
            let value = value_usd_ceil(amount, asset.price, bank.decimals)?;
            values.debt_usd = add(values.debt_usd, value)?;
            values.has_debt = true;
        }
    }

    Ok(values)
}

pub fn health_factor(position: &UserPosition, market: &Market) -> LendingResult<u64> {
    position_values(position, market)?.health_factor()
}

/// Amount of `mint` the position may still borrow under its LTV limit.
///
/// Zero, never negative, once the position is at or over its limit.
pub fn available_to_borrow(position: &UserPosition, mint: &Pubkey, market: &Market) -> LendingResult<u64> {
    let values = position_values(position, market)?;
    let headroom = values.borrow_limit_usd.saturating_sub(values.debt_usd);
    if headroom == 0 {
        return Ok(0);
    }
    let asset = market.get(mint)?;
    amount_for_value(headroom, asset.price, asset.bank.decimals)
}

/// Largest amount of `mint` the position can withdraw right now.
///
/// Bounded by the position's redeemable balance, the bank's free liquidity
/// and, when the position carries debt, by keeping the health factor at or
/// above 1.0.
pub fn max_withdrawable(position: &UserPosition, mint: &Pubkey, market: &Market) -> LendingResult<u64> {
    let bank = market.bank(mint)?;
    let redeemable = bank.deposit_value(position.deposit_shares(mint))?;
    let upper = redeemable.min(bank.available_liquidity());
    if upper == 0 || withdrawal_is_safe(position, mint, upper, market)? {
        return Ok(upper);
    }

    // largest safe amount in [0, upper)
    let (mut low, mut high) = (0u64, upper);
    while high - low > 1 {
        let mid = low + (high - low) / 2;
        if withdrawal_is_safe(position, mint, mid, market)? {
            low = mid;
        } else {
            high = mid;
        }
    }
    Ok(low)
}

fn withdrawal_is_safe(position: &UserPosition, mint: &Pubkey, amount: u64, market: &Market) -> LendingResult<bool> {
    let mut market = market.clone();
    let mut position = position.clone();

    let bank = market.bank_mut(mint)?;
    let shares = bank.withdraw_shares_for(amount)?;
    if shares > position.deposit_shares(mint) {
        return Ok(false);
    }
    match bank.record_withdraw(shares) {
        Ok(_) => {}
        Err(LendingError::InsufficientLiquidity) => return Ok(false),
        Err(err) => return Err(err),
    }
    position.debit_deposit(mint, shares)?;

    if !position.has_borrows() {
        return Ok(true);
    }
    Ok(health_factor(&position, &market)? >= HEALTH_FACTOR_ONE)
}

fn add(a: u128, b: u128) -> LendingResult<u128> {
    a.checked_add(b).ok_or(LendingError::ArithmeticOverflow)
}
