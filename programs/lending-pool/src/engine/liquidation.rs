use anchor_lang::prelude::*;

use super::market::{Market, PricedBank};
use super::risk::{position_values, PositionValues};
use crate::constants::{BPS_DENOMINATOR, HEALTH_FACTOR_ONE, HEALTH_FACTOR_WARNING};
use crate::errors::{LendingError, LendingResult};
use crate::math::{amount_for_value, mul_bps, value_usd, value_usd_ceil};
use crate::state::UserPosition;

/// Where a position sits relative to liquidation
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PositionState {
    /// Health factor >= 1.2, or no debt
    Healthy,
    /// 1.0 <= health factor < 1.2
    AtRisk,
    /// Health factor < 1.0 with collateral left to seize
    Liquidatable,
    /// Debt without any collateral value; nothing to liquidate
    BadDebt,
}

pub fn classify(values: &PositionValues) -> LendingResult<PositionState> {
    if !values.has_debt {
        return Ok(PositionState::Healthy);
    }
    if values.collateral_usd == 0 {
        return Ok(PositionState::BadDebt);
    }
    let health_factor = values.health_factor()?;
    Ok(if health_factor < HEALTH_FACTOR_ONE {
        PositionState::Liquidatable
    } else if health_factor < HEALTH_FACTOR_WARNING {
        PositionState::AtRisk
    } else {
        PositionState::Healthy
    })
}

/// Largest `debt_mint` repayment one liquidation may make.
///
/// Capped by the debt bank's close factor and by the collateral available:
/// the repayment plus the collateral bank's bonus never exceeds the
/// position's `collateral_mint` deposit.
pub fn max_repayable(
    position: &UserPosition,
    debt_mint: &Pubkey,
    collateral_mint: &Pubkey,
    market: &Market,
) -> LendingResult<u64> {
    let debt = market.get(debt_mint)?;
    let collateral = market.get(collateral_mint)?;

    let debt_amount = debt.bank.debt_value(position.borrow_shares(debt_mint))?;
    let close_factor_cap = mul_bps(debt_amount, debt.bank.config.close_factor_bps as u64)?;

    let collateral_amount = collateral
        .bank
        .deposit_value(position.deposit_shares(collateral_mint))?;
    let collateral_usd = value_usd(collateral_amount, collateral.price, collateral.bank.decimals)?;
    let repay_usd_cap = collateral_usd
        .checked_mul(BPS_DENOMINATOR as u128)
        .ok_or(LendingError::ArithmeticOverflow)?
        / bonus_multiplier(collateral);
    let collateral_cap = amount_for_value(repay_usd_cap, debt.price, debt.bank.decimals)?;

    Ok(close_factor_cap.min(collateral_cap))
}

/// Collateral units owed to a liquidator for repaying `repay_amount` of debt:
/// repay value * (1 + bonus), converted at the collateral price
pub fn seized_collateral(repay_amount: u64, debt: &PricedBank, collateral: &PricedBank) -> LendingResult<u64> {
    let repay_usd = value_usd(repay_amount, debt.price, debt.bank.decimals)?;
    let seized_usd = repay_usd
        .checked_mul(bonus_multiplier(collateral))
        .ok_or(LendingError::ArithmeticOverflow)?
        / BPS_DENOMINATOR as u128;
    amount_for_value(seized_usd, collateral.price, collateral.bank.decimals)
}

fn bonus_multiplier(collateral: &PricedBank) -> u128 {
    BPS_DENOMINATOR as u128 + collateral.bank.config.liquidation_bonus_bps as u128
}

/// A liquidation opportunity found by [`scan_liquidatable`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PositionSummary {
    pub owner: Pubkey,
    pub health_factor: u64,
    pub collateral_usd: u128,
    pub debt_usd: u128,
    /// Largest debt of the position
    pub debt_mint: Pubkey,
    /// Largest collateral of the position
    pub collateral_mint: Pubkey,
    /// Close-factor and collateral capped repayment, in debt units
    pub max_repayable: u64,
    /// USD value of the bonus earned by repaying `max_repayable`
    pub liquidator_profit_usd: u128,
}

/// Every liquidatable position, worst health factor first.
///
/// Pure read over all positions. A position holding an asset `market` does
/// not carry cannot be valued and is left out.
pub fn scan_liquidatable(positions: &[UserPosition], market: &Market) -> LendingResult<Vec<PositionSummary>> {
    let mut found = Vec::new();

    for position in positions {
        match summarize(position, market) {
            Ok(Some(summary)) => found.push(summary),
            Ok(None) | Err(LendingError::UnknownAsset) => continue,
            Err(err) => return Err(err),
        }
    }

    found.sort_by_key(|summary| summary.health_factor);
    Ok(found)
}

fn summarize(position: &UserPosition, market: &Market) -> LendingResult<Option<PositionSummary>> {
    let values = position_values(position, market)?;
    if classify(&values)? != PositionState::Liquidatable {
        return Ok(None);
    }

    let (debt_mint, collateral_mint) = largest_legs(position, market)?;
    let max_repayable = max_repayable(position, &debt_mint, &collateral_mint, market)?;
    let debt = market.get(&debt_mint)?;
    let collateral = market.get(&collateral_mint)?;
    let bonus = mul_bps(max_repayable, collateral.bank.config.liquidation_bonus_bps as u64)?;

    Ok(Some(PositionSummary {
        owner: position.owner,
        health_factor: values.health_factor()?,
        collateral_usd: values.collateral_usd,
        debt_usd: values.debt_usd,
        debt_mint,
        collateral_mint,
        max_repayable,
        liquidator_profit_usd: value_usd(bonus, debt.price, debt.bank.decimals)?,
    }))
}

/// (largest debt mint, largest collateral mint) by USD value
fn largest_legs(position: &UserPosition, market: &Market) -> LendingResult<(Pubkey, Pubkey)> {
    let mut debt: Option<(u128, Pubkey)> = None;
    let mut collateral: Option<(u128, Pubkey)> = None;

    for balance in position.balances.iter() {
        let asset = market.get(&balance.mint)?;
        let bank = &asset.bank;
        if balance.borrow_shares > 0 {
            let value = value_usd_ceil(bank.debt_value(balance.borrow_shares)?, asset.price, bank.decimals)?;
            if debt.map_or(true, |(best, _)| value > best) {
                debt = Some((value, balance.mint));
            }
        }
        if balance.deposit_shares > 0 {
            let value = value_usd(bank.deposit_value(balance.deposit_shares)?, asset.price, bank.decimals)?;
            if collateral.map_or(true, |(best, _)| value > best) {
                collateral = Some((value, balance.mint));
            }
        }
    }

    match (debt, collateral) {
        (Some((_, debt_mint)), Some((_, collateral_mint))) => Ok((debt_mint, collateral_mint)),
        _ => Err(LendingError::NotLiquidatable),
    }
}
