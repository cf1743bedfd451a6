//! The five ledger-mutating actions.
//!
//! Each action works on a copy of the market and the positions involved and
//! writes the copies back only after every check has passed, so a failed
//! action leaves its inputs untouched.

use anchor_lang::prelude::*;

use super::liquidation::{max_repayable, seized_collateral, PositionState};
use super::market::Market;
use super::risk::{available_to_borrow, position_values};
use crate::constants::{HEALTH_FACTOR_ONE, MIN_HEALTH_FACTOR_AFTER_BORROW};
use crate::errors::{LendingError, LendingResult};
use crate::state::UserPosition;

/// Result of a deposit, withdraw, borrow or repay
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionOutcome {
    /// Tokens moved between the user and the vault
    pub amount: u64,
    /// Shares minted or burned
    pub shares: u64,
    /// Health factor after the action
    pub health_factor: u64,
    pub state: PositionState,
}

/// Result of a liquidation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LiquidationOutcome {
    /// Debt tokens the liquidator pays into the debt vault
    pub repaid: u64,
    /// Borrow shares burned from the target
    pub debt_shares_burned: u64,
    /// Collateral tokens moved to the liquidator
    pub seized_collateral: u64,
    /// Deposit shares moved from the target to the liquidator
    pub seized_shares: u64,
    /// Target health factor after the liquidation
    pub health_factor: u64,
    pub state: PositionState,
    /// Liquidator health factor after the liquidation
    pub liquidator_health_factor: u64,
}

pub fn deposit(
    market: &mut Market,
    position: &mut UserPosition,
    owner: &Pubkey,
    mint: &Pubkey,
    amount: u64,
    now: i64,
) -> LendingResult<ActionOutcome> {
    check_owner(position, owner)?;
    if amount == 0 {
        return Err(LendingError::InvalidAmount);
    }
    let mut next_market = market.clone();
    let mut next = position.clone();
    next_market.accrue_all(now)?;

    let bank = next_market.bank_mut(mint)?;
    let shares = bank.record_deposit(amount)?;
    bank.check_invariants()?;
    next.credit_deposit(*mint, amount, shares)?;

    let (health_factor, state) = refresh_health(&mut next, &next_market, now)?;

    *market = next_market;
    *position = next;
    Ok(ActionOutcome {
        amount,
        shares,
        health_factor,
        state,
    })
}

pub fn withdraw(
    market: &mut Market,
    position: &mut UserPosition,
    owner: &Pubkey,
    mint: &Pubkey,
    amount: u64,
    now: i64,
) -> LendingResult<ActionOutcome> {
    check_owner(position, owner)?;
    if amount == 0 {
        return Err(LendingError::InvalidAmount);
    }
    let mut next_market = market.clone();
    let mut next = position.clone();
    next_market.accrue_all(now)?;

    let bank = next_market.bank_mut(mint)?;
    let shares = bank.withdraw_shares_for(amount)?;
    if shares > next.deposit_shares(mint) {
        return Err(LendingError::InsufficientBalance);
    }
    let received = bank.record_withdraw(shares)?;
    bank.check_invariants()?;
    next.debit_deposit(mint, shares)?;

    let (health_factor, state) = refresh_health(&mut next, &next_market, now)?;
    if health_factor < HEALTH_FACTOR_ONE {
        return Err(LendingError::UnsafeWithdrawal);
    }

    *market = next_market;
    *position = next;
    Ok(ActionOutcome {
        amount: received,
        shares,
        health_factor,
        state,
    })
}

pub fn borrow(
    market: &mut Market,
    position: &mut UserPosition,
    owner: &Pubkey,
    mint: &Pubkey,
    amount: u64,
    now: i64,
) -> LendingResult<ActionOutcome> {
    check_owner(position, owner)?;
    if amount == 0 {
        return Err(LendingError::InvalidAmount);
    }
    let mut next_market = market.clone();
    let mut next = position.clone();
    next_market.accrue_all(now)?;

    if amount > available_to_borrow(&next, mint, &next_market)? {
        return Err(LendingError::ExceedsBorrowLimit);
    }

    let bank = next_market.bank_mut(mint)?;
    let shares = bank.record_borrow(amount)?;
    bank.check_invariants()?;
    next.credit_borrow(*mint, amount, shares)?;

    let (health_factor, state) = refresh_health(&mut next, &next_market, now)?;
    if health_factor < MIN_HEALTH_FACTOR_AFTER_BORROW {
        return Err(LendingError::ExceedsBorrowLimit);
    }

    *market = next_market;
    *position = next;
    Ok(ActionOutcome {
        amount,
        shares,
        health_factor,
        state,
    })
}

/// Repay up to `amount`; anything above the outstanding debt is not taken
pub fn repay(
    market: &mut Market,
    position: &mut UserPosition,
    owner: &Pubkey,
    mint: &Pubkey,
    amount: u64,
    now: i64,
) -> LendingResult<ActionOutcome> {
    check_owner(position, owner)?;
    if amount == 0 {
        return Err(LendingError::InvalidAmount);
    }
    let held = position.borrow_shares(mint);
    if held == 0 {
        return Err(LendingError::InsufficientBalance);
    }
    let mut next_market = market.clone();
    let mut next = position.clone();
    next_market.accrue_all(now)?;

    let bank = next_market.bank_mut(mint)?;
    let (shares, _) = bank.repay_shares_for(amount, held)?;
    if shares == 0 {
        return Err(LendingError::InvalidAmount);
    }
    let paid = bank.record_repay(shares)?;
    bank.check_invariants()?;
    next.debit_borrow(mint, shares)?;

    let (health_factor, state) = refresh_health(&mut next, &next_market, now)?;

    *market = next_market;
    *position = next;
    Ok(ActionOutcome {
        amount: paid,
        shares,
        health_factor,
        state,
    })
}

/// Repay part of `target`'s `debt_mint` debt and seize `collateral_mint`
/// collateral plus the liquidation bonus into `liquidator_position`.
///
/// Eligibility and the close-factor cap are evaluated against the market
/// after accrual, never against an earlier read.
#[allow(clippy::too_many_arguments)]
pub fn liquidate(
    market: &mut Market,
    target: &mut UserPosition,
    liquidator_position: &mut UserPosition,
    liquidator: &Pubkey,
    debt_mint: &Pubkey,
    collateral_mint: &Pubkey,
    repay_amount: u64,
    now: i64,
) -> LendingResult<LiquidationOutcome> {
    if &target.owner == liquidator {
        return Err(LendingError::SelfLiquidation);
    }
    check_owner(liquidator_position, liquidator)?;
    if repay_amount == 0 {
        return Err(LendingError::InvalidAmount);
    }

    let mut next_market = market.clone();
    let mut next_target = target.clone();
    let mut next_liquidator = liquidator_position.clone();
    next_market.accrue_all(now)?;

    if position_values(&next_target, &next_market)?.state()? != PositionState::Liquidatable {
        return Err(LendingError::NotLiquidatable);
    }
    if repay_amount > max_repayable(&next_target, debt_mint, collateral_mint, &next_market)? {
        return Err(LendingError::ExceedsCloseFactor);
    }

    // debt side
    let held_debt = next_target.borrow_shares(debt_mint);
    let debt_bank = next_market.bank_mut(debt_mint)?;
    let (debt_shares_burned, _) = debt_bank.repay_shares_for(repay_amount, held_debt)?;
    if debt_shares_burned == 0 {
        return Err(LendingError::InvalidAmount);
    }
    let repaid = debt_bank.record_repay(debt_shares_burned)?;
    next_target.debit_borrow(debt_mint, debt_shares_burned)?;

    // collateral side
    let seized = seized_collateral(
        repaid,
        next_market.get(debt_mint)?,
        next_market.get(collateral_mint)?,
    )?;
    let held_collateral = next_target.deposit_shares(collateral_mint);
    let collateral_bank = next_market.bank(collateral_mint)?;
    let seized_shares = collateral_bank.deposit_shares_for(seized)?.min(held_collateral);
    let seized_amount = collateral_bank.deposit_value(seized_shares)?;
    if seized_shares > 0 {
        next_target.debit_deposit(collateral_mint, seized_shares)?;
        next_liquidator.credit_deposit(*collateral_mint, seized_amount, seized_shares)?;
    }

    next_market.bank(debt_mint)?.check_invariants()?;
    next_market.bank(collateral_mint)?.check_invariants()?;
    let (health_factor, state) = refresh_health(&mut next_target, &next_market, now)?;
    let (liquidator_health_factor, _) = refresh_health(&mut next_liquidator, &next_market, now)?;

    *market = next_market;
    *target = next_target;
    *liquidator_position = next_liquidator;
    Ok(LiquidationOutcome {
        repaid,
        debt_shares_burned,
        seized_collateral: seized_amount,
        seized_shares,
        health_factor,
        state,
        liquidator_health_factor,
    })
}

fn check_owner(position: &UserPosition, owner: &Pubkey) -> LendingResult<()> {
    if &position.owner != owner {
        return Err(LendingError::InvalidAccount);
    }
    Ok(())
}

/// Recompute and cache the position's health factor
fn refresh_health(position: &mut UserPosition, market: &Market, now: i64) -> LendingResult<(u64, PositionState)> {
    let values = position_values(position, market)?;
    let health_factor = values.health_factor()?;
    position.health_factor = health_factor;
    position.last_updated = now;
    Ok((health_factor, values.state()?))
}
