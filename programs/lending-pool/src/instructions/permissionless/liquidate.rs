use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, Mint, TokenAccount, TokenInterface, TransferChecked};
use pyth_solana_receiver_sdk::price_update::PriceUpdateV2;

use crate::engine::actions;
use crate::errors::LendingError;
use crate::events::LiquidationEvent;
use crate::instructions::market::load_market;
use crate::state::{Bank, UserPosition};

/// Accounts for liquidating an unhealthy position
///
/// Remaining accounts: `(bank, price_update)` for every other asset held by
/// the target or the liquidator position.
#[derive(Accounts)]
pub struct Liquidate<'info> {
    /// Liquidator repaying the debt
    pub liquidator: Signer<'info>,

    /// The unhealthy position to liquidate
    #[account(
        mut,
        seeds = [UserPosition::SEED_PREFIX, target_position.owner.as_ref()],
        bump = target_position.bump,
        constraint = target_position.owner != liquidator.key() @ LendingError::SelfLiquidation
    )]
    pub target_position: Box<Account<'info, UserPosition>>,

    /// Liquidator's own position, credited with the seized collateral
    #[account(
        mut,
        seeds = [UserPosition::SEED_PREFIX, liquidator.key().as_ref()],
        bump = liquidator_position.bump,
        constraint = liquidator_position.owner == liquidator.key() @ LendingError::InvalidAccount
    )]
    pub liquidator_position: Box<Account<'info, UserPosition>>,

    /// The bank of the debt being repaid
    #[account(
        mut,
        seeds = [Bank::SEED_PREFIX, debt_mint.key().as_ref()],
        bump = debt_bank.bump,
        constraint = debt_bank.vault == debt_vault.key() @ LendingError::InvalidAccount
    )]
    pub debt_bank: Box<Account<'info, Bank>>,

    /// Pyth price update for the debt bank's feed
    pub debt_price_update: Box<Account<'info, PriceUpdateV2>>,

    /// The bank of the collateral being seized
    #[account(
        mut,
        seeds = [Bank::SEED_PREFIX, collateral_bank.mint.as_ref()],
        bump = collateral_bank.bump,
        constraint = collateral_bank.key() != debt_bank.key() @ LendingError::InvalidAccount
    )]
    pub collateral_bank: Box<Account<'info, Bank>>,

    /// Pyth price update for the collateral bank's feed
    pub collateral_price_update: Box<Account<'info, PriceUpdateV2>>,

    pub debt_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Debt bank's vault (receives repayment)
    #[account(mut)]
    pub debt_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Liquidator's token account for repaying debt
    #[account(
        mut,
        constraint = liquidator_token_account.mint == debt_mint.key() @ LendingError::InvalidAccount,
        constraint = liquidator_token_account.owner == liquidator.key() @ LendingError::InvalidAccount
    )]
    pub liquidator_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Liquidate an unhealthy position
///
/// When a position's health factor falls below 1.0 the liquidator:
/// 1. Repays part of its debt, at most the close factor of the debt bank
/// 2. Takes over collateral worth the repayment plus the collateral bank's
///    liquidation bonus, as deposit shares in its own position
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `repay_amount` - Amount of debt to repay (in debt token units)
pub fn handler(ctx: Context<Liquidate>, repay_amount: u64) -> Result<()> {
    let clock = Clock::get()?;
    let liquidator = ctx.accounts.liquidator.key();
    let debt_mint = ctx.accounts.debt_bank.mint;
    let collateral_mint = ctx.accounts.collateral_bank.mint;

    let debt_bank: &Bank = &ctx.accounts.debt_bank;
    let debt_price: &PriceUpdateV2 = &ctx.accounts.debt_price_update;
    let collateral_bank: &Bank = &ctx.accounts.collateral_bank;
    let collateral_price: &PriceUpdateV2 = &ctx.accounts.collateral_price_update;
    let mut market = load_market(
        &[(debt_bank, debt_price), (collateral_bank, collateral_price)],
        ctx.remaining_accounts,
        &clock,
    )?;

    let accounts = &mut *ctx.accounts;
    let outcome = actions::liquidate(
        &mut market,
        &mut accounts.target_position,
        &mut accounts.liquidator_position,
        &liquidator,
        &debt_mint,
        &collateral_mint,
        repay_amount,
        clock.unix_timestamp,
    )?;
    accounts.debt_bank.set_inner(market.bank(&debt_mint)?.clone());
    accounts.collateral_bank.set_inner(market.bank(&collateral_mint)?.clone());

    // Transfer repayment from liquidator to the debt vault
    let transfer_ctx = CpiContext::new(
        accounts.token_program.to_account_info(),
        TransferChecked {
            from: accounts.liquidator_token_account.to_account_info(),
            mint: accounts.debt_mint.to_account_info(),
            to: accounts.debt_vault.to_account_info(),
            authority: accounts.liquidator.to_account_info(),
        },
    );
    token_interface::transfer_checked(transfer_ctx, outcome.repaid, accounts.debt_mint.decimals)?;

    emit!(LiquidationEvent {
        liquidator,
        owner: accounts.target_position.owner,
        debt_bank: accounts.debt_bank.key(),
        collateral_bank: accounts.collateral_bank.key(),
        repaid: outcome.repaid,
        debt_shares_burned: outcome.debt_shares_burned,
        collateral_seized: outcome.seized_collateral,
        collateral_shares_seized: outcome.seized_shares,
        health_factor: outcome.health_factor,
        timestamp: clock.unix_timestamp,
    });

    msg!("Liquidation successful!");
    msg!("Repaid: {} debt tokens", outcome.repaid);
    msg!("Collateral seized: {} tokens ({} shares)", outcome.seized_collateral, outcome.seized_shares);
    msg!("Health factor after: {}", outcome.health_factor);

    Ok(())
}
