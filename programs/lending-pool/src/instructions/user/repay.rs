use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, Mint, TokenAccount, TokenInterface, TransferChecked};
use pyth_solana_receiver_sdk::price_update::PriceUpdateV2;

use crate::engine::actions;
use crate::errors::LendingError;
use crate::events::RepayEvent;
use crate::instructions::market::load_market;
use crate::state::{Bank, UserPosition};

/// Accounts for repaying debt
///
/// Remaining accounts: `(bank, price_update)` for every other asset the
/// position holds.
#[derive(Accounts)]
pub struct Repay<'info> {
    /// User repaying their own debt
    pub owner: Signer<'info>,

    /// The bank the debt is owed to
    #[account(
        mut,
        seeds = [Bank::SEED_PREFIX, mint.key().as_ref()],
        bump = bank.bump,
        has_one = mint @ LendingError::InvalidAccount,
        has_one = vault @ LendingError::InvalidAccount
    )]
    pub bank: Box<Account<'info, Bank>>,

    /// Pyth price update carrying the bank's feed
    pub price_update: Box<Account<'info, PriceUpdateV2>>,

    /// User's position
    #[account(
        mut,
        seeds = [UserPosition::SEED_PREFIX, owner.key().as_ref()],
        bump = user_position.bump,
        has_one = owner @ LendingError::InvalidAccount
    )]
    pub user_position: Box<Account<'info, UserPosition>>,

    pub mint: Box<InterfaceAccount<'info, Mint>>,

    /// User's token account (source)
    #[account(
        mut,
        constraint = user_token_account.mint == mint.key() @ LendingError::InvalidAccount,
        constraint = user_token_account.owner == owner.key() @ LendingError::InvalidAccount
    )]
    pub user_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Bank's vault (destination)
    #[account(mut)]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Repay borrowed tokens
///
/// Only the outstanding debt is taken; an `amount` above it is capped.
/// `u64::MAX` repays everything.
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `amount` - Maximum amount of tokens to repay (in native units)
pub fn handler(ctx: Context<Repay>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();
    let mint = ctx.accounts.mint.key();

    let bank: &Bank = &ctx.accounts.bank;
    let price_update: &PriceUpdateV2 = &ctx.accounts.price_update;
    let mut market = load_market(&[(bank, price_update)], ctx.remaining_accounts, &clock)?;
    let outcome = actions::repay(
        &mut market,
        &mut ctx.accounts.user_position,
        &owner,
        &mint,
        amount,
        clock.unix_timestamp,
    )?;
    ctx.accounts.bank.set_inner(market.bank(&mint)?.clone());

    // Transfer the amount owed from user to vault
    let transfer_ctx = CpiContext::new(
        ctx.accounts.token_program.to_account_info(),
        TransferChecked {
            from: ctx.accounts.user_token_account.to_account_info(),
            mint: ctx.accounts.mint.to_account_info(),
            to: ctx.accounts.vault.to_account_info(),
            authority: ctx.accounts.owner.to_account_info(),
        },
    );
    token_interface::transfer_checked(transfer_ctx, outcome.amount, ctx.accounts.mint.decimals)?;

    emit!(RepayEvent {
        bank: ctx.accounts.bank.key(),
        owner,
        amount: outcome.amount,
        shares: outcome.shares,
        health_factor: outcome.health_factor,
        timestamp: clock.unix_timestamp,
    });

    msg!("Repaid {} tokens to bank {}", outcome.amount, mint);

    Ok(())
}
