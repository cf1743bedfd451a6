use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, Mint, TokenAccount, TokenInterface, TransferChecked};
use pyth_solana_receiver_sdk::price_update::PriceUpdateV2;

use crate::engine::actions;
use crate::errors::LendingError;
use crate::events::BorrowEvent;
use crate::instructions::market::load_market;
use crate::state::{Bank, UserPosition};

/// Accounts for borrowing from a bank
///
/// Remaining accounts: `(bank, price_update)` for every other asset the
/// position holds. Collateral in banks left out cannot back the borrow.
#[derive(Accounts)]
pub struct Borrow<'info> {
    /// User borrowing tokens
    pub owner: Signer<'info>,

    /// The bank to borrow from
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

    /// Bank's vault (source)
    #[account(mut)]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// User's token account (destination)
    #[account(
        mut,
        constraint = user_token_account.mint == mint.key() @ LendingError::InvalidAccount
    )]
    pub user_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,
}

/// Borrow tokens against the position's collateral
///
/// # Arguments
/// * `ctx` - The context containing all accounts
/// * `amount` - Amount of tokens to borrow (in native units)
pub fn handler(ctx: Context<Borrow>, amount: u64) -> Result<()> {
    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();
    let mint = ctx.accounts.mint.key();

    let bank: &Bank = &ctx.accounts.bank;
    let price_update: &PriceUpdateV2 = &ctx.accounts.price_update;
    let mut market = load_market(&[(bank, price_update)], ctx.remaining_accounts, &clock)?;
    let outcome = actions::borrow(
        &mut market,
        &mut ctx.accounts.user_position,
        &owner,
        &mint,
        amount,
        clock.unix_timestamp,
    )?;
    ctx.accounts.bank.set_inner(market.bank(&mint)?.clone());

    // Transfer tokens from vault to user using the bank PDA as signer
    let bump = ctx.accounts.bank.bump;
    let seeds = &[Bank::SEED_PREFIX, mint.as_ref(), &[bump]];
    let signer_seeds = &[&seeds[..]];

    let transfer_ctx = CpiContext::new_with_signer(
        ctx.accounts.token_program.to_account_info(),
        TransferChecked {
            from: ctx.accounts.vault.to_account_info(),
            mint: ctx.accounts.mint.to_account_info(),
            to: ctx.accounts.user_token_account.to_account_info(),
            authority: ctx.accounts.bank.to_account_info(),
        },
        signer_seeds,
    );
    token_interface::transfer_checked(transfer_ctx, amount, ctx.accounts.mint.decimals)?;

    emit!(BorrowEvent {
        bank: ctx.accounts.bank.key(),
        owner,
        amount,
        shares: outcome.shares,
        health_factor: outcome.health_factor,
        timestamp: clock.unix_timestamp,
    });

    msg!("Borrowed {} tokens from bank {}", amount, mint);
    msg!("Health factor: {}", outcome.health_factor);

    Ok(())
}
