use anchor_lang::prelude::*;

use crate::errors::LendingError;
use crate::events::LendingMarketInitialized;
use crate::program::LendingPool;
use crate::state::LendingMarket;

/// Accounts for creating the market admin record
#[derive(Accounts)]
pub struct InitLendingMarket<'info> {
    /// Program upgrade authority, becomes the market authority
    #[account(mut)]
    pub authority: Signer<'info>,

    /// PDA: ["lending_market"]
    #[account(
        init,
        payer = authority,
        space = 8 + LendingMarket::INIT_SPACE,
        seeds = [LendingMarket::SEED_PREFIX],
        bump
    )]
    pub lending_market: Account<'info, LendingMarket>,

    #[account(
        constraint = program.programdata_address()? == Some(program_data.key()) @ LendingError::InvalidAccount
    )]
    pub program: Program<'info, LendingPool>,

    #[account(
        constraint = program_data.upgrade_authority_address == Some(authority.key()) @ LendingError::Unauthorized
    )]
    pub program_data: Account<'info, ProgramData>,

    pub system_program: Program<'info, System>,
}

/// Create the singleton lending market
///
/// Only the program's upgrade authority can do this, so the first caller
/// cannot take over bank creation.
pub fn handler(ctx: Context<InitLendingMarket>) -> Result<()> {
    let authority = ctx.accounts.authority.key();
    let market = LendingMarket::new(authority, ctx.bumps.lending_market);
    ctx.accounts.lending_market.set_inner(market);

    emit!(LendingMarketInitialized {
        lending_market: ctx.accounts.lending_market.key(),
        authority,
    });

    msg!("Lending market initialized, authority: {}", authority);

    Ok(())
}
