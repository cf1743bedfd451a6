use anchor_lang::prelude::*;

use crate::events::UserPositionInitialized;
use crate::state::UserPosition;

/// Accounts for initializing a user's position
#[derive(Accounts)]
pub struct InitUser<'info> {
    /// User who owns this position
    #[account(mut)]
    pub owner: Signer<'info>,

    /// PDA: ["user", owner]
    #[account(
        init,
        payer = owner,
        space = 8 + UserPosition::INIT_SPACE,
        seeds = [UserPosition::SEED_PREFIX, owner.key().as_ref()],
        bump
    )]
    pub user_position: Account<'info, UserPosition>,

    pub system_program: Program<'info, System>,
}

/// Initialize a user's position account
///
/// One position per user holds the balances of every bank.
pub fn handler(ctx: Context<InitUser>) -> Result<()> {
    let clock = Clock::get()?;
    let owner = ctx.accounts.owner.key();

    let position = UserPosition::new(owner, ctx.bumps.user_position, clock.unix_timestamp);
    ctx.accounts.user_position.set_inner(position);

    emit!(UserPositionInitialized {
        user_position: ctx.accounts.user_position.key(),
        owner,
    });

    msg!("User position initialized for: {}", owner);

    Ok(())
}
