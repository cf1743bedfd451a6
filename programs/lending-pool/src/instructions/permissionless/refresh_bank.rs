use anchor_lang::prelude::*;

use crate::events::InterestAccrued;
use crate::state::Bank;

/// Accounts for refreshing a bank
#[derive(Accounts)]
pub struct RefreshBank<'info> {
    /// The bank to accrue
    #[account(
        mut,
        seeds = [Bank::SEED_PREFIX, bank.mint.as_ref()],
        bump = bank.bump
    )]
    pub bank: Account<'info, Bank>,
}

/// Accrue interest on a bank up to the current time
///
/// Anyone can call this. Every action accrues its banks anyway, so this only
/// keeps idle banks and their views current.
pub fn handler(ctx: Context<RefreshBank>) -> Result<()> {
    let bank = &mut ctx.accounts.bank;
    let clock = Clock::get()?;

    let interest = bank.accrue(clock.unix_timestamp)?;
    bank.check_invariants()?;
    let utilization_bps = bank.utilization_bps();

    emit!(InterestAccrued {
        bank: bank.key(),
        interest,
        total_deposited: bank.total_deposited,
        total_borrowed: bank.total_borrowed,
        utilization_bps,
        timestamp: clock.unix_timestamp,
    });

    msg!("Bank refreshed: {}", bank.mint);
    msg!("Interest accrued: {}, Utilization: {} bps", interest, utilization_bps);

    Ok(())
}
