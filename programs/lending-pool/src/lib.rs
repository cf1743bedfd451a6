use anchor_lang::prelude::*;

pub mod constants;
pub mod engine;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod math;
pub mod oracle;
pub mod state;

use instructions::*;

declare_id!("CVeRLkBRYVUh2idDsvrkAomm9yxTuoa42HnGJXQiga2j");

#[program]
pub mod lending_pool {
    use super::*;

    // ============================================================================
    // ADMIN INSTRUCTIONS
    // ============================================================================

    /// Create the market admin record (program upgrade authority only)
    pub fn init_lending_market(ctx: Context<InitLendingMarket>) -> Result<()> {
        instructions::admin::init_lending_market::handler(ctx)
    }

    /// Initialize a new bank (market authority only)
    pub fn init_bank(ctx: Context<InitBank>, params: InitBankParams) -> Result<()> {
        instructions::admin::init_bank::handler(ctx, params)
    }

    // ============================================================================
    // USER INSTRUCTIONS
    // ============================================================================

    /// Initialize a user's position account
    pub fn init_user(ctx: Context<InitUser>) -> Result<()> {
        instructions::user::init_user::handler(ctx)
    }

    /// Deposit tokens into a bank
    pub fn deposit(ctx: Context<Deposit>, amount: u64) -> Result<()> {
        instructions::user::deposit::handler(ctx, amount)
    }

    /// Withdraw tokens from a bank
    pub fn withdraw(ctx: Context<Withdraw>, amount: u64) -> Result<()> {
        instructions::user::withdraw::handler(ctx, amount)
    }

    /// Borrow tokens from a bank
    pub fn borrow(ctx: Context<Borrow>, amount: u64) -> Result<()> {
        instructions::user::borrow::handler(ctx, amount)
    }

    /// Repay borrowed tokens
    pub fn repay(ctx: Context<Repay>, amount: u64) -> Result<()> {
        instructions::user::repay::handler(ctx, amount)
    }

    // ============================================================================
    // PERMISSIONLESS INSTRUCTIONS
    // ============================================================================

    /// Accrue interest on a bank
    pub fn refresh_bank(ctx: Context<RefreshBank>) -> Result<()> {
        instructions::permissionless::refresh_bank::handler(ctx)
    }

    /// Liquidate an unhealthy position
    pub fn liquidate(ctx: Context<Liquidate>, repay_amount: u64) -> Result<()> {
        instructions::permissionless::liquidate::handler(ctx, repay_amount)
    }
}
