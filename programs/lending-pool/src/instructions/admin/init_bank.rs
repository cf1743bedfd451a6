use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

use crate::constants::TREASURY_SEED;
use crate::errors::LendingError;
use crate::events::BankInitialized;
use crate::state::{Bank, BankAddresses, BankConfig, LendingMarket};

/// Accounts for initializing a new bank
#[derive(Accounts)]
pub struct InitBank<'info> {
    /// Market authority paying for the bank
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(
        seeds = [LendingMarket::SEED_PREFIX],
        bump = lending_market.bump,
        has_one = authority @ LendingError::Unauthorized
    )]
    pub lending_market: Account<'info, LendingMarket>,

    /// The bank account to initialize
    /// PDA: ["bank", mint]
    #[account(
        init,
        payer = authority,
        space = 8 + Bank::INIT_SPACE,
        seeds = [Bank::SEED_PREFIX, mint.key().as_ref()],
        bump
    )]
    pub bank: Box<Account<'info, Bank>>,

    /// The token mint for this bank (e.g., USDC, SOL)
    pub mint: Box<InterfaceAccount<'info, Mint>>,

    /// Token vault holding deposits, owned by the bank
    /// PDA: ["treasury", mint]
    #[account(
        init,
        payer = authority,
        seeds = [TREASURY_SEED, mint.key().as_ref()],
        bump,
        token::mint = mint,
        token::authority = bank,
        token::token_program = token_program
    )]
    pub vault: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}

/// Parameters for initializing a bank
#[derive(AnchorSerialize, AnchorDeserialize, Clone)]
pub struct InitBankParams {
    /// Pyth feed id pricing the mint in USD
    pub price_feed_id: [u8; 32],

    /// Loan-to-Value ratio (e.g., 8000 = 80%)
    pub max_ltv_bps: u16,

    /// Liquidation threshold, strictly above the LTV (e.g., 8500 = 85%)
    pub liquidation_threshold_bps: u16,

    /// Liquidation bonus paid out of this bank's collateral
    pub liquidation_bonus_bps: u16,

    /// Share of a debt in this bank repayable per liquidation
    pub close_factor_bps: u16,

    /// Annual simple interest rate on borrows
    pub interest_rate_bps: u16,
}

impl From<InitBankParams> for BankConfig {
    fn from(params: InitBankParams) -> Self {
        Self {
            max_ltv_bps: params.max_ltv_bps,
            liquidation_threshold_bps: params.liquidation_threshold_bps,
            liquidation_bonus_bps: params.liquidation_bonus_bps,
            close_factor_bps: params.close_factor_bps,
            interest_rate_bps: params.interest_rate_bps,
        }
    }
}

/// Initialize a new bank (asset pool)
///
/// One bank per mint, created by the market authority. The configuration
/// is validated here and cannot be changed afterwards.
pub fn handler(ctx: Context<InitBank>, params: InitBankParams) -> Result<()> {
    let clock = Clock::get()?;
    let price_feed_id = params.price_feed_id;
    require!(price_feed_id != [0u8; 32], LendingError::InvalidPriceFeed);
    let config = BankConfig::from(params);

    let addresses = BankAddresses {
        bump: ctx.bumps.bank,
        vault: ctx.accounts.vault.key(),
        vault_bump: ctx.bumps.vault,
    };
    let bank = Bank::new(
        ctx.accounts.authority.key(),
        ctx.accounts.mint.key(),
        ctx.accounts.mint.decimals,
        addresses,
        price_feed_id,
        config,
        clock.unix_timestamp,
    )?;
    ctx.accounts.bank.set_inner(bank);

    let bank = &ctx.accounts.bank;
    emit!(BankInitialized {
        bank: bank.key(),
        mint: bank.mint,
        authority: bank.authority,
        vault: bank.vault,
        price_feed_id: bank.price_feed_id,
        max_ltv_bps: config.max_ltv_bps,
        liquidation_threshold_bps: config.liquidation_threshold_bps,
        liquidation_bonus_bps: config.liquidation_bonus_bps,
        close_factor_bps: config.close_factor_bps,
        interest_rate_bps: config.interest_rate_bps,
    });

    msg!("Bank initialized for mint: {}", bank.mint);
    msg!("LTV: {} bps, Liquidation threshold: {} bps",
        config.max_ltv_bps,
        config.liquidation_threshold_bps
    );

    Ok(())
}
