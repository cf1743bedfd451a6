use anchor_lang::prelude::*;

// ============================================================================
// MARKET EVENTS
// ============================================================================

/// Emitted when the lending market admin record is created
#[event]
pub struct LendingMarketInitialized {
    pub lending_market: Pubkey,
    pub authority: Pubkey,
}

/// Emitted when a new bank is initialized
#[event]
pub struct BankInitialized {
    pub bank: Pubkey,
    pub mint: Pubkey,
    pub authority: Pubkey,
    pub vault: Pubkey,
    pub price_feed_id: [u8; 32],
    pub max_ltv_bps: u16,
    pub liquidation_threshold_bps: u16,
    pub liquidation_bonus_bps: u16,
    pub close_factor_bps: u16,
    pub interest_rate_bps: u16,
}

/// Emitted whenever interest is accrued into a bank
#[event]
pub struct InterestAccrued {
    pub bank: Pubkey,
    pub interest: u64,
    pub total_deposited: u64,
    pub total_borrowed: u64,
    pub utilization_bps: u64,
    pub timestamp: i64,
}

// ============================================================================
// USER POSITION EVENTS
// ============================================================================

/// Emitted when a user position is initialized
#[event]
pub struct UserPositionInitialized {
    pub user_position: Pubkey,
    pub owner: Pubkey,
}

/// Emitted when tokens are deposited
#[event]
pub struct DepositEvent {
    pub bank: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub shares: u64,
    pub health_factor: u64,
    pub timestamp: i64,
}

/// Emitted when tokens are withdrawn
#[event]
pub struct WithdrawEvent {
    pub bank: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub shares: u64,
    pub health_factor: u64,
    /// Health factor ended between 1.0 and 1.2
    pub at_risk: bool,
    pub timestamp: i64,
}

/// Emitted when tokens are borrowed
#[event]
pub struct BorrowEvent {
    pub bank: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub shares: u64,
    pub health_factor: u64,
    pub timestamp: i64,
}

/// Emitted when debt is repaid
#[event]
pub struct RepayEvent {
    pub bank: Pubkey,
    pub owner: Pubkey,
    pub amount: u64,
    pub shares: u64,
    pub health_factor: u64,
    pub timestamp: i64,
}

// ============================================================================
// LIQUIDATION EVENTS
// ============================================================================

/// Emitted when a position is liquidated
#[event]
pub struct LiquidationEvent {
    pub liquidator: Pubkey,
    pub owner: Pubkey,
    pub debt_bank: Pubkey,
    pub collateral_bank: Pubkey,
    pub repaid: u64,
    pub debt_shares_burned: u64,
    pub collateral_seized: u64,
    pub collateral_shares_seized: u64,
    pub health_factor: u64,
    pub timestamp: i64,
}
