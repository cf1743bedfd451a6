/// Lending pool constants

// ============================================================================
// SCALING CONSTANTS
// ============================================================================

/// Basis points denominator (100% = 10000 BPS)
pub const BPS_DENOMINATOR: u64 = 10_000;

/// USD value scale factor (1e6) for prices and valuations
pub const USD_SCALE: u128 = 1_000_000; // 10^6

/// Seconds per year (for interest rate calculations)
pub const SECONDS_PER_YEAR: u64 = 31_536_000; // 365 * 24 * 60 * 60

// ============================================================================
// PDA SEEDS
// ============================================================================

/// Seed prefix for Bank PDA: ["bank", mint]
pub const BANK_SEED: &[u8] = b"bank";

/// Seed prefix for UserPosition PDA: ["user", owner]
pub const USER_SEED: &[u8] = b"user";

/// Seed prefix for the bank's token vault PDA: ["treasury", mint]
pub const TREASURY_SEED: &[u8] = b"treasury";

/// Seed prefix for the singleton LendingMarket PDA: ["lending_market"]
pub const LENDING_MARKET_SEED: &[u8] = b"lending_market";

// ============================================================================
// LIMITS
// ============================================================================

/// Maximum number of distinct assets tracked by one user position
pub const MAX_POSITION_ASSETS: usize = 8;

/// Maximum age of a Pyth price update before it is rejected
pub const MAX_PRICE_AGE_SECONDS: u64 = 60;

/// Decimal exponent of the USD prices the engine works with (1e6 scale)
pub const PRICE_DECIMALS: i32 = 6;

// ============================================================================
// HEALTH FACTOR
// ============================================================================

/// Health factor scale (1.0 = 10000)
pub const HEALTH_FACTOR_ONE: u64 = 10_000;

/// Below this (1.2) a position is flagged at risk
pub const HEALTH_FACTOR_WARNING: u64 = 12_000;

/// Reported when the position carries no debt
pub const HEALTH_FACTOR_MAX: u64 = u64::MAX;

/// Minimum health factor after borrow (1.0 = 10000)
pub const MIN_HEALTH_FACTOR_AFTER_BORROW: u64 = HEALTH_FACTOR_ONE;
