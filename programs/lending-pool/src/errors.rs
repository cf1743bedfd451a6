use anchor_lang::prelude::*;

/// Result type of the pure accounting engine
pub type LendingResult<T> = std::result::Result<T, LendingError>;

/// Lending pool errors
#[error_code]
pub enum LendingError {
    #[msg("Invalid bank parameter")]
    InvalidParameter,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Insufficient balance in user position")]
    InsufficientBalance,

    #[msg("Insufficient free liquidity in bank")]
    InsufficientLiquidity,

    #[msg("Borrow exceeds the position's borrow limit")]
    ExceedsBorrowLimit,

    #[msg("Withdrawal would make the position liquidatable")]
    UnsafeWithdrawal,

    #[msg("Math overflow")]
    ArithmeticOverflow,

    #[msg("Division by zero")]
    DivisionByZero,

    #[msg("Position is not liquidatable")]
    NotLiquidatable,

    #[msg("Repay amount exceeds the close factor")]
    ExceedsCloseFactor,

    #[msg("Oracle price is stale")]
    StalePrice,

    #[msg("Bank or price for a held asset was not supplied")]
    UnknownAsset,

    #[msg("Maximum assets per position reached")]
    TooManyAssets,

    #[msg("Price update is not the bank's feed, not fully verified, or not a positive price")]
    InvalidPriceFeed,

    #[msg("Account is not a lending pool account of the expected type")]
    InvalidAccount,

    #[msg("Liquidator cannot liquidate its own position")]
    SelfLiquidation,

    #[msg("Ledger invariant violated")]
    LedgerInvariantViolated,

    #[msg("Signer is not the market authority")]
    Unauthorized,
}
