//! Fixed-point helpers over native token units, basis points and USD values.
//!
//! Token amounts and shares are `u64` in the asset's native precision. USD
//! values are `u128` scaled by [`USD_SCALE`](crate::constants::USD_SCALE). Every intermediate product is
//! taken in `u128` and narrowed back with a checked conversion.

use crate::constants::BPS_DENOMINATOR;
use crate::errors::{LendingError, LendingResult};

/// `amount * bps / 10000`, rounded down
pub fn mul_bps(amount: u64, bps: u64) -> LendingResult<u64> {
    let product = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(LendingError::ArithmeticOverflow)?;
    narrow(product / BPS_DENOMINATOR as u128)
}

/// USD-value variant of [`mul_bps`]
pub fn mul_bps_u128(value: u128, bps: u64) -> LendingResult<u128> {
    Ok(value
        .checked_mul(bps as u128)
        .ok_or(LendingError::ArithmeticOverflow)?
        / BPS_DENOMINATOR as u128)
}

/// Shares minted for `amount`, rounded down.
///
/// An empty pool (no shares outstanding) issues shares 1:1.
pub fn to_shares(amount: u64, total_amount: u64, total_shares: u64) -> LendingResult<u64> {
    if total_shares == 0 {
        return Ok(amount);
    }
    mul_div_floor(amount, total_shares, total_amount)
}

/// Shares for `amount`, rounded up (debt issuance, withdraw burns)
pub fn to_shares_ceil(amount: u64, total_amount: u64, total_shares: u64) -> LendingResult<u64> {
    if total_shares == 0 {
        return Ok(amount);
    }
    mul_div_ceil(amount, total_shares, total_amount)
}

/// Amount redeemable for `shares`, rounded down
pub fn to_amount(shares: u64, total_amount: u64, total_shares: u64) -> LendingResult<u64> {
    if shares == 0 {
        return Ok(0);
    }
    mul_div_floor(shares, total_amount, total_shares)
}

/// Amount owed for `shares`, rounded up
pub fn to_amount_ceil(shares: u64, total_amount: u64, total_shares: u64) -> LendingResult<u64> {
    if shares == 0 {
        return Ok(0);
    }
    mul_div_ceil(shares, total_amount, total_shares)
}

/// USD value (scaled by 10^6) of `amount` native units at `price`, rounded down
pub fn value_usd(amount: u64, price: u64, decimals: u8) -> LendingResult<u128> {
    let product = (amount as u128)
        .checked_mul(price as u128)
        .ok_or(LendingError::ArithmeticOverflow)?;
    Ok(product / decimals_scale(decimals)?)
}

/// [`value_usd`] rounded up, for debt: any owed unit at a non-zero price is worth at least 1
pub fn value_usd_ceil(amount: u64, price: u64, decimals: u8) -> LendingResult<u128> {
    let product = (amount as u128)
        .checked_mul(price as u128)
        .ok_or(LendingError::ArithmeticOverflow)?;
    Ok(product.div_ceil(decimals_scale(decimals)?))
}

/// Native units worth `value` USD at `price`, rounded down
pub fn amount_for_value(value: u128, price: u64, decimals: u8) -> LendingResult<u64> {
    if price == 0 {
        return Err(LendingError::DivisionByZero);
    }
    let scaled = value
        .checked_mul(decimals_scale(decimals)?)
        .ok_or(LendingError::ArithmeticOverflow)?;
    narrow(scaled / price as u128)
}

/// `numerator * HEALTH_FACTOR_ONE / denominator`, saturating at `u64::MAX`
pub fn ratio(numerator: u128, denominator: u128, one: u64) -> LendingResult<u64> {
    if denominator == 0 {
        return Err(LendingError::DivisionByZero);
    }
    let scaled = numerator
        .checked_mul(one as u128)
        .ok_or(LendingError::ArithmeticOverflow)?;
    Ok(u64::try_from(scaled / denominator).unwrap_or(u64::MAX))
}

fn decimals_scale(decimals: u8) -> LendingResult<u128> {
    10u128
        .checked_pow(decimals as u32)
        .ok_or(LendingError::ArithmeticOverflow)
}

fn mul_div_floor(a: u64, b: u64, denom: u64) -> LendingResult<u64> {
    if denom == 0 {
        return Err(LendingError::DivisionByZero);
    }
    let product = (a as u128)
        .checked_mul(b as u128)
        .ok_or(LendingError::ArithmeticOverflow)?;
    narrow(product / denom as u128)
}

fn mul_div_ceil(a: u64, b: u64, denom: u64) -> LendingResult<u64> {
    if denom == 0 {
        return Err(LendingError::DivisionByZero);
    }
    let product = (a as u128)
        .checked_mul(b as u128)
        .ok_or(LendingError::ArithmeticOverflow)?;
    narrow(product.div_ceil(denom as u128))
}

fn narrow(value: u128) -> LendingResult<u64> {
    u64::try_from(value).map_err(|_| LendingError::ArithmeticOverflow)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::USD_SCALE;
    use proptest::prelude::*;

    const fn usd(whole: u64) -> u128 {
        whole as u128 * USD_SCALE
    }

    #[test]
    fn mul_bps_rounds_down() {
        assert_eq!(mul_bps(1_000, 8_000).unwrap(), 800);
        assert_eq!(mul_bps(999, 5_000).unwrap(), 499);
        assert_eq!(mul_bps(u64::MAX, 10_000).unwrap(), u64::MAX);
    }

    #[test]
    fn mul_bps_overflow_is_reported() {
        assert!(matches!(
            mul_bps(u64::MAX, 20_000),
            Err(LendingError::ArithmeticOverflow)
        ));
    }

    #[test]
    fn first_depositor_bootstraps_one_to_one() {
        assert_eq!(to_shares(500, 0, 0).unwrap(), 500);
        assert_eq!(to_shares_ceil(500, 0, 0).unwrap(), 500);
    }

    #[test]
    fn shares_scale_with_pool_value() {
        // pool worth 2000 backing 1000 shares
        assert_eq!(to_shares(100, 2_000, 1_000).unwrap(), 50);
        assert_eq!(to_shares(101, 2_000, 1_000).unwrap(), 50);
        assert_eq!(to_shares_ceil(101, 2_000, 1_000).unwrap(), 51);
        assert_eq!(to_amount(50, 2_000, 1_000).unwrap(), 100);
    }

    #[test]
    fn to_amount_without_shares_is_illegal() {
        assert_eq!(to_amount(0, 0, 0).unwrap(), 0);
        assert!(matches!(
            to_amount(10, 100, 0),
            Err(LendingError::DivisionByZero)
        ));
        assert!(matches!(
            to_amount_ceil(10, 100, 0),
            Err(LendingError::DivisionByZero)
        ));
    }

    #[test]
    fn shares_against_empty_amount_is_illegal() {
        assert!(matches!(
            to_shares(10, 0, 100),
            Err(LendingError::DivisionByZero)
        ));
    }

    #[test]
    fn usd_valuation_respects_decimals() {
        // 1.5 tokens with 9 decimals at $20
        assert_eq!(value_usd(1_500_000_000, 20_000_000, 9).unwrap(), usd(30));
        assert_eq!(amount_for_value(usd(30), 20_000_000, 9).unwrap(), 1_500_000_000);
        assert!(matches!(
            amount_for_value(usd(1), 0, 6),
            Err(LendingError::DivisionByZero)
        ));
    }

    #[test]
    fn debt_valuation_rounds_dust_up() {
        // 6 lamports at $150 is 0.9 micro-USD
        assert_eq!(value_usd(6, 150_000_000, 9).unwrap(), 0);
        assert_eq!(value_usd_ceil(6, 150_000_000, 9).unwrap(), 1);
        assert_eq!(value_usd_ceil(1_500_000_000, 20_000_000, 9).unwrap(), usd(30));
        assert_eq!(value_usd_ceil(0, 150_000_000, 9).unwrap(), 0);
    }

    #[test]
    fn ratio_saturates() {
        assert_eq!(ratio(850, 800, 10_000).unwrap(), 10_625);
        assert_eq!(ratio(u128::MAX / 10_000, 1, 10_000).unwrap(), u64::MAX);
        assert!(matches!(ratio(1, 0, 10_000), Err(LendingError::DivisionByZero)));
    }

    proptest! {
        #[test]
        fn share_rounding_never_creates_value(
            amount in 1..=u32::MAX as u64,
            total_amount in 1..=u32::MAX as u64,
            total_shares in 1..=u32::MAX as u64,
        ) {
            let shares = to_shares(amount, total_amount, total_shares).unwrap();
            let redeemed = to_amount(
                shares,
                total_amount + amount,
                total_shares + shares,
            ).unwrap();
            prop_assert!(redeemed <= amount);
        }

        #[test]
        fn ceil_never_below_floor(
            amount in 0..=u32::MAX as u64,
            total_amount in 1..=u32::MAX as u64,
            total_shares in 1..=u32::MAX as u64,
        ) {
            let floor = to_shares(amount, total_amount, total_shares).unwrap();
            let ceil = to_shares_ceil(amount, total_amount, total_shares).unwrap();
            prop_assert!(ceil >= floor && ceil - floor <= 1);
        }
    }
}
