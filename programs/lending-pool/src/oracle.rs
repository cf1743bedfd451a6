//! Pyth pull-oracle reads, converted to the engine's USD scale.

use anchor_lang::prelude::*;
use pyth_solana_receiver_sdk::error::GetPriceError;
use pyth_solana_receiver_sdk::price_update::PriceUpdateV2;

use crate::constants::{MAX_PRICE_AGE_SECONDS, PRICE_DECIMALS};
use crate::errors::{LendingError, LendingResult};
use crate::state::Bank;

/// Largest exponent magnitude accepted from a feed
const MAX_EXPONENT_ABS: i32 = 18;

/// USD price of one whole token of `bank`, scaled by 10^6.
///
/// The update must carry the bank's feed id, be fully verified and be no
/// older than `MAX_PRICE_AGE_SECONDS`.
pub fn bank_price(bank: &Bank, update: &PriceUpdateV2, clock: &Clock) -> LendingResult<u64> {
    let price = update
        .get_price_no_older_than(clock, MAX_PRICE_AGE_SECONDS, &bank.price_feed_id)
        .map_err(|err| price_error(err.into()))?;
    normalize_price(price.price, price.exponent)
}

/// `price * 10^exponent` USD expressed with `PRICE_DECIMALS` decimals
pub fn normalize_price(price: i64, exponent: i32) -> LendingResult<u64> {
    if price <= 0 || exponent.abs() > MAX_EXPONENT_ABS {
        return Err(LendingError::InvalidPriceFeed);
    }

    let price = price as u128;
    let scale = exponent + PRICE_DECIMALS;
    let normalized = if scale >= 0 {
        price
            .checked_mul(10u128.pow(scale as u32))
            .ok_or(LendingError::ArithmeticOverflow)?
    } else {
        price / 10u128.pow(scale.unsigned_abs())
    };

    if normalized == 0 {
        return Err(LendingError::InvalidPriceFeed);
    }
    u64::try_from(normalized).map_err(|_| LendingError::ArithmeticOverflow)
}

fn price_error(err: Error) -> LendingError {
    match err {
        Error::AnchorError(err) if err.error_code_number == u32::from(GetPriceError::PriceTooOld) => {
            LendingError::StalePrice
        }
        _ => LendingError::InvalidPriceFeed,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::state::bank::tests::{bank_with, config};
    use pyth_solana_receiver_sdk::price_update::{PriceFeedMessage, VerificationLevel};

    pub const NOW: i64 = 1_700_000_000;

    pub fn clock_at(unix_timestamp: i64) -> Clock {
        Clock {
            unix_timestamp,
            ..Default::default()
        }
    }

    pub fn price_update(feed_id: [u8; 32], price: i64, exponent: i32, publish_time: i64) -> PriceUpdateV2 {
        PriceUpdateV2 {
            write_authority: Pubkey::new_unique(),
            verification_level: VerificationLevel::Full,
            price_message: PriceFeedMessage {
                feed_id,
                price,
                conf: 0,
                exponent,
                publish_time,
                prev_publish_time: publish_time - 1,
                ema_price: price,
                ema_conf: 0,
            },
            posted_slot: 0,
        }
    }

    #[test]
    fn pyth_exponents_map_to_micro_usd() {
        // $150.12345678 with exponent -8
        assert_eq!(normalize_price(15_012_345_678, -8).unwrap(), 150_123_456);
        // $1 with exponent -6 is already in scale
        assert_eq!(normalize_price(1_000_000, -6).unwrap(), 1_000_000);
        assert_eq!(normalize_price(42, 0).unwrap(), 42_000_000);
    }

    #[test]
    fn non_positive_or_vanishing_prices_are_rejected() {
        assert!(matches!(normalize_price(0, -8), Err(LendingError::InvalidPriceFeed)));
        assert!(matches!(normalize_price(-5, -8), Err(LendingError::InvalidPriceFeed)));
        // 1e-12 USD rounds to zero micro-USD
        assert!(matches!(normalize_price(1, -12), Err(LendingError::InvalidPriceFeed)));
        assert!(matches!(normalize_price(1, 40), Err(LendingError::InvalidPriceFeed)));
        assert!(matches!(normalize_price(i64::MAX, 18), Err(LendingError::ArithmeticOverflow)));
    }

    #[test]
    fn bank_price_reads_its_own_feed() {
        let bank = bank_with(Pubkey::new_unique(), 9, config());
        let update = price_update(bank.price_feed_id, 15_000_000_000, -8, NOW - 10);
        assert_eq!(bank_price(&bank, &update, &clock_at(NOW)).unwrap(), 150_000_000);
    }

    #[test]
    fn old_update_is_stale() {
        let bank = bank_with(Pubkey::new_unique(), 9, config());
        let update = price_update(bank.price_feed_id, 15_000_000_000, -8, NOW - 61);
        assert!(matches!(
            bank_price(&bank, &update, &clock_at(NOW)),
            Err(LendingError::StalePrice)
        ));
    }

    #[test]
    fn foreign_feed_or_partial_verification_is_rejected() {
        let bank = bank_with(Pubkey::new_unique(), 9, config());
        let foreign = price_update([9u8; 32], 15_000_000_000, -8, NOW);
        assert!(matches!(
            bank_price(&bank, &foreign, &clock_at(NOW)),
            Err(LendingError::InvalidPriceFeed)
        ));

        let mut partial = price_update(bank.price_feed_id, 15_000_000_000, -8, NOW);
        partial.verification_level = VerificationLevel::Partial { num_signatures: 3 };
        assert!(matches!(
            bank_price(&bank, &partial, &clock_at(NOW)),
            Err(LendingError::InvalidPriceFeed)
        ));
    }

    #[test]
    fn negative_pyth_price_is_invalid() {
        let bank = bank_with(Pubkey::new_unique(), 9, config());
        let update = price_update(bank.price_feed_id, -1, -8, NOW);
        assert!(matches!(
            bank_price(&bank, &update, &clock_at(NOW)),
            Err(LendingError::InvalidPriceFeed)
        ));
    }
}
