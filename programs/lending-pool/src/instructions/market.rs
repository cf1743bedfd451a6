use anchor_lang::prelude::*;
use pyth_solana_receiver_sdk::price_update::PriceUpdateV2;

use crate::engine::Market;
use crate::errors::LendingError;
use crate::oracle::bank_price;
use crate::state::Bank;

/// Build the priced market an instruction values positions against.
///
/// `named` are the banks the instruction's account context already holds,
/// each with the Pyth update it is priced by. `remaining` carries
/// `(bank, price_update)` pairs for every other asset the affected positions
/// hold. Named banks win over a duplicate pair in `remaining`.
pub fn load_market(named: &[(&Bank, &PriceUpdateV2)], remaining: &[AccountInfo], clock: &Clock) -> Result<Market> {
    require!(remaining.len() % 2 == 0, LendingError::InvalidAccount);

    let mut market = Market::new();

    for pair in remaining.chunks_exact(2) {
        let bank: Bank = read_account(&pair[0])?;
        let update: PriceUpdateV2 = read_account(&pair[1])?;
        let price = bank_price(&bank, &update, clock)?;
        market.insert(bank, price);
    }

    for (bank, update) in named {
        let price = bank_price(bank, update, clock)?;
        market.insert((*bank).clone(), price);
    }

    Ok(market)
}

/// Deserialize an account owned by `T`'s program, checking owner and discriminator
fn read_account<T: AccountDeserialize + Owner>(info: &AccountInfo) -> Result<T> {
    require_keys_eq!(*info.owner, T::owner(), LendingError::InvalidAccount);
    let data = info.try_borrow_data()?;
    T::try_deserialize(&mut &data[..])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::tests::{clock_at, price_update, NOW};
    use crate::state::bank::tests::{bank_with, config};

    /// Backing storage for an `AccountInfo`
    struct Stored {
        key: Pubkey,
        owner: Pubkey,
        lamports: u64,
        data: Vec<u8>,
    }

    impl Stored {
        fn new<T: AccountSerialize>(account: &T, owner: Pubkey) -> Self {
            let mut data = Vec::new();
            account.try_serialize(&mut data).unwrap();
            Self {
                key: Pubkey::new_unique(),
                owner,
                lamports: 1_000_000,
                data,
            }
        }

        fn bank(bank: &Bank) -> Self {
            Self::new(bank, crate::ID)
        }

        fn update(update: &PriceUpdateV2) -> Self {
            Self::new(update, PriceUpdateV2::owner())
        }

        fn info(&mut self) -> AccountInfo<'_> {
            AccountInfo::new(
                &self.key,
                false,
                false,
                &mut self.lamports,
                &mut self.data,
                &self.owner,
                false,
                0,
            )
        }
    }

    fn error_code(result: Result<Market>) -> u32 {
        match result {
            Ok(_) => panic!("market loaded"),
            Err(Error::AnchorError(err)) => err.error_code_number,
            Err(Error::ProgramError(err)) => panic!("unexpected program error: {err:?}"),
        }
    }

    fn load(stored: &mut [Stored]) -> Result<Market> {
        let infos: Vec<AccountInfo> = stored.iter_mut().map(Stored::info).collect();
        load_market(&[], &infos, &clock_at(NOW))
    }

    fn sol_bank() -> Bank {
        bank_with(Pubkey::new_unique(), 9, config())
    }

    #[test]
    fn remaining_pairs_are_priced() {
        let bank = sol_bank();
        let update = price_update(bank.price_feed_id, 15_000_000_000, -8, NOW);
        let mut stored = [Stored::bank(&bank), Stored::update(&update)];

        let market = load(&mut stored).unwrap();
        assert_eq!(market.get(&bank.mint).unwrap().price, 150_000_000);
    }

    #[test]
    fn odd_remaining_accounts_are_rejected() {
        let bank = sol_bank();
        let mut stored = [Stored::bank(&bank)];
        assert_eq!(error_code(load(&mut stored)), u32::from(LendingError::InvalidAccount));
    }

    #[test]
    fn foreign_owned_bank_is_rejected() {
        let bank = sol_bank();
        let update = price_update(bank.price_feed_id, 15_000_000_000, -8, NOW);
        let mut stored = [Stored::new(&bank, Pubkey::new_unique()), Stored::update(&update)];
        assert_eq!(error_code(load(&mut stored)), u32::from(LendingError::InvalidAccount));
    }

    #[test]
    fn update_for_another_feed_is_rejected() {
        let bank = sol_bank();
        let update = price_update([3u8; 32], 15_000_000_000, -8, NOW);
        let mut stored = [Stored::bank(&bank), Stored::update(&update)];
        assert_eq!(error_code(load(&mut stored)), u32::from(LendingError::InvalidPriceFeed));
    }

    #[test]
    fn price_update_must_be_pyth_owned() {
        let bank = sol_bank();
        let update = price_update(bank.price_feed_id, 15_000_000_000, -8, NOW);
        let mut stored = [Stored::bank(&bank), Stored::new(&update, crate::ID)];
        assert_eq!(error_code(load(&mut stored)), u32::from(LendingError::InvalidAccount));
    }

    #[test]
    fn stale_update_is_rejected() {
        let bank = sol_bank();
        let update = price_update(bank.price_feed_id, 15_000_000_000, -8, NOW - 120);
        let mut stored = [Stored::bank(&bank), Stored::update(&update)];
        assert_eq!(error_code(load(&mut stored)), u32::from(LendingError::StalePrice));
    }

    #[test]
    fn named_bank_overrides_remaining_copy() {
        let stale_copy = sol_bank();
        let mut fresh = stale_copy.clone();
        fresh.total_deposited = 1_000;
        fresh.total_deposit_shares = 1_000;

        let old = price_update(stale_copy.price_feed_id, 14_000_000_000, -8, NOW);
        let current = price_update(fresh.price_feed_id, 15_000_000_000, -8, NOW);
        let mut stored = [Stored::bank(&stale_copy), Stored::update(&old)];
        let infos: Vec<AccountInfo> = stored.iter_mut().map(Stored::info).collect();

        let market = load_market(&[(&fresh, &current)], &infos, &clock_at(NOW)).unwrap();
        let priced = market.get(&fresh.mint).unwrap();
        assert_eq!(priced.bank.total_deposited, 1_000);
        assert_eq!(priced.price, 150_000_000);
    }
}
