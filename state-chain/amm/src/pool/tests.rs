// Copyright 2025 Chainflip Labs GmbH
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

use super::*;
use crate::common::default_price_limit;
use cf_amm_math::{
	sqrt_price_from_ratio,
	test_utilities::{rng_liquidity, rng_u256_inclusive_bound},
	MIN_SQRT_PRICE,
};
use cf_traits::mocks::MockAssetLedger;
use cf_utilities::assert_ok;
use rand::{Rng, SeedableRng};

const ASSET_ZERO: AssetId = AssetId(1);
const ASSET_ONE: AssetId = AssetId(2);
const POOL: AccountId = AccountId([9; 32]);
const LP: AccountId = AccountId([1; 32]);
const OTHER_LP: AccountId = AccountId([2; 32]);
const TRADER: AccountId = AccountId([3; 32]);
const FUNDS: AssetAmount = 1 << 100;

fn config(fee_pips: u32) -> PoolConfig {
	PoolConfig {
		assets: SideMap::from_array([ASSET_ZERO, ASSET_ONE]),
		range_low: -60_000,
		range_high: 60_000,
		fee_pips,
	}
}

fn one() -> SqrtPriceQ64F96 {
	U256::one() << 96
}

fn funded_ledger() -> MockAssetLedger {
	let mut ledger = MockAssetLedger::default();
	for account in [LP, OTHER_LP, TRADER] {
		ledger.credit(ASSET_ZERO, &account, FUNDS);
		ledger.credit(ASSET_ONE, &account, FUNDS);
	}
	ledger
}

fn initialized_pool(fee_pips: u32) -> PoolState {
	let mut pool = PoolState::new(config(fee_pips), POOL).unwrap();
	assert_eq!(pool.initialize(one()), Ok(0));
	pool
}

/// Pays exactly what the pool asks for out of `payer`'s balances.
fn pay_from(
	payer: AccountId,
) -> impl FnOnce(&mut MockAssetLedger, &AccountId, SideMap<AssetAmount>) -> Result<(), LedgerError> {
	move |ledger, pool, amounts| {
		let assets = SideMap::from_array([ASSET_ZERO, ASSET_ONE]);
		for side in Side::ALL {
			ledger.transfer(assets[side], &payer, pool, amounts[side])?;
		}
		Ok(())
	}
}

/// Pays the positive delta of a swap out of `payer`'s balances.
fn pay_input_from(
	payer: AccountId,
) -> impl FnOnce(
	&mut MockAssetLedger,
	&AccountId,
	SideMap<SignedAssetAmount>,
) -> Result<Settlement, LedgerError> {
	move |ledger, pool, deltas| {
		let assets = SideMap::from_array([ASSET_ZERO, ASSET_ONE]);
		for side in Side::ALL {
			if deltas[side] > 0 {
				ledger.transfer(assets[side], &payer, pool, deltas[side] as AssetAmount)?;
			}
		}
		Ok(Settlement::Paid)
	}
}

fn mint(
	pool: &mut PoolState,
	ledger: &mut MockAssetLedger,
	owner: AccountId,
	liquidity: Liquidity,
) -> SideMap<AssetAmount> {
	assert_ok!(pool.mint(ledger, &owner, liquidity, pay_from(owner)))
}

#[test]
fn new_validates_config() {
	assert_ok!(PoolState::new(config(MAX_FEE_PIPS), POOL));

	for assets in [[ASSET_ONE, ASSET_ZERO], [ASSET_ZERO, ASSET_ZERO], [AssetId(0), ASSET_ONE]] {
		let config = PoolConfig { assets: SideMap::from_array(assets), ..config(0) };
		assert_eq!(PoolState::new(config, POOL), Err(NewError::InvalidAssets));
	}
	for (range_low, range_high) in [(10, 10), (10, -10), (MIN_TICK - 1, 0), (0, MAX_TICK + 1)] {
		let config = PoolConfig { range_low, range_high, ..config(0) };
		assert_eq!(PoolState::new(config, POOL), Err(NewError::InvalidRange));
	}
	assert_eq!(PoolState::new(config(MAX_FEE_PIPS + 1), POOL), Err(NewError::InvalidFeeAmount));
	assert_eq!(NewError::InvalidRange.kind(), ErrorKind::Configuration);
}

#[test]
fn initialize_only_once_and_within_range() {
	let mut pool = PoolState::new(config(3000), POOL).unwrap();
	assert!(!pool.is_initialized());
	assert_eq!(pool.initialize(U256::zero()), Err(InitializeError::InvalidInitialPrice));
	assert_eq!(pool.initialize(MAX_SQRT_PRICE), Err(InitializeError::InvalidInitialPrice));
	assert_eq!(
		pool.initialize(sqrt_price_at_tick(60_000)),
		Err(InitializeError::PriceOutsideRange)
	);
	assert_eq!(
		pool.initialize(sqrt_price_at_tick(-60_001)),
		Err(InitializeError::PriceOutsideRange)
	);
	assert!(!pool.is_initialized());

	assert_eq!(pool.initialize(sqrt_price_at_tick(-60_000)), Ok(-60_000));
	assert_eq!(pool.current_tick(), -60_000);
	assert_eq!(pool.initialize(one()), Err(InitializeError::AlreadyInitialized));
	assert_eq!(pool.sqrt_price(), sqrt_price_at_tick(-60_000));
}

#[test]
fn mint_requires_initialized_pool_and_liquidity() {
	let mut ledger = funded_ledger();
	let mut pool = PoolState::new(config(3000), POOL).unwrap();
	assert_eq!(
		pool.mint(&mut ledger, &LP, 1000, pay_from(LP)),
		Err(MintError::NotInitialized)
	);
	pool.initialize(one()).unwrap();
	assert_eq!(pool.mint(&mut ledger, &LP, 0, pay_from(LP)), Err(MintError::ZeroLiquidity));
	mint(&mut pool, &mut ledger, LP, 1000);
	assert_eq!(
		pool.mint(&mut ledger, &LP, Liquidity::MAX, pay_from(LP)),
		Err(MintError::MaximumLiquidity)
	);
	// A single call changes liquidity by at most `i128::MAX`.
	assert_eq!(
		pool.mint(&mut ledger, &OTHER_LP, i128::MAX as Liquidity + 1, pay_from(OTHER_LP)),
		Err(MintError::MaximumLiquidity)
	);
	assert_eq!(pool.liquidity(), 1000);
}

#[test]
fn mint_collects_required_amounts() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(3000);

	let required = mint(&mut pool, &mut ledger, LP, 1_000_000_000);
	// At a price of one in a symmetric range both assets are needed in equal measure.
	assert!(required[Side::Zero] > 0);
	assert!(required[Side::Zero].abs_diff(required[Side::One]) <= 1);
	for (side, asset) in [(Side::Zero, ASSET_ZERO), (Side::One, ASSET_ONE)] {
		assert_eq!(ledger.balance_of(asset, &POOL), required[side]);
		assert_eq!(ledger.balance_of(asset, &LP), FUNDS - required[side]);
	}
	assert_eq!(pool.liquidity(), 1_000_000_000);
	assert_eq!(pool.position(&LP).unwrap().liquidity, 1_000_000_000);

	mint(&mut pool, &mut ledger, LP, 500);
	mint(&mut pool, &mut ledger, OTHER_LP, 500);
	assert_eq!(pool.position(&LP).unwrap().liquidity, 1_000_000_500);
	assert_eq!(pool.liquidity(), 1_000_001_000);
	assert_eq!(pool.sum_of_position_liquidity(), pool.liquidity());
}

#[test]
fn mint_below_range_only_needs_asset_zero() {
	let mut ledger = funded_ledger();
	let mut pool = PoolState::new(config(3000), POOL).unwrap();
	pool.initialize(sqrt_price_at_tick(-60_000)).unwrap();
	let required = mint(&mut pool, &mut ledger, LP, 1_000_000);
	assert!(required[Side::Zero] > 0);
	assert_eq!(required[Side::One], 0);
}

#[test]
fn underfunded_mint_is_reverted() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(3000);
	mint(&mut pool, &mut ledger, LP, 1_000_000);
	let pool_before = pool.clone();

	let result = pool.mint(&mut ledger, &LP, 1_000_000, |ledger, pool, amounts| {
		ledger.transfer(ASSET_ZERO, &LP, pool, amounts[Side::Zero])?;
		ledger.transfer(ASSET_ONE, &LP, pool, amounts[Side::One] - 1)
	});
	assert_eq!(result, Err(MintError::InsufficientFunding(Side::One)));
	assert_eq!(pool, pool_before);

	let result = pool.mint(&mut ledger, &OTHER_LP, 1_000_000, |_, _, _| Err("declined"));
	assert_eq!(result, Err(MintError::CallbackFailed("declined")));
	assert_eq!(result.unwrap_err().into_callback_error(), Ok("declined"));
	assert_eq!(pool, pool_before);
	assert!(pool.position(&OTHER_LP).is_none());
}

#[test]
fn burn_credits_owed_amounts_without_transferring() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(3000);
	let paid = mint(&mut pool, &mut ledger, LP, 1_000_000_000);

	assert_eq!(pool.burn(&LP, 0), Err(BurnError::ZeroLiquidity));
	assert_eq!(pool.burn(&OTHER_LP, 1), Err(BurnError::InsufficientLiquidity));
	assert_eq!(pool.burn(&LP, 1_000_000_001), Err(BurnError::InsufficientLiquidity));
	assert_eq!(pool.burn(&LP, Liquidity::MAX), Err(BurnError::MaximumLiquidity));
	assert_eq!(pool.liquidity(), 1_000_000_000);

	let burned = assert_ok!(pool.burn(&LP, 1_000_000_000));
	for side in Side::ALL {
		// Rounded in favour of the pool both ways.
		assert!(burned[side] <= paid[side]);
		assert!(paid[side] - burned[side] <= 1);
	}
	let position = pool.position(&LP).unwrap();
	assert_eq!(position.liquidity, 0);
	assert_eq!(position.owed, burned);
	assert_eq!(pool.liquidity(), 0);
	assert_eq!(ledger.balance_of(ASSET_ZERO, &POOL), paid[Side::Zero]);
}

#[test]
fn collect_pays_up_to_owed_and_removes_empty_positions() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(3000);
	mint(&mut pool, &mut ledger, LP, 1_000_000_000);
	let burned = pool.burn(&LP, 1_000_000_000).unwrap();

	assert_eq!(
		pool.collect(&mut ledger, &OTHER_LP, &OTHER_LP, SideMap::from_array([u128::MAX; 2])),
		Ok(SideMap::default())
	);

	let partial = SideMap::from_array([10, 0]);
	assert_eq!(pool.collect(&mut ledger, &LP, &TRADER, partial), Ok(partial));
	assert_eq!(ledger.balance_of(ASSET_ZERO, &TRADER), FUNDS + 10);
	assert_eq!(pool.position(&LP).unwrap().owed[Side::Zero], burned[Side::Zero] - 10);

	let rest = assert_ok!(pool.collect(&mut ledger, &LP, &LP, SideMap::from_array([u128::MAX; 2])));
	assert_eq!(rest, SideMap::from_array([burned[Side::Zero] - 10, burned[Side::One]]));
	assert!(pool.position(&LP).is_none());
}

#[test]
fn failed_collect_leaves_owed_amounts() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(3000);
	mint(&mut pool, &mut ledger, LP, 1_000_000_000);
	pool.burn(&LP, 1_000_000_000).unwrap();
	let pool_before = pool.clone();

	ledger.freeze(&POOL);
	assert_eq!(
		pool.collect(&mut ledger, &LP, &LP, SideMap::from_array([u128::MAX; 2])),
		Err(CollectError::Payout(LedgerError::Rejected))
	);
	assert_eq!(pool, pool_before);
}

#[test]
fn exact_input_swap_consumes_the_whole_input() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(3000);
	mint(&mut pool, &mut ledger, LP, 1_000_000_000_000);
	let pool_balances = SideMap::from_array([ASSET_ZERO, ASSET_ONE])
		.map(|_, asset| ledger.balance_of(asset, &POOL));

	let deltas = assert_ok!(pool.swap(
		&mut ledger,
		&TRADER,
		Side::Zero,
		1_000_000,
		default_price_limit(Side::Zero),
		pay_input_from(TRADER),
	));
	assert_eq!(deltas[Side::Zero], 1_000_000);
	let amount_out = deltas[Side::One].unsigned_abs();
	// Slightly less than the input at a price of one, because of the fee and the price impact.
	assert!(amount_out < 997_000 && amount_out > 996_000, "{amount_out}");

	assert_eq!(ledger.balance_of(ASSET_ZERO, &TRADER), FUNDS - 1_000_000);
	assert_eq!(ledger.balance_of(ASSET_ONE, &TRADER), FUNDS + amount_out);
	assert_eq!(ledger.balance_of(ASSET_ZERO, &POOL), pool_balances[Side::Zero] + 1_000_000);
	assert_eq!(ledger.balance_of(ASSET_ONE, &POOL), pool_balances[Side::One] - amount_out);

	assert!(pool.sqrt_price() < one());
	assert_eq!(pool.current_tick(), -1);
	assert_eq!(pool.total_fees_earned()[Side::Zero], U256::from(3000));
	assert_eq!(pool.total_swap_inputs()[Side::Zero], U256::from(997_000));
	assert_eq!(pool.total_swap_outputs()[Side::One], U256::from(amount_out));
	assert!(!pool.fee_growth_global()[Side::Zero].is_zero());
	assert!(pool.fee_growth_global()[Side::One].is_zero());
}

#[test]
fn exact_output_swap_delivers_the_requested_output() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(3000);
	mint(&mut pool, &mut ledger, LP, 1_000_000_000_000);

	let deltas = assert_ok!(pool.swap(
		&mut ledger,
		&TRADER,
		Side::One,
		-1_000_000,
		default_price_limit(Side::One),
		pay_input_from(TRADER),
	));
	assert_eq!(deltas[Side::Zero], -1_000_000);
	let amount_in = deltas[Side::One] as AssetAmount;
	assert!(amount_in > 1_003_000 && amount_in < 1_004_100, "{amount_in}");
	assert_eq!(ledger.balance_of(ASSET_ZERO, &TRADER), FUNDS + 1_000_000);
	assert_eq!(ledger.balance_of(ASSET_ONE, &TRADER), FUNDS - amount_in);
	assert!(pool.sqrt_price() > one());
	assert_eq!(pool.current_tick(), 0);
}

#[test]
fn swap_stops_at_the_edge_of_the_range() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(0);
	let paid = mint(&mut pool, &mut ledger, LP, 1_000_000_000);

	let deltas = assert_ok!(pool.swap(
		&mut ledger,
		&TRADER,
		Side::Zero,
		i128::MAX >> 1,
		default_price_limit(Side::Zero),
		pay_input_from(TRADER),
	));
	assert_eq!(pool.sqrt_price(), sqrt_price_at_tick(-60_000));
	assert_eq!(pool.current_tick(), -60_000);
	// All of asset one is sold, less what rounding keeps in the pool.
	assert!(deltas[Side::One].unsigned_abs() <= paid[Side::One]);
	assert!(paid[Side::One] - deltas[Side::One].unsigned_abs() <= 1);
	assert!(deltas[Side::Zero] < i128::MAX >> 1);

	// The price can't move further down, but swaps still succeed without moving any funds.
	let deltas = assert_ok!(pool.swap(
		&mut ledger,
		&TRADER,
		Side::Zero,
		1000,
		MIN_SQRT_PRICE + 1,
		pay_input_from(TRADER),
	));
	assert_eq!(deltas, SideMap::default());
}

#[test]
fn swap_stops_at_the_price_limit() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(3000);
	mint(&mut pool, &mut ledger, LP, 1_000_000_000);

	let limit = sqrt_price_from_ratio(11, 10).unwrap();
	let deltas = assert_ok!(pool.swap(
		&mut ledger,
		&TRADER,
		Side::One,
		1 << 80,
		limit,
		pay_input_from(TRADER),
	));
	assert_eq!(pool.sqrt_price(), limit);
	assert!(deltas[Side::One] < 1 << 80);
	assert!(deltas[Side::Zero] < 0);
}

#[test]
fn swap_validates_arguments() {
	let mut ledger = funded_ledger();
	let mut pool = PoolState::new(config(3000), POOL).unwrap();
	assert_eq!(
		pool.swap(&mut ledger, &TRADER, Side::Zero, 100, MIN_SQRT_PRICE + 1, pay_input_from(TRADER)),
		Err(SwapError::NotInitialized)
	);
	pool.initialize(one()).unwrap();
	mint(&mut pool, &mut ledger, LP, 1_000_000_000);

	assert_eq!(
		pool.swap(&mut ledger, &TRADER, Side::Zero, 0, MIN_SQRT_PRICE + 1, pay_input_from(TRADER)),
		Err(SwapError::ZeroAmount)
	);
	for limit in [one(), one() + 1, MIN_SQRT_PRICE, MIN_SQRT_PRICE - 1] {
		assert_eq!(
			pool.swap(&mut ledger, &TRADER, Side::Zero, 100, limit, pay_input_from(TRADER)),
			Err(SwapError::InvalidPriceLimit)
		);
	}
	for limit in [one(), one() - 1, MAX_SQRT_PRICE] {
		assert_eq!(
			pool.swap(&mut ledger, &TRADER, Side::One, 100, limit, pay_input_from(TRADER)),
			Err(SwapError::InvalidPriceLimit)
		);
	}
}

#[test]
fn underpaid_swap_is_reverted() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(3000);
	mint(&mut pool, &mut ledger, LP, 1_000_000_000);
	let pool_before = pool.clone();

	let result = pool.swap(
		&mut ledger,
		&TRADER,
		Side::Zero,
		1_000_000,
		default_price_limit(Side::Zero),
		|ledger, pool, deltas| {
			ledger.transfer(ASSET_ZERO, &TRADER, pool, deltas[Side::Zero] as AssetAmount - 1)?;
			Ok::<_, LedgerError>(Settlement::Paid)
		},
	);
	assert_eq!(result, Err(SwapError::InsufficientFunding));
	assert_eq!(result.unwrap_err().into_callback_error().unwrap_err().kind(), ErrorKind::Funding);
	assert_eq!(pool, pool_before);

	let result = pool.swap(
		&mut ledger,
		&TRADER,
		Side::Zero,
		1_000_000,
		default_price_limit(Side::Zero),
		|_, _, _| Err(LedgerError::InsufficientAllowance),
	);
	assert_eq!(result, Err(SwapError::CallbackFailed(LedgerError::InsufficientAllowance)));
	assert_eq!(pool, pool_before);
}

#[test]
fn dry_run_is_only_accepted_for_the_null_recipient() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(3000);
	mint(&mut pool, &mut ledger, LP, 1_000_000_000);
	let pool_before = pool.clone();
	let ledger_before = ledger.clone();

	let dry_run = |_: &mut MockAssetLedger, _: &AccountId, _: SideMap<SignedAssetAmount>| {
		Ok::<_, LedgerError>(Settlement::DryRun)
	};
	assert_eq!(
		pool.swap(&mut ledger, &TRADER, Side::Zero, 1000, MIN_SQRT_PRICE + 1, dry_run),
		Err(SwapError::DryRunRejected)
	);
	assert_eq!(pool, pool_before);

	let quoted = assert_ok!(pool.swap(
		&mut ledger,
		&AccountId::NULL,
		Side::Zero,
		1000,
		MIN_SQRT_PRICE + 1,
		dry_run
	));
	let paid = assert_ok!(pool_before.clone().swap(
		&mut ledger.clone(),
		&TRADER,
		Side::Zero,
		1000,
		MIN_SQRT_PRICE + 1,
		pay_input_from(TRADER),
	));
	assert_eq!(quoted, paid);
	assert_eq!(ledger, ledger_before);
	// Nothing about the dry run stays behind: no price move and no fees for the LPs.
	assert_eq!(pool, pool_before);
}

#[test]
fn fees_are_shared_in_proportion_to_liquidity() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(3000);
	mint(&mut pool, &mut ledger, LP, 1_000_000_000);
	mint(&mut pool, &mut ledger, OTHER_LP, 1_000_000_000);

	pool.swap(
		&mut ledger,
		&TRADER,
		Side::Zero,
		1_000_000,
		default_price_limit(Side::Zero),
		pay_input_from(TRADER),
	)
	.unwrap();
	let fee = pool.total_fees_earned()[Side::Zero].as_u128();
	assert_eq!(fee, 3000);

	for lp in [LP, OTHER_LP] {
		let value = pool.value_of_liquidity(1_000_000_000).unwrap();
		let burned = pool.burn(&lp, 1_000_000_000).unwrap();
		assert_eq!(burned.map(|_, amount| U256::from(amount)), value);
		let owed = pool.position(&lp).unwrap().owed;
		let earned = owed[Side::Zero] - burned[Side::Zero];
		assert!(earned <= fee / 2 && earned + 1 >= fee / 2, "{earned}");
		assert_eq!(owed[Side::One], burned[Side::One]);
	}
}

#[test]
fn fees_accrue_across_fee_growth_wraparound() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(3000);
	mint(&mut pool, &mut ledger, LP, 1_000_000_000);
	let mut twin = pool.clone();
	let mut twin_ledger = ledger.clone();

	// Both accumulators sit just below the top of their range, with the position in sync.
	let near_max = U256::MAX - U256::from(10u32);
	pool.fee_growth_global = SideMap::from_array([near_max; 2]);
	pool.positions.get_mut(&LP).unwrap().fee_growth_inside_last = pool.fee_growth_global;

	for (pool, ledger) in [(&mut pool, &mut ledger), (&mut twin, &mut twin_ledger)] {
		assert_ok!(pool.swap(
			ledger,
			&TRADER,
			Side::Zero,
			1_000_000,
			default_price_limit(Side::Zero),
			pay_input_from(TRADER),
		));
	}
	assert!(pool.fee_growth_global()[Side::Zero] < near_max);
	assert_eq!(
		pool.fee_growth_global()[Side::Zero].overflowing_sub(near_max).0,
		twin.fee_growth_global()[Side::Zero]
	);

	let burned = assert_ok!(pool.burn(&LP, 1_000_000_000));
	assert_eq!(twin.burn(&LP, 1_000_000_000), Ok(burned));
	let owed = pool.position(&LP).unwrap().owed;
	assert_eq!(owed, twin.position(&LP).unwrap().owed);
	assert!(owed[Side::Zero] - burned[Side::Zero] > 0);
	assert_eq!(owed[Side::One], burned[Side::One]);
}

#[test]
fn position_fee_accrual_wraps_with_the_accumulator() {
	let one_unit_per_liquidity = U256::one() << FEE_GROWTH_FRACTIONAL_BITS;
	let last = U256::MAX - one_unit_per_liquidity + 1;
	let mut position = Position {
		liquidity: 1000,
		fee_growth_inside_last: SideMap::from_array([last; 2]),
		owed: SideMap::default(),
	};

	// Three units per liquidity later on one side, having wrapped past zero.
	let current = SideMap::from_array([one_unit_per_liquidity << 1, last]);
	let fees = position.accrue_fees(current);
	assert_eq!(fees, SideMap::from_array([3000, 0]));
	assert_eq!(position.owed, fees);
	assert_eq!(position.fee_growth_inside_last, current);
}

#[test]
fn fees_are_not_earned_before_minting() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(3000);
	mint(&mut pool, &mut ledger, LP, 1_000_000_000);
	pool.swap(
		&mut ledger,
		&TRADER,
		Side::One,
		1_000_000,
		default_price_limit(Side::One),
		pay_input_from(TRADER),
	)
	.unwrap();

	mint(&mut pool, &mut ledger, OTHER_LP, 1_000_000_000);
	let burned = pool.burn(&OTHER_LP, 1_000_000_000).unwrap();
	assert_eq!(pool.position(&OTHER_LP).unwrap().owed, burned);
}

#[test]
fn swaps_without_liquidity_move_the_price_to_the_limit() {
	let mut ledger = funded_ledger();
	let mut pool = initialized_pool(3000);
	let limit = sqrt_price_at_tick(100);
	let deltas = assert_ok!(pool.swap(
		&mut ledger,
		&TRADER,
		Side::One,
		1000,
		limit,
		pay_input_from(TRADER),
	));
	assert_eq!(deltas, SideMap::default());
	assert_eq!(pool.sqrt_price(), limit);
	assert_eq!(pool.current_tick(), 100);
	assert!(pool.fee_growth_global()[Side::One].is_zero());
}

#[test]
fn burning_minted_liquidity_never_returns_more_than_was_paid() {
	let mut rng = rand::rngs::StdRng::from_seed([3; 32]);
	for _ in 0..200 {
		let range_low = rng.gen_range(-200_000..200_000);
		let range_high = rng.gen_range(range_low + 1..=200_000);
		let mut pool =
			PoolState::new(PoolConfig { range_low, range_high, ..config(3000) }, POOL).unwrap();
		let sqrt_price = rng_u256_inclusive_bound(
			&mut rng,
			sqrt_price_at_tick(range_low)..=sqrt_price_at_tick(range_high) - 1,
		);
		assert_ok!(pool.initialize(sqrt_price));

		let mut ledger = funded_ledger();
		let liquidity = rng_liquidity(&mut rng, 64);
		let paid = mint(&mut pool, &mut ledger, LP, liquidity);
		let burned = pool.burn(&LP, liquidity).unwrap();
		for side in Side::ALL {
			assert!(burned[side] <= paid[side]);
			assert!(paid[side] - burned[side] <= 1);
		}
	}
}
