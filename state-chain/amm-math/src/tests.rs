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
use rand::{Rng, SeedableRng};

#[test]
fn test_mul_div_floor() {
	assert_eq!(mul_div_floor(1.into(), 1.into(), 1), 1.into());
	assert_eq!(mul_div_floor(1.into(), 1.into(), 2), 0.into());
	assert_eq!(mul_div_floor(1.into(), 3.into(), 2), 1.into());
	assert_eq!(mul_div_floor(4.into(), 1.into(), 3), 1.into());
	assert_eq!(mul_div_floor(5.into(), 1.into(), 6), 0.into());

	assert_eq!(mul_div_floor(U256::MAX, U256::MAX, U256::MAX), U256::MAX);
	assert_eq!(mul_div_floor(U256::MAX, U256::MAX - 1, U256::MAX), U256::MAX - 1);
}

#[test]
fn test_mul_div() {
	assert_eq!(mul_div(U256::MAX, U256::MAX, U256::MAX), (U256::MAX, U256::MAX));
	assert_eq!(mul_div(U256::MAX, U256::MAX - 1, U256::MAX), (U256::MAX - 1, U256::MAX - 1));
	assert_eq!(mul_div(2.into(), 2.into(), 3), (1.into(), 2.into()));
	assert_eq!(mul_div(2.into(), 2.into(), 4), (1.into(), 1.into()));
	assert_eq!(mul_div(2.into(), 2.into(), 5), (0.into(), 1.into()));
	assert_eq!(mul_div_ceil(2.into(), 2.into(), 6), 1.into());
}

#[test]
fn checked_mul_div_reports_failures() {
	assert_eq!(mul_div_floor_checked(1.into(), 1.into(), 0), None);
	assert_eq!(mul_div_ceil_checked(1.into(), 1.into(), 0), None);
	assert_eq!(mul_div_floor_checked(U256::MAX, U256::MAX, 1), None);
	assert_eq!(mul_div_ceil_checked(U256::MAX, 2.into(), 2), Some(U256::MAX));
	assert_eq!(mul_div_ceil_checked(7.into(), 1.into(), 2), Some(4.into()));
	assert_eq!(mul_div_floor_checked(7.into(), 1.into(), 2), Some(3.into()));
}

#[test]
fn liquidity_deltas_are_checked() {
	assert_eq!(add_liquidity_delta(10, -4), Some(6));
	assert_eq!(add_liquidity_delta(10, 4), Some(14));
	assert_eq!(add_liquidity_delta(3, -4), None);
	assert_eq!(add_liquidity_delta(u128::MAX, 1), None);
}

#[test]
fn sqrt_price_at_extreme_ticks() {
	assert_eq!(sqrt_price_at_tick(MIN_TICK), MIN_SQRT_PRICE);
	assert_eq!(sqrt_price_at_tick(MAX_TICK), MAX_SQRT_PRICE);
	assert!(!sqrt_price_at_tick(MIN_TICK).is_zero());
}

#[test]
fn test_sqrt_price_at_tick() {
	assert_eq!(sqrt_price_at_tick(0), U256::one() << 96);
	assert_eq!(sqrt_price_at_tick(-738203), U256::from_dec_str("7409801140451").unwrap());
	assert_eq!(sqrt_price_at_tick(-500000), U256::from_dec_str("1101692437043807371").unwrap());
	assert_eq!(
		sqrt_price_at_tick(-50000),
		U256::from_dec_str("6504256538020985011912221507").unwrap()
	);
	assert_eq!(
		sqrt_price_at_tick(-1000),
		U256::from_dec_str("75364347830767020784054125655").unwrap()
	);
	assert_eq!(sqrt_price_at_tick(-50), U256::from_dec_str("79030349367926598376800521322").unwrap());
	assert_eq!(sqrt_price_at_tick(50), U256::from_dec_str("79426470787362580746886972461").unwrap());
	assert_eq!(
		sqrt_price_at_tick(1000),
		U256::from_dec_str("83290069058676223003182343270").unwrap()
	);
	assert_eq!(
		sqrt_price_at_tick(50000),
		U256::from_dec_str("965075977353221155028623082916").unwrap()
	);
	assert_eq!(
		sqrt_price_at_tick(500000),
		U256::from_dec_str("5697689776495288729098254600827762987878").unwrap()
	);
	assert_eq!(
		sqrt_price_at_tick(738203),
		U256::from_dec_str("847134979253254120489401328389043031315994541").unwrap()
	);
}

#[test]
fn test_tick_at_sqrt_price() {
	assert_eq!(tick_at_sqrt_price(MIN_SQRT_PRICE), MIN_TICK);
	assert_eq!(tick_at_sqrt_price(U256::from_dec_str("79228162514264337593543").unwrap()), -276325);
	assert_eq!(
		tick_at_sqrt_price(U256::from_dec_str("9903520314283042199192993792").unwrap()),
		-41591
	);
	assert_eq!(
		tick_at_sqrt_price(U256::from_dec_str("79228162514264337593543950336").unwrap()),
		0
	);
	assert_eq!(
		tick_at_sqrt_price(U256::from_dec_str("112045541949572279837463876454").unwrap()),
		6931
	);
	assert_eq!(
		tick_at_sqrt_price(U256::from_dec_str("79228162514264337593543950336000000").unwrap()),
		276324
	);
	assert_eq!(tick_at_sqrt_price(MAX_SQRT_PRICE - 1), MAX_TICK - 1);
}

#[test]
fn tick_round_trips_through_sqrt_price() {
	let mut rng = rand::rngs::StdRng::from_seed([7; 32]);
	for _ in 0..2000 {
		let tick = rng.gen_range(MIN_TICK..MAX_TICK);
		let sqrt_price = sqrt_price_at_tick(tick);
		assert_eq!(tick_at_sqrt_price(sqrt_price), tick);
		assert!(sqrt_price < sqrt_price_at_tick(tick + 1));
		// Just below the tick's price belongs to the previous tick.
		if tick > MIN_TICK {
			assert_eq!(tick_at_sqrt_price(sqrt_price - 1), tick - 1);
		}
	}
}

#[test]
fn sqrt_price_from_ratio_encodes_human_prices() {
	assert_eq!(sqrt_price_from_ratio(1, 1), Some(U256::one() << 96));
	assert_eq!(sqrt_price_from_ratio(10_000, 1), Some(U256::from(100) << 96));
	assert_eq!(sqrt_price_from_ratio(1, 4), Some(U256::one() << 95));
	assert_eq!(sqrt_price_from_ratio(1, 0), None);
	assert_eq!(tick_at_sqrt_price(sqrt_price_from_ratio(1, 1).unwrap()), 0);
	// 1.0001^92108 ~= 10000
	assert_eq!(tick_at_sqrt_price(sqrt_price_from_ratio(10_000, 1).unwrap()), 92108);
}

#[test]
fn price_conversions_agree_with_ticks() {
	let one = U256::one() << PRICE_FRACTIONAL_BITS;
	assert_eq!(price_at_tick(0), Some(one));
	assert_eq!(price_to_sqrt_price(one), U256::one() << 96);
	assert_eq!(tick_at_price(one), Some(0));
	assert_eq!(price_at_tick(MAX_TICK + 1), None);
}
