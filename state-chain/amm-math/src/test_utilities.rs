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

use crate::{Liquidity, SqrtPriceQ64F96, MAX_SQRT_PRICE, MIN_SQRT_PRICE, U256};
use rand::Rng;

pub fn rng_u256(rng: &mut impl Rng) -> U256 {
	U256([rng.gen(), rng.gen(), rng.gen(), rng.gen()])
}

/// Returns a uniformly distributed value in `bound`, by masking to the bit length of the upper
/// bound and rejecting samples outside the range.
pub fn rng_u256_inclusive_bound(rng: &mut impl Rng, bound: core::ops::RangeInclusive<U256>) -> U256 {
	let start = *bound.start();
	let end = *bound.end();
	assert!(start <= end);
	let mask = if end.bits() == 256 { U256::MAX } else { (U256::one() << end.bits()) - 1 };
	loop {
		let value = rng_u256(rng) & mask;
		if (start..=end).contains(&value) {
			break value
		}
	}
}

/// A valid sqrt price whose magnitude is spread logarithmically across the whole domain.
pub fn rng_sqrt_price(rng: &mut impl Rng) -> SqrtPriceQ64F96 {
	let bits = rng.gen_range(MIN_SQRT_PRICE.bits()..MAX_SQRT_PRICE.bits());
	rng_u256_inclusive_bound(rng, MIN_SQRT_PRICE..=(MAX_SQRT_PRICE - 1).min(U256::one() << bits))
}

/// A liquidity amount whose magnitude is spread logarithmically up to `max_bits` bits.
pub fn rng_liquidity(rng: &mut impl Rng, max_bits: u32) -> Liquidity {
	let bits = rng.gen_range(1..=max_bits.min(128));
	if bits == 128 {
		rng.gen()
	} else {
		rng.gen_range(1..(1u128 << bits))
	}
}
