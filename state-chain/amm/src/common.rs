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

use cf_amm_math::{SqrtPriceQ64F96, Tick, MAX_SQRT_PRICE, MIN_SQRT_PRICE, U256};
use cf_primitives::{Side, SignedAssetAmount, ONE_IN_PIPS};
use codec::{Decode, Encode};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::PoolConfig;

/// The largest fee a pool may charge, 50%.
pub const MAX_FEE_PIPS: u32 = ONE_IN_PIPS / 2;

/// What a swap settlement did with the deltas it was given.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
pub enum Settlement {
	/// The input was transferred to the pool. The pool checks its balance and pays the output.
	Paid,
	/// Nothing was transferred. Only accepted for swaps paying out to the null account, in which
	/// case the pool returns the deltas without checking balances or paying out.
	DryRun,
}

pub struct ZeroToOne {}
pub struct OneToZero {}

pub trait SwapDirection {
	const INPUT_SIDE: Side;

	/// The protocol wide price a swap in this direction can approach but never reach.
	const PRICE_BOUND: SqrtPriceQ64F96;

	/// Determines if a given sqrt_price is further along the direction of the swap than another
	fn sqrt_price_op_more_than(
		sqrt_price: SqrtPriceQ64F96,
		sqrt_price_other: SqrtPriceQ64F96,
	) -> bool;

	/// The edge of the pool's range the price moves towards.
	fn range_boundary(config: &PoolConfig) -> Tick;

	/// A price limit must lie strictly between the current price and the protocol wide bound.
	fn is_price_limit_valid(current: SqrtPriceQ64F96, limit: SqrtPriceQ64F96) -> bool {
		Self::sqrt_price_op_more_than(limit, current) &&
			Self::sqrt_price_op_more_than(Self::PRICE_BOUND, limit)
	}

	/// The most permissive valid price limit.
	fn default_price_limit() -> SqrtPriceQ64F96;
}

impl SwapDirection for ZeroToOne {
	const INPUT_SIDE: Side = Side::Zero;
	const PRICE_BOUND: SqrtPriceQ64F96 = MIN_SQRT_PRICE;

	fn sqrt_price_op_more_than(
		sqrt_price: SqrtPriceQ64F96,
		sqrt_price_other: SqrtPriceQ64F96,
	) -> bool {
		sqrt_price < sqrt_price_other
	}

	fn range_boundary(config: &PoolConfig) -> Tick {
		config.range_low
	}

	fn default_price_limit() -> SqrtPriceQ64F96 {
		MIN_SQRT_PRICE + 1
	}
}

impl SwapDirection for OneToZero {
	const INPUT_SIDE: Side = Side::One;
	const PRICE_BOUND: SqrtPriceQ64F96 = MAX_SQRT_PRICE;

	fn sqrt_price_op_more_than(
		sqrt_price: SqrtPriceQ64F96,
		sqrt_price_other: SqrtPriceQ64F96,
	) -> bool {
		sqrt_price > sqrt_price_other
	}

	fn range_boundary(config: &PoolConfig) -> Tick {
		config.range_high
	}

	fn default_price_limit() -> SqrtPriceQ64F96 {
		MAX_SQRT_PRICE - 1
	}
}

/// The most permissive price limit for a swap paying in `input_side`.
pub fn default_price_limit(input_side: Side) -> SqrtPriceQ64F96 {
	match input_side {
		Side::Zero => ZeroToOne::default_price_limit(),
		Side::One => OneToZero::default_price_limit(),
	}
}

/// Converts an amount to a signed amount if it fits.
pub(crate) fn to_signed(amount: U256) -> Option<SignedAssetAmount> {
	u128::try_from(amount).ok().and_then(|amount| SignedAssetAmount::try_from(amount).ok())
}
