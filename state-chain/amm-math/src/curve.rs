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

//! Amount, liquidity and price relations of a constant product curve restricted to a price range.
//!
//! For liquidity `L` between the sqrt prices `a < b`:
//! - the amount of asset zero is `L * (b - a) / (a * b)`
//! - the amount of asset one is `L * (b - a)`
//!
//! Each relation is provided in a rounding direction that always favours the pool.

use crate::{
	mul_div, mul_div_ceil, mul_div_ceil_checked, mul_div_floor, mul_div_floor_checked, Amount,
	Liquidity, SqrtPriceQ64F96, ONE_IN_PIPS, SQRT_PRICE_FRACTIONAL_BITS, U256, U512,
};


fn ordered(a: SqrtPriceQ64F96, b: SqrtPriceQ64F96) -> (SqrtPriceQ64F96, SqrtPriceQ64F96) {
	if a <= b {
		(a, b)
	} else {
		(b, a)
	}
}

/// The amount of asset zero between two sqrt prices, given in either order.
///
/// Panics if either price is zero.
pub fn amount0_delta(
	sqrt_price_a: SqrtPriceQ64F96,
	sqrt_price_b: SqrtPriceQ64F96,
	liquidity: Liquidity,
	round_up: bool,
) -> Amount {
	let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);
	assert!(SqrtPriceQ64F96::zero() < lower);

	/*
		Proof that `mul_div` does not overflow:
		If A ∈ ℕ, B ∈ ℕ, A > 0, B >= A
		Then A * B >= B and B - A < B
		Then A * B > B - A
	*/
	let (floor, ceil) = mul_div(
		U256::from(liquidity) << SQRT_PRICE_FRACTIONAL_BITS,
		upper - lower,
		U256::full_mul(upper, lower),
	);
	if round_up {
		ceil
	} else {
		floor
	}
}

/// The amount of asset one between two sqrt prices, given in either order.
pub fn amount1_delta(
	sqrt_price_a: SqrtPriceQ64F96,
	sqrt_price_b: SqrtPriceQ64F96,
	liquidity: Liquidity,
	round_up: bool,
) -> Amount {
	let (lower, upper) = ordered(sqrt_price_a, sqrt_price_b);

	/*
		Proof that `mul_div` does not overflow:
		If A ∈ u160, B ∈ u160, A <= B, L ∈ u128
		Then B - A ∈ u160
		Then L * (B - A) / (1<<96) <= u192::MAX < u256::MAX
	*/
	let (floor, ceil) =
		mul_div(liquidity.into(), upper - lower, U512::one() << SQRT_PRICE_FRACTIONAL_BITS);
	if round_up {
		ceil
	} else {
		floor
	}
}

/// The amounts of asset zero and asset one backing `liquidity` over `[sqrt_lower, sqrt_upper)` at
/// the current price. Below the range only asset zero is needed, above it only asset one.
///
/// Rounding up gives the amounts a depositor owes, rounding down the amounts a withdrawal receives.
pub fn amounts_for_liquidity(
	sqrt_price: SqrtPriceQ64F96,
	sqrt_lower: SqrtPriceQ64F96,
	sqrt_upper: SqrtPriceQ64F96,
	liquidity: Liquidity,
	round_up: bool,
) -> (Amount, Amount) {
	assert!(sqrt_lower < sqrt_upper);
	if sqrt_price <= sqrt_lower {
		(amount0_delta(sqrt_lower, sqrt_upper, liquidity, round_up), Amount::zero())
	} else if sqrt_price < sqrt_upper {
		(
			amount0_delta(sqrt_price, sqrt_upper, liquidity, round_up),
			amount1_delta(sqrt_lower, sqrt_price, liquidity, round_up),
		)
	} else {
		(Amount::zero(), amount1_delta(sqrt_lower, sqrt_upper, liquidity, round_up))
	}
}

/// The largest liquidity over `[sqrt_lower, sqrt_upper)` that both amounts can fund at the current
/// price. Inverse of [amounts_for_liquidity]; whichever asset binds first limits the result.
/// Saturates at `Liquidity::MAX`.
pub fn liquidity_for_amounts(
	sqrt_price: SqrtPriceQ64F96,
	sqrt_lower: SqrtPriceQ64F96,
	sqrt_upper: SqrtPriceQ64F96,
	amount0: Amount,
	amount1: Amount,
) -> Liquidity {
	fn zero_amount_to_liquidity(
		lower: SqrtPriceQ64F96,
		upper: SqrtPriceQ64F96,
		amount: Amount,
	) -> U512 {
		(U512::saturating_mul(amount.into(), U256::full_mul(lower, upper)) /
			U512::from(upper - lower)) >>
			SQRT_PRICE_FRACTIONAL_BITS
	}

	fn one_amount_to_liquidity(
		lower: SqrtPriceQ64F96,
		upper: SqrtPriceQ64F96,
		amount: Amount,
	) -> U512 {
		U256::full_mul(amount, U256::one() << SQRT_PRICE_FRACTIONAL_BITS) / (upper - lower)
	}

	assert!(sqrt_lower < sqrt_upper);
	if sqrt_price <= sqrt_lower {
		zero_amount_to_liquidity(sqrt_lower, sqrt_upper, amount0)
	} else if sqrt_price < sqrt_upper {
		core::cmp::min(
			zero_amount_to_liquidity(sqrt_price, sqrt_upper, amount0),
			one_amount_to_liquidity(sqrt_lower, sqrt_price, amount1),
		)
	} else {
		one_amount_to_liquidity(sqrt_lower, sqrt_upper, amount1)
	}
	.try_into()
	.unwrap_or(Liquidity::MAX)
}

/// The price after adding (`add`) or removing `amount` of asset zero. Rounds up, so the price never
/// moves further than the amount pays for.
fn next_sqrt_price_from_amount0_rounding_up(
	sqrt_price: SqrtPriceQ64F96,
	liquidity: Liquidity,
	amount: Amount,
	add: bool,
) -> Option<SqrtPriceQ64F96> {
	if amount.is_zero() {
		return Some(sqrt_price)
	}
	let numerator = U256::from(liquidity) << SQRT_PRICE_FRACTIONAL_BITS;
	let product = U256::full_mul(amount, sqrt_price);
	let denominator = if add {
		U512::from(numerator).checked_add(product)?
	} else {
		U512::from(numerator).checked_sub(product).filter(|denominator| !denominator.is_zero())?
	};
	mul_div_ceil_checked(numerator, sqrt_price, denominator)
}

/// The price after adding (`add`) or removing `amount` of asset one. Rounds down, so the price never
/// moves further than the amount pays for.
fn next_sqrt_price_from_amount1_rounding_down(
	sqrt_price: SqrtPriceQ64F96,
	liquidity: Liquidity,
	amount: Amount,
	add: bool,
) -> Option<SqrtPriceQ64F96> {
	let q96 = U256::one() << SQRT_PRICE_FRACTIONAL_BITS;
	if add {
		sqrt_price.checked_add(mul_div_floor_checked(amount, q96, liquidity)?)
	} else {
		let quotient = mul_div_ceil_checked(amount, q96, liquidity)?;
		if sqrt_price > quotient {
			Some(sqrt_price - quotient)
		} else {
			None
		}
	}
}

/// The price reached by swapping `amount_in` into the curve. Returns `None` if there is no liquidity
/// or the result cannot be represented.
pub fn next_sqrt_price_from_input(
	sqrt_price: SqrtPriceQ64F96,
	liquidity: Liquidity,
	amount_in: Amount,
	zero_for_one: bool,
) -> Option<SqrtPriceQ64F96> {
	if sqrt_price.is_zero() || liquidity == 0 {
		return None
	}
	if zero_for_one {
		next_sqrt_price_from_amount0_rounding_up(sqrt_price, liquidity, amount_in, true)
	} else {
		next_sqrt_price_from_amount1_rounding_down(sqrt_price, liquidity, amount_in, true)
	}
}

/// The price reached by taking `amount_out` from the curve. Returns `None` if there is no liquidity
/// or the curve cannot supply the amount.
pub fn next_sqrt_price_from_output(
	sqrt_price: SqrtPriceQ64F96,
	liquidity: Liquidity,
	amount_out: Amount,
	zero_for_one: bool,
) -> Option<SqrtPriceQ64F96> {
	if sqrt_price.is_zero() || liquidity == 0 {
		return None
	}
	if zero_for_one {
		next_sqrt_price_from_amount1_rounding_down(sqrt_price, liquidity, amount_out, false)
	} else {
		next_sqrt_price_from_amount0_rounding_up(sqrt_price, liquidity, amount_out, false)
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SwapAmount {
	/// Spend up to this much of the input asset, fee included.
	ExactInput(Amount),
	/// Receive up to this much of the output asset.
	ExactOutput(Amount),
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SwapStep {
	pub sqrt_price_next: SqrtPriceQ64F96,
	/// Input consumed by the curve, excluding the fee.
	pub amount_in: Amount,
	pub amount_out: Amount,
	pub fee_amount: Amount,
}

/// Moves the price from `sqrt_price_current` towards `sqrt_price_target` (never past it) by as much
/// as `amount` allows. The direction is implied by the two prices.
///
/// On exact input the fee is taken from the input before it is swapped. If the target is not
/// reached, all of the specified input is consumed and whatever the curve did not use is the fee.
/// On exact output the output is capped at the requested amount.
///
/// Returns `None` if `fee_pips` is not below 100% or the price movement cannot be represented.
pub fn compute_swap_step(
	sqrt_price_current: SqrtPriceQ64F96,
	sqrt_price_target: SqrtPriceQ64F96,
	liquidity: Liquidity,
	amount: SwapAmount,
	fee_pips: u32,
) -> Option<SwapStep> {
	if fee_pips >= ONE_IN_PIPS {
		return None
	}
	let zero_for_one = sqrt_price_current >= sqrt_price_target;

	let input_between = |from, to| {
		if zero_for_one {
			amount0_delta(from, to, liquidity, true)
		} else {
			amount1_delta(from, to, liquidity, true)
		}
	};
	let output_between = |from, to| {
		if zero_for_one {
			amount1_delta(from, to, liquidity, false)
		} else {
			amount0_delta(from, to, liquidity, false)
		}
	};

	let sqrt_price_next = match amount {
		SwapAmount::ExactInput(remaining) => {
			let remaining_less_fee =
				mul_div_floor(remaining, (ONE_IN_PIPS - fee_pips).into(), ONE_IN_PIPS);
			if remaining_less_fee >= input_between(sqrt_price_current, sqrt_price_target) {
				sqrt_price_target
			} else {
				next_sqrt_price_from_input(
					sqrt_price_current,
					liquidity,
					remaining_less_fee,
					zero_for_one,
				)?
			}
		},
		SwapAmount::ExactOutput(remaining) => {
			if remaining >= output_between(sqrt_price_current, sqrt_price_target) {
				sqrt_price_target
			} else {
				next_sqrt_price_from_output(sqrt_price_current, liquidity, remaining, zero_for_one)?
			}
		},
	};
	let reached_target = sqrt_price_next == sqrt_price_target;

	let amount_in = input_between(sqrt_price_current, sqrt_price_next);
	let amount_out = match amount {
		SwapAmount::ExactOutput(remaining) =>
			core::cmp::min(output_between(sqrt_price_current, sqrt_price_next), remaining),
		SwapAmount::ExactInput(_) => output_between(sqrt_price_current, sqrt_price_next),
	};
	let fee_amount = match amount {
		SwapAmount::ExactInput(remaining) if !reached_target => remaining.saturating_sub(amount_in),
		_ => mul_div_ceil(amount_in, fee_pips.into(), ONE_IN_PIPS - fee_pips),
	};

	Some(SwapStep { sqrt_price_next, amount_in, amount_out, fee_amount })
}
