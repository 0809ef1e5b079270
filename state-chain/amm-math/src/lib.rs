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

#![cfg_attr(not(feature = "std"), no_std)]

//! Fixed point arithmetic of the concentrated liquidity AMM.
//!
//! Prices are stored as the square root of the price of asset zero in units of asset one, as a
//! Q64.96 fixed point number. Fee growth is accumulated per unit of liquidity as a Q128.128 number.
//! All functions are pure.

pub mod curve;

#[cfg(any(test, feature = "test-utilities"))]
pub mod test_utilities;

#[cfg(test)]
mod tests;

pub use primitive_types::{U256, U512};

pub type Amount = U256;
pub type Tick = i32;
pub type Liquidity = u128;
pub type SqrtPriceQ64F96 = U256;
pub type FeeGrowthQ128F128 = U256;
/// Price of asset zero in units of asset one as a Q128.128 number.
pub type Price = U256;

pub const SQRT_PRICE_FRACTIONAL_BITS: u32 = 96;
pub const PRICE_FRACTIONAL_BITS: u32 = 128;
pub const FEE_GROWTH_FRACTIONAL_BITS: u32 = 128;

pub use cf_primitives::ONE_IN_PIPS;

/// The minimum tick that may be passed to `sqrt_price_at_tick` computed from log base 1.0001 of
/// 2**-128
pub const MIN_TICK: Tick = -887272;
/// The maximum tick that may be passed to `sqrt_price_at_tick` computed from log base 1.0001 of
/// 2**128
pub const MAX_TICK: Tick = -MIN_TICK;
/// The minimum value that can be returned from `sqrt_price_at_tick`. Equivalent to
/// `sqrt_price_at_tick(MIN_TICK)`
pub const MIN_SQRT_PRICE: SqrtPriceQ64F96 = U256([0x1000276a3u64, 0x0, 0x0, 0x0]);
/// The maximum value that can be returned from `sqrt_price_at_tick`. Equivalent to
/// `sqrt_price_at_tick(MAX_TICK)`.
pub const MAX_SQRT_PRICE: SqrtPriceQ64F96 =
	U256([0x5d951d5263988d26u64, 0xefd1fc6a50648849u64, 0xfffd8963u64, 0x0u64]);

pub fn mul_div_floor<C: Into<U512>>(a: U256, b: U256, c: C) -> U256 {
	let c: U512 = c.into();
	(U256::full_mul(a, b) / c).try_into().unwrap()
}

pub fn mul_div_ceil<C: Into<U512>>(a: U256, b: U256, c: C) -> U256 {
	mul_div(a, b, c).1
}

/// Returns `a * b / c` rounded down and rounded up. Panics if the result does not fit in 256 bits
/// or `c` is zero.
pub fn mul_div<C: Into<U512>>(a: U256, b: U256, c: C) -> (U256, U256) {
	let c: U512 = c.into();

	let (d, m) = U512::div_mod(U256::full_mul(a, b), c);

	(
		d.try_into().unwrap(),
		if m > U512::zero() {
			// cannot overflow as for m > 0, c must be > 1, and as (a*b) < U512::MAX, therefore
			// a*b/c < U512::MAX
			d + 1
		} else {
			d
		}
		.try_into()
		.unwrap(),
	)
}

/// As [mul_div_floor] but returns `None` instead of panicking when `c` is zero or the result does
/// not fit in 256 bits.
pub fn mul_div_floor_checked<C: Into<U512>>(a: U256, b: U256, c: C) -> Option<U256> {
	let c: U512 = c.into();
	if c.is_zero() {
		None
	} else {
		(U256::full_mul(a, b) / c).try_into().ok()
	}
}

/// As [mul_div_ceil] but returns `None` instead of panicking when `c` is zero or the result does
/// not fit in 256 bits.
pub fn mul_div_ceil_checked<C: Into<U512>>(a: U256, b: U256, c: C) -> Option<U256> {
	let c: U512 = c.into();
	if c.is_zero() {
		return None
	}
	let (d, m) = U512::div_mod(U256::full_mul(a, b), c);
	(if m.is_zero() { d } else { d + 1 }).try_into().ok()
}

/// Applies a signed liquidity delta. Returns `None` on underflow or overflow.
pub fn add_liquidity_delta(liquidity: Liquidity, delta: i128) -> Option<Liquidity> {
	liquidity.checked_add_signed(delta)
}

pub fn is_sqrt_price_valid(sqrt_price: SqrtPriceQ64F96) -> bool {
	(MIN_SQRT_PRICE..MAX_SQRT_PRICE).contains(&sqrt_price)
}

pub fn is_tick_valid(tick: Tick) -> bool {
	(MIN_TICK..=MAX_TICK).contains(&tick)
}

pub fn sqrt_price_to_price(sqrt_price: SqrtPriceQ64F96) -> Price {
	assert!((MIN_SQRT_PRICE..=MAX_SQRT_PRICE).contains(&sqrt_price));

	// Never zero: MIN_SQRT_PRICE has its 33rd bit set, which survives the shift below.
	mul_div_floor(
		sqrt_price,
		sqrt_price,
		SqrtPriceQ64F96::one() << (2 * SQRT_PRICE_FRACTIONAL_BITS - PRICE_FRACTIONAL_BITS),
	)
}

pub fn price_to_sqrt_price(price: Price) -> SqrtPriceQ64F96 {
	((U512::from(price) << PRICE_FRACTIONAL_BITS).integer_sqrt() >>
		(PRICE_FRACTIONAL_BITS - SQRT_PRICE_FRACTIONAL_BITS))
		.try_into()
		.unwrap_or(SqrtPriceQ64F96::MAX)
}

/// Encodes the ratio `amount_one / amount_zero` as a sqrt price, rounding down. "1:10000" means
/// one unit of asset zero is worth ten thousand units of asset one, i.e.
/// `sqrt_price_from_ratio(10_000, 1)`.
///
/// Returns `None` if `amount_zero` is zero.
pub fn sqrt_price_from_ratio(amount_one: u128, amount_zero: u128) -> Option<SqrtPriceQ64F96> {
	if amount_zero == 0 {
		return None
	}
	// amount_one << 192 < 2^320 so its root fits in 160 bits.
	((U512::from(amount_one) << (2 * SQRT_PRICE_FRACTIONAL_BITS)) / U512::from(amount_zero))
		.integer_sqrt()
		.try_into()
		.ok()
}

pub fn price_at_tick(tick: Tick) -> Option<Price> {
	if is_tick_valid(tick) {
		Some(sqrt_price_to_price(sqrt_price_at_tick(tick)))
	} else {
		None
	}
}

pub fn tick_at_price(price: Price) -> Option<Tick> {
	let sqrt_price = price_to_sqrt_price(price);
	if is_sqrt_price_valid(sqrt_price) {
		Some(tick_at_sqrt_price(sqrt_price))
	} else {
		None
	}
}

/// Returns `sqrt(1.0001^tick) * 2^96`, rounded up.
///
/// Panics if the tick is outside `[MIN_TICK, MAX_TICK]`.
pub fn sqrt_price_at_tick(tick: Tick) -> SqrtPriceQ64F96 {
	assert!(is_tick_valid(tick));

	let abs_tick = tick.unsigned_abs();

	let mut r = if abs_tick & 0x1u32 != 0 {
		U256::from(0xfffcb933bd6fad37aa2d162d1a594001u128)
	} else {
		U256::one() << 128u128
	};

	macro_rules! handle_tick_bit {
		($bit:literal, $constant:literal) => {
			/* Proof that `checked_mul` does not overflow:
				`r <= 2^128` holds initially. Every constant is below 2^128, so `r * constant`
				fits in 256 bits and after the shift `r <= u128::MAX`. The bound therefore holds
				before every application of the macro.
			*/
			#[cfg(debug_assertions)]
			U256::checked_mul(U256::one() << 128u128, $constant.into()).unwrap();
			if abs_tick & (0x1u32 << $bit) != 0 {
				r = U256::checked_mul(r, U256::from($constant)).unwrap() >> 128u128
			}
		}
	}

	handle_tick_bit!(1, 0xfff97272373d413259a46990580e213au128);
	handle_tick_bit!(2, 0xfff2e50f5f656932ef12357cf3c7fdccu128);
	handle_tick_bit!(3, 0xffe5caca7e10e4e61c3624eaa0941cd0u128);
	handle_tick_bit!(4, 0xffcb9843d60f6159c9db58835c926644u128);
	handle_tick_bit!(5, 0xff973b41fa98c081472e6896dfb254c0u128);
	handle_tick_bit!(6, 0xff2ea16466c96a3843ec78b326b52861u128);
	handle_tick_bit!(7, 0xfe5dee046a99a2a811c461f1969c3053u128);
	handle_tick_bit!(8, 0xfcbe86c7900a88aedcffc83b479aa3a4u128);
	handle_tick_bit!(9, 0xf987a7253ac413176f2b074cf7815e54u128);
	handle_tick_bit!(10, 0xf3392b0822b70005940c7a398e4b70f3u128);
	handle_tick_bit!(11, 0xe7159475a2c29b7443b29c7fa6e889d9u128);
	handle_tick_bit!(12, 0xd097f3bdfd2022b8845ad8f792aa5825u128);
	handle_tick_bit!(13, 0xa9f746462d870fdf8a65dc1f90e061e5u128);
	handle_tick_bit!(14, 0x70d869a156d2a1b890bb3df62baf32f7u128);
	handle_tick_bit!(15, 0x31be135f97d08fd981231505542fcfa6u128);
	handle_tick_bit!(16, 0x9aa508b5b7a84e1c677de54f3e99bc9u128);
	handle_tick_bit!(17, 0x5d6af8dedb81196699c329225ee604u128);
	handle_tick_bit!(18, 0x2216e584f5fa1ea926041bedfe98u128);
	handle_tick_bit!(19, 0x48a170391f7dc42444e8fa2u128);
	// abs_tick <= MAX_TICK < 2^20

	// r > 0 even with every bit applied, see the `sqrt_price_at_extreme_ticks` test.
	let sqrt_price_q32f128 = if tick > 0 { U256::MAX / r } else { r };

	// Rounding up keeps `tick_at_sqrt_price(sqrt_price_at_tick(tick)) == tick`.
	(sqrt_price_q32f128 >> 32u128) +
		if sqrt_price_q32f128.low_u32() == 0 { U256::zero() } else { U256::one() }
}

/// Calculates the greatest tick value such that `sqrt_price_at_tick(tick) <= sqrt_price`
///
/// Panics if the price is outside `[MIN_SQRT_PRICE, MAX_SQRT_PRICE)`.
pub fn tick_at_sqrt_price(sqrt_price: SqrtPriceQ64F96) -> Tick {
	assert!(is_sqrt_price_valid(sqrt_price));

	let sqrt_price_q64f128 = sqrt_price << 32u128;

	let (integer_log_2, mantissa) = {
		let mut _bits_remaining = sqrt_price_q64f128;
		let mut most_significant_bit = 0u8;

		#[rustfmt::skip]
		macro_rules! add_integer_bit {
			($bit:literal, $lower_bits_mask:literal) => {
				if _bits_remaining > U256::from($lower_bits_mask) {
					most_significant_bit |= $bit;
					_bits_remaining >>= $bit;
				}
			};
		}

		add_integer_bit!(128u8, 0xFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFFu128);
		add_integer_bit!(64u8, 0xFFFFFFFFFFFFFFFFu128);
		add_integer_bit!(32u8, 0xFFFFFFFFu128);
		add_integer_bit!(16u8, 0xFFFFu128);
		add_integer_bit!(8u8, 0xFFu128);
		add_integer_bit!(4u8, 0xFu128);
		add_integer_bit!(2u8, 0x3u128);
		add_integer_bit!(1u8, 0x1u128);

		(
			// Integer part of log2 of the Q64.128 value.
			((most_significant_bit as i16) + (-128i16)) as i8,
			// Normalised so the most significant bit is bit 127. The top 128 bits are zero.
			if most_significant_bit >= 128u8 {
				sqrt_price_q64f128 >> (most_significant_bit - 127u8)
			} else {
				sqrt_price_q64f128 << (127u8 - most_significant_bit)
			}
			.as_u128(),
		)
	};

	let log_2_q63f64 = {
		let mut log_2_q63f64 = (integer_log_2 as i128) << 64u8;
		let mut _mantissa = mantissa;

		// Squaring the mantissa doubles its log, so each overflow past bit 128 is one more
		// fractional bit of the result.
		#[rustfmt::skip]
		macro_rules! add_fractional_bit {
			($bit:literal) => {
				let mantissa_sq =
					(U256::checked_mul(_mantissa.into(), _mantissa.into()).unwrap() >> 127u8);
				_mantissa = if mantissa_sq.bit(128) {
					log_2_q63f64 |= 1i128 << $bit;
					(mantissa_sq >> 1u8).as_u128()
				} else {
					mantissa_sq.as_u128()
				}
			};
		}

		add_fractional_bit!(63u8);
		add_fractional_bit!(62u8);
		add_fractional_bit!(61u8);
		add_fractional_bit!(60u8);
		add_fractional_bit!(59u8);
		add_fractional_bit!(58u8);
		add_fractional_bit!(57u8);
		add_fractional_bit!(56u8);
		add_fractional_bit!(55u8);
		add_fractional_bit!(54u8);
		add_fractional_bit!(53u8);
		add_fractional_bit!(52u8);
		add_fractional_bit!(51u8);
		add_fractional_bit!(50u8);

		// 14 fractional bits are enough to pick between the two candidate ticks below.
		log_2_q63f64
	};

	// Two's complement multiplication by hand as there is no signed 256 bit type.
	let log_sqrt10001_q127f128 = U256::overflowing_mul(
		if log_2_q63f64 < 0 {
			(U256::from(u128::MAX) << 128u8) | U256::from(log_2_q63f64 as u128)
		} else {
			U256::from(log_2_q63f64 as u128)
		},
		U256::from(255738958999603826347141u128),
	)
	.0;

	let tick_low = (U256::overflowing_sub(
		log_sqrt10001_q127f128,
		U256::from(3402992956809132418596140100660247210u128),
	)
	.0 >> 128u8)
		.as_u128() as Tick;
	let tick_high = (U256::overflowing_add(
		log_sqrt10001_q127f128,
		U256::from(291339464771989622907027621153398088495u128),
	)
	.0 >> 128u8)
		.as_u128() as Tick;

	if tick_low == tick_high {
		tick_low
	} else if sqrt_price_at_tick(tick_high) <= sqrt_price {
		tick_high
	} else {
		tick_low
	}
}
