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

//! A concentrated liquidity pool with a single price range fixed at creation.
//!
//! The price math is Uniswap V3's, for a pool whose only liquidity spans `[range_low,
//! range_high)`. As no swap can cross a tick with liquidity on it, a swap is always a single step
//! bounded by the range and the caller's price limit.
//!
//! Funds move through settlement closures. The pool performs its state transition, hands the
//! closure the amounts it is owed and then checks its own balances on the [AssetLedger]. While the
//! closure runs the pool is mutably borrowed, so the closure cannot re-enter it.
//!
//! Positions are keyed by the account that called the pool. Fees are attributed to positions
//! through the global fee growth per unit of liquidity, which for a single range pool is also the
//! fee growth inside every position's range.

#[cfg(test)]
mod tests;

use alloc::collections::BTreeMap;
use cf_amm_math::{
	add_liquidity_delta,
	curve::{amounts_for_liquidity, compute_swap_step, SwapAmount},
	is_sqrt_price_valid, mul_div_floor, sqrt_price_at_tick, tick_at_sqrt_price, Amount,
	FeeGrowthQ128F128, Liquidity, SqrtPriceQ64F96, Tick, FEE_GROWTH_FRACTIONAL_BITS, MAX_SQRT_PRICE,
	MAX_TICK, MIN_TICK, U256, U512,
};
use cf_primitives::{
	AccountId, AssetAmount, AssetId, ErrorKind, FeeTier, Side, SideMap, SignedAssetAmount,
};
use cf_traits::{AssetLedger, LedgerError};
use codec::{Decode, Encode};
use core::convert::Infallible;
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

use crate::common::{
	to_signed, OneToZero, Settlement, SwapDirection, ZeroToOne, MAX_FEE_PIPS,
};

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
pub struct PoolConfig {
	/// Canonically ordered, `assets[Side::Zero] < assets[Side::One]`.
	pub assets: SideMap<AssetId>,
	pub range_low: Tick,
	pub range_high: Tick,
	/// The fee taken from swap inputs and earned by liquidity providers, in parts per million.
	pub fee_pips: FeeTier,
}

impl PoolConfig {
	pub fn validate(&self) -> Result<(), NewError> {
		let (asset_zero, asset_one) = (self.assets[Side::Zero], self.assets[Side::One]);
		if !asset_zero.is_valid() || !asset_one.is_valid() || asset_zero >= asset_one {
			return Err(NewError::InvalidAssets)
		}
		if !(MIN_TICK <= self.range_low && self.range_low < self.range_high &&
			self.range_high <= MAX_TICK)
		{
			return Err(NewError::InvalidRange)
		}
		if self.fee_pips > MAX_FEE_PIPS {
			return Err(NewError::InvalidFeeAmount)
		}
		Ok(())
	}

	pub fn sqrt_price_range(&self) -> (SqrtPriceQ64F96, SqrtPriceQ64F96) {
		(sqrt_price_at_tick(self.range_low), sqrt_price_at_tick(self.range_high))
	}
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
pub struct Position {
	pub liquidity: Liquidity,
	/// Fee growth per unit of liquidity at the last time this position was modified.
	pub fee_growth_inside_last: SideMap<FeeGrowthQ128F128>,
	/// Burned liquidity and earned fees that have not been collected yet.
	pub owed: SideMap<AssetAmount>,
}

impl Position {
	/// Credits the fees earned since the last snapshot to `owed` and moves the snapshot to
	/// `fee_growth_inside`. Must be called before `liquidity` changes, as the snapshot is only
	/// meaningful while liquidity is constant.
	fn accrue_fees(&mut self, fee_growth_inside: SideMap<FeeGrowthQ128F128>) -> SideMap<AssetAmount> {
		let fees = fee_growth_inside.zip(self.fee_growth_inside_last).map(|_, (current, last)| {
			/*
				Proof that `mul_div_floor` does not overflow:
				Note position.liquidity: u128
				U512::one() << 128 > u128::MAX
			*/
			let fees = mul_div_floor(
				current.overflowing_sub(last).0,
				self.liquidity.into(),
				U512::one() << FEE_GROWTH_FRACTIONAL_BITS,
			);
			AssetAmount::try_from(fees).unwrap_or(AssetAmount::MAX)
		});
		self.owed = self.owed.zip(fees).map(|_, (owed, fees)| owed.saturating_add(fees));
		self.fee_growth_inside_last = fee_growth_inside;
		fees
	}

	pub fn is_empty(&self) -> bool {
		self.liquidity == 0 && self.owed == SideMap::default()
	}
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NewError {
	/// Assets must be non-zero, distinct and canonically ordered.
	InvalidAssets,
	/// The range must be non-empty and within `[MIN_TICK, MAX_TICK]`.
	InvalidRange,
	/// Fee must be between 0 - 50%
	InvalidFeeAmount,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InitializeError {
	AlreadyInitialized,
	/// The price is outside the protocol wide bounds.
	InvalidInitialPrice,
	/// The tick of the price is outside the pool's range.
	PriceOutsideRange,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MintError<E> {
	NotInitialized,
	ZeroLiquidity,
	/// The pool's total liquidity would overflow, or more than `i128::MAX` liquidity was
	/// requested in one call.
	MaximumLiquidity,
	/// The amounts required are too large to settle.
	AmountOverflow,
	/// The settlement did not pay the pool the required amount of this side's asset.
	InsufficientFunding(Side),
	/// Callback failed
	CallbackFailed(E),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BurnError {
	ZeroLiquidity,
	/// The caller's position does not exist or holds less liquidity than requested.
	InsufficientLiquidity,
	/// More than `i128::MAX` liquidity was requested in one call.
	MaximumLiquidity,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CollectError {
	Payout(LedgerError),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SwapError<E> {
	NotInitialized,
	ZeroAmount,
	/// The price limit is on the wrong side of the current price or beyond the protocol bound.
	InvalidPriceLimit,
	/// The amounts of the swap do not fit in a signed asset amount.
	AmountOverflow,
	/// The settlement did not pay the pool the input of the swap.
	InsufficientFunding,
	/// A dry run settlement was returned for a swap paying out to a real account.
	DryRunRejected,
	Payout(LedgerError),
	/// Callback failed
	CallbackFailed(E),
}

impl<E> MintError<E> {
	/// Separates a failure of the settlement closure from failures of the pool itself.
	pub fn into_callback_error(self) -> Result<E, MintError<Infallible>> {
		Err(match self {
			MintError::CallbackFailed(error) => return Ok(error),
			MintError::NotInitialized => MintError::NotInitialized,
			MintError::ZeroLiquidity => MintError::ZeroLiquidity,
			MintError::MaximumLiquidity => MintError::MaximumLiquidity,
			MintError::AmountOverflow => MintError::AmountOverflow,
			MintError::InsufficientFunding(side) => MintError::InsufficientFunding(side),
		})
	}
}

impl MintError<Infallible> {
	pub fn kind(&self) -> ErrorKind {
		match self {
			MintError::NotInitialized => ErrorKind::State,
			MintError::ZeroLiquidity | MintError::MaximumLiquidity | MintError::AmountOverflow =>
				ErrorKind::Bound,
			MintError::InsufficientFunding(_) => ErrorKind::Funding,
			MintError::CallbackFailed(never) => match *never {},
		}
	}
}

impl<E> SwapError<E> {
	/// Separates a failure of the settlement closure from failures of the pool itself.
	pub fn into_callback_error(self) -> Result<E, SwapError<Infallible>> {
		Err(match self {
			SwapError::CallbackFailed(error) => return Ok(error),
			SwapError::NotInitialized => SwapError::NotInitialized,
			SwapError::ZeroAmount => SwapError::ZeroAmount,
			SwapError::InvalidPriceLimit => SwapError::InvalidPriceLimit,
			SwapError::AmountOverflow => SwapError::AmountOverflow,
			SwapError::InsufficientFunding => SwapError::InsufficientFunding,
			SwapError::DryRunRejected => SwapError::DryRunRejected,
			SwapError::Payout(error) => SwapError::Payout(error),
		})
	}
}

impl SwapError<Infallible> {
	pub fn kind(&self) -> ErrorKind {
		match self {
			SwapError::NotInitialized => ErrorKind::State,
			SwapError::ZeroAmount | SwapError::InvalidPriceLimit | SwapError::AmountOverflow =>
				ErrorKind::Bound,
			SwapError::InsufficientFunding | SwapError::DryRunRejected | SwapError::Payout(_) =>
				ErrorKind::Funding,
			SwapError::CallbackFailed(never) => match *never {},
		}
	}
}

impl NewError {
	pub fn kind(&self) -> ErrorKind {
		ErrorKind::Configuration
	}
}

impl InitializeError {
	pub fn kind(&self) -> ErrorKind {
		ErrorKind::State
	}
}

impl BurnError {
	pub fn kind(&self) -> ErrorKind {
		ErrorKind::Bound
	}
}

impl CollectError {
	pub fn kind(&self) -> ErrorKind {
		ErrorKind::Funding
	}
}

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
pub struct PoolState {
	config: PoolConfig,
	/// The account holding the pool's reserves on the asset ledger.
	account: AccountId,
	/// Zero until the pool is initialized. Stays within the pool's range afterwards, and can
	/// reach the upper bound of the range.
	sqrt_price: SqrtPriceQ64F96,
	/// The greatest tick whose price is less than or equal to `sqrt_price`.
	current_tick: Tick,
	/// The sum of the liquidity of all positions, all of which is active across the whole range.
	liquidity: Liquidity,
	/// The total fees earned over all time per unit of liquidity. Wraps on overflow.
	fee_growth_global: SideMap<FeeGrowthQ128F128>,
	positions: BTreeMap<AccountId, Position>,
	/// Total fees earned over all time
	total_fees_earned: SideMap<Amount>,
	/// Total of all swap inputs over all time (not including fees)
	total_swap_inputs: SideMap<Amount>,
	/// Total of all swap outputs over all time
	total_swap_outputs: SideMap<Amount>,
}

impl PoolState {
	/// Creates an uninitialized pool without liquidity. `account` holds the pool's reserves.
	///
	/// This function never panics
	pub fn new(config: PoolConfig, account: AccountId) -> Result<Self, NewError> {
		config.validate()?;
		Ok(Self {
			config,
			account,
			sqrt_price: SqrtPriceQ64F96::zero(),
			current_tick: 0,
			liquidity: 0,
			fee_growth_global: Default::default(),
			positions: Default::default(),
			total_fees_earned: Default::default(),
			total_swap_inputs: Default::default(),
			total_swap_outputs: Default::default(),
		})
	}

	/// Sets the initial price. Only possible once, and the price's tick must lie within
	/// `[range_low, range_high)`. Returns the tick of the price.
	///
	/// This function never panics
	///
	/// If this function returns an `Err(_)` no state changes have occurred
	pub fn initialize(&mut self, sqrt_price: SqrtPriceQ64F96) -> Result<Tick, InitializeError> {
		if self.is_initialized() {
			return Err(InitializeError::AlreadyInitialized)
		}
		if !is_sqrt_price_valid(sqrt_price) {
			return Err(InitializeError::InvalidInitialPrice)
		}
		let tick = tick_at_sqrt_price(sqrt_price);
		if !(self.config.range_low..self.config.range_high).contains(&tick) {
			return Err(InitializeError::PriceOutsideRange)
		}
		self.sqrt_price = sqrt_price;
		self.current_tick = tick;
		Ok(tick)
	}

	/// Adds `liquidity` to the position of `owner` across the whole range, crediting the
	/// position's earned fees to its owed balances first. Then calls `settle` with the amounts
	/// of each asset required, rounded up, and checks the pool's balances increased by at least
	/// those amounts. Returns the required amounts.
	///
	/// This function never panics
	///
	/// If this function returns an `Err(_)` no state changes have occurred to the pool
	pub fn mint<L: AssetLedger, E>(
		&mut self,
		ledger: &mut L,
		owner: &AccountId,
		liquidity: Liquidity,
		settle: impl FnOnce(&mut L, &AccountId, SideMap<AssetAmount>) -> Result<(), E>,
	) -> Result<SideMap<AssetAmount>, MintError<E>> {
		if !self.is_initialized() {
			return Err(MintError::NotInitialized)
		}
		if liquidity == 0 {
			return Err(MintError::ZeroLiquidity)
		}
		let delta = i128::try_from(liquidity).map_err(|_| MintError::MaximumLiquidity)?;
		let total_liquidity =
			add_liquidity_delta(self.liquidity, delta).ok_or(MintError::MaximumLiquidity)?;
		let required = self
			.liquidity_to_amounts::<true>(liquidity)
			.try_map(|_, amount| AssetAmount::try_from(amount))
			.map_err(|_| MintError::AmountOverflow)?;

		let previous_position = self.positions.get(owner).cloned();
		let mut position = previous_position.clone().unwrap_or_default();
		position.accrue_fees(self.fee_growth_global);
		position.liquidity =
			add_liquidity_delta(position.liquidity, delta).ok_or(MintError::MaximumLiquidity)?;

		let previous_liquidity = self.liquidity;
		self.liquidity = total_liquidity;
		self.positions.insert(*owner, position);

		self.settle_deposit(ledger, required, settle).map_err(|error| {
			self.liquidity = previous_liquidity;
			match previous_position {
				Some(position) => self.positions.insert(*owner, position),
				None => self.positions.remove(owner),
			};
			error
		})?;

		Ok(required)
	}

	fn settle_deposit<L: AssetLedger, E>(
		&self,
		ledger: &mut L,
		required: SideMap<AssetAmount>,
		settle: impl FnOnce(&mut L, &AccountId, SideMap<AssetAmount>) -> Result<(), E>,
	) -> Result<(), MintError<E>> {
		let balances_before = self.reserves(ledger);
		settle(ledger, &self.account, required).map_err(MintError::CallbackFailed)?;
		let balances_after = self.reserves(ledger);
		for side in Side::ALL {
			if balances_after[side] < balances_before[side].saturating_add(required[side]) {
				return Err(MintError::InsufficientFunding(side))
			}
		}
		Ok(())
	}

	/// Removes `liquidity` from the position of `owner`. The value of the liquidity, rounded down,
	/// and the fees the position earned are added to the position's owed balances, but nothing is
	/// transferred. Returns the value of the removed liquidity.
	///
	/// This function never panics
	///
	/// If this function returns an `Err(_)` no state changes have occurred
	pub fn burn(
		&mut self,
		owner: &AccountId,
		liquidity: Liquidity,
	) -> Result<SideMap<AssetAmount>, BurnError> {
		if liquidity == 0 {
			return Err(BurnError::ZeroLiquidity)
		}
		let delta = -i128::try_from(liquidity).map_err(|_| BurnError::MaximumLiquidity)?;
		let position_liquidity = self
			.positions
			.get(owner)
			.and_then(|position| add_liquidity_delta(position.liquidity, delta))
			.ok_or(BurnError::InsufficientLiquidity)?;
		// The position's liquidity is part of the total.
		let total_liquidity =
			add_liquidity_delta(self.liquidity, delta).ok_or(BurnError::InsufficientLiquidity)?;
		let amounts = self
			.liquidity_to_amounts::<false>(liquidity)
			.map(|_, amount| AssetAmount::try_from(amount).unwrap_or(AssetAmount::MAX));
		let fee_growth_global = self.fee_growth_global;

		if let Some(position) = self.positions.get_mut(owner) {
			position.accrue_fees(fee_growth_global);
			position.liquidity = position_liquidity;
			position.owed =
				position.owed.zip(amounts).map(|_, (owed, amount)| owed.saturating_add(amount));
		}
		self.liquidity = total_liquidity;

		Ok(amounts)
	}

	/// Pays `recipient` up to `requested` of each asset from the owed balances of `owner`'s
	/// position, and returns the amounts paid. A position that is empty afterwards is removed. An
	/// owner without a position is paid nothing.
	///
	/// This function never panics
	///
	/// If this function returns an `Err(_)` no state changes have occurred to the pool
	pub fn collect<L: AssetLedger>(
		&mut self,
		ledger: &mut L,
		owner: &AccountId,
		recipient: &AccountId,
		requested: SideMap<AssetAmount>,
	) -> Result<SideMap<AssetAmount>, CollectError> {
		let Some(position) = self.positions.get(owner) else { return Ok(SideMap::default()) };
		let paid = requested
			.zip(position.owed)
			.map(|_, (requested, owed)| core::cmp::min(requested, owed));

		for side in Side::ALL {
			if paid[side] > 0 {
				ledger
					.transfer(self.config.assets[side], &self.account, recipient, paid[side])
					.map_err(CollectError::Payout)?;
			}
		}

		if let Some(position) = self.positions.get_mut(owner) {
			position.owed = position.owed.zip(paid).map(|_, (owed, paid)| owed - paid);
			if position.is_empty() {
				self.positions.remove(owner);
			}
		}

		Ok(paid)
	}

	/// Swaps in the direction paying `input_side`. A positive `amount_specified` is an exact
	/// input, including the fee, a negative one an exact output. The price moves towards
	/// `sqrt_price_limit` but stops at the edge of the pool's range.
	///
	/// Returns the signed amounts of each asset, positive for the amount paid into the pool and
	/// negative for the amount paid out. `settle` receives these deltas and must pay the input. On
	/// [Settlement::Paid] the pool checks it was paid and transfers the output to `recipient`.
	/// [Settlement::DryRun] is only accepted for the null recipient: the deltas are returned and
	/// the pool is left as it was.
	///
	/// This function never panics
	///
	/// If this function returns an `Err(_)` no state changes have occurred to the pool
	pub fn swap<L: AssetLedger, E>(
		&mut self,
		ledger: &mut L,
		recipient: &AccountId,
		input_side: Side,
		amount_specified: SignedAssetAmount,
		sqrt_price_limit: SqrtPriceQ64F96,
		settle: impl FnOnce(&mut L, &AccountId, SideMap<SignedAssetAmount>) -> Result<Settlement, E>,
	) -> Result<SideMap<SignedAssetAmount>, SwapError<E>> {
		match input_side {
			Side::Zero => self.inner_swap::<ZeroToOne, L, E>(
				ledger,
				recipient,
				amount_specified,
				sqrt_price_limit,
				settle,
			),
			Side::One => self.inner_swap::<OneToZero, L, E>(
				ledger,
				recipient,
				amount_specified,
				sqrt_price_limit,
				settle,
			),
		}
	}

	fn inner_swap<SD: SwapDirection, L: AssetLedger, E>(
		&mut self,
		ledger: &mut L,
		recipient: &AccountId,
		amount_specified: SignedAssetAmount,
		sqrt_price_limit: SqrtPriceQ64F96,
		settle: impl FnOnce(&mut L, &AccountId, SideMap<SignedAssetAmount>) -> Result<Settlement, E>,
	) -> Result<SideMap<SignedAssetAmount>, SwapError<E>> {
		if amount_specified == 0 {
			return Err(SwapError::ZeroAmount)
		}
		if !self.is_initialized() {
			return Err(SwapError::NotInitialized)
		}
		if !SD::is_price_limit_valid(self.sqrt_price, sqrt_price_limit) {
			return Err(SwapError::InvalidPriceLimit)
		}

		let range_boundary = sqrt_price_at_tick(SD::range_boundary(&self.config));
		let sqrt_price_target = if SD::sqrt_price_op_more_than(sqrt_price_limit, range_boundary) {
			range_boundary
		} else {
			sqrt_price_limit
		};

		let exact_input = amount_specified > 0;
		let magnitude = Amount::from(amount_specified.unsigned_abs());
		let step = compute_swap_step(
			self.sqrt_price,
			sqrt_price_target,
			self.liquidity,
			if exact_input {
				SwapAmount::ExactInput(magnitude)
			} else {
				SwapAmount::ExactOutput(magnitude)
			},
			self.config.fee_pips,
		)
		.ok_or(SwapError::AmountOverflow)?;

		// The amount paid in includes the fee. The input and output amounts are bounded by
		// `magnitude` on the specified side only, so the other side may not fit.
		let amount_in = step.amount_in + step.fee_amount;
		let (amount_specified_remaining, amount_calculated) = if exact_input {
			(
				to_signed(amount_in)
					.and_then(|amount_in| amount_specified.checked_sub(amount_in))
					.ok_or(SwapError::AmountOverflow)?,
				to_signed(step.amount_out)
					.and_then(SignedAssetAmount::checked_neg)
					.ok_or(SwapError::AmountOverflow)?,
			)
		} else {
			(
				to_signed(step.amount_out)
					.and_then(|amount_out| amount_specified.checked_add(amount_out))
					.ok_or(SwapError::AmountOverflow)?,
				to_signed(amount_in).ok_or(SwapError::AmountOverflow)?,
			)
		};
		let specified_side = if exact_input { SD::INPUT_SIDE } else { !SD::INPUT_SIDE };
		let mut deltas = SideMap::<SignedAssetAmount>::default();
		deltas[specified_side] = amount_specified - amount_specified_remaining;
		deltas[!specified_side] = amount_calculated;

		let checkpoint = (
			self.sqrt_price,
			self.current_tick,
			self.fee_growth_global,
			self.total_fees_earned,
			self.total_swap_inputs,
			self.total_swap_outputs,
		);

		if self.liquidity > 0 {
			// Cannot overflow: the fee is below 2^127 as it is part of a signed amount.
			self.fee_growth_global[SD::INPUT_SIDE] = self.fee_growth_global[SD::INPUT_SIDE]
				.overflowing_add(mul_div_floor(
					step.fee_amount,
					U256::one() << FEE_GROWTH_FRACTIONAL_BITS,
					self.liquidity,
				))
				.0;
		}
		self.total_fees_earned[SD::INPUT_SIDE] =
			self.total_fees_earned[SD::INPUT_SIDE].saturating_add(step.fee_amount);
		self.total_swap_inputs[SD::INPUT_SIDE] =
			self.total_swap_inputs[SD::INPUT_SIDE].saturating_add(step.amount_in);
		self.total_swap_outputs[!SD::INPUT_SIDE] =
			self.total_swap_outputs[!SD::INPUT_SIDE].saturating_add(step.amount_out);
		if step.sqrt_price_next != self.sqrt_price {
			self.sqrt_price = step.sqrt_price_next;
			self.current_tick = Self::tick_of(step.sqrt_price_next);
		}

		let settlement = self.settle_swap::<SD, L, E>(ledger, recipient, deltas, settle);
		// Only a paid swap leaves its mark on the pool. Dry runs are undone like failures.
		if !matches!(settlement, Ok(Settlement::Paid)) {
			(
				self.sqrt_price,
				self.current_tick,
				self.fee_growth_global,
				self.total_fees_earned,
				self.total_swap_inputs,
				self.total_swap_outputs,
			) = checkpoint;
		}
		settlement.map(|_| deltas)
	}

	fn settle_swap<SD: SwapDirection, L: AssetLedger, E>(
		&self,
		ledger: &mut L,
		recipient: &AccountId,
		deltas: SideMap<SignedAssetAmount>,
		settle: impl FnOnce(&mut L, &AccountId, SideMap<SignedAssetAmount>) -> Result<Settlement, E>,
	) -> Result<Settlement, SwapError<E>> {
		let input_asset = self.config.assets[SD::INPUT_SIDE];
		let balance_before = ledger.balance_of(input_asset, &self.account);

		match settle(ledger, &self.account, deltas).map_err(SwapError::CallbackFailed)? {
			Settlement::DryRun if recipient.is_null() => Ok(Settlement::DryRun),
			Settlement::DryRun => Err(SwapError::DryRunRejected),
			Settlement::Paid => {
				let amount_in = deltas[SD::INPUT_SIDE].unsigned_abs();
				if ledger.balance_of(input_asset, &self.account) <
					balance_before.saturating_add(amount_in)
				{
					return Err(SwapError::InsufficientFunding)
				}
				let amount_out = deltas[!SD::INPUT_SIDE].unsigned_abs();
				if amount_out > 0 {
					ledger
						.transfer(
							self.config.assets[!SD::INPUT_SIDE],
							&self.account,
							recipient,
							amount_out,
						)
						.map_err(SwapError::Payout)?;
				}
				Ok(Settlement::Paid)
			},
		}
	}

	fn tick_of(sqrt_price: SqrtPriceQ64F96) -> Tick {
		if sqrt_price >= MAX_SQRT_PRICE {
			MAX_TICK
		} else {
			tick_at_sqrt_price(sqrt_price)
		}
	}

	/// Returns the value of `liquidity` at the current price, i.e. the assets needed to add it to
	/// the pool (`ROUND_UP`) or received when removing it from the pool.
	///
	/// This function never panics
	fn liquidity_to_amounts<const ROUND_UP: bool>(&self, liquidity: Liquidity) -> SideMap<Amount> {
		let (sqrt_lower, sqrt_upper) = self.config.sqrt_price_range();
		let (amount_zero, amount_one) =
			amounts_for_liquidity(self.sqrt_price, sqrt_lower, sqrt_upper, liquidity, ROUND_UP);
		SideMap::from_array([amount_zero, amount_one])
	}

	/// Returns the assets `liquidity` would be worth if it were burned now, rounded down. `None`
	/// if the pool is not initialized.
	pub fn value_of_liquidity(&self, liquidity: Liquidity) -> Option<SideMap<Amount>> {
		self.is_initialized().then(|| self.liquidity_to_amounts::<false>(liquidity))
	}

	fn reserves<L: AssetLedger>(&self, ledger: &L) -> SideMap<AssetAmount> {
		self.config.assets.map(|_, asset| ledger.balance_of(asset, &self.account))
	}

	pub fn config(&self) -> &PoolConfig {
		&self.config
	}

	pub fn account(&self) -> &AccountId {
		&self.account
	}

	pub fn is_initialized(&self) -> bool {
		!self.sqrt_price.is_zero()
	}

	pub fn sqrt_price(&self) -> SqrtPriceQ64F96 {
		self.sqrt_price
	}

	pub fn current_tick(&self) -> Tick {
		self.current_tick
	}

	pub fn liquidity(&self) -> Liquidity {
		self.liquidity
	}

	pub fn fee_growth_global(&self) -> SideMap<FeeGrowthQ128F128> {
		self.fee_growth_global
	}

	pub fn position(&self, owner: &AccountId) -> Option<&Position> {
		self.positions.get(owner)
	}

	pub fn positions(&self) -> impl '_ + Iterator<Item = (&AccountId, &Position)> {
		self.positions.iter()
	}

	/// The sum of the liquidity of all positions, always equal to [Self::liquidity].
	pub fn sum_of_position_liquidity(&self) -> Liquidity {
		self.positions.values().map(|position| position.liquidity).sum()
	}

	pub fn total_fees_earned(&self) -> SideMap<Amount> {
		self.total_fees_earned
	}

	pub fn total_swap_inputs(&self) -> SideMap<Amount> {
		self.total_swap_inputs
	}

	pub fn total_swap_outputs(&self) -> SideMap<Amount> {
		self.total_swap_outputs
	}
}
