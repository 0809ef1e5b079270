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

//! Fills swaps across an ordered list of pools of one asset pair.
//!
//! Each pool is asked for whatever is left of the order, so later pools are only used when earlier
//! ones run out of range. Quotes run the same code on scratch copies of the pools and balances,
//! with the null account as payer and recipient. The router's settlement then answers with
//! [Settlement::DryRun] instead of paying, and the pools return the amounts they would have
//! swapped.


use cf_amm::{default_price_limit, math::SqrtPriceQ64F96, PoolState, Settlement, SwapError};
use cf_pool_registry::PoolRegistry;
use cf_primitives::{
	AccountId, AssetAmount, AssetId, ErrorKind, PoolIndex, Side, SideMap, SignedAssetAmount,
	Timestamp,
};
use cf_traits::{AssetLedger, LedgerError};
use cf_utilities::ensure;
use codec::{Decode, Encode};
use core::convert::Infallible;
use scale_info::TypeInfo;
use tracing::{debug, info};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExactInputParams {
	pub asset_in: AssetId,
	pub asset_out: AssetId,
	/// Pools of the pair, tried in order.
	pub pool_indices: Vec<PoolIndex>,
	pub recipient: AccountId,
	pub deadline: Timestamp,
	pub amount_in: AssetAmount,
	pub minimum_out: AssetAmount,
	/// `None` lets the price move as far as the pools' ranges allow.
	pub sqrt_price_limit: Option<SqrtPriceQ64F96>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExactOutputParams {
	pub asset_in: AssetId,
	pub asset_out: AssetId,
	/// Pools of the pair, tried in order.
	pub pool_indices: Vec<PoolIndex>,
	pub recipient: AccountId,
	pub deadline: Timestamp,
	pub amount_out: AssetAmount,
	pub maximum_in: AssetAmount,
	/// `None` lets the price move as far as the pools' ranges allow.
	pub sqrt_price_limit: Option<SqrtPriceQ64F96>,
}

/// Identifies who pays for a swap and which pool may ask for the payment. A null payer makes the
/// settlement a dry run.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub struct SwapCallbackData {
	pub asset_in: AssetId,
	pub asset_out: AssetId,
	pub pool_index: PoolIndex,
	pub payer: AccountId,
	/// The account of the pool at `(asset_in, asset_out, pool_index)`.
	pub pool: AccountId,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterError {
	#[error("deadline elapsed")]
	DeadlineElapsed,
	#[error("pool {0} not found")]
	PoolNotFound(PoolIndex),
	#[error("received {amount_out}, less than the minimum {minimum_out}")]
	TooLittleReceived { amount_out: AssetAmount, minimum_out: AssetAmount },
	#[error("requires {amount_in}, more than the maximum {maximum_in}")]
	TooMuchRequested { amount_in: AssetAmount, maximum_in: AssetAmount },
	#[error("cannot swap an asset for itself")]
	IdenticalAssets,
	#[error("settlement invoked by an unexpected account {0}")]
	UnexpectedCallbackInvoker(AccountId),
	#[error("the null account cannot receive swap outputs")]
	ReservedRecipient,
	#[error("amount overflow")]
	AmountOverflow,
	#[error("pool swap failed: {0:?}")]
	Swap(SwapError<Infallible>),
	#[error(transparent)]
	Ledger(#[from] LedgerError),
}

impl RouterError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			RouterError::DeadlineElapsed |
			RouterError::TooLittleReceived { .. } |
			RouterError::TooMuchRequested { .. } |
			RouterError::UnexpectedCallbackInvoker(_) |
			RouterError::ReservedRecipient => ErrorKind::Policy,
			RouterError::PoolNotFound(_) => ErrorKind::NotFound,
			RouterError::IdenticalAssets => ErrorKind::Configuration,
			RouterError::AmountOverflow => ErrorKind::Bound,
			RouterError::Swap(error) => error.kind(),
			RouterError::Ledger(error) => error.kind(),
		}
	}
}

impl From<SwapError<RouterError>> for RouterError {
	fn from(error: SwapError<RouterError>) -> Self {
		error.into_callback_error().unwrap_or_else(RouterError::Swap)
	}
}

/// What a fill asks each pool for.
#[derive(Copy, Clone, Debug)]
enum Order {
	ExactInput(AssetAmount),
	ExactOutput(AssetAmount),
}

/// The amounts a fill paid and received.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
struct Filled {
	amount_in: AssetAmount,
	amount_out: AssetAmount,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Router {
	account: AccountId,
}

impl Router {
	/// `account` is the identity the router spends payers' allowances as.
	pub fn new(account: AccountId) -> Self {
		Self { account }
	}

	pub fn account(&self) -> &AccountId {
		&self.account
	}

	/// Swaps up to `amount_in` of `asset_in` paid by `payer`, and returns the amount of `asset_out`
	/// paid to the recipient.
	pub fn fill_exact_input<A: AssetLedger>(
		&self,
		pools: &mut PoolRegistry,
		assets: &mut A,
		now: Timestamp,
		payer: &AccountId,
		params: &ExactInputParams,
	) -> Result<AssetAmount, RouterError> {
		ensure!(!params.recipient.is_null(), RouterError::ReservedRecipient);
		ensure!(now <= params.deadline, RouterError::DeadlineElapsed);
		let filled = self.execute_exact_input(pools, assets, payer, params)?;
		info!(
			"Filled exact input {} -> {} for {}: paid {}, received {}",
			params.asset_in, params.asset_out, payer, filled.amount_in, filled.amount_out,
		);
		Ok(filled.amount_out)
	}

	/// Swaps for up to `amount_out` of `asset_out` paid by `payer`, and returns the amount of
	/// `asset_in` paid.
	pub fn fill_exact_output<A: AssetLedger>(
		&self,
		pools: &mut PoolRegistry,
		assets: &mut A,
		now: Timestamp,
		payer: &AccountId,
		params: &ExactOutputParams,
	) -> Result<AssetAmount, RouterError> {
		ensure!(!params.recipient.is_null(), RouterError::ReservedRecipient);
		ensure!(now <= params.deadline, RouterError::DeadlineElapsed);
		let filled = self.execute_exact_output(pools, assets, payer, params)?;
		info!(
			"Filled exact output {} -> {} for {}: paid {}, received {}",
			params.asset_in, params.asset_out, payer, filled.amount_in, filled.amount_out,
		);
		Ok(filled.amount_in)
	}

	/// The amount [Self::fill_exact_input] would currently pay out for `params`, ignoring the
	/// recipient and minimum. An order past its deadline cannot be quoted. Nothing is modified.
	pub fn quote_exact_input<A: AssetLedger + Clone>(
		&self,
		pools: &PoolRegistry,
		assets: &A,
		now: Timestamp,
		params: &ExactInputParams,
	) -> Result<AssetAmount, RouterError> {
		ensure!(now <= params.deadline, RouterError::DeadlineElapsed);
		let params = ExactInputParams {
			recipient: AccountId::NULL,
			minimum_out: 0,
			..params.clone()
		};
		self.execute_exact_input(&mut pools.clone(), &mut assets.clone(), &AccountId::NULL, &params)
			.map(|filled| filled.amount_out)
	}

	/// The amount [Self::fill_exact_output] would currently charge for `params`, ignoring the
	/// recipient and maximum. An order past its deadline cannot be quoted. Nothing is modified.
	pub fn quote_exact_output<A: AssetLedger + Clone>(
		&self,
		pools: &PoolRegistry,
		assets: &A,
		now: Timestamp,
		params: &ExactOutputParams,
	) -> Result<AssetAmount, RouterError> {
		ensure!(now <= params.deadline, RouterError::DeadlineElapsed);
		let params = ExactOutputParams {
			recipient: AccountId::NULL,
			maximum_in: AssetAmount::MAX,
			..params.clone()
		};
		self.execute_exact_output(&mut pools.clone(), &mut assets.clone(), &AccountId::NULL, &params)
			.map(|filled| filled.amount_in)
	}

	fn execute_exact_input<A: AssetLedger>(
		&self,
		pools: &mut PoolRegistry,
		assets: &mut A,
		payer: &AccountId,
		params: &ExactInputParams,
	) -> Result<Filled, RouterError> {
		let filled = self.execute(
			pools,
			assets,
			payer,
			(params.asset_in, params.asset_out),
			&params.pool_indices,
			&params.recipient,
			Order::ExactInput(params.amount_in),
			params.sqrt_price_limit,
		)?;
		if filled.amount_out < params.minimum_out {
			return Err(RouterError::TooLittleReceived {
				amount_out: filled.amount_out,
				minimum_out: params.minimum_out,
			})
		}
		Ok(filled)
	}

	fn execute_exact_output<A: AssetLedger>(
		&self,
		pools: &mut PoolRegistry,
		assets: &mut A,
		payer: &AccountId,
		params: &ExactOutputParams,
	) -> Result<Filled, RouterError> {
		let filled = self.execute(
			pools,
			assets,
			payer,
			(params.asset_in, params.asset_out),
			&params.pool_indices,
			&params.recipient,
			Order::ExactOutput(params.amount_out),
			params.sqrt_price_limit,
		)?;
		if filled.amount_in > params.maximum_in {
			return Err(RouterError::TooMuchRequested {
				amount_in: filled.amount_in,
				maximum_in: params.maximum_in,
			})
		}
		Ok(filled)
	}

	#[allow(clippy::too_many_arguments)]
	fn execute<A: AssetLedger>(
		&self,
		pools: &mut PoolRegistry,
		assets: &mut A,
		payer: &AccountId,
		(asset_in, asset_out): (AssetId, AssetId),
		pool_indices: &[PoolIndex],
		recipient: &AccountId,
		order: Order,
		sqrt_price_limit: Option<SqrtPriceQ64F96>,
	) -> Result<Filled, RouterError> {
		ensure!(asset_in != asset_out, RouterError::IdenticalAssets);
		let input_side = if asset_in < asset_out { Side::Zero } else { Side::One };
		let sqrt_price_limit =
			sqrt_price_limit.unwrap_or_else(|| default_price_limit(input_side));

		let mut filled = Filled::default();
		for pool_index in pool_indices.iter().copied() {
			let remaining = match order {
				Order::ExactInput(amount_in) => amount_in - filled.amount_in,
				Order::ExactOutput(amount_out) => amount_out - filled.amount_out,
			};
			if remaining == 0 {
				break
			}
			let amount_specified =
				SignedAssetAmount::try_from(remaining).map_err(|_| RouterError::AmountOverflow)?;
			let amount_specified = match order {
				Order::ExactInput(_) => amount_specified,
				Order::ExactOutput(_) => -amount_specified,
			};

			let data = SwapCallbackData {
				asset_in,
				asset_out,
				pool_index,
				payer: *payer,
				pool: pools
					.expected_pool_account(asset_in, asset_out, pool_index)
					.ok_or(RouterError::PoolNotFound(pool_index))?,
			};
			let handle = pools
				.resolve(asset_in, asset_out, pool_index)
				.ok_or(RouterError::PoolNotFound(pool_index))?;
			let pool = pools.pool_mut(handle).ok_or(RouterError::PoolNotFound(pool_index))?;
			let deltas = self.protected_swap(
				pool,
				assets,
				recipient,
				input_side,
				amount_specified,
				sqrt_price_limit,
				&data,
			)?;

			let (paid, received) =
				(deltas[input_side].unsigned_abs(), deltas[!input_side].unsigned_abs());
			debug!(
				"Pool {asset_in}/{asset_out}#{pool_index} swapped {paid} for {received}{}",
				if payer.is_null() { " (dry run)" } else { "" },
			);
			filled = Filled {
				amount_in: filled.amount_in.checked_add(paid).ok_or(RouterError::AmountOverflow)?,
				amount_out: filled
					.amount_out
					.checked_add(received)
					.ok_or(RouterError::AmountOverflow)?,
			};
		}
		Ok(filled)
	}

	/// Swaps on a single pool, settling through [Self::settlement_callback]. Dry run swaps return
	/// the amounts the pool would have swapped. Failures of the pool and of the settlement are
	/// returned unchanged.
	#[allow(clippy::too_many_arguments)]
	pub fn protected_swap<A: AssetLedger>(
		&self,
		pool: &mut PoolState,
		assets: &mut A,
		recipient: &AccountId,
		input_side: Side,
		amount_specified: SignedAssetAmount,
		sqrt_price_limit: SqrtPriceQ64F96,
		data: &SwapCallbackData,
	) -> Result<SideMap<SignedAssetAmount>, RouterError> {
		pool.swap(
			assets,
			recipient,
			input_side,
			amount_specified,
			sqrt_price_limit,
			|assets, invoker, deltas| self.settlement_callback(assets, invoker, deltas, data),
		)
		.map_err(RouterError::from)
	}

	/// Pays a pool the input of a swap made by the router, spending the payer's allowance. Swaps
	/// paid by the null account are dry runs and pay nothing.
	pub fn settlement_callback<A: AssetLedger>(
		&self,
		assets: &mut A,
		invoker: &AccountId,
		deltas: SideMap<SignedAssetAmount>,
		data: &SwapCallbackData,
	) -> Result<Settlement, RouterError> {
		ensure!(*invoker == data.pool, RouterError::UnexpectedCallbackInvoker(*invoker));
		if data.payer.is_null() {
			return Ok(Settlement::DryRun)
		}
		let pair = AssetId::canonical_pair(data.asset_in, data.asset_out);
		for side in Side::ALL {
			if deltas[side] > 0 {
				assets.transfer_on_behalf(
					pair[side],
					&self.account,
					&data.payer,
					invoker,
					deltas[side].unsigned_abs(),
				)?;
			}
		}
		Ok(Settlement::Paid)
	}
}
