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

//! The transactional boundary of the settlement engine.
//!
//! [Runtime] owns the pools, the position ledger, the router and the collaborators they settle
//! with. Every operation runs in a transaction: the whole state is checkpointed first and restored
//! if the operation fails, so a failed operation never leaves partial effects behind, neither in
//! the pools nor in the asset ledger.

mod error;
pub mod settings;


pub use error::RuntimeError;
pub use settings::{CommandLineOptions, Settings};

use cf_amm::{
	default_price_limit,
	math::{Liquidity, SqrtPriceQ64F96, Tick},
	PoolState, Settlement,
};
use cf_pool_registry::{PoolHandle, PoolRegistry};
use cf_position_ledger::{DepositParams, OpenParams, OpenedPosition, PositionLedger};
use cf_primitives::{
	AccountId, AssetAmount, AssetId, FeeTier, PoolIndex, PositionId, Side, SideMap,
	SignedAssetAmount, Timestamp,
};
use cf_swap_router::{ExactInputParams, ExactOutputParams, Router};
use cf_traits::{AssetLedger, OwnershipRegistry, TimeSource};
use cf_utilities::ensure;
use tracing::{info, warn};

pub const ROUTER_ACCOUNT_DOMAIN: &[u8] = b"cf-amm/router";
pub const POSITION_LEDGER_ACCOUNT_DOMAIN: &[u8] = b"cf-amm/position-ledger";

/// The account the router settles swaps with. Payers grant it allowances.
pub fn router_account() -> AccountId {
	AccountId::derive(ROUTER_ACCOUNT_DOMAIN, &[])
}

/// The account the position ledger holds its pool positions as. Owners of positions grant it
/// allowances.
pub fn position_ledger_account() -> AccountId {
	AccountId::derive(POSITION_LEDGER_ACCOUNT_DOMAIN, &[])
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct State<A, O> {
	pub pools: PoolRegistry,
	pub assets: A,
	pub ownership: O,
	pub positions: PositionLedger,
	pub router: Router,
}

pub struct Runtime<A, O, T> {
	state: State<A, O>,
	clock: T,
}

fn pool_mut(
	pools: &mut PoolRegistry,
	asset_a: AssetId,
	asset_b: AssetId,
	pool_index: PoolIndex,
) -> Result<&mut PoolState, RuntimeError> {
	let not_found = RuntimeError::PoolNotFound { asset_a, asset_b, pool_index };
	match pools.resolve(asset_a, asset_b, pool_index) {
		Some(handle) => pools.pool_mut(handle).ok_or(not_found),
		None => Err(not_found),
	}
}

impl<A, O, T> Runtime<A, O, T>
where
	A: AssetLedger + Clone,
	O: OwnershipRegistry + Clone,
	T: TimeSource,
{
	pub fn new(settings: &Settings, assets: A, ownership: O, clock: T) -> Self {
		Self {
			state: State {
				pools: PoolRegistry::new(settings.registry.allowed_fee_tiers.iter().copied()),
				assets,
				ownership,
				positions: PositionLedger::new(
					position_ledger_account(),
					settings.collect_dust_guard(),
				),
				router: Router::new(router_account()),
			},
			clock,
		}
	}

	/// Runs `f` against the state. If it fails, the state is restored to what it was before.
	fn transactional<R>(
		&mut self,
		operation: &'static str,
		f: impl FnOnce(&mut State<A, O>, Timestamp) -> Result<R, RuntimeError>,
	) -> Result<R, RuntimeError> {
		let checkpoint = self.state.clone();
		let now = self.clock.now();
		match f(&mut self.state, now) {
			Ok(result) => {
				info!(operation, now, "Transaction committed");
				Ok(result)
			},
			Err(error) => {
				warn!(operation, now, kind = ?error.kind(), "Transaction rolled back: {error}");
				self.state = checkpoint;
				Err(error)
			},
		}
	}

	pub fn state(&self) -> &State<A, O> {
		&self.state
	}

	pub fn pools(&self) -> &PoolRegistry {
		&self.state.pools
	}

	pub fn pool(&self, asset_a: AssetId, asset_b: AssetId, pool_index: PoolIndex) -> Option<&PoolState> {
		self.state
			.pools
			.resolve(asset_a, asset_b, pool_index)
			.and_then(|handle| self.state.pools.pool(handle))
	}

	pub fn assets(&self) -> &A {
		&self.state.assets
	}

	/// Direct access to the asset ledger, for funding accounts and granting allowances outside of
	/// the engine.
	pub fn assets_mut(&mut self) -> &mut A {
		&mut self.state.assets
	}

	pub fn ownership(&self) -> &O {
		&self.state.ownership
	}

	/// Direct access to the ownership registry, e.g. to transfer or approve position tokens.
	pub fn ownership_mut(&mut self) -> &mut O {
		&mut self.state.ownership
	}

	pub fn positions(&self) -> &PositionLedger {
		&self.state.positions
	}

	pub fn router(&self) -> &Router {
		&self.state.router
	}

	pub fn now(&self) -> Timestamp {
		self.clock.now()
	}

	pub fn create_pool(
		&mut self,
		asset_a: AssetId,
		asset_b: AssetId,
		range_low: Tick,
		range_high: Tick,
		fee_tier: FeeTier,
	) -> Result<(PoolHandle, bool), RuntimeError> {
		self.transactional("create_pool", |state, _| {
			Ok(state.pools.create_or_get(asset_a, asset_b, range_low, range_high, fee_tier)?)
		})
	}

	pub fn initialize_pool(
		&mut self,
		asset_a: AssetId,
		asset_b: AssetId,
		pool_index: PoolIndex,
		sqrt_price: SqrtPriceQ64F96,
	) -> Result<Tick, RuntimeError> {
		self.transactional("initialize_pool", |state, _| {
			pool_mut(&mut state.pools, asset_a, asset_b, pool_index)?
				.initialize(sqrt_price)
				.map_err(RuntimeError::Initialize)
		})
	}

	/// Adds liquidity owned by `owner` directly to a pool. `settle` is asked to pay the pool the
	/// required amounts, in canonical asset order.
	#[allow(clippy::too_many_arguments)]
	pub fn pool_mint<E>(
		&mut self,
		asset_a: AssetId,
		asset_b: AssetId,
		pool_index: PoolIndex,
		owner: &AccountId,
		liquidity: Liquidity,
		settle: impl FnOnce(&mut A, &AccountId, SideMap<AssetAmount>) -> Result<(), E>,
	) -> Result<SideMap<AssetAmount>, RuntimeError>
	where
		RuntimeError: From<E>,
	{
		self.transactional("pool_mint", |state, _| {
			Ok(pool_mut(&mut state.pools, asset_a, asset_b, pool_index)?.mint(
				&mut state.assets,
				owner,
				liquidity,
				settle,
			)?)
		})
	}

	pub fn pool_burn(
		&mut self,
		asset_a: AssetId,
		asset_b: AssetId,
		pool_index: PoolIndex,
		owner: &AccountId,
		liquidity: Liquidity,
	) -> Result<SideMap<AssetAmount>, RuntimeError> {
		self.transactional("pool_burn", |state, _| {
			pool_mut(&mut state.pools, asset_a, asset_b, pool_index)?
				.burn(owner, liquidity)
				.map_err(RuntimeError::Burn)
		})
	}

	pub fn pool_collect(
		&mut self,
		asset_a: AssetId,
		asset_b: AssetId,
		pool_index: PoolIndex,
		owner: &AccountId,
		recipient: &AccountId,
		requested: SideMap<AssetAmount>,
	) -> Result<SideMap<AssetAmount>, RuntimeError> {
		self.transactional("pool_collect", |state, _| {
			pool_mut(&mut state.pools, asset_a, asset_b, pool_index)?
				.collect(&mut state.assets, owner, recipient, requested)
				.map_err(RuntimeError::Collect)
		})
	}

	/// Swaps directly against a pool. A positive `amount_specified` is an exact amount of
	/// `asset_in`, a negative one an exact amount of `asset_out`. `settle` is asked to pay the
	/// pool the positive side of the returned deltas, in canonical asset order. The null account
	/// is reserved for quotes and cannot be the recipient.
	#[allow(clippy::too_many_arguments)]
	pub fn pool_swap<E>(
		&mut self,
		asset_in: AssetId,
		asset_out: AssetId,
		pool_index: PoolIndex,
		recipient: &AccountId,
		amount_specified: SignedAssetAmount,
		sqrt_price_limit: Option<SqrtPriceQ64F96>,
		settle: impl FnOnce(&mut A, &AccountId, SideMap<SignedAssetAmount>) -> Result<Settlement, E>,
	) -> Result<SideMap<SignedAssetAmount>, RuntimeError>
	where
		RuntimeError: From<E>,
	{
		let input_side = if asset_in < asset_out { Side::Zero } else { Side::One };
		self.transactional("pool_swap", |state, _| {
			ensure!(!recipient.is_null(), RuntimeError::ReservedRecipient);
			Ok(pool_mut(&mut state.pools, asset_in, asset_out, pool_index)?.swap(
				&mut state.assets,
				recipient,
				input_side,
				amount_specified,
				sqrt_price_limit.unwrap_or_else(|| default_price_limit(input_side)),
				settle,
			)?)
		})
	}

	pub fn open_position(&mut self, params: OpenParams) -> Result<OpenedPosition, RuntimeError> {
		self.transactional("open_position", |state, now| {
			Ok(state.positions.open(
				&mut state.pools,
				&mut state.assets,
				&mut state.ownership,
				now,
				params,
			)?)
		})
	}

	pub fn deposit_position(
		&mut self,
		params: DepositParams,
	) -> Result<(Liquidity, SideMap<AssetAmount>), RuntimeError> {
		self.transactional("deposit_position", |state, now| {
			Ok(state.positions.deposit(&mut state.pools, &mut state.assets, now, params)?)
		})
	}

	pub fn close_position(
		&mut self,
		actor: &AccountId,
		id: PositionId,
	) -> Result<SideMap<AssetAmount>, RuntimeError> {
		self.transactional("close_position", |state, _| {
			Ok(state.positions.close(&mut state.pools, &state.ownership, actor, id)?)
		})
	}

	pub fn withdraw_position(
		&mut self,
		actor: &AccountId,
		id: PositionId,
		recipient: &AccountId,
	) -> Result<SideMap<AssetAmount>, RuntimeError> {
		self.transactional("withdraw_position", |state, _| {
			Ok(state.positions.withdraw(
				&mut state.pools,
				&mut state.assets,
				&mut state.ownership,
				actor,
				id,
				recipient,
			)?)
		})
	}

	pub fn fill_exact_input(
		&mut self,
		payer: &AccountId,
		params: &ExactInputParams,
	) -> Result<AssetAmount, RuntimeError> {
		self.transactional("fill_exact_input", |state, now| {
			Ok(state.router.fill_exact_input(
				&mut state.pools,
				&mut state.assets,
				now,
				payer,
				params,
			)?)
		})
	}

	pub fn fill_exact_output(
		&mut self,
		payer: &AccountId,
		params: &ExactOutputParams,
	) -> Result<AssetAmount, RuntimeError> {
		self.transactional("fill_exact_output", |state, now| {
			Ok(state.router.fill_exact_output(
				&mut state.pools,
				&mut state.assets,
				now,
				payer,
				params,
			)?)
		})
	}

	pub fn quote_exact_input(&self, params: &ExactInputParams) -> Result<AssetAmount, RuntimeError> {
		Ok(self.state.router.quote_exact_input(
			&self.state.pools,
			&self.state.assets,
			self.clock.now(),
			params,
		)?)
	}

	pub fn quote_exact_output(
		&self,
		params: &ExactOutputParams,
	) -> Result<AssetAmount, RuntimeError> {
		Ok(self.state.router.quote_exact_output(
			&self.state.pools,
			&self.state.assets,
			self.clock.now(),
			params,
		)?)
	}
}
