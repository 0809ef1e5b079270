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

//! Turns the single pool position of the ledger's own account into individually owned positions.
//!
//! Every mint and burn the ledger makes on a pool uses the ledger's account, so all records of a
//! pool share one pool position. The ledger attributes fees to a record by multiplying the
//! record's liquidity with the change of the shared position's fee growth snapshot since the record
//! was last touched.
//!
//! Records are represented externally by ownership tokens with the same id. Only the owner of a
//! token, or an account it approved, may close or withdraw the record.


use cf_amm::{
	math::{
		curve::liquidity_for_amounts, mul_div_floor, FeeGrowthQ128F128, Liquidity, Tick,
		FEE_GROWTH_FRACTIONAL_BITS, U512,
	},
	BurnError, CollectError, MintError, PoolState,
};
use cf_pool_registry::PoolRegistry;
use cf_primitives::{
	AccountId, AssetAmount, AssetId, ErrorKind, FeeTier, PoolIndex, PositionId, Side, SideMap,
	Timestamp,
};
use cf_traits::{AssetLedger, LedgerError, OwnershipError, OwnershipRegistry};
use codec::{Decode, Encode};
use core::convert::Infallible;
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Rounding guard kept back by [PositionLedger::withdraw] when none is configured.
pub const DEFAULT_COLLECT_DUST_GUARD: AssetAmount = 1;

#[derive(Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
pub struct PositionRecord {
	pub id: PositionId,
	/// The account the position was opened for. The ownership token may have changed hands since.
	pub owner: AccountId,
	pub assets: SideMap<AssetId>,
	pub pool_index: PoolIndex,
	pub fee_tier: FeeTier,
	pub range_low: Tick,
	pub range_high: Tick,
	pub liquidity: Liquidity,
	pub owed: SideMap<AssetAmount>,
	/// The fee growth snapshot of the ledger's pool position when this record was last touched.
	pub fee_growth_inside_last: SideMap<FeeGrowthQ128F128>,
}

impl PositionRecord {
	/// Credits the fees earned by this record's liquidity since its last snapshot.
	fn accrue_fees(&mut self, fee_growth_inside: SideMap<FeeGrowthQ128F128>) {
		let liquidity = self.liquidity;
		let fees = fee_growth_inside.zip(self.fee_growth_inside_last).map(|_, (current, last)| {
			// Cannot overflow as liquidity < 2^128.
			let fees = mul_div_floor(
				current.overflowing_sub(last).0,
				liquidity.into(),
				U512::one() << FEE_GROWTH_FRACTIONAL_BITS,
			);
			AssetAmount::try_from(fees).unwrap_or(AssetAmount::MAX)
		});
		self.owed = self.owed.zip(fees).map(|_, (owed, fees)| owed.saturating_add(fees));
		self.fee_growth_inside_last = fee_growth_inside;
	}
}

/// Identifies who pays for a mint and which pool may ask for the payment.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub struct MintCallbackData {
	pub payer: AccountId,
	pub assets: SideMap<AssetId>,
	pub pool_index: PoolIndex,
	/// The account of the pool at `(assets, pool_index)`.
	pub pool: AccountId,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenParams {
	pub asset_a: AssetId,
	pub asset_b: AssetId,
	pub pool_index: PoolIndex,
	/// The largest amounts of `asset_a` and `asset_b` the owner is willing to deposit.
	pub desired_a: AssetAmount,
	pub desired_b: AssetAmount,
	pub owner: AccountId,
	pub deadline: Timestamp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DepositParams {
	pub id: PositionId,
	/// In canonical asset order.
	pub desired: SideMap<AssetAmount>,
	pub payer: AccountId,
	pub deadline: Timestamp,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpenedPosition {
	pub id: PositionId,
	pub liquidity: Liquidity,
	/// The amounts paid, in canonical asset order.
	pub amounts: SideMap<AssetAmount>,
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionError {
	#[error("deadline elapsed")]
	DeadlineElapsed,
	#[error("pool not found")]
	PoolNotFound,
	#[error("position {0} not found")]
	PositionNotFound(PositionId),
	#[error("not authorized to manage position {0}")]
	Unauthorized(PositionId),
	#[error("settlement invoked by an unexpected account {0}")]
	UnexpectedCallbackInvoker(AccountId),
	#[error("the desired amounts are worth no liquidity")]
	ZeroLiquidity,
	#[error("pool mint failed: {0:?}")]
	Mint(MintError<Infallible>),
	#[error("pool burn failed: {0:?}")]
	Burn(BurnError),
	#[error("pool collect failed: {0:?}")]
	Collect(CollectError),
	#[error(transparent)]
	Ledger(#[from] LedgerError),
	#[error(transparent)]
	Ownership(#[from] OwnershipError),
}

impl PositionError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			PositionError::DeadlineElapsed |
			PositionError::Unauthorized(_) |
			PositionError::UnexpectedCallbackInvoker(_) => ErrorKind::Policy,
			PositionError::PoolNotFound | PositionError::PositionNotFound(_) =>
				ErrorKind::NotFound,
			PositionError::ZeroLiquidity => ErrorKind::Bound,
			PositionError::Mint(error) => error.kind(),
			PositionError::Burn(error) => error.kind(),
			PositionError::Collect(error) => error.kind(),
			PositionError::Ledger(error) => error.kind(),
			PositionError::Ownership(error) => error.kind(),
		}
	}
}

impl From<MintError<PositionError>> for PositionError {
	fn from(error: MintError<PositionError>) -> Self {
		error.into_callback_error().unwrap_or_else(PositionError::Mint)
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PositionLedger {
	account: AccountId,
	next_id: PositionId,
	records: BTreeMap<PositionId, PositionRecord>,
	collect_dust_guard: AssetAmount,
}

impl PositionLedger {
	/// `account` is the identity the ledger uses with pools and to spend allowances.
	pub fn new(account: AccountId, collect_dust_guard: AssetAmount) -> Self {
		Self { account, next_id: 1, records: Default::default(), collect_dust_guard }
	}

	/// Deposits up to the desired amounts into a pool as a new position owned by `params.owner`,
	/// who pays for it through an allowance granted to the ledger's account.
	pub fn open<A: AssetLedger, O: OwnershipRegistry>(
		&mut self,
		pools: &mut PoolRegistry,
		assets: &mut A,
		ownership: &mut O,
		now: Timestamp,
		params: OpenParams,
	) -> Result<OpenedPosition, PositionError> {
		if now > params.deadline {
			return Err(PositionError::DeadlineElapsed)
		}
		let (asset_pair, desired) = if params.asset_a <= params.asset_b {
			(
				SideMap::from_array([params.asset_a, params.asset_b]),
				SideMap::from_array([params.desired_a, params.desired_b]),
			)
		} else {
			(
				SideMap::from_array([params.asset_b, params.asset_a]),
				SideMap::from_array([params.desired_b, params.desired_a]),
			)
		};
		let callback_data = self.callback_data(pools, params.owner, asset_pair, params.pool_index)?;
		let pool = Self::pool_mut(pools, asset_pair, params.pool_index)?;
		let (liquidity, amounts) = self.mint(pool, assets, desired, &callback_data)?;
		let fee_growth_inside = self.pool_position_snapshot(pool);
		let config = pool.config().clone();

		let id = self.next_id;
		ownership.mint(&params.owner, id)?;
		self.next_id += 1;
		self.records.insert(
			id,
			PositionRecord {
				id,
				owner: params.owner,
				assets: asset_pair,
				pool_index: params.pool_index,
				fee_tier: config.fee_pips,
				range_low: config.range_low,
				range_high: config.range_high,
				liquidity,
				owed: Default::default(),
				fee_growth_inside_last: fee_growth_inside,
			},
		);

		info!(
			"Opened position {id} for {} in pool {}/{}#{}: liquidity {liquidity}, paid {:?}",
			params.owner,
			asset_pair[Side::Zero],
			asset_pair[Side::One],
			params.pool_index,
			amounts.into_array(),
		);
		Ok(OpenedPosition { id, liquidity, amounts })
	}

	/// Adds liquidity to an existing position, paid by `params.payer`. Anyone may add liquidity to
	/// any position. Returns the liquidity added and the amounts paid.
	pub fn deposit<A: AssetLedger>(
		&mut self,
		pools: &mut PoolRegistry,
		assets: &mut A,
		now: Timestamp,
		params: DepositParams,
	) -> Result<(Liquidity, SideMap<AssetAmount>), PositionError> {
		let DepositParams { id, desired, payer, deadline } = params;
		if now > deadline {
			return Err(PositionError::DeadlineElapsed)
		}
		let record = self.records.get(&id).ok_or(PositionError::PositionNotFound(id))?;
		let (asset_pair, pool_index) = (record.assets, record.pool_index);
		let callback_data = self.callback_data(pools, payer, asset_pair, pool_index)?;
		let pool = Self::pool_mut(pools, asset_pair, pool_index)?;
		let (liquidity, amounts) = self.mint(pool, assets, desired, &callback_data)?;
		let fee_growth_inside = self.pool_position_snapshot(pool);

		let record = self.records.get_mut(&id).ok_or(PositionError::PositionNotFound(id))?;
		record.accrue_fees(fee_growth_inside);
		record.liquidity = record.liquidity.saturating_add(liquidity);

		info!("Deposited liquidity {liquidity} into position {id}, paid {:?}", amounts.into_array());
		Ok((liquidity, amounts))
	}

	/// Burns all of the position's liquidity. The value of the liquidity and the fees earned are
	/// credited to the position, to be paid out by [Self::withdraw].
	pub fn close<O: OwnershipRegistry>(
		&mut self,
		pools: &mut PoolRegistry,
		ownership: &O,
		actor: &AccountId,
		id: PositionId,
	) -> Result<SideMap<AssetAmount>, PositionError> {
		self.ensure_authorized(ownership, actor, id)?;
		let record = self.records.get(&id).ok_or(PositionError::PositionNotFound(id))?;
		if record.liquidity == 0 {
			return Ok(SideMap::default())
		}
		let (liquidity, asset_pair, pool_index) =
			(record.liquidity, record.assets, record.pool_index);

		let pool = Self::pool_mut(pools, asset_pair, pool_index)?;
		let burned = pool.burn(&self.account, liquidity).map_err(PositionError::Burn)?;
		let fee_growth_inside = self.pool_position_snapshot(pool);

		let record = self.records.get_mut(&id).ok_or(PositionError::PositionNotFound(id))?;
		record.accrue_fees(fee_growth_inside);
		record.owed = record.owed.zip(burned).map(|_, (owed, burned)| owed.saturating_add(burned));
		record.liquidity = 0;

		info!("Closed position {id}: burned liquidity {liquidity} for {:?}", burned.into_array());
		Ok(burned)
	}

	/// Pays the amounts owed to the position, less the dust guard, to `recipient`. A position
	/// without liquidity is retired along with its ownership token.
	pub fn withdraw<A: AssetLedger, O: OwnershipRegistry>(
		&mut self,
		pools: &mut PoolRegistry,
		assets: &mut A,
		ownership: &mut O,
		actor: &AccountId,
		id: PositionId,
		recipient: &AccountId,
	) -> Result<SideMap<AssetAmount>, PositionError> {
		self.ensure_authorized(ownership, actor, id)?;
		let record = self.records.get(&id).ok_or(PositionError::PositionNotFound(id))?;
		let requested = record.owed.map(|_, owed| owed.saturating_sub(self.collect_dust_guard));
		let (asset_pair, pool_index) = (record.assets, record.pool_index);

		let pool = Self::pool_mut(pools, asset_pair, pool_index)?;
		let paid = pool
			.collect(assets, &self.account, recipient, requested)
			.map_err(PositionError::Collect)?;

		let record = self.records.get_mut(&id).ok_or(PositionError::PositionNotFound(id))?;
		record.owed = SideMap::default();
		let retired = record.liquidity == 0;
		if retired {
			ownership.burn(id)?;
			self.records.remove(&id);
		}

		info!(
			"Withdrew {:?} from position {id} to {recipient}{}",
			paid.into_array(),
			if retired { ", position retired" } else { "" },
		);
		Ok(paid)
	}

	/// Pays a pool for a mint made by the ledger. The pool's account must be `invoker`, and the
	/// payer must have granted the ledger an allowance for the required amounts.
	pub fn settlement_callback<A: AssetLedger>(
		&self,
		assets: &mut A,
		invoker: &AccountId,
		required: SideMap<AssetAmount>,
		data: &MintCallbackData,
	) -> Result<(), PositionError> {
		if *invoker != data.pool {
			return Err(PositionError::UnexpectedCallbackInvoker(*invoker))
		}
		for side in Side::ALL {
			if required[side] > 0 {
				assets.transfer_on_behalf(
					data.assets[side],
					&self.account,
					&data.payer,
					invoker,
					required[side],
				)?;
			}
		}
		debug!(
			"Settled mint into pool {}/{}#{} from {}: {:?}",
			data.assets[Side::Zero],
			data.assets[Side::One],
			data.pool_index,
			data.payer,
			required.into_array(),
		);
		Ok(())
	}

	fn callback_data(
		&self,
		pools: &PoolRegistry,
		payer: AccountId,
		assets: SideMap<AssetId>,
		pool_index: PoolIndex,
	) -> Result<MintCallbackData, PositionError> {
		let pool = pools
			.expected_pool_account(assets[Side::Zero], assets[Side::One], pool_index)
			.ok_or(PositionError::PoolNotFound)?;
		Ok(MintCallbackData { payer, assets, pool_index, pool })
	}

	fn pool_mut(
		pools: &mut PoolRegistry,
		assets: SideMap<AssetId>,
		pool_index: PoolIndex,
	) -> Result<&mut PoolState, PositionError> {
		let handle = pools
			.resolve(assets[Side::Zero], assets[Side::One], pool_index)
			.ok_or(PositionError::PoolNotFound)?;
		pools.pool_mut(handle).ok_or(PositionError::PoolNotFound)
	}

	/// Mints the liquidity the desired amounts are worth at the pool's current price.
	fn mint<A: AssetLedger>(
		&self,
		pool: &mut PoolState,
		assets: &mut A,
		desired: SideMap<AssetAmount>,
		callback_data: &MintCallbackData,
	) -> Result<(Liquidity, SideMap<AssetAmount>), PositionError> {
		let (sqrt_lower, sqrt_upper) = pool.config().sqrt_price_range();
		let liquidity = liquidity_for_amounts(
			pool.sqrt_price(),
			sqrt_lower,
			sqrt_upper,
			desired[Side::Zero].into(),
			desired[Side::One].into(),
		);
		if liquidity == 0 {
			return Err(PositionError::ZeroLiquidity)
		}
		let amounts = pool.mint(assets, &self.account, liquidity, |assets, invoker, required| {
			self.settlement_callback(assets, invoker, required, callback_data)
		})?;
		Ok((liquidity, amounts))
	}

	fn pool_position_snapshot(&self, pool: &PoolState) -> SideMap<FeeGrowthQ128F128> {
		pool.position(&self.account)
			.map(|position| position.fee_growth_inside_last)
			.unwrap_or_default()
	}

	fn ensure_authorized<O: OwnershipRegistry>(
		&self,
		ownership: &O,
		actor: &AccountId,
		id: PositionId,
	) -> Result<(), PositionError> {
		if !self.records.contains_key(&id) {
			return Err(PositionError::PositionNotFound(id))
		}
		if !ownership.is_approved_or_owner(actor, id) {
			return Err(PositionError::Unauthorized(id))
		}
		Ok(())
	}

	pub fn record(&self, id: PositionId) -> Option<&PositionRecord> {
		self.records.get(&id)
	}

	/// The records whose ownership tokens `owner` currently holds.
	pub fn records_of<'a, O: OwnershipRegistry>(
		&'a self,
		ownership: &'a O,
		owner: &'a AccountId,
	) -> impl 'a + Iterator<Item = &'a PositionRecord> {
		self.records
			.values()
			.filter(move |record| ownership.owner_of(record.id).as_ref() == Some(owner))
	}

	pub fn next_id(&self) -> PositionId {
		self.next_id
	}

	pub fn account(&self) -> &AccountId {
		&self.account
	}

	pub fn collect_dust_guard(&self) -> AssetAmount {
		self.collect_dust_guard
	}
}
