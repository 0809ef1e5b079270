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

//! Maps pool configurations to pool instances.
//!
//! Creation is idempotent: a configuration is a [PoolKey], and the same key always yields the same
//! [PoolHandle] and the same pool account. Pools of a pair are additionally numbered in creation
//! order, which is the [PoolIndex] used by liquidity providers and swappers to address them.


use cf_amm::{
	math::Tick,
	pool::{NewError, PoolConfig, PoolState},
};
use cf_primitives::{AccountId, AssetId, ErrorKind, FeeTier, PoolIndex, Side, SideMap};
use codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

/// Domain tag of pool account derivation.
pub const POOL_ACCOUNT_DOMAIN: &[u8] = b"cf-amm/pool";

/// Fee tiers allowed when no other tiers are configured, in parts per million.
pub const DEFAULT_FEE_TIERS: [FeeTier; 3] = [500, 3_000, 10_000];

/// The configuration that identifies a pool. The assets are always canonically ordered.
#[derive(
	Copy,
	Clone,
	Debug,
	PartialEq,
	Eq,
	PartialOrd,
	Ord,
	Hash,
	Encode,
	Decode,
	MaxEncodedLen,
	TypeInfo,
	Serialize,
	Deserialize,
)]
pub struct PoolKey {
	pub assets: (AssetId, AssetId),
	pub range: (Tick, Tick),
	pub fee_tier: FeeTier,
}

impl PoolKey {
	pub fn new(
		asset_a: AssetId,
		asset_b: AssetId,
		range_low: Tick,
		range_high: Tick,
		fee_tier: FeeTier,
	) -> Self {
		Self {
			assets: canonical_pair(asset_a, asset_b),
			range: (range_low, range_high),
			fee_tier,
		}
	}

	/// The account holding the reserves of the pool with this key. A pure function of the key.
	pub fn account(&self) -> AccountId {
		AccountId::derive(POOL_ACCOUNT_DOMAIN, &self.encode())
	}

	pub fn config(&self) -> PoolConfig {
		PoolConfig {
			assets: SideMap::from_array([self.assets.0, self.assets.1]),
			range_low: self.range.0,
			range_high: self.range.1,
			fee_pips: self.fee_tier,
		}
	}
}

fn canonical_pair(asset_a: AssetId, asset_b: AssetId) -> (AssetId, AssetId) {
	let assets = AssetId::canonical_pair(asset_a, asset_b);
	(assets[Side::Zero], assets[Side::One])
}

/// Refers to a pool of a [PoolRegistry].
#[derive(
	Copy,
	Clone,
	Debug,
	PartialEq,
	Eq,
	PartialOrd,
	Ord,
	Hash,
	Encode,
	Decode,
	MaxEncodedLen,
	TypeInfo,
	Serialize,
	Deserialize,
)]
pub struct PoolHandle(u32);

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryError {
	#[error("a pool needs two different assets")]
	IdenticalAssets,
	#[error("fee tier {0} is not allowed")]
	FeeTierNotAllowed(FeeTier),
	#[error("invalid pool configuration: {0:?}")]
	InvalidPool(NewError),
}

impl RegistryError {
	pub fn kind(&self) -> ErrorKind {
		ErrorKind::Configuration
	}
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolRegistry {
	pools: Vec<(PoolKey, PoolState)>,
	by_key: BTreeMap<PoolKey, PoolHandle>,
	by_pair: BTreeMap<(AssetId, AssetId), Vec<PoolHandle>>,
	allowed_fee_tiers: BTreeSet<FeeTier>,
}

impl Default for PoolRegistry {
	fn default() -> Self {
		Self::new(DEFAULT_FEE_TIERS)
	}
}

impl PoolRegistry {
	pub fn new(allowed_fee_tiers: impl IntoIterator<Item = FeeTier>) -> Self {
		Self {
			pools: Default::default(),
			by_key: Default::default(),
			by_pair: Default::default(),
			allowed_fee_tiers: allowed_fee_tiers.into_iter().collect(),
		}
	}

	/// Returns the pool with the given configuration, creating it if it doesn't exist yet. The
	/// returned flag is `true` if the pool was created by this call. Newly created pools are not
	/// initialized.
	pub fn create_or_get(
		&mut self,
		asset_a: AssetId,
		asset_b: AssetId,
		range_low: Tick,
		range_high: Tick,
		fee_tier: FeeTier,
	) -> Result<(PoolHandle, bool), RegistryError> {
		if asset_a == asset_b {
			return Err(RegistryError::IdenticalAssets)
		}
		let key = PoolKey::new(asset_a, asset_b, range_low, range_high, fee_tier);
		if let Some(handle) = self.by_key.get(&key) {
			return Ok((*handle, false))
		}
		if !self.allowed_fee_tiers.contains(&fee_tier) {
			return Err(RegistryError::FeeTierNotAllowed(fee_tier))
		}

		let account = key.account();
		let pool = PoolState::new(key.config(), account).map_err(RegistryError::InvalidPool)?;
		let handle = PoolHandle(self.pools.len() as u32);
		self.pools.push((key, pool));
		self.by_key.insert(key, handle);
		let pair_pools = self.by_pair.entry(key.assets).or_default();
		pair_pools.push(handle);

		info!(
			"Created pool {}/{} range [{}, {}) fee {} at index {}, account {account}",
			key.assets.0,
			key.assets.1,
			range_low,
			range_high,
			fee_tier,
			pair_pools.len() - 1,
		);
		Ok((handle, true))
	}

	/// The `index`th pool created for the pair, in either asset order.
	pub fn resolve(&self, asset_a: AssetId, asset_b: AssetId, index: PoolIndex) -> Option<PoolHandle> {
		self.pools_for_pair(asset_a, asset_b).get(index as usize).copied()
	}

	pub fn handle_of(&self, key: &PoolKey) -> Option<PoolHandle> {
		self.by_key.get(key).copied()
	}

	pub fn key(&self, handle: PoolHandle) -> Option<&PoolKey> {
		self.pools.get(handle.0 as usize).map(|(key, _)| key)
	}

	pub fn pool(&self, handle: PoolHandle) -> Option<&PoolState> {
		self.pools.get(handle.0 as usize).map(|(_, pool)| pool)
	}

	pub fn pool_mut(&mut self, handle: PoolHandle) -> Option<&mut PoolState> {
		self.pools.get_mut(handle.0 as usize).map(|(_, pool)| pool)
	}

	/// All pools of the pair in creation order, i.e. indexed by [PoolIndex].
	pub fn pools_for_pair(&self, asset_a: AssetId, asset_b: AssetId) -> &[PoolHandle] {
		self.by_pair
			.get(&canonical_pair(asset_a, asset_b))
			.map(Vec::as_slice)
			.unwrap_or_default()
	}

	/// The account of the pool a settlement for `(asset_a, asset_b, index)` must come from.
	pub fn expected_pool_account(
		&self,
		asset_a: AssetId,
		asset_b: AssetId,
		index: PoolIndex,
	) -> Option<AccountId> {
		self.resolve(asset_a, asset_b, index)
			.and_then(|handle| self.key(handle))
			.map(PoolKey::account)
	}

	pub fn allowed_fee_tiers(&self) -> impl '_ + Iterator<Item = FeeTier> {
		self.allowed_fee_tiers.iter().copied()
	}

	pub fn iter(&self) -> impl '_ + Iterator<Item = (PoolHandle, &PoolKey, &PoolState)> {
		self.pools
			.iter()
			.enumerate()
			.map(|(index, (key, pool))| (PoolHandle(index as u32), key, pool))
	}

	pub fn len(&self) -> usize {
		self.pools.len()
	}

	pub fn is_empty(&self) -> bool {
		self.pools.is_empty()
	}
}
