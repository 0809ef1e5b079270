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

//! Identities, amounts and the pair-indexed containers shared by every crate of the settlement
//! engine.

use blake2::{digest::consts::U32, Blake2b, Digest};
use codec::{Decode, Encode, MaxEncodedLen};
use core::fmt;
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

mod side;

pub use side::{Side, SideMap};


/// A quantity of some asset. Amounts that cross the boundary of the engine are bounded to 128 bits.
pub type AssetAmount = u128;
/// A signed asset quantity, positive when owed to a pool and negative when paid out by it.
pub type SignedAssetAmount = i128;
/// Position of a pool within the list of pools of its asset pair, in order of creation.
pub type PoolIndex = u32;
pub type PositionId = u64;
pub type Timestamp = u64;
/// Swap fee in parts per million of the input amount, i.e. 3000 is 0.3%.
pub type FeeTier = u32;

/// Denominator of [FeeTier].
pub const ONE_IN_PIPS: u32 = 1_000_000;

type Blake2b256 = Blake2b<U32>;

#[derive(
	Copy,
	Clone,
	Default,
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
pub struct AccountId(pub [u8; 32]);

impl AccountId {
	/// The reserved identity. Quotes use it as both payer and recipient, so any settlement that
	/// names it as recipient is never committed.
	pub const NULL: Self = Self([0u8; 32]);

	pub const fn new(bytes: [u8; 32]) -> Self {
		Self(bytes)
	}

	pub fn is_null(&self) -> bool {
		*self == Self::NULL
	}

	/// Derives a deterministic identity from a domain tag and arbitrary data. The same inputs always
	/// produce the same identity.
	pub fn derive(domain: &[u8], data: &[u8]) -> Self {
		let mut hasher = Blake2b256::new();
		hasher.update((domain.len() as u32).to_le_bytes());
		hasher.update(domain);
		hasher.update(data);
		let mut bytes = [0u8; 32];
		bytes.copy_from_slice(&hasher.finalize());
		Self(bytes)
	}
}

impl From<[u8; 32]> for AccountId {
	fn from(bytes: [u8; 32]) -> Self {
		Self(bytes)
	}
}

impl fmt::Display for AccountId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "0x")?;
		for byte in &self.0[..4] {
			write!(f, "{byte:02x}")?;
		}
		write!(f, "…")?;
		for byte in &self.0[28..] {
			write!(f, "{byte:02x}")?;
		}
		Ok(())
	}
}

impl fmt::Debug for AccountId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "AccountId(")?;
		for byte in &self.0 {
			write!(f, "{byte:02x}")?;
		}
		write!(f, ")")
	}
}

/// Identifies a fungible asset. Zero is not a valid asset.
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
pub struct AssetId(pub u64);

impl AssetId {
	pub fn is_valid(&self) -> bool {
		self.0 != 0
	}

	/// Orders two assets canonically. The smaller asset is asset zero of every pool of the pair.
	pub fn canonical_pair(a: AssetId, b: AssetId) -> SideMap<AssetId> {
		if a <= b {
			SideMap::from_array([a, b])
		} else {
			SideMap::from_array([b, a])
		}
	}
}

impl fmt::Display for AssetId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "asset#{}", self.0)
	}
}

/// Broad classification of failures, shared by the errors of every crate of the engine.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Encode, Decode, TypeInfo, Serialize, Deserialize)]
pub enum ErrorKind {
	/// Invalid pool configuration or disallowed fee tier.
	Configuration,
	/// The operation is not valid in the current state, e.g. a pool that is not initialized.
	State,
	/// A settlement did not deliver the required funds, or a payout could not be made.
	Funding,
	/// A caller-supplied bound was violated: deadline, price limit, slippage or amount range.
	Bound,
	/// The caller is not allowed to perform the operation.
	Policy,
	/// A referenced pool or position does not exist.
	NotFound,
}
