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

//! Interfaces through which the engine reaches the systems it does not own: balances and
//! allowances of fungible assets, ownership of position tokens, and the clock.

#![cfg_attr(not(feature = "std"), no_std)]

use cf_primitives::{AccountId, AssetAmount, AssetId, ErrorKind, PositionId, Timestamp};
use codec::{Decode, Encode};
use scale_info::TypeInfo;

pub mod mocks;

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub enum LedgerError {
	#[error("insufficient balance")]
	InsufficientBalance,
	#[error("insufficient allowance")]
	InsufficientAllowance,
	#[error("balance would overflow")]
	BalanceOverflow,
	#[error("transfer rejected by the asset ledger")]
	Rejected,
}

impl LedgerError {
	pub fn kind(&self) -> ErrorKind {
		ErrorKind::Funding
	}
}

/// Balances and allowances of fungible assets.
///
/// Transfers are atomic: on `Err` no balance or allowance has changed.
pub trait AssetLedger {
	fn balance_of(&self, asset: AssetId, holder: &AccountId) -> AssetAmount;

	/// Moves `amount` of `asset` held by `from` to `to`. `from` must be the identity the caller acts
	/// as, e.g. a pool paying out of its own account.
	fn transfer(
		&mut self,
		asset: AssetId,
		from: &AccountId,
		to: &AccountId,
		amount: AssetAmount,
	) -> Result<(), LedgerError>;

	/// Moves `amount` of `asset` held by `owner` to `to`, spending the allowance `owner` granted to
	/// `spender`.
	fn transfer_on_behalf(
		&mut self,
		asset: AssetId,
		spender: &AccountId,
		owner: &AccountId,
		to: &AccountId,
		amount: AssetAmount,
	) -> Result<(), LedgerError>;
}

#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Encode, Decode, TypeInfo)]
pub enum OwnershipError {
	#[error("position token {0} already exists")]
	AlreadyExists(PositionId),
	#[error("position token {0} does not exist")]
	NotFound(PositionId),
}

impl OwnershipError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			OwnershipError::AlreadyExists(_) => ErrorKind::State,
			OwnershipError::NotFound(_) => ErrorKind::NotFound,
		}
	}
}

/// Ownership of the transferable tokens that represent positions.
pub trait OwnershipRegistry {
	fn mint(&mut self, owner: &AccountId, id: PositionId) -> Result<(), OwnershipError>;

	fn burn(&mut self, id: PositionId) -> Result<(), OwnershipError>;

	fn owner_of(&self, id: PositionId) -> Option<AccountId>;

	/// Whether `actor` owns the token or has been approved by its owner to manage it.
	fn is_approved_or_owner(&self, actor: &AccountId, id: PositionId) -> bool;
}

pub trait TimeSource {
	fn now(&self) -> Timestamp;
}
