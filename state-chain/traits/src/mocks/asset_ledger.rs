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

use crate::{AssetLedger, LedgerError};
use cf_primitives::{AccountId, AssetAmount, AssetId};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MockAssetLedger {
	balances: BTreeMap<(AssetId, AccountId), AssetAmount>,
	allowances: BTreeMap<(AssetId, AccountId, AccountId), AssetAmount>,
	frozen: BTreeSet<AccountId>,
}

impl MockAssetLedger {
	pub fn credit(&mut self, asset: AssetId, holder: &AccountId, amount: AssetAmount) {
		let balance = self.balances.entry((asset, *holder)).or_default();
		*balance = balance.saturating_add(amount);
	}

	/// Sets the allowance `owner` grants `spender`, replacing any previous allowance.
	pub fn approve(
		&mut self,
		asset: AssetId,
		owner: &AccountId,
		spender: &AccountId,
		amount: AssetAmount,
	) {
		self.allowances.insert((asset, *owner, *spender), amount);
	}

	pub fn allowance(&self, asset: AssetId, owner: &AccountId, spender: &AccountId) -> AssetAmount {
		self.allowances.get(&(asset, *owner, *spender)).copied().unwrap_or_default()
	}

	/// Makes every transfer out of `holder` fail with [LedgerError::Rejected].
	pub fn freeze(&mut self, holder: &AccountId) {
		self.frozen.insert(*holder);
	}

	pub fn thaw(&mut self, holder: &AccountId) {
		self.frozen.remove(holder);
	}

	/// The sum of all balances of `asset`.
	pub fn total_issuance(&self, asset: AssetId) -> AssetAmount {
		self.balances
			.iter()
			.filter(|((balance_asset, _), _)| *balance_asset == asset)
			.fold(0, |total, (_, balance)| total.saturating_add(*balance))
	}

	fn move_balance(
		&mut self,
		asset: AssetId,
		from: &AccountId,
		to: &AccountId,
		amount: AssetAmount,
	) -> Result<(), LedgerError> {
		if self.frozen.contains(from) {
			return Err(LedgerError::Rejected)
		}
		let from_balance = self.balance_of(asset, from);
		let remaining = from_balance.checked_sub(amount).ok_or(LedgerError::InsufficientBalance)?;
		if from == to {
			return Ok(())
		}
		let credited =
			self.balance_of(asset, to).checked_add(amount).ok_or(LedgerError::BalanceOverflow)?;
		self.balances.insert((asset, *from), remaining);
		self.balances.insert((asset, *to), credited);
		Ok(())
	}
}

impl AssetLedger for MockAssetLedger {
	fn balance_of(&self, asset: AssetId, holder: &AccountId) -> AssetAmount {
		self.balances.get(&(asset, *holder)).copied().unwrap_or_default()
	}

	fn transfer(
		&mut self,
		asset: AssetId,
		from: &AccountId,
		to: &AccountId,
		amount: AssetAmount,
	) -> Result<(), LedgerError> {
		self.move_balance(asset, from, to, amount)
	}

	fn transfer_on_behalf(
		&mut self,
		asset: AssetId,
		spender: &AccountId,
		owner: &AccountId,
		to: &AccountId,
		amount: AssetAmount,
	) -> Result<(), LedgerError> {
		let allowance = self.allowance(asset, owner, spender);
		let remaining_allowance =
			allowance.checked_sub(amount).ok_or(LedgerError::InsufficientAllowance)?;
		self.move_balance(asset, owner, to, amount)?;
		self.allowances.insert((asset, *owner, *spender), remaining_allowance);
		Ok(())
	}
}
