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

use crate::{OwnershipError, OwnershipRegistry};
use cf_primitives::{AccountId, PositionId};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MockOwnershipRegistry {
	owners: BTreeMap<PositionId, AccountId>,
	approvals: BTreeMap<PositionId, AccountId>,
	operators: BTreeSet<(AccountId, AccountId)>,
}

impl MockOwnershipRegistry {
	/// Lets `operator` manage token `id` until it changes hands.
	pub fn approve(&mut self, id: PositionId, operator: &AccountId) -> Result<(), OwnershipError> {
		if !self.owners.contains_key(&id) {
			return Err(OwnershipError::NotFound(id))
		}
		self.approvals.insert(id, *operator);
		Ok(())
	}

	/// Lets `operator` manage every token of `owner`.
	pub fn set_approval_for_all(&mut self, owner: &AccountId, operator: &AccountId, approved: bool) {
		if approved {
			self.operators.insert((*owner, *operator));
		} else {
			self.operators.remove(&(*owner, *operator));
		}
	}

	pub fn transfer(&mut self, id: PositionId, to: &AccountId) -> Result<(), OwnershipError> {
		let owner = self.owners.get_mut(&id).ok_or(OwnershipError::NotFound(id))?;
		*owner = *to;
		self.approvals.remove(&id);
		Ok(())
	}

	pub fn tokens_of(&self, owner: &AccountId) -> Vec<PositionId> {
		self.owners
			.iter()
			.filter_map(|(id, token_owner)| (token_owner == owner).then_some(*id))
			.collect()
	}
}

impl OwnershipRegistry for MockOwnershipRegistry {
	fn mint(&mut self, owner: &AccountId, id: PositionId) -> Result<(), OwnershipError> {
		if self.owners.contains_key(&id) {
			return Err(OwnershipError::AlreadyExists(id))
		}
		self.owners.insert(id, *owner);
		Ok(())
	}

	fn burn(&mut self, id: PositionId) -> Result<(), OwnershipError> {
		self.owners.remove(&id).ok_or(OwnershipError::NotFound(id))?;
		self.approvals.remove(&id);
		Ok(())
	}

	fn owner_of(&self, id: PositionId) -> Option<AccountId> {
		self.owners.get(&id).copied()
	}

	fn is_approved_or_owner(&self, actor: &AccountId, id: PositionId) -> bool {
		match self.owners.get(&id) {
			Some(owner) =>
				owner == actor ||
					self.approvals.get(&id) == Some(actor) ||
					self.operators.contains(&(*owner, *actor)),
			None => false,
		}
	}
}
