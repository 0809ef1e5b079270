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

use codec::{Decode, Encode, MaxEncodedLen};
use scale_info::TypeInfo;
use serde::{Deserialize, Serialize};

#[derive(
	Debug,
	Clone,
	Copy,
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
pub enum Side {
	Zero,
	One,
}

impl Side {
	pub const ALL: [Side; 2] = [Side::Zero, Side::One];
}

impl core::ops::Not for Side {
	type Output = Self;

	fn not(self) -> Self::Output {
		match self {
			Side::Zero => Side::One,
			Side::One => Side::Zero,
		}
	}
}

/// A value for each asset of a pool. Indexable by [Side].
#[derive(
	Copy,
	Clone,
	Default,
	Debug,
	TypeInfo,
	PartialEq,
	Eq,
	Encode,
	Decode,
	MaxEncodedLen,
	Serialize,
	Deserialize,
)]
pub struct SideMap<T> {
	zero: T,
	one: T,
}

impl<T> SideMap<T> {
	pub fn from_array(array: [T; 2]) -> Self {
		let [zero, one] = array;
		Self { zero, one }
	}

	pub fn into_array(self) -> [T; 2] {
		[self.zero, self.one]
	}

	pub fn map<R>(self, mut f: impl FnMut(Side, T) -> R) -> SideMap<R> {
		SideMap { zero: f(Side::Zero, self.zero), one: f(Side::One, self.one) }
	}

	pub fn try_map<R, E>(
		self,
		mut f: impl FnMut(Side, T) -> Result<R, E>,
	) -> Result<SideMap<R>, E> {
		Ok(SideMap { zero: f(Side::Zero, self.zero)?, one: f(Side::One, self.one)? })
	}

	pub fn zip<S>(self, other: SideMap<S>) -> SideMap<(T, S)> {
		SideMap { zero: (self.zero, other.zero), one: (self.one, other.one) }
	}

	/// Swaps the two values, i.e. reindexes the map by the opposite side.
	pub fn flip(self) -> Self {
		SideMap { zero: self.one, one: self.zero }
	}
}

impl<T> core::ops::Index<Side> for SideMap<T> {
	type Output = T;
	fn index(&self, side: Side) -> &T {
		match side {
			Side::Zero => &self.zero,
			Side::One => &self.one,
		}
	}
}

impl<T> core::ops::IndexMut<Side> for SideMap<T> {
	fn index_mut(&mut self, side: Side) -> &mut T {
		match side {
			Side::Zero => &mut self.zero,
			Side::One => &mut self.one,
		}
	}
}
