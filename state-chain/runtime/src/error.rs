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

use cf_amm::{BurnError, CollectError, InitializeError, MintError, SwapError};
use cf_pool_registry::RegistryError;
use cf_position_ledger::PositionError;
use cf_primitives::{AssetId, ErrorKind, PoolIndex};
use cf_swap_router::RouterError;
use cf_traits::LedgerError;
use core::convert::Infallible;

/// Every way a boundary operation can fail. A failed operation leaves the engine unchanged.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
	#[error("no pool {pool_index} for {asset_a}/{asset_b}")]
	PoolNotFound { asset_a: AssetId, asset_b: AssetId, pool_index: PoolIndex },
	#[error("the null account is reserved for quotes")]
	ReservedRecipient,
	#[error(transparent)]
	Registry(#[from] RegistryError),
	#[error("initialize failed: {0:?}")]
	Initialize(InitializeError),
	#[error("mint failed: {0:?}")]
	Mint(MintError<Infallible>),
	#[error("burn failed: {0:?}")]
	Burn(BurnError),
	#[error("collect failed: {0:?}")]
	Collect(CollectError),
	#[error("swap failed: {0:?}")]
	Swap(SwapError<Infallible>),
	#[error(transparent)]
	Position(#[from] PositionError),
	#[error(transparent)]
	Router(#[from] RouterError),
	#[error(transparent)]
	Ledger(#[from] LedgerError),
}

impl RuntimeError {
	pub fn kind(&self) -> ErrorKind {
		match self {
			RuntimeError::PoolNotFound { .. } => ErrorKind::NotFound,
			RuntimeError::ReservedRecipient => ErrorKind::Policy,
			RuntimeError::Registry(error) => error.kind(),
			RuntimeError::Initialize(error) => error.kind(),
			RuntimeError::Mint(error) => error.kind(),
			RuntimeError::Burn(error) => error.kind(),
			RuntimeError::Collect(error) => error.kind(),
			RuntimeError::Swap(error) => error.kind(),
			RuntimeError::Position(error) => error.kind(),
			RuntimeError::Router(error) => error.kind(),
			RuntimeError::Ledger(error) => error.kind(),
		}
	}
}

impl From<Infallible> for RuntimeError {
	fn from(error: Infallible) -> Self {
		match error {}
	}
}

impl<E> From<MintError<E>> for RuntimeError
where
	RuntimeError: From<E>,
{
	fn from(error: MintError<E>) -> Self {
		match error.into_callback_error() {
			Ok(error) => error.into(),
			Err(error) => RuntimeError::Mint(error),
		}
	}
}

impl<E> From<SwapError<E>> for RuntimeError
where
	RuntimeError: From<E>,
{
	fn from(error: SwapError<E>) -> Self {
		match error.into_callback_error() {
			Ok(error) => error.into(),
			Err(error) => RuntimeError::Swap(error),
		}
	}
}
