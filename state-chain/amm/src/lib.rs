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

extern crate alloc;


pub mod common;
pub mod pool;

pub use cf_amm_math as math;
pub use common::{default_price_limit, Settlement, MAX_FEE_PIPS};
pub use pool::{
	BurnError, CollectError, InitializeError, MintError, NewError, PoolConfig, PoolState, Position,
	SwapError,
};
