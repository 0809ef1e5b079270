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

#![cfg(any(test, feature = "mocks"))]

//! In-memory implementations of the collaborator traits for tests and local tooling.

pub mod asset_ledger;
pub mod ownership;
pub mod time_source;

pub use asset_ledger::MockAssetLedger;
pub use ownership::MockOwnershipRegistry;
pub use time_source::MockTimeSource;
