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

use crate::TimeSource;
use cf_primitives::Timestamp;
use std::sync::{
	atomic::{AtomicU64, Ordering},
	Arc,
};

/// A clock that only moves when told to. Clones share the same time.
#[derive(Clone, Debug, Default)]
pub struct MockTimeSource(Arc<AtomicU64>);

impl MockTimeSource {
	pub fn starting_at(now: Timestamp) -> Self {
		Self(Arc::new(AtomicU64::new(now)))
	}

	pub fn set(&self, now: Timestamp) {
		self.0.store(now, Ordering::Relaxed);
	}

	pub fn advance(&self, by: Timestamp) {
		self.0.fetch_add(by, Ordering::Relaxed);
	}
}

impl TimeSource for MockTimeSource {
	fn now(&self) -> Timestamp {
		self.0.load(Ordering::Relaxed)
	}
}
