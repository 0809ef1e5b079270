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

#[cfg(feature = "test-utils")]
pub mod testing;

/// Returns the result of the expression if it is `Ok`, otherwise panics with the error and the
/// text of the expression that produced it.
#[macro_export]
macro_rules! assert_ok {
	($expression:expr) => {
		match $expression {
			Ok(value) => value,
			Err(error) => panic!("expression '{}' returned Err({:?})", stringify!($expression), error),
		}
	};
}

/// Returns the error if the expression is `Err`, otherwise panics.
#[macro_export]
macro_rules! assert_err {
	($expression:expr) => {
		match $expression {
			Ok(value) =>
				panic!("expression '{}' returned Ok({:?})", stringify!($expression), value),
			Err(error) => error,
		}
	};
}

#[cfg(feature = "std")]
#[macro_export]
macro_rules! assert_panics {
	($expression:expr) => {
		match ::std::panic::catch_unwind(::std::panic::AssertUnwindSafe(|| $expression)) {
			Ok(_result) => panic!("expression didn't panic '{}'", stringify!($expression),),
			Err(panic) => panic,
		}
	};
}

/// Returns `Ok(())` if the condition holds, otherwise returns early with the given error.
#[macro_export]
macro_rules! ensure {
	($condition:expr, $error:expr $(,)?) => {
		if !$condition {
			return Err($error.into())
		}
	};
}
