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
use std::{collections::BTreeMap, fmt};

use tracing::{
	field::{Field, Visit},
	Level,
};
use tracing_subscriber::Layer;

/// Targets of the crates whose events the test logger prints.
const LOGGED_TARGETS: [&str; 4] =
	["cf_position_ledger", "cf_swap_router", "cf_settlement_runtime", "cf_pool_registry"];

/// Run at the start of a unit test to output all tracing logs in a CLI readable format.
/// Do not leave this in unit tests or it will panic when running more than one at a time.
#[allow(dead_code)]
pub fn init_test_logger() {
	use tracing_subscriber::{
		prelude::__tracing_subscriber_SubscriberExt, registry, util::SubscriberInitExt,
	};

	registry().with(TestLoggerLayer).try_init().expect("Failed to init the test logger, make sure you only run one test at a time with `init_test_logger`");
}

/// Installs a subscriber honouring `RUST_LOG` if none is installed yet. Safe to call from every
/// test.
pub fn try_init_env_logger() {
	let _ = tracing_subscriber::fmt()
		.with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
		.with_test_writer()
		.try_init();
}

struct TestLoggerLayer;

/// Prints events with colour, the message and the list of key/value pairs, skipping spans and
/// timestamps.
impl<S> Layer<S> for TestLoggerLayer
where
	S: tracing::Subscriber + for<'lookup> tracing_subscriber::registry::LookupSpan<'lookup>,
{
	fn on_event(
		&self,
		event: &tracing::Event<'_>,
		_ctx: tracing_subscriber::layer::Context<'_, S>,
	) {
		let target = event.metadata().target();
		if !LOGGED_TARGETS.iter().any(|logged| target.starts_with(logged)) {
			return
		}

		const KV_LIST_INDENT: &str = "    \x1b[0;34m|\x1b[0m";
		const LOCATION_INDENT: &str = "    \x1b[0;34m-->\x1b[0m";

		let mut visitor = CustomVisitor::default();
		event.record(&mut visitor);

		let level_color = match *event.metadata().level() {
			Level::ERROR => "[0;31m",
			Level::WARN => "[0;33m",
			Level::INFO => "[0;36m",
			Level::DEBUG => "[0;32m",
			Level::TRACE => "[0;35m",
		};

		println!(
			"\x1b{level_color}[{}]\x1b[0m {} ({target})",
			event.metadata().level().as_str(),
			visitor.message,
		);

		if matches!(*event.metadata().level(), Level::WARN | Level::ERROR) {
			if let (Some(file), Some(line)) = (event.metadata().file(), event.metadata().line()) {
				println!("{LOCATION_INDENT} {file}:{line}");
			}
		}

		visitor.kv.iter().for_each(|(k, v)| {
			println!("{KV_LIST_INDENT} {k} = {v}");
		});
	}
}

#[derive(Default)]
struct CustomVisitor {
	pub message: String,
	pub kv: BTreeMap<String, String>,
}

impl Visit for CustomVisitor {
	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		match field.name() {
			"message" => self.message = format!("{value:?}"),
			_ => {
				self.kv.insert(field.name().to_string(), format!("{value:?}"));
			},
		}
	}
}
