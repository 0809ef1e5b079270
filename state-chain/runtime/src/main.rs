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

//! Loads and validates the engine settings, the same way an embedding service would, and reports
//! the accounts the engine operates under.
//!
//! ```sh
//! cf-settlement --config-path config/Testing.toml --positions.collect_dust_guard 0
//! ```

use cf_settlement_runtime::{position_ledger_account, router_account, CommandLineOptions, Settings};
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() {
	tracing_subscriber::FmtSubscriber::builder()
		.with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
		.try_init()
		.expect("setting default subscriber failed");

	std::process::exit(match run(CommandLineOptions::parse()) {
		Ok(()) => 0,
		Err(err) => {
			error!(
				"Please ensure your config file path is configured correctly and the file is \
				 valid: {err}"
			);
			1
		},
	})
}

fn run(opts: CommandLineOptions) -> Result<(), config::ConfigError> {
	let settings = Settings::new(opts)?;
	info!(
		allowed_fee_tiers = ?settings.registry.allowed_fee_tiers,
		collect_dust_guard = settings.positions.collect_dust_guard,
		"Settings loaded"
	);
	info!(
		router = %router_account(),
		position_ledger = %position_ledger_account(),
		"Engine accounts"
	);
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use cf_utilities::{assert_err, assert_ok};

	#[test]
	fn runs_with_valid_settings() {
		assert_ok!(run(CommandLineOptions {
			config_path: Some("config/Testing.toml".to_owned()),
			..Default::default()
		}));
		assert_ok!(run(CommandLineOptions::default()));
	}

	#[test]
	fn rejects_invalid_settings() {
		assert_err!(run(CommandLineOptions {
			config_path: Some("config/Testing.toml".to_owned()),
			registry_allowed_fee_tiers: Some(vec![3000, 3000]),
			..Default::default()
		}));
		assert_err!(run(CommandLineOptions {
			config_path: Some("config/DoesNotExist.toml".to_owned()),
			..Default::default()
		}));
	}
}
