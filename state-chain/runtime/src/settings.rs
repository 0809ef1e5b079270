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

use cf_pool_registry::DEFAULT_FEE_TIERS;
use cf_primitives::{AssetAmount, FeeTier};
use clap::Parser;
use config::{Config, ConfigError, File, Map, Source, Value};
use serde::Deserialize;
use std::collections::BTreeSet;

pub const DEFAULT_CONFIG_PATH: &str = "config/Default.toml";

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Registry {
	/// Fee tiers, in parts per million, that pools may be created with.
	pub allowed_fee_tiers: Vec<FeeTier>,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Positions {
	pub collect_dust_guard: u64,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct Settings {
	pub registry: Registry,
	pub positions: Positions,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			registry: Registry { allowed_fee_tiers: DEFAULT_FEE_TIERS.to_vec() },
			positions: Positions { collect_dust_guard: 1 },
		}
	}
}

#[derive(Parser, Debug, Clone, Default)]
pub struct CommandLineOptions {
	#[clap(short = 'c', long = "config-path")]
	pub config_path: Option<String>,

	#[clap(long = "registry.allowed_fee_tiers", value_delimiter = ',')]
	pub registry_allowed_fee_tiers: Option<Vec<FeeTier>>,

	#[clap(long = "positions.collect_dust_guard")]
	pub positions_collect_dust_guard: Option<u64>,
}

impl Source for CommandLineOptions {
	fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
		Box::new((*self).clone())
	}

	fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
		let mut map = Map::new();

		if let Some(tiers) = &self.registry_allowed_fee_tiers {
			map.insert("registry.allowed_fee_tiers".to_owned(), Value::from(tiers.clone()));
		}
		if let Some(guard) = self.positions_collect_dust_guard {
			map.insert("positions.collect_dust_guard".to_owned(), Value::from(guard));
		}

		Ok(map)
	}
}

impl Settings {
	/// New settings loaded from the `config_path` in the `CommandLineOptions` or
	/// "config/Default.toml" if none, with overridden values from the `CommandLineOptions`.
	pub fn new(opts: CommandLineOptions) -> Result<Self, ConfigError> {
		Self::load_settings_from_all_sources(DEFAULT_CONFIG_PATH, opts)
	}

	pub fn load_settings_from_all_sources(
		default_config_path: &str,
		opts: CommandLineOptions,
	) -> Result<Self, ConfigError> {
		let config_path = opts.config_path.clone().unwrap_or_else(|| default_config_path.to_owned());

		let settings: Settings = Config::builder()
			.add_source(File::with_name(&config_path))
			.add_source(opts)
			.build()?
			.try_deserialize()?;

		settings.validate_settings()?;

		Ok(settings)
	}

	pub fn validate_settings(&self) -> Result<(), ConfigError> {
		let tiers = &self.registry.allowed_fee_tiers;
		if tiers.is_empty() {
			return Err(ConfigError::Message("registry.allowed_fee_tiers must not be empty".into()))
		}
		if let Some(tier) = tiers.iter().find(|tier| **tier > cf_amm::MAX_FEE_PIPS) {
			return Err(ConfigError::Message(format!(
				"fee tier {tier} exceeds the maximum of {}",
				cf_amm::MAX_FEE_PIPS
			)))
		}
		if tiers.iter().collect::<BTreeSet<_>>().len() != tiers.len() {
			return Err(ConfigError::Message(
				"registry.allowed_fee_tiers contains duplicates".into(),
			))
		}
		Ok(())
	}

	pub fn collect_dust_guard(&self) -> AssetAmount {
		self.positions.collect_dust_guard.into()
	}
}
