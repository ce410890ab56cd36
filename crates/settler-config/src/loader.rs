//! Configuration loading from files and environment.

use crate::types::*;
use anyhow::{Context, Result};
use settler_types::ETH_TOKEN_ADDRESS;
use std::path::Path;
use tracing::{debug, info};

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
	/// Load configuration from file
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<SettlerConfig> {
		let path = path.as_ref();
		info!("Loading configuration from {:?}", path);

		let contents = std::fs::read_to_string(path)
			.with_context(|| format!("Failed to read config file: {:?}", path))?;

		let config = match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Self::from_toml(&contents)?,
			Some("json") => Self::from_json(&contents)?,
			Some("yaml") | Some("yml") => Self::from_yaml(&contents)?,
			_ => anyhow::bail!("Unsupported config format: {:?}", path),
		};

		Self::validate_config(&config)?;
		Ok(config)
	}

	/// Load from TOML string
	pub fn from_toml(contents: &str) -> Result<SettlerConfig> {
		toml::from_str(contents).map_err(|e| anyhow::anyhow!("Failed to parse TOML: {}", e))
	}

	/// Load from JSON string
	pub fn from_json(contents: &str) -> Result<SettlerConfig> {
		serde_json::from_str(contents).context("Failed to parse JSON")
	}

	/// Load from YAML string
	pub fn from_yaml(contents: &str) -> Result<SettlerConfig> {
		serde_yaml::from_str(contents).context("Failed to parse YAML")
	}

	/// Load from a file with environment variable overrides applied.
	pub fn from_env_and_file<P: AsRef<Path>>(path: P) -> Result<SettlerConfig> {
		let mut config = Self::from_file(path)?;
		Self::apply_env_overrides(&mut config)?;
		Self::validate_config(&config)?;
		Ok(config)
	}

	/// Apply environment variable overrides
	fn apply_env_overrides(config: &mut SettlerConfig) -> Result<()> {
		if let Ok(admin) = std::env::var("SETTLER_ADMIN") {
			debug!("Overriding admin from environment");
			config.settlement.admin = admin
				.parse()
				.context("SETTLER_ADMIN is not a valid address")?;
		}

		if let Ok(enabled) = std::env::var("SETTLER_TRADE_ENABLED") {
			debug!("Overriding trade switch from environment");
			config.settlement.trade_enabled = enabled
				.parse()
				.context("SETTLER_TRADE_ENABLED must be true or false")?;
		}

		if let Ok(path) = std::env::var("SETTLER_STORAGE_PATH") {
			debug!("Overriding storage path from environment");
			config.storage.path = Some(path.into());
		}

		if let Ok(level) = std::env::var("SETTLER_LOG_LEVEL") {
			config.monitoring.log_level = level;
		}

		Ok(())
	}

	/// Validate configuration
	fn validate_config(config: &SettlerConfig) -> Result<()> {
		// The deployment invariants: every identity must be a real address.
		if config.settlement.address.is_zero() {
			anyhow::bail!("settlement.address must not be the zero address");
		}
		if config.settlement.admin.is_zero() {
			anyhow::bail!("settlement.admin must not be the zero address");
		}
		if config.venue.address.is_zero() {
			anyhow::bail!("venue.address must not be the zero address");
		}

		for operator in &config.settlement.operators {
			if operator.is_zero() {
				anyhow::bail!("operators must not contain the zero address");
			}
		}

		for token in &config.settlement.listed_tokens {
			if token.is_zero() {
				anyhow::bail!("listed_tokens must not contain the zero address");
			}
			if *token == ETH_TOKEN_ADDRESS {
				anyhow::bail!("the ether sentinel cannot be listed");
			}
		}

		if config.storage.backend == StorageBackend::File && config.storage.path.is_none() {
			anyhow::bail!("storage.path is required for the file backend");
		}

		Ok(())
	}
}

/// Load configuration from standard locations
pub fn load_config() -> Result<SettlerConfig> {
	// Check for config file in order:
	// 1. Environment variable SETTLER_CONFIG
	// 2. ./settler.toml
	// 3. ./config/settler.toml

	if let Ok(path) = std::env::var("SETTLER_CONFIG") {
		return ConfigLoader::from_env_and_file(Path::new(&path));
	}

	let paths = ["./settler.toml", "./config/settler.toml"];
	for path in &paths {
		if Path::new(path).exists() {
			return ConfigLoader::from_env_and_file(Path::new(path));
		}
	}

	anyhow::bail!("No configuration file found (set SETTLER_CONFIG or create settler.toml)")
}

#[cfg(test)]
mod tests {
	use super::*;

	const SAMPLE: &str = r#"
[settlement]
address = "0x5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e"
admin = "0xadadadadadadadadadadadadadadadadadadadad"
operators = ["0x0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e0e"]
listed_tokens = ["0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"]
trade_enabled = true

[venue]
address = "0xfefefefefefefefefefefefefefefefefefefefe"

[storage]
backend = "memory"

[monitoring]
log_level = "debug"
"#;

	#[test]
	fn test_toml_parsing() {
		let config = ConfigLoader::from_toml(SAMPLE).unwrap();
		assert_eq!(config.settlement.operators.len(), 1);
		assert!(config.settlement.trade_enabled);
		assert_eq!(config.storage.backend, StorageBackend::Memory);
		assert_eq!(config.monitoring.log_level, "debug");
	}

	#[test]
	fn test_defaults_for_optional_sections() {
		let toml = r#"
[settlement]
address = "0x5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e"
admin = "0xadadadadadadadadadadadadadadadadadadadad"

[venue]
address = "0xfefefefefefefefefefefefefefefefefefefefe"
"#;
		let config = ConfigLoader::from_toml(toml).unwrap();
		assert!(config.settlement.operators.is_empty());
		assert!(!config.settlement.trade_enabled);
		assert_eq!(config.storage.backend, StorageBackend::Memory);
		assert_eq!(config.monitoring.log_level, "info");
	}

	#[test]
	fn test_json_parsing() {
		let json = r#"{
			"settlement": {
				"address": "0x5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e5e",
				"admin": "0xadadadadadadadadadadadadadadadadadadadad"
			},
			"venue": {
				"address": "0xfefefefefefefefefefefefefefefefefefefefe"
			}
		}"#;
		let config = ConfigLoader::from_json(json).unwrap();
		assert!(!config.settlement.address.is_zero());
	}

	#[test]
	fn test_validation_rejects_zero_addresses() {
		let mut config = ConfigLoader::from_toml(SAMPLE).unwrap();
		config.settlement.admin = settler_types::Address::ZERO;

		let err = ConfigLoader::validate_config(&config).unwrap_err();
		assert!(err.to_string().contains("admin"));
	}

	#[test]
	fn test_validation_rejects_listing_the_ether_sentinel() {
		let mut config = ConfigLoader::from_toml(SAMPLE).unwrap();
		config.settlement.listed_tokens.push(ETH_TOKEN_ADDRESS);

		let err = ConfigLoader::validate_config(&config).unwrap_err();
		assert!(err.to_string().contains("ether sentinel"));
	}

	#[test]
	fn test_validation_requires_path_for_file_backend() {
		let mut config = ConfigLoader::from_toml(SAMPLE).unwrap();
		config.storage.backend = StorageBackend::File;

		assert!(ConfigLoader::validate_config(&config).is_err());

		config.storage.path = Some("./data/nonces".into());
		assert!(ConfigLoader::validate_config(&config).is_ok());
	}

	#[test]
	fn test_toml_round_trip() {
		let config = ConfigLoader::from_toml(SAMPLE).unwrap();
		let serialized = toml::to_string(&config).unwrap();
		let reparsed = ConfigLoader::from_toml(&serialized).unwrap();
		assert_eq!(reparsed.settlement.address, config.settlement.address);
		assert_eq!(reparsed.settlement.listed_tokens, config.settlement.listed_tokens);
	}
}
