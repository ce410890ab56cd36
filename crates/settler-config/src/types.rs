//! Configuration types.

use serde::{Deserialize, Serialize};
use settler_types::Address;
use std::path::PathBuf;

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlerConfig {
	pub settlement: SettlementConfig,
	pub venue: VenueConfig,
	#[serde(default)]
	pub storage: StorageConfig,
	#[serde(default)]
	pub monitoring: MonitoringConfig,
}

/// Identity, roles and initial policy of the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementConfig {
	/// The engine's own address: nonce domain tag and custody account.
	pub address: Address,
	/// The singular admin.
	pub admin: Address,
	/// Accounts granted the operator role at startup.
	#[serde(default)]
	pub operators: Vec<Address>,
	/// Tokens listed at startup.
	#[serde(default)]
	pub listed_tokens: Vec<Address>,
	/// Whether trading starts enabled.
	#[serde(default)]
	pub trade_enabled: bool,
}

/// The venue's ledger account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VenueConfig {
	pub address: Address,
}

/// Where nonce watermarks are persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
	Memory,
	File,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
	pub backend: StorageBackend,
	/// Directory for the file backend.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub path: Option<PathBuf>,
}

impl Default for StorageConfig {
	fn default() -> Self {
		Self {
			backend: StorageBackend::Memory,
			path: None,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
	pub log_level: String,
}

impl Default for MonitoringConfig {
	fn default() -> Self {
		Self {
			log_level: "info".to_string(),
		}
	}
}
