//! Configuration for the settlement engine.

pub mod loader;
pub mod types;

pub use loader::{load_config, ConfigLoader};
pub use types::{
	MonitoringConfig, SettlementConfig, SettlerConfig, StorageBackend, StorageConfig, VenueConfig,
};
