//! Persistence for the nonce registry.
//!
//! The registry itself is a plain mapping `(owner, token-pair key) -> last
//! accepted nonce`; this crate abstracts where that mapping lives so the
//! engine can run against volatile memory in tests and a durable backend in
//! deployment.

use async_trait::async_trait;
use settler_types::{Address, TokenPairKey, U256};
use thiserror::Error;

/// Re-export implementations
pub mod implementations {
	pub mod file;
	pub mod memory;
}

pub use implementations::file::FileNonceStore;
pub use implementations::memory::MemoryNonceStore;

/// Errors that can occur in a nonce store backend.
#[derive(Debug, Error)]
pub enum StorageError {
	/// Error that occurs during serialization/deserialization.
	#[error("serialization error: {0}")]
	Serialization(String),
	/// Error that occurs in the storage backend.
	#[error("backend error: {0}")]
	Backend(String),
}

/// Low-level interface to the persisted nonce watermarks.
///
/// Keys that were never written read back as zero: the registry is created
/// implicitly on first use and entries are never deleted.
#[async_trait]
pub trait NonceStore: Send + Sync {
	/// Returns the stored watermark for the key, `U256::ZERO` if unset.
	async fn get(&self, owner: Address, pair: TokenPairKey) -> Result<U256, StorageError>;

	/// Stores a new watermark for the key.
	///
	/// Monotonicity is enforced by the caller (the nonce registry), not
	/// here; the store is a dumb map.
	async fn set(&self, owner: Address, pair: TokenPairKey, nonce: U256) -> Result<(), StorageError>;
}
