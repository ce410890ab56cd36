//! In-memory nonce store.

use crate::{NonceStore, StorageError};
use async_trait::async_trait;
use settler_types::{Address, TokenPairKey, U256};

/// Volatile nonce store backed by a concurrent map.
#[derive(Clone, Default)]
pub struct MemoryNonceStore {
	data: dashmap::DashMap<(Address, TokenPairKey), U256>,
}

impl MemoryNonceStore {
	pub fn new() -> Self {
		Self::default()
	}
}

#[async_trait]
impl NonceStore for MemoryNonceStore {
	async fn get(&self, owner: Address, pair: TokenPairKey) -> Result<U256, StorageError> {
		Ok(self
			.data
			.get(&(owner, pair))
			.map(|entry| *entry)
			.unwrap_or(U256::ZERO))
	}

	async fn set(&self, owner: Address, pair: TokenPairKey, nonce: U256) -> Result<(), StorageError> {
		self.data.insert((owner, pair), nonce);
		Ok(())
	}
}
