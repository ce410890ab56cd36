//! File-backed nonce store.
//!
//! One JSON file per owner, rewritten on every watermark update, with a
//! concurrent in-memory cache in front. Watermarks survive process
//! restarts; a corrupt file is skipped with a warning rather than taking
//! the store down.

use crate::{NonceStore, StorageError};
use async_trait::async_trait;
use settler_types::{Address, TokenPairKey, U256};
use std::collections::HashMap;
use std::path::PathBuf;
use tokio::fs;
use tracing::{debug, warn};

/// Durable nonce store rooted at a directory.
#[derive(Clone)]
pub struct FileNonceStore {
	base_path: PathBuf,
	/// In-memory cache for reads; the file is the source of truth on open.
	cache: dashmap::DashMap<(Address, TokenPairKey), U256>,
}

impl FileNonceStore {
	pub async fn new(base_path: PathBuf) -> Result<Self, StorageError> {
		fs::create_dir_all(&base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		let store = Self {
			base_path,
			cache: dashmap::DashMap::new(),
		};
		store.load_all().await?;
		Ok(store)
	}

	/// File path holding all watermarks for one owner.
	fn owner_path(&self, owner: Address) -> PathBuf {
		self.base_path.join(format!("nonces_{owner}.json"))
	}

	/// Loads every owner file into the cache.
	async fn load_all(&self) -> Result<(), StorageError> {
		let mut entries = fs::read_dir(&self.base_path)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?;

		while let Some(entry) = entries
			.next_entry()
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))?
		{
			let path = entry.path();
			if path.extension().and_then(|s| s.to_str()) != Some("json") {
				continue;
			}
			let Some(owner) = Self::owner_from_path(&path) else {
				warn!("Skipping unrecognized file {:?}", path);
				continue;
			};
			match fs::read_to_string(&path).await {
				Ok(content) => match serde_json::from_str::<HashMap<String, U256>>(&content) {
					Ok(records) => {
						for (pair_hex, nonce) in records {
							match pair_hex.parse::<U256>() {
								Ok(pair) => {
									self.cache.insert((owner, TokenPairKey::from(pair)), nonce);
								}
								Err(e) => warn!("Bad pair key in {:?}: {}", path, e),
							}
						}
					}
					Err(e) => warn!("Failed to parse nonce file {:?}: {}", path, e),
				},
				Err(e) => warn!("Failed to read nonce file {:?}: {}", path, e),
			}
		}

		debug!("Loaded {} nonce watermarks from disk", self.cache.len());
		Ok(())
	}

	fn owner_from_path(path: &std::path::Path) -> Option<Address> {
		path.file_stem()?
			.to_str()?
			.strip_prefix("nonces_")?
			.parse::<Address>()
			.ok()
	}

	/// Rewrites the owner's file from the cache.
	async fn persist_owner(&self, owner: Address) -> Result<(), StorageError> {
		let records: HashMap<String, U256> = self
			.cache
			.iter()
			.filter(|entry| entry.key().0 == owner)
			.map(|entry| (entry.key().1.to_string(), *entry.value()))
			.collect();

		let content = serde_json::to_string_pretty(&records)
			.map_err(|e| StorageError::Serialization(e.to_string()))?;

		fs::write(self.owner_path(owner), content)
			.await
			.map_err(|e| StorageError::Backend(e.to_string()))
	}
}

#[async_trait]
impl NonceStore for FileNonceStore {
	async fn get(&self, owner: Address, pair: TokenPairKey) -> Result<U256, StorageError> {
		Ok(self
			.cache
			.get(&(owner, pair))
			.map(|entry| *entry)
			.unwrap_or(U256::ZERO))
	}

	async fn set(&self, owner: Address, pair: TokenPairKey, nonce: U256) -> Result<(), StorageError> {
		self.cache.insert((owner, pair), nonce);
		self.persist_owner(owner).await
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	#[tokio::test]
	async fn test_file_store_survives_reopen() {
		let temp_dir = TempDir::new().unwrap();
		let owner = Address::repeat_byte(0x01);
		let pair = TokenPairKey::new(Address::repeat_byte(0x02), Address::repeat_byte(0x03));

		let store = FileNonceStore::new(temp_dir.path().to_path_buf()).await.unwrap();
		assert_eq!(store.get(owner, pair).await.unwrap(), U256::ZERO);
		store.set(owner, pair, U256::from(99u64)).await.unwrap();

		// Verify file exists
		assert!(store.owner_path(owner).exists());

		// A fresh instance over the same directory sees the watermark.
		let store2 = FileNonceStore::new(temp_dir.path().to_path_buf()).await.unwrap();
		assert_eq!(store2.get(owner, pair).await.unwrap(), U256::from(99u64));
	}

	#[tokio::test]
	async fn test_file_store_keeps_pairs_separate() {
		let temp_dir = TempDir::new().unwrap();
		let owner = Address::repeat_byte(0x01);
		let pair_a = TokenPairKey::new(Address::repeat_byte(0x02), Address::repeat_byte(0x03));
		let pair_b = TokenPairKey::new(Address::repeat_byte(0x03), Address::repeat_byte(0x02));

		let store = FileNonceStore::new(temp_dir.path().to_path_buf()).await.unwrap();
		store.set(owner, pair_a, U256::from(1u64)).await.unwrap();
		store.set(owner, pair_b, U256::from(2u64)).await.unwrap();

		let store2 = FileNonceStore::new(temp_dir.path().to_path_buf()).await.unwrap();
		assert_eq!(store2.get(owner, pair_a).await.unwrap(), U256::from(1u64));
		assert_eq!(store2.get(owner, pair_b).await.unwrap(), U256::from(2u64));
	}
}
