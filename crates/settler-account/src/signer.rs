//! Local private-key signer for producing order signatures.
//!
//! This is client-side convenience: the engine itself never signs anything.
//! Used by the CLI, the simulator, and tests.

use alloy_primitives::{eip191_hash_message, Address, B256};
use alloy_signer::SignerSync;
use alloy_signer_local::PrivateKeySigner;
use settler_types::{Order, OrderSignature};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AccountError {
	#[error("invalid private key: {0}")]
	InvalidKey(String),

	#[error("signing failed: {0}")]
	SigningFailed(String),
}

/// Wraps an in-memory secp256k1 key and signs order hashes with the
/// EIP-191 prefix applied.
pub struct LocalSigner {
	signer: PrivateKeySigner,
}

impl LocalSigner {
	/// Creates a signer from a hex-encoded private key (0x prefix optional).
	pub fn new(private_key_hex: &str) -> Result<Self, AccountError> {
		let signer = private_key_hex
			.parse::<PrivateKeySigner>()
			.map_err(|e| AccountError::InvalidKey(e.to_string()))?;
		Ok(Self { signer })
	}

	/// Generates a throwaway key. Test and simulation use only.
	pub fn random() -> Self {
		Self {
			signer: PrivateKeySigner::random(),
		}
	}

	/// The address this signer's signatures recover to.
	pub fn address(&self) -> Address {
		self.signer.address()
	}

	/// Signs an order over its packed message hash.
	pub fn sign_order(&self, order: &Order) -> Result<OrderSignature, AccountError> {
		self.sign_hash(order.message_hash())
	}

	/// Signs an arbitrary 32-byte message hash, applying the EIP-191 prefix
	/// first so the result matches what [`crate::recover_signer`] expects.
	pub fn sign_hash(&self, msg_hash: B256) -> Result<OrderSignature, AccountError> {
		let digest = eip191_hash_message(msg_hash);
		let sig = self
			.signer
			.sign_hash_sync(&digest)
			.map_err(|e| AccountError::SigningFailed(e.to_string()))?;
		Ok(OrderSignature {
			v: 27 + sig.v() as u8,
			r: sig.r().into(),
			s: sig.s().into(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_new_rejects_garbage_key() {
		assert!(LocalSigner::new("not-a-key").is_err());
		assert!(LocalSigner::new("0x12").is_err());
	}

	#[test]
	fn test_known_key_address() {
		// The first well-known anvil/hardhat development key.
		let signer = LocalSigner::new(
			"0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80",
		)
		.unwrap();
		assert_eq!(
			signer.address(),
			"0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266"
				.parse::<Address>()
				.unwrap()
		);
	}
}
