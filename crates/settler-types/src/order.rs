//! The limit order model and its signing preimage.

use crate::nonce::{Nonce, TokenPairKey};
use alloy_primitives::{keccak256, Address, B256, U256};
use alloy_sol_types::SolValue;
use serde::{Deserialize, Serialize};

/// A pre-signed limit order, reconstructed per call and never stored.
///
/// The owner signs over the packed encoding of all eight fields; altering
/// any single field invalidates the signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
	/// Account the source tokens are pulled from; must be the signer.
	pub owner: Address,
	/// Replay-protection watermark for (owner, token pair).
	pub nonce: Nonce,
	/// Token sold.
	pub src_token: Address,
	/// Amount of `src_token` pulled from the owner, fee included.
	pub src_amount: U256,
	/// Token (or the ether sentinel) bought.
	pub dest_token: Address,
	/// Recipient of the proceeds.
	pub dest_address: Address,
	/// Minimum acceptable conversion rate, in `RATE_PRECISION` fixed point.
	pub min_conversion_rate: U256,
	/// Fee rate in `MAX_FEE_PRECISION` fixed point.
	pub fee_in_precision: U256,
}

impl Order {
	/// The nonce-namespacing key for this order's token pair.
	pub fn pair_key(&self) -> TokenPairKey {
		TokenPairKey::new(self.src_token, self.dest_token)
	}

	/// Keccak hash of the solidity-packed encoding of the order fields, in
	/// declaration order. This is the message the owner signs (after the
	/// EIP-191 prefix is applied by the signer).
	pub fn message_hash(&self) -> B256 {
		let preimage = (
			self.owner,
			self.nonce.value(),
			self.src_token,
			self.src_amount,
			self.dest_token,
			self.dest_address,
			self.min_conversion_rate,
			self.fee_in_precision,
		)
			.abi_encode_packed();
		keccak256(preimage)
	}
}

/// A detached secp256k1 signature over an order's message hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderSignature {
	/// Recovery id; only 27 and 28 are accepted.
	pub v: u8,
	pub r: B256,
	pub s: B256,
}

/// Outcome of a successfully executed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionReceipt {
	/// Amount pulled from the owner (fee included).
	pub src_amount: U256,
	/// Fee retained by the engine.
	pub fee_amount: U256,
	/// Amount actually delegated to the venue.
	pub traded_amount: U256,
	/// Amount the venue delivered to the destination address.
	pub dest_amount: U256,
	/// The nonce committed for (owner, pair).
	pub nonce: Nonce,
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::address;

	fn sample() -> Order {
		Order {
			owner: address!("0101010101010101010101010101010101010101"),
			nonce: Nonce::at_time(address!("0202020202020202020202020202020202020202"), 1_700_000_000_000),
			src_token: address!("0303030303030303030303030303030303030303"),
			src_amount: U256::from(100u64),
			dest_token: crate::constants::ETH_TOKEN_ADDRESS,
			dest_address: address!("0101010101010101010101010101010101010101"),
			min_conversion_rate: U256::ZERO,
			fee_in_precision: U256::from(10_000u64),
		}
	}

	#[test]
	fn test_message_hash_length_and_determinism() {
		let order = sample();
		assert_eq!(order.message_hash(), order.message_hash());
	}

	#[test]
	fn test_message_hash_is_sensitive_to_every_field() {
		let base = sample().message_hash();
		let mut mutations: Vec<Order> = Vec::new();

		let mut o = sample();
		o.owner = address!("0909090909090909090909090909090909090909");
		mutations.push(o);

		let mut o = sample();
		o.nonce = Nonce::from(o.nonce.value() + U256::from(1u64));
		mutations.push(o);

		let mut o = sample();
		o.src_token = address!("0909090909090909090909090909090909090909");
		mutations.push(o);

		let mut o = sample();
		o.src_amount += U256::from(1u64);
		mutations.push(o);

		let mut o = sample();
		o.dest_token = address!("0909090909090909090909090909090909090909");
		mutations.push(o);

		let mut o = sample();
		o.dest_address = address!("0909090909090909090909090909090909090909");
		mutations.push(o);

		let mut o = sample();
		o.min_conversion_rate = U256::from(1u64);
		mutations.push(o);

		let mut o = sample();
		o.fee_in_precision = U256::ZERO;
		mutations.push(o);

		for mutated in mutations {
			assert_ne!(mutated.message_hash(), base, "mutation did not change the hash");
		}
	}

	#[test]
	fn test_packed_preimage_layout() {
		// 4 addresses (20 bytes) + 4 uint256 (32 bytes) = 208 bytes packed.
		let order = sample();
		let preimage = (
			order.owner,
			order.nonce.value(),
			order.src_token,
			order.src_amount,
			order.dest_token,
			order.dest_address,
			order.min_conversion_rate,
			order.fee_in_precision,
		)
			.abi_encode_packed();
		assert_eq!(preimage.len(), 4 * 20 + 4 * 32);
		assert_eq!(&preimage[..20], order.owner.as_slice());
	}
}
