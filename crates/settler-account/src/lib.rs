//! Signature verification and local order signing.
//!
//! Orders are signed over the EIP-191 prefixed message hash with a plain
//! secp256k1 key. Verification is failure-tolerant by contract: malformed
//! input yields `false`, never a panic or an error, so the executor can
//! branch on the result.

use alloy_primitives::{eip191_hash_message, Address, Signature, B256, U256};
use settler_types::OrderSignature;

pub mod signer;

pub use signer::{AccountError, LocalSigner};

/// Recovers the signer of `msg_hash` from a detached (v, r, s) signature.
///
/// The signature is expected over the EIP-191 prefixed hash; the prefix is
/// applied here. Returns `None` for a non-canonical `v` (only 27 and 28 are
/// accepted) or any signature that fails recovery.
pub fn recover_signer(msg_hash: B256, signature: &OrderSignature) -> Option<Address> {
	if signature.v != 27 && signature.v != 28 {
		return None;
	}
	let sig = Signature::new(
		U256::from_be_bytes(*signature.r),
		U256::from_be_bytes(*signature.s),
		signature.v == 28,
	);
	let digest = eip191_hash_message(msg_hash);
	sig.recover_address_from_prehash(&digest).ok()
}

/// True iff the signature over `msg_hash` recovers exactly to
/// `expected_signer`.
///
/// A signature over any altered message recovers to a different (garbage)
/// address and therefore fails the comparison; this is the primary defense
/// against tampering with any single order field.
pub fn verify_signature(msg_hash: B256, signature: &OrderSignature, expected_signer: Address) -> bool {
	recover_signer(msg_hash, signature).is_some_and(|signer| signer == expected_signer)
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy_primitives::{address, U256};
	use settler_types::{Nonce, Order};

	fn sample_order(owner: Address, domain: Address) -> Order {
		Order {
			owner,
			nonce: Nonce::at_time(domain, 1_700_000_000_000),
			src_token: address!("0303030303030303030303030303030303030303"),
			src_amount: U256::from(100_000u64),
			dest_token: settler_types::ETH_TOKEN_ADDRESS,
			dest_address: owner,
			min_conversion_rate: U256::ZERO,
			fee_in_precision: U256::from(10_000u64),
		}
	}

	#[test]
	fn test_signature_roundtrip() {
		let signer = LocalSigner::random();
		let domain = address!("0202020202020202020202020202020202020202");
		let order = sample_order(signer.address(), domain);

		let sig = signer.sign_order(&order).unwrap();
		assert!(sig.v == 27 || sig.v == 28);
		assert!(verify_signature(order.message_hash(), &sig, signer.address()));
		assert_eq!(recover_signer(order.message_hash(), &sig), Some(signer.address()));
	}

	#[test]
	fn test_rejects_non_canonical_v() {
		let signer = LocalSigner::random();
		let domain = address!("0202020202020202020202020202020202020202");
		let order = sample_order(signer.address(), domain);
		let sig = signer.sign_order(&order).unwrap();

		for bad_v in [0u8, 1, 26, 29, 255] {
			let mut tampered = sig;
			tampered.v = bad_v;
			assert!(!verify_signature(order.message_hash(), &tampered, signer.address()));
		}
	}

	#[test]
	fn test_rejects_tampered_components() {
		let signer = LocalSigner::random();
		let other = LocalSigner::random();
		let domain = address!("0202020202020202020202020202020202020202");
		let order = sample_order(signer.address(), domain);

		let sig = signer.sign_order(&order).unwrap();
		let foreign = other.sign_order(&sample_order(other.address(), domain)).unwrap();

		// Wrong message: signature over a different order.
		let mut altered = order.clone();
		altered.src_amount += U256::from(1u64);
		assert!(!verify_signature(altered.message_hash(), &sig, signer.address()));

		// Wrong r / wrong s / wrong expected signer.
		let mut tampered = sig;
		tampered.r = foreign.r;
		assert!(!verify_signature(order.message_hash(), &tampered, signer.address()));

		let mut tampered = sig;
		tampered.s = foreign.s;
		assert!(!verify_signature(order.message_hash(), &tampered, signer.address()));

		assert!(!verify_signature(order.message_hash(), &sig, other.address()));
	}

	#[test]
	fn test_flipped_v_recovers_different_address() {
		let signer = LocalSigner::random();
		let domain = address!("0202020202020202020202020202020202020202");
		let order = sample_order(signer.address(), domain);

		let mut sig = signer.sign_order(&order).unwrap();
		sig.v = if sig.v == 27 { 28 } else { 27 };
		assert!(!verify_signature(order.message_hash(), &sig, signer.address()));
	}
}
