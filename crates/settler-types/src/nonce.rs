//! Replay-protection keying: time-derived nonces and token-pair keys.
//!
//! A nonce is a 256-bit watermark, not a counter: the upper 16 bytes are a
//! domain tag (the first 16 bytes of the settlement engine's own address)
//! and the lower 16 bytes are a big-endian millisecond timestamp. The
//! registry accepts a nonce only if its tag matches the engine and it is
//! strictly greater than the stored watermark for the (owner, pair) key.

use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width of the domain-tag / timestamp halves of a nonce, in bytes.
const HALF: usize = 16;

/// A 256-bit order nonce combining a domain tag with a timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Nonce(U256);

impl Nonce {
	/// Derives the nonce for `domain` at the given unix millisecond
	/// timestamp.
	///
	/// Two nonces derived within the same millisecond for the same key are
	/// identical; callers producing more than one order per key must use
	/// strictly increasing timestamps. The registry's strict greater-than
	/// check makes a collision fail on submission rather than double-execute.
	pub fn at_time(domain: Address, timestamp_ms: u64) -> Self {
		let mut bytes = [0u8; 32];
		bytes[..HALF].copy_from_slice(&domain.as_slice()[..HALF]);
		bytes[HALF..].copy_from_slice(&u128::from(timestamp_ms).to_be_bytes());
		Self(U256::from_be_bytes(bytes))
	}

	/// Derives a nonce for `domain` from the current wall clock.
	pub fn now(domain: Address) -> Self {
		Self::at_time(domain, chrono::Utc::now().timestamp_millis() as u64)
	}

	/// The first 16 bytes of the nonce: the domain tag.
	pub fn domain_tag(&self) -> [u8; HALF] {
		let bytes = self.0.to_be_bytes::<32>();
		let mut tag = [0u8; HALF];
		tag.copy_from_slice(&bytes[..HALF]);
		tag
	}

	/// Whether the domain tag matches the first 16 bytes of `domain`.
	pub fn matches_domain(&self, domain: Address) -> bool {
		self.domain_tag() == domain.as_slice()[..HALF]
	}

	/// The timestamp half of the nonce, in unix milliseconds.
	pub fn timestamp_ms(&self) -> u128 {
		let bytes = self.0.to_be_bytes::<32>();
		let mut ts = [0u8; HALF];
		ts.copy_from_slice(&bytes[HALF..]);
		u128::from_be_bytes(ts)
	}

	/// The raw 256-bit value.
	pub fn value(&self) -> U256 {
		self.0
	}
}

impl From<U256> for Nonce {
	fn from(value: U256) -> Self {
		Self(value)
	}
}

impl From<Nonce> for U256 {
	fn from(nonce: Nonce) -> Self {
		nonce.0
	}
}

impl fmt::Display for Nonce {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#066x}", self.0)
	}
}

/// Identifies a (src_token, dest_token) pair for nonce namespacing: the
/// first 16 bytes of each address, concatenated into a single 256-bit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenPairKey(U256);

impl TokenPairKey {
	pub fn new(src_token: Address, dest_token: Address) -> Self {
		let mut bytes = [0u8; 32];
		bytes[..HALF].copy_from_slice(&src_token.as_slice()[..HALF]);
		bytes[HALF..].copy_from_slice(&dest_token.as_slice()[..HALF]);
		Self(U256::from_be_bytes(bytes))
	}

	pub fn value(&self) -> U256 {
		self.0
	}
}

impl From<U256> for TokenPairKey {
	fn from(value: U256) -> Self {
		Self(value)
	}
}

impl fmt::Display for TokenPairKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:#066x}", self.0)
	}
}
