//! Protocol constants.

use alloy_primitives::{address, Address, U256};

/// Fixed-point denominator for fee rates: 100 * 10^4.
///
/// A `fee_in_precision` of `MAX_FEE_PRECISION` is a 100% fee; 10_000 is 1%.
pub const MAX_FEE_PRECISION: U256 = U256::from_limbs([1_000_000, 0, 0, 0]);

/// Fixed-point denominator for conversion rates (10^18).
pub const RATE_PRECISION: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// Conventional sentinel address for ether, usable as a destination token.
pub const ETH_TOKEN_ADDRESS: Address = address!("eeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeeee");

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fee_precision_value() {
		assert_eq!(MAX_FEE_PRECISION, U256::from(1_000_000u64));
		assert_eq!(RATE_PRECISION, U256::from(10u64).pow(U256::from(18u64)));
	}
}
