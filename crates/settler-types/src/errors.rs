//! Error taxonomy for the settlement engine.
//!
//! Every failure rolls the whole call back; the variants exist so callers
//! can tell apart failures that are retryable with the same signed order
//! (slippage, missing allowance) from those that never clear without a new
//! order or admin action.

use alloy_primitives::{Address, U256};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SettlementError>;

/// Errors surfaced by a token ledger.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
	#[error("insufficient balance: need {needed}, have {available}")]
	InsufficientBalance { needed: U256, available: U256 },

	#[error("insufficient allowance: need {needed}, have {available}")]
	InsufficientAllowance { needed: U256, available: U256 },

	#[error("unknown ledger checkpoint {0}")]
	UnknownCheckpoint(u64),
}

/// Errors surfaced by a trading venue.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum VenueError {
	#[error("no conversion rate available for the pair")]
	NoRate,

	#[error("achievable rate {achieved} is below the order minimum {minimum}")]
	RateBelowMinimum { achieved: U256, minimum: U256 },

	#[error("zero-amount trade rejected")]
	ZeroAmount,

	#[error("destination amount {0} exceeds the requested maximum")]
	MaxDestAmountExceeded(U256),

	#[error("arithmetic overflow computing the destination amount")]
	Overflow,

	#[error(transparent)]
	Ledger(#[from] LedgerError),
}

/// Broad failure classes, matching how a caller has to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
	/// Wrong signer, wrong caller role, or a reentrant call.
	Authorization,
	/// Nonce not strictly newer than the stored watermark, or foreign tag.
	Staleness,
	/// Funds, fees, rates: may clear when external conditions change.
	Economic,
	/// Requires admin action (listing, enabling) or a fixed configuration.
	Policy,
}

/// The central error type for every settlement operation.
#[derive(Debug, Error)]
pub enum SettlementError {
	// Authorization failures.
	#[error("caller {0} does not hold the operator role")]
	NotOperator(Address),

	#[error("caller {0} is not the admin")]
	NotAdmin(Address),

	#[error("signature does not recover to the order owner {expected}")]
	BadSignature { expected: Address },

	#[error("reentrant call rejected while an execution is in flight")]
	Reentrancy,

	// Staleness failures.
	#[error("nonce {nonce} is not strictly greater than the stored {stored}")]
	StaleNonce { nonce: U256, stored: U256 },

	#[error("nonce carries a foreign domain tag")]
	WrongDomainTag,

	// Economic failures.
	#[error("fee {fee} exceeds the maximum fee precision {max}")]
	FeeExceedsMax { fee: U256, max: U256 },

	#[error("arithmetic overflow in fee computation")]
	Overflow,

	#[error(transparent)]
	Ledger(#[from] LedgerError),

	#[error(transparent)]
	Venue(#[from] VenueError),

	#[error("nonce store: {0}")]
	Storage(String),

	// Policy failures.
	#[error("trading is disabled")]
	TradeDisabled,

	#[error("token {0} is not listed")]
	TokenNotListed(Address),

	#[error("{0} must not be the zero address")]
	ZeroAddress(&'static str),

	#[error("{0} already holds the operator role")]
	OperatorExists(Address),

	#[error("the ether sentinel cannot be used as a source token")]
	EtherSource,
}

impl SettlementError {
	/// The spec taxonomy class of this failure.
	pub fn kind(&self) -> FailureKind {
		match self {
			Self::NotOperator(_) | Self::NotAdmin(_) | Self::BadSignature { .. } | Self::Reentrancy => {
				FailureKind::Authorization
			}
			Self::StaleNonce { .. } | Self::WrongDomainTag => FailureKind::Staleness,
			Self::FeeExceedsMax { .. }
			| Self::Overflow
			| Self::Ledger(_)
			| Self::Venue(_)
			| Self::Storage(_) => FailureKind::Economic,
			Self::TradeDisabled
			| Self::TokenNotListed(_)
			| Self::ZeroAddress(_)
			| Self::OperatorExists(_)
			| Self::EtherSource => FailureKind::Policy,
		}
	}

	/// Whether resubmitting the same signed order can ever succeed.
	///
	/// Slippage and funding failures clear when rates or allowances move;
	/// an over-limit fee or a zero trade amount is signed into the order
	/// and never clears, and stale nonces only get staler.
	pub fn is_retryable(&self) -> bool {
		match self {
			Self::Ledger(_) | Self::Storage(_) => true,
			Self::Venue(venue) => !matches!(venue, VenueError::ZeroAmount),
			_ => false,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_retryability_distinction() {
		let slippage = SettlementError::Venue(VenueError::RateBelowMinimum {
			achieved: U256::from(1u64),
			minimum: U256::from(2u64),
		});
		assert!(slippage.is_retryable());
		assert_eq!(slippage.kind(), FailureKind::Economic);

		let allowance = SettlementError::Ledger(LedgerError::InsufficientAllowance {
			needed: U256::from(2u64),
			available: U256::ZERO,
		});
		assert!(allowance.is_retryable());

		let fee = SettlementError::FeeExceedsMax {
			fee: U256::from(2u64),
			max: U256::from(1u64),
		};
		assert!(!fee.is_retryable());
		assert_eq!(fee.kind(), FailureKind::Economic);

		let stale = SettlementError::StaleNonce {
			nonce: U256::ZERO,
			stored: U256::from(1u64),
		};
		assert!(!stale.is_retryable());
		assert_eq!(stale.kind(), FailureKind::Staleness);

		// A 100%-fee order trades zero and can never become valid.
		assert!(!SettlementError::Venue(VenueError::ZeroAmount).is_retryable());
	}
}
