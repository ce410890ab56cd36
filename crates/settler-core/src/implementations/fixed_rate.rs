//! Fixed-rate trading venue.
//!
//! Pays out of its own token inventory at admin-set pair rates. Intended
//! for tests and the simulator; a deployment would implement [`Venue`]
//! against the real liquidity network.

use crate::ledger::TokenLedger;
use crate::venue::{TradeParams, Venue};
use async_trait::async_trait;
use settler_types::{Address, U256, VenueError, RATE_PRECISION};
use std::sync::Arc;
use tracing::debug;

/// [`Venue`] implementation with settable per-pair conversion rates.
pub struct FixedRateVenue {
	/// The venue's own account on the ledger: source tokens are pulled in
	/// here, proceeds are paid out of its inventory.
	account: Address,
	ledger: Arc<dyn TokenLedger>,
	/// (src, dest) -> rate in `RATE_PRECISION` fixed point.
	rates: dashmap::DashMap<(Address, Address), U256>,
}

impl FixedRateVenue {
	pub fn new(account: Address, ledger: Arc<dyn TokenLedger>) -> Self {
		Self {
			account,
			ledger,
			rates: dashmap::DashMap::new(),
		}
	}

	/// The venue's ledger account.
	pub fn account(&self) -> Address {
		self.account
	}

	/// Sets the conversion rate for a pair.
	pub fn set_pair_rate(&self, src_token: Address, dest_token: Address, rate: U256) {
		self.rates.insert((src_token, dest_token), rate);
	}
}

#[async_trait]
impl Venue for FixedRateVenue {
	async fn expected_rate(
		&self,
		src_token: Address,
		dest_token: Address,
		_src_amount: U256,
	) -> Result<U256, VenueError> {
		self.rates
			.get(&(src_token, dest_token))
			.map(|rate| *rate)
			.ok_or(VenueError::NoRate)
	}

	async fn trade(&self, params: TradeParams) -> Result<U256, VenueError> {
		if params.src_amount.is_zero() {
			return Err(VenueError::ZeroAmount);
		}

		let rate = self
			.expected_rate(params.src_token, params.dest_token, params.src_amount)
			.await?;
		if rate < params.min_conversion_rate {
			return Err(VenueError::RateBelowMinimum {
				achieved: rate,
				minimum: params.min_conversion_rate,
			});
		}

		let dest_amount = params
			.src_amount
			.checked_mul(rate)
			.ok_or(VenueError::Overflow)?
			/ RATE_PRECISION;
		if dest_amount > params.max_dest_amount {
			return Err(VenueError::MaxDestAmountExceeded(dest_amount));
		}

		// Pull the source tokens from the taker via its allowance, then pay
		// the proceeds out of inventory.
		self.ledger
			.transfer_from(
				params.src_token,
				self.account,
				params.taker,
				self.account,
				params.src_amount,
			)
			.await?;
		self.ledger
			.transfer(params.dest_token, self.account, params.dest_address, dest_amount)
			.await?;

		debug!(
			src = %params.src_token,
			dest = %params.dest_token,
			amount = %params.src_amount,
			delivered = %dest_amount,
			"venue trade filled"
		);
		Ok(dest_amount)
	}
}
