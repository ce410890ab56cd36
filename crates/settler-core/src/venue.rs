//! The liquidity venue collaborator.

use async_trait::async_trait;
use settler_types::{Address, U256, VenueError};

/// Parameters for a delegated trade, mirroring the `tradeWithHint` shape of
/// the consumed venue interface.
#[derive(Debug, Clone)]
pub struct TradeParams {
	/// Account the venue pulls the source tokens from (the engine).
	pub taker: Address,
	pub src_token: Address,
	pub src_amount: U256,
	pub dest_token: Address,
	/// Recipient of the proceeds.
	pub dest_address: Address,
	/// Upper bound on the delivered amount.
	pub max_dest_amount: U256,
	/// Rate floor the venue must enforce, in `RATE_PRECISION` fixed point.
	pub min_conversion_rate: U256,
	/// Fee-sharing wallet; unused by the shipped venue.
	pub wallet_id: Address,
	/// Routing hint; unused by the shipped venue.
	pub hint: Vec<u8>,
}

/// The external trading venue the engine delegates swaps to.
#[async_trait]
pub trait Venue: Send + Sync {
	/// Quotes the currently achievable rate for the pair.
	async fn expected_rate(
		&self,
		src_token: Address,
		dest_token: Address,
		src_amount: U256,
	) -> Result<U256, VenueError>;

	/// Executes the trade and returns the amount delivered to
	/// `dest_address`.
	///
	/// Must fail when the achievable rate is below
	/// `min_conversion_rate` (slippage protection) and on zero-amount
	/// trades; failure must leave no partial effect behind.
	async fn trade(&self, params: TradeParams) -> Result<U256, VenueError>;
}
