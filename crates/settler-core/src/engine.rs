//! The order executor and its registries.
//!
//! A [`SettlementEngine`] owns the nonce watermarks, the token allow-list,
//! the operator set and the trade switch, and drives the
//! validate → authorize → deduct fee → pull funds → delegate trade →
//! commit nonce transition as a single all-or-nothing call.

use crate::access::Role;
use crate::fee::deduct_fee;
use crate::ledger::{CheckpointId, TokenLedger};
use crate::venue::{TradeParams, Venue};
use dashmap::DashSet;
use settler_storage::NonceStore;
use settler_types::{
	Address, ExecutionReceipt, Nonce, Order, OrderSignature, Result, SettlementError,
	TokenPairKey, U256, ETH_TOKEN_ADDRESS,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Identity and role configuration for a [`SettlementEngine`].
#[derive(Debug, Clone)]
pub struct EngineParams {
	/// The engine's own address: nonce domain tag and custody account for
	/// pulled funds.
	pub address: Address,
	/// The singular admin.
	pub admin: Address,
	/// The venue's ledger account, granted max allowance per listed token.
	pub venue_address: Address,
}

/// The settlement engine.
///
/// All mutation of the registries goes through [`Self::execute_limit_order`]
/// and [`Self::invalidate_old_orders`]; both pass through a single
/// execution gate so a reentrant call fails instead of observing
/// half-applied state.
pub struct SettlementEngine {
	address: Address,
	admin: Address,
	venue_address: Address,
	venue: Arc<dyn Venue>,
	ledger: Arc<dyn TokenLedger>,
	nonces: Arc<dyn NonceStore>,
	operators: DashSet<Address>,
	listed_tokens: DashSet<Address>,
	trade_enabled: AtomicBool,
	execution_gate: Mutex<()>,
}

impl SettlementEngine {
	/// Builds an engine. Fails if any configured address is zero.
	pub fn new(
		params: EngineParams,
		venue: Arc<dyn Venue>,
		ledger: Arc<dyn TokenLedger>,
		nonces: Arc<dyn NonceStore>,
	) -> Result<Self> {
		if params.address.is_zero() {
			return Err(SettlementError::ZeroAddress("engine address"));
		}
		if params.admin.is_zero() {
			return Err(SettlementError::ZeroAddress("admin"));
		}
		if params.venue_address.is_zero() {
			return Err(SettlementError::ZeroAddress("venue address"));
		}

		Ok(Self {
			address: params.address,
			admin: params.admin,
			venue_address: params.venue_address,
			venue,
			ledger,
			nonces,
			operators: DashSet::new(),
			listed_tokens: DashSet::new(),
			trade_enabled: AtomicBool::new(false),
			execution_gate: Mutex::new(()),
		})
	}

	pub fn address(&self) -> Address {
		self.address
	}

	pub fn admin(&self) -> Address {
		self.admin
	}

	pub fn venue_address(&self) -> Address {
		self.venue_address
	}

	// ---- Access control -------------------------------------------------

	/// The capability `caller` holds.
	pub fn role_of(&self, caller: Address) -> Role {
		if caller == self.admin {
			Role::Admin
		} else if self.operators.contains(&caller) {
			Role::Operator
		} else {
			Role::None
		}
	}

	fn require_admin(&self, caller: Address) -> Result<()> {
		if caller == self.admin {
			Ok(())
		} else {
			Err(SettlementError::NotAdmin(caller))
		}
	}

	// Membership is checked directly rather than through `role_of`: an
	// address can hold both roles, and the admin summary must not mask the
	// operator grant.
	fn require_operator(&self, caller: Address) -> Result<()> {
		if self.operators.contains(&caller) {
			Ok(())
		} else {
			Err(SettlementError::NotOperator(caller))
		}
	}

	/// Grants the operator role. Admin only; fails on a duplicate grant.
	pub fn add_operator(&self, caller: Address, operator: Address) -> Result<()> {
		self.require_admin(caller)?;
		if operator.is_zero() {
			return Err(SettlementError::ZeroAddress("operator"));
		}
		if !self.operators.insert(operator) {
			return Err(SettlementError::OperatorExists(operator));
		}
		info!(%operator, "operator added");
		Ok(())
	}

	pub fn is_operator(&self, address: Address) -> bool {
		self.operators.contains(&address)
	}

	// ---- Token listing and the trade switch -----------------------------

	/// Lists a token for settlement and grants the venue max allowance over
	/// the engine's balance of it. Admin only.
	pub async fn list_token(&self, caller: Address, token: Address) -> Result<()> {
		self.require_admin(caller)?;
		if token.is_zero() {
			return Err(SettlementError::ZeroAddress("token"));
		}
		if token == ETH_TOKEN_ADDRESS {
			return Err(SettlementError::EtherSource);
		}

		self.ledger
			.approve(token, self.address, self.venue_address, U256::MAX)
			.await;
		self.listed_tokens.insert(token);
		info!(%token, "token listed");
		Ok(())
	}

	pub fn is_listed(&self, token: Address) -> bool {
		self.listed_tokens.contains(&token)
	}

	pub fn enable_trade(&self, caller: Address) -> Result<()> {
		self.require_admin(caller)?;
		self.trade_enabled.store(true, Ordering::SeqCst);
		info!("trading enabled");
		Ok(())
	}

	pub fn disable_trade(&self, caller: Address) -> Result<()> {
		self.require_admin(caller)?;
		self.trade_enabled.store(false, Ordering::SeqCst);
		info!("trading disabled");
		Ok(())
	}

	pub fn trade_enabled(&self) -> bool {
		self.trade_enabled.load(Ordering::SeqCst)
	}

	// ---- Nonce registry --------------------------------------------------

	/// Whether the nonce carries this engine's domain tag. A foreign tag is
	/// rejected everywhere: execution, invalidation and the validity check.
	pub fn valid_address_in_nonce(&self, nonce: Nonce) -> bool {
		nonce.matches_domain(self.address)
	}

	/// The stored watermark for (owner, pair); zero if never touched.
	pub async fn stored_nonce(&self, owner: Address, pair: TokenPairKey) -> Result<U256> {
		self.nonces
			.get(owner, pair)
			.await
			.map_err(|e| SettlementError::Storage(e.to_string()))
	}

	/// Whether `nonce` would be accepted for (owner, pair) right now:
	/// correctly tagged and strictly greater than the stored watermark.
	pub async fn is_valid_nonce(
		&self,
		owner: Address,
		pair: TokenPairKey,
		nonce: Nonce,
	) -> Result<bool> {
		if !self.valid_address_in_nonce(nonce) {
			return Ok(false);
		}
		let stored = self.stored_nonce(owner, pair).await?;
		Ok(nonce.value() > stored)
	}

	/// Advances the caller's own watermark for `pair` to `nonce`,
	/// cancelling every previously signed order with a nonce at or below
	/// it. This is unilateral cancellation: no signature needed, and the
	/// key is always the caller's — nobody can invalidate for somebody
	/// else.
	pub async fn invalidate_old_orders(
		&self,
		caller: Address,
		pair: TokenPairKey,
		nonce: Nonce,
	) -> Result<()> {
		let _gate = self
			.execution_gate
			.try_lock()
			.map_err(|_| SettlementError::Reentrancy)?;

		if !self.valid_address_in_nonce(nonce) {
			return Err(SettlementError::WrongDomainTag);
		}
		let stored = self.stored_nonce(caller, pair).await?;
		if nonce.value() <= stored {
			return Err(SettlementError::StaleNonce {
				nonce: nonce.value(),
				stored,
			});
		}

		self.nonces
			.set(caller, pair, nonce.value())
			.await
			.map_err(|e| SettlementError::Storage(e.to_string()))?;
		info!(owner = %caller, %pair, %nonce, "orders invalidated up to nonce");
		Ok(())
	}

	// ---- Execution -------------------------------------------------------

	/// Executes a pre-signed limit order. Operator only.
	///
	/// Any failure before the final nonce commit rolls everything back: no
	/// funds move and the watermark stays put, which is what makes a
	/// slippage failure retryable with the very same signature.
	pub async fn execute_limit_order(
		&self,
		caller: Address,
		order: &Order,
		signature: &OrderSignature,
	) -> Result<ExecutionReceipt> {
		let _gate = self
			.execution_gate
			.try_lock()
			.map_err(|_| SettlementError::Reentrancy)?;

		// Validate.
		self.require_operator(caller)?;
		if !self.trade_enabled() {
			return Err(SettlementError::TradeDisabled);
		}
		if order.src_token == ETH_TOKEN_ADDRESS {
			return Err(SettlementError::EtherSource);
		}
		if !self.is_listed(order.src_token) {
			return Err(SettlementError::TokenNotListed(order.src_token));
		}
		if !self.valid_address_in_nonce(order.nonce) {
			return Err(SettlementError::WrongDomainTag);
		}
		let pair = order.pair_key();
		let stored = self.stored_nonce(order.owner, pair).await?;
		if order.nonce.value() <= stored {
			return Err(SettlementError::StaleNonce {
				nonce: order.nonce.value(),
				stored,
			});
		}

		// Authorize: the signature must recover to the owner over the
		// exact field tuple.
		if !settler_account::verify_signature(order.message_hash(), signature, order.owner) {
			return Err(SettlementError::BadSignature {
				expected: order.owner,
			});
		}

		// Deduct fee.
		let (traded_amount, fee_amount) = deduct_fee(order.src_amount, order.fee_in_precision)?;
		debug!(
			owner = %order.owner,
			nonce = %order.nonce,
			src = %order.src_token,
			amount = %order.src_amount,
			fee = %fee_amount,
			"executing limit order"
		);

		// Pull funds, then trade, inside a ledger checkpoint. Funds come
		// out of the owner's balance via allowance; the engine's own
		// balance is never a funding source.
		let checkpoint = self.ledger.checkpoint().await;

		if let Err(e) = self
			.ledger
			.transfer_from(
				order.src_token,
				self.address,
				order.owner,
				self.address,
				order.src_amount,
			)
			.await
		{
			self.abort(checkpoint, "fund pull").await;
			return Err(e.into());
		}

		// Delegate trade. The venue enforces the rate floor; a worse rate
		// fails here with the nonce untouched.
		let dest_amount = match self
			.venue
			.trade(TradeParams {
				taker: self.address,
				src_token: order.src_token,
				src_amount: traded_amount,
				dest_token: order.dest_token,
				dest_address: order.dest_address,
				max_dest_amount: U256::MAX,
				min_conversion_rate: order.min_conversion_rate,
				wallet_id: Address::ZERO,
				hint: Vec::new(),
			})
			.await
		{
			Ok(amount) => amount,
			Err(e) => {
				self.abort(checkpoint, "venue trade").await;
				return Err(e.into());
			}
		};

		// Commit nonce. Only now does the order become unreplayable.
		if let Err(e) = self.nonces.set(order.owner, pair, order.nonce.value()).await {
			self.abort(checkpoint, "nonce commit").await;
			return Err(SettlementError::Storage(e.to_string()));
		}
		self.ledger.commit(checkpoint).await;

		info!(
			owner = %order.owner,
			nonce = %order.nonce,
			traded = %traded_amount,
			delivered = %dest_amount,
			"limit order settled"
		);
		Ok(ExecutionReceipt {
			src_amount: order.src_amount,
			fee_amount,
			traded_amount,
			dest_amount,
			nonce: order.nonce,
		})
	}

	/// Rolls the ledger back to `checkpoint`, logging the failed stage.
	async fn abort(&self, checkpoint: CheckpointId, stage: &str) {
		warn!(stage, "execution aborted, rolling back");
		if let Err(e) = self.ledger.rollback(checkpoint).await {
			// A checkpoint we just created cannot be missing; reaching this
			// indicates a broken ledger implementation.
			error!(stage, "ledger rollback failed: {e}");
		}
	}
}
