//! The token transfer/allowance collaborator.

use async_trait::async_trait;
use settler_types::{Address, LedgerError, U256};

/// Handle to a point-in-time snapshot of ledger state.
pub type CheckpointId = u64;

/// ERC20-shaped balance and allowance mechanics, plus explicit
/// transactional checkpoints.
///
/// The engine pulls funds, delegates a trade and only then commits; if
/// anything after the first transfer fails, it rolls the ledger back to the
/// checkpoint taken at the start of the mutation window. The checkpoint
/// methods stand in for the transaction rollback an on-chain substrate
/// would provide implicitly.
///
/// Transfers have reverting semantics: insufficient balance or allowance is
/// an error with no partial effect.
#[async_trait]
pub trait TokenLedger: Send + Sync {
	async fn balance_of(&self, token: Address, holder: Address) -> U256;

	async fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256;

	/// Sets `spender`'s allowance over `owner`'s balance of `token`.
	async fn approve(&self, token: Address, owner: Address, spender: Address, amount: U256);

	/// Moves `amount` of `token` from `from` to `to` out of `from`'s own
	/// balance.
	async fn transfer(
		&self,
		token: Address,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), LedgerError>;

	/// Moves `amount` of `token` from `from` to `to`, spending `spender`'s
	/// allowance.
	async fn transfer_from(
		&self,
		token: Address,
		spender: Address,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), LedgerError>;

	/// Captures the current state; pair with [`Self::rollback`] or
	/// [`Self::commit`].
	async fn checkpoint(&self) -> CheckpointId;

	/// Restores the state captured at `checkpoint` and releases it.
	async fn rollback(&self, checkpoint: CheckpointId) -> Result<(), LedgerError>;

	/// Releases `checkpoint` without restoring it.
	async fn commit(&self, checkpoint: CheckpointId);
}
