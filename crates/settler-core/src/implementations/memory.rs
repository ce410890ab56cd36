//! In-memory token ledger.
//!
//! Models balances and allowances for any token address, including the
//! ether sentinel, with whole-state checkpoints for rollback. Intended for
//! tests and the simulator; a deployment would implement [`TokenLedger`]
//! over the real asset substrate.

use crate::ledger::{CheckpointId, TokenLedger};
use async_trait::async_trait;
use settler_types::{Address, LedgerError, U256};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default)]
struct LedgerState {
	/// (token, holder) -> balance
	balances: HashMap<(Address, Address), U256>,
	/// (token, owner, spender) -> allowance
	allowances: HashMap<(Address, Address, Address), U256>,
}

impl LedgerState {
	fn debit(&mut self, token: Address, holder: Address, amount: U256) -> Result<(), LedgerError> {
		let balance = self.balances.entry((token, holder)).or_default();
		if *balance < amount {
			return Err(LedgerError::InsufficientBalance {
				needed: amount,
				available: *balance,
			});
		}
		*balance -= amount;
		Ok(())
	}

	fn credit(&mut self, token: Address, holder: Address, amount: U256) {
		*self.balances.entry((token, holder)).or_default() += amount;
	}
}

/// Volatile [`TokenLedger`] implementation.
pub struct MemoryLedger {
	state: Mutex<LedgerState>,
	checkpoints: Mutex<HashMap<CheckpointId, LedgerState>>,
	next_checkpoint: AtomicU64,
}

impl MemoryLedger {
	pub fn new() -> Self {
		Self {
			state: Mutex::new(LedgerState::default()),
			checkpoints: Mutex::new(HashMap::new()),
			next_checkpoint: AtomicU64::new(1),
		}
	}

	/// Credits a balance out of thin air. Test and simulation setup only.
	pub async fn mint(&self, token: Address, to: Address, amount: U256) {
		self.state.lock().await.credit(token, to, amount);
	}
}

impl Default for MemoryLedger {
	fn default() -> Self {
		Self::new()
	}
}

#[async_trait]
impl TokenLedger for MemoryLedger {
	async fn balance_of(&self, token: Address, holder: Address) -> U256 {
		self.state
			.lock()
			.await
			.balances
			.get(&(token, holder))
			.copied()
			.unwrap_or(U256::ZERO)
	}

	async fn allowance(&self, token: Address, owner: Address, spender: Address) -> U256 {
		self.state
			.lock()
			.await
			.allowances
			.get(&(token, owner, spender))
			.copied()
			.unwrap_or(U256::ZERO)
	}

	async fn approve(&self, token: Address, owner: Address, spender: Address, amount: U256) {
		self.state
			.lock()
			.await
			.allowances
			.insert((token, owner, spender), amount);
	}

	async fn transfer(
		&self,
		token: Address,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), LedgerError> {
		let mut state = self.state.lock().await;
		state.debit(token, from, amount)?;
		state.credit(token, to, amount);
		Ok(())
	}

	async fn transfer_from(
		&self,
		token: Address,
		spender: Address,
		from: Address,
		to: Address,
		amount: U256,
	) -> Result<(), LedgerError> {
		let mut state = self.state.lock().await;

		let allowance = state
			.allowances
			.get(&(token, from, spender))
			.copied()
			.unwrap_or(U256::ZERO);
		if allowance < amount {
			return Err(LedgerError::InsufficientAllowance {
				needed: amount,
				available: allowance,
			});
		}

		state.debit(token, from, amount)?;
		state.credit(token, to, amount);

		// The conventional infinite allowance is never drawn down.
		if allowance != U256::MAX {
			state.allowances.insert((token, from, spender), allowance - amount);
		}
		Ok(())
	}

	async fn checkpoint(&self) -> CheckpointId {
		let snapshot = self.state.lock().await.clone();
		let id = self.next_checkpoint.fetch_add(1, Ordering::SeqCst);
		self.checkpoints.lock().await.insert(id, snapshot);
		id
	}

	async fn rollback(&self, checkpoint: CheckpointId) -> Result<(), LedgerError> {
		let snapshot = self
			.checkpoints
			.lock()
			.await
			.remove(&checkpoint)
			.ok_or(LedgerError::UnknownCheckpoint(checkpoint))?;
		*self.state.lock().await = snapshot;
		Ok(())
	}

	async fn commit(&self, checkpoint: CheckpointId) {
		self.checkpoints.lock().await.remove(&checkpoint);
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const TOKEN: Address = Address::repeat_byte(0x0a);
	const ALICE: Address = Address::repeat_byte(0x01);
	const BOB: Address = Address::repeat_byte(0x02);
	const SPENDER: Address = Address::repeat_byte(0x03);

	#[tokio::test]
	async fn test_transfer_requires_balance() {
		let ledger = MemoryLedger::new();
		ledger.mint(TOKEN, ALICE, U256::from(10u64)).await;

		let err = ledger
			.transfer(TOKEN, ALICE, BOB, U256::from(11u64))
			.await
			.unwrap_err();
		assert!(matches!(err, LedgerError::InsufficientBalance { .. }));
		// No partial effect.
		assert_eq!(ledger.balance_of(TOKEN, ALICE).await, U256::from(10u64));
		assert_eq!(ledger.balance_of(TOKEN, BOB).await, U256::ZERO);

		ledger.transfer(TOKEN, ALICE, BOB, U256::from(4u64)).await.unwrap();
		assert_eq!(ledger.balance_of(TOKEN, ALICE).await, U256::from(6u64));
		assert_eq!(ledger.balance_of(TOKEN, BOB).await, U256::from(4u64));
	}

	#[tokio::test]
	async fn test_transfer_from_spends_allowance() {
		let ledger = MemoryLedger::new();
		ledger.mint(TOKEN, ALICE, U256::from(10u64)).await;

		// Zero allowance: rejected.
		let err = ledger
			.transfer_from(TOKEN, SPENDER, ALICE, BOB, U256::from(1u64))
			.await
			.unwrap_err();
		assert!(matches!(err, LedgerError::InsufficientAllowance { .. }));

		ledger.approve(TOKEN, ALICE, SPENDER, U256::from(5u64)).await;
		ledger
			.transfer_from(TOKEN, SPENDER, ALICE, BOB, U256::from(3u64))
			.await
			.unwrap();
		assert_eq!(ledger.allowance(TOKEN, ALICE, SPENDER).await, U256::from(2u64));

		// Infinite allowance is not drawn down.
		ledger.approve(TOKEN, ALICE, SPENDER, U256::MAX).await;
		ledger
			.transfer_from(TOKEN, SPENDER, ALICE, BOB, U256::from(1u64))
			.await
			.unwrap();
		assert_eq!(ledger.allowance(TOKEN, ALICE, SPENDER).await, U256::MAX);
	}

	#[tokio::test]
	async fn test_checkpoint_rollback_restores_state() {
		let ledger = MemoryLedger::new();
		ledger.mint(TOKEN, ALICE, U256::from(10u64)).await;

		let checkpoint = ledger.checkpoint().await;
		ledger.transfer(TOKEN, ALICE, BOB, U256::from(10u64)).await.unwrap();
		assert_eq!(ledger.balance_of(TOKEN, ALICE).await, U256::ZERO);

		ledger.rollback(checkpoint).await.unwrap();
		assert_eq!(ledger.balance_of(TOKEN, ALICE).await, U256::from(10u64));
		assert_eq!(ledger.balance_of(TOKEN, BOB).await, U256::ZERO);

		// A released checkpoint cannot be used again.
		assert!(matches!(
			ledger.rollback(checkpoint).await.unwrap_err(),
			LedgerError::UnknownCheckpoint(_)
		));
	}

	#[tokio::test]
	async fn test_commit_releases_checkpoint() {
		let ledger = MemoryLedger::new();
		ledger.mint(TOKEN, ALICE, U256::from(10u64)).await;

		let checkpoint = ledger.checkpoint().await;
		ledger.transfer(TOKEN, ALICE, BOB, U256::from(1u64)).await.unwrap();
		ledger.commit(checkpoint).await;

		assert!(ledger.rollback(checkpoint).await.is_err());
		assert_eq!(ledger.balance_of(TOKEN, BOB).await, U256::from(1u64));
	}
}
