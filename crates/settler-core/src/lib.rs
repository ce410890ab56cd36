//! The limit-order settlement engine.
//!
//! Orchestrates verification, nonce accounting, fee deduction, fund pulls
//! and delegated trades as a single all-or-nothing transition. The external
//! collaborators — the token transfer/allowance mechanism and the trading
//! venue — live behind the [`TokenLedger`] and [`Venue`] traits; in-memory
//! implementations for tests and simulation ship under
//! [`implementations`].

pub mod access;
pub mod engine;
pub mod fee;
pub mod ledger;
pub mod venue;

/// Re-export implementations
pub mod implementations {
	pub mod fixed_rate;
	pub mod memory;
}

pub use access::Role;
pub use engine::{EngineParams, SettlementEngine};
pub use fee::deduct_fee;
pub use implementations::fixed_rate::FixedRateVenue;
pub use implementations::memory::MemoryLedger;
pub use ledger::{CheckpointId, TokenLedger};
pub use venue::{TradeParams, Venue};

// The signature verifier is part of the engine's public surface.
pub use settler_account::{recover_signer, verify_signature};
