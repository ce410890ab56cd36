//! Core types for the limit-order settlement engine.
//!
//! This crate defines the order model, the time-derived nonce and token-pair
//! keying used for replay protection, the packed message hashing that orders
//! are signed over, and the central error taxonomy shared by every other
//! crate in the workspace.

pub mod constants;
pub mod errors;
pub mod nonce;
pub mod order;

pub use constants::{ETH_TOKEN_ADDRESS, MAX_FEE_PRECISION, RATE_PRECISION};
pub use errors::{FailureKind, LedgerError, Result, SettlementError, VenueError};
pub use nonce::{Nonce, TokenPairKey};
pub use order::{ExecutionReceipt, Order, OrderSignature};

// Re-export the ethereum primitives used throughout the workspace.
pub use alloy_primitives::{keccak256, Address, B256, U256};
