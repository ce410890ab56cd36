//! One end-to-end settlement against in-memory collaborators.
//!
//! Builds an engine from the configuration, mints a throwaway owner a
//! balance, signs a 100-unit order and has the first configured operator
//! execute it. Exercises the whole validate → authorize → fee → pull →
//! trade → commit path without touching anything external.

use anyhow::{Context, Result};
use settler_account::LocalSigner;
use settler_config::{ConfigLoader, StorageBackend};
use settler_core::{EngineParams, FixedRateVenue, MemoryLedger, SettlementEngine, TokenLedger};
use settler_storage::{FileNonceStore, MemoryNonceStore, NonceStore};
use settler_types::{Nonce, Order, ETH_TOKEN_ADDRESS, RATE_PRECISION, U256};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub async fn run(config_path: PathBuf) -> Result<()> {
	let config =
		ConfigLoader::from_env_and_file(&config_path).context("Failed to load configuration")?;

	let src_token = *config
		.settlement
		.listed_tokens
		.first()
		.context("simulate needs at least one listed token")?;
	let operator = *config
		.settlement
		.operators
		.first()
		.context("simulate needs at least one operator")?;

	let ledger = Arc::new(MemoryLedger::new());
	let venue = Arc::new(FixedRateVenue::new(config.venue.address, ledger.clone()));
	let nonces: Arc<dyn NonceStore> = match config.storage.backend {
		StorageBackend::Memory => Arc::new(MemoryNonceStore::new()),
		StorageBackend::File => {
			let path = config.storage.path.clone().context("storage.path is required")?;
			Arc::new(FileNonceStore::new(path).await?)
		}
	};

	let engine = SettlementEngine::new(
		EngineParams {
			address: config.settlement.address,
			admin: config.settlement.admin,
			venue_address: config.venue.address,
		},
		venue.clone(),
		ledger.clone(),
		nonces,
	)?;

	let admin = config.settlement.admin;
	for op in &config.settlement.operators {
		engine.add_operator(admin, *op)?;
	}
	for token in &config.settlement.listed_tokens {
		engine.list_token(admin, *token).await?;
	}
	engine.enable_trade(admin)?;

	// A throwaway owner with funds and allowance, and venue inventory to
	// pay out of. Rate: 0.01 ether per token.
	let unit = U256::from(10u64).pow(U256::from(18u64));
	let rate = RATE_PRECISION / U256::from(100u64);
	let owner = LocalSigner::random();
	ledger.mint(src_token, owner.address(), unit * U256::from(1_000u64)).await;
	ledger
		.approve(src_token, owner.address(), config.settlement.address, U256::MAX)
		.await;
	ledger
		.mint(ETH_TOKEN_ADDRESS, config.venue.address, unit * U256::from(100u64))
		.await;
	venue.set_pair_rate(src_token, ETH_TOKEN_ADDRESS, rate);

	let order = Order {
		owner: owner.address(),
		nonce: Nonce::now(config.settlement.address),
		src_token,
		src_amount: unit * U256::from(100u64),
		dest_token: ETH_TOKEN_ADDRESS,
		dest_address: owner.address(),
		min_conversion_rate: rate,
		fee_in_precision: U256::from(10_000u64), // 1%
	};
	let signature = owner.sign_order(&order).context("Signing failed")?;

	info!(owner = %order.owner, nonce = %order.nonce, "submitting signed order");
	let receipt = engine.execute_limit_order(operator, &order, &signature).await?;

	println!("order settled");
	println!("  pulled:    {}", receipt.src_amount);
	println!("  fee:       {}", receipt.fee_amount);
	println!("  traded:    {}", receipt.traded_amount);
	println!("  delivered: {}", receipt.dest_amount);
	println!("  nonce:     {}", receipt.nonce);
	println!(
		"  owner ether balance: {}",
		ledger.balance_of(ETH_TOKEN_ADDRESS, owner.address()).await
	);
	Ok(())
}
