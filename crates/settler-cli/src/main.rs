use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use settler_account::LocalSigner;
use settler_config::ConfigLoader;
use settler_types::{Address, Nonce, Order, TokenPairKey, U256};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod simulate;

#[derive(Parser)]
#[command(name = "settler")]
#[command(about = "Limit-order settlement engine utilities", long_about = None)]
struct Cli {
	#[command(subcommand)]
	command: Commands,

	#[arg(long, env = "SETTLER_LOG_LEVEL", default_value = "info")]
	log_level: String,
}

/// Order fields shared by the hashing and signing commands.
#[derive(Args)]
struct OrderArgs {
	#[arg(long)]
	owner: Address,
	/// Raw 256-bit nonce, e.g. from `settler derive-nonce`.
	#[arg(long)]
	nonce: U256,
	#[arg(long)]
	src_token: Address,
	#[arg(long)]
	src_amount: U256,
	#[arg(long)]
	dest_token: Address,
	#[arg(long)]
	dest_address: Address,
	#[arg(long, default_value = "0")]
	min_conversion_rate: U256,
	#[arg(long, default_value = "0")]
	fee_in_precision: U256,
}

impl OrderArgs {
	fn into_order(self) -> Order {
		Order {
			owner: self.owner,
			nonce: Nonce::from(self.nonce),
			src_token: self.src_token,
			src_amount: self.src_amount,
			dest_token: self.dest_token,
			dest_address: self.dest_address,
			min_conversion_rate: self.min_conversion_rate,
			fee_in_precision: self.fee_in_precision,
		}
	}
}

#[derive(Subcommand)]
enum Commands {
	/// Validate a configuration file
	Validate {
		#[arg(short, long, value_name = "FILE", default_value = "settler.toml")]
		config: PathBuf,
	},
	/// Derive an order nonce for an engine address (current time unless
	/// a millisecond timestamp is given)
	DeriveNonce {
		engine: Address,
		#[arg(long)]
		timestamp_ms: Option<u64>,
	},
	/// Print the nonce-namespacing key for a token pair
	PairKey {
		src_token: Address,
		dest_token: Address,
	},
	/// Print the message hash an owner signs for an order
	HashOrder {
		#[command(flatten)]
		order: OrderArgs,
	},
	/// Sign an order with a local private key
	SignOrder {
		#[arg(long, env = "SETTLER_PRIVATE_KEY", hide_env_values = true)]
		private_key: String,
		#[command(flatten)]
		order: OrderArgs,
	},
	/// Settle one order end-to-end against in-memory collaborators
	Simulate {
		#[arg(short, long, value_name = "FILE", default_value = "settler.toml")]
		config: PathBuf,
	},
}

#[tokio::main]
async fn main() -> Result<()> {
	let cli = Cli::parse();
	setup_tracing(&cli.log_level)?;

	match cli.command {
		Commands::Validate { config } => validate(config),
		Commands::DeriveNonce {
			engine,
			timestamp_ms,
		} => {
			let nonce = match timestamp_ms {
				Some(ts) => Nonce::at_time(engine, ts),
				None => Nonce::now(engine),
			};
			println!("{nonce}");
			Ok(())
		}
		Commands::PairKey {
			src_token,
			dest_token,
		} => {
			println!("{}", TokenPairKey::new(src_token, dest_token));
			Ok(())
		}
		Commands::HashOrder { order } => {
			println!("{}", order.into_order().message_hash());
			Ok(())
		}
		Commands::SignOrder { private_key, order } => sign_order(&private_key, order),
		Commands::Simulate { config } => simulate::run(config).await,
	}
}

fn validate(config: PathBuf) -> Result<()> {
	let config =
		ConfigLoader::from_env_and_file(&config).context("Failed to load configuration")?;

	println!("Configuration is valid");
	println!("  engine address: {}", config.settlement.address);
	println!("  admin:          {}", config.settlement.admin);
	println!("  venue:          {}", config.venue.address);
	println!("  operators:      {}", config.settlement.operators.len());
	println!("  listed tokens:  {}", config.settlement.listed_tokens.len());
	println!("  trade enabled:  {}", config.settlement.trade_enabled);
	Ok(())
}

fn sign_order(private_key: &str, order: OrderArgs) -> Result<()> {
	let signer = LocalSigner::new(private_key).context("Invalid private key")?;
	let order = order.into_order();
	if order.owner != signer.address() {
		anyhow::bail!(
			"order owner {} does not match the signing key's address {}",
			order.owner,
			signer.address()
		);
	}

	let signature = signer.sign_order(&order).context("Signing failed")?;
	println!("msg_hash: {}", order.message_hash());
	println!("v: {}", signature.v);
	println!("r: {}", signature.r);
	println!("s: {}", signature.s);
	Ok(())
}

fn setup_tracing(log_level: &str) -> Result<()> {
	let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

	tracing_subscriber::registry()
		.with(env_filter)
		.with(tracing_subscriber::fmt::layer())
		.init();

	Ok(())
}
