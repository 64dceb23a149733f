//! Multisig spend CLI application
//!
//! A command-line interface for building, co-signing and finalizing
//! transactions that spend from P2SH multisig addresses.

use clap::{Args, Parser, Subcommand};
use multisig_spend::cli::{self, AppContext, CliResult, Payment};
use multisig_spend::config::EngineConfig;
use std::future::Future;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "multisig-spend")]
#[command(version = "0.1.0")]
#[command(about = "Build and co-sign multisig spends on Flux", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Chain id (flux, fluxTestnet), overrides the configuration
    #[arg(long, global = true)]
    chain: Option<String>,

    /// Explorer base URL, overrides the configuration
    #[arg(long, global = true)]
    explorer: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct PaymentArgs {
    /// Multisig address funding the payment
    #[arg(short, long)]
    from: String,

    /// Recipient's address
    #[arg(short, long)]
    to: String,

    /// Amount in coins
    #[arg(short, long)]
    amount: String,

    /// Fee in coins
    #[arg(long, default_value = "0")]
    fee: String,

    /// Change address, the sender when omitted
    #[arg(long)]
    change: Option<String>,

    /// Message embedded as an OP_RETURN output
    #[arg(short, long)]
    message: Option<String>,
}

#[derive(Args)]
struct KeyArgs {
    /// Private key in WIF
    #[arg(long)]
    wif: String,

    /// Redeem script hex
    #[arg(long)]
    redeem_script: String,
}

#[derive(Subcommand)]
enum Commands {
    /// List the unspent outputs of an address
    Utxos {
        /// Address to query
        address: String,
    },

    /// Show which UTXOs would fund a payment
    Select {
        /// Address to select from
        #[arg(short, long)]
        from: String,

        /// Amount in coins
        #[arg(short, long)]
        amount: String,

        /// Fee in coins
        #[arg(long, default_value = "0")]
        fee: String,
    },

    /// Build an unsigned transaction
    Build {
        #[command(flatten)]
        payment: PaymentArgs,
    },

    /// Add a signature to a transaction
    Sign {
        /// Transaction hex, or @file
        tx: String,

        #[command(flatten)]
        keys: KeyArgs,

        /// JSON file with the spent outputs; fetched from the explorer when omitted
        #[arg(long)]
        utxos: Option<PathBuf>,
    },

    /// Collapse signature placeholders into the final form
    Finalize {
        /// Transaction hex, or @file
        tx: String,
    },

    /// Fetch, select, build and sign in one step
    Spend {
        #[command(flatten)]
        payment: PaymentArgs,

        #[command(flatten)]
        keys: KeyArgs,

        /// Post the partially signed transaction to the relay
        #[arg(long)]
        relay: bool,
    },

    /// Broadcast a finalized transaction
    Broadcast {
        /// Transaction hex, or @file
        tx: String,
    },

    /// Describe a raw transaction
    Decode {
        /// Transaction hex, or @file
        tx: String,
    },
}

impl PaymentArgs {
    fn resolve(&self, ctx: &AppContext) -> CliResult<Payment> {
        Ok(Payment {
            sender: self.from.clone(),
            receiver: self.to.clone(),
            change: self.change.clone(),
            amount: ctx.parse_amount(&self.amount)?,
            fee: ctx.parse_amount(&self.fee)?,
            message: self.message.clone(),
        })
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = EngineConfig::load_or_default(cli.config.as_deref())?;
    if let Some(chain) = cli.chain {
        config.chain = chain;
    }
    if let Some(explorer) = cli.explorer {
        config.explorer = Some(explorer);
    }
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Utxos { address } => {
            block_on(cli::cmd_utxos(&ctx, &address))?;
        }

        Commands::Select { from, amount, fee } => {
            let amount = ctx.parse_amount(&amount)?;
            let fee = ctx.parse_amount(&fee)?;
            block_on(cli::cmd_select(&ctx, &from, amount, fee))?;
        }

        Commands::Build { payment } => {
            let payment = payment.resolve(&ctx)?;
            block_on(cli::cmd_build(&ctx, &payment))?;
        }

        Commands::Sign { tx, keys, utxos } => {
            let tx = cli::read_hex_arg(&tx)?;
            block_on(cli::cmd_sign(
                &ctx,
                &tx,
                &keys.wif,
                &keys.redeem_script,
                utxos.as_deref(),
            ))?;
        }

        Commands::Finalize { tx } => {
            cli::cmd_finalize(&ctx, &cli::read_hex_arg(&tx)?)?;
        }

        Commands::Spend {
            payment,
            keys,
            relay,
        } => {
            let payment = payment.resolve(&ctx)?;
            block_on(cli::cmd_spend(
                &ctx,
                &payment,
                &keys.wif,
                &keys.redeem_script,
                relay,
            ))?;
        }

        Commands::Broadcast { tx } => {
            let tx = cli::read_hex_arg(&tx)?;
            block_on(cli::cmd_broadcast(&ctx, &tx))?;
        }

        Commands::Decode { tx } => {
            cli::cmd_decode(&ctx, &cli::read_hex_arg(&tx)?)?;
        }
    }

    Ok(())
}

/// Run a network command; offline commands never start a runtime
fn block_on<F>(command: F) -> CliResult<()>
where
    F: Future<Output = CliResult<()>>,
{
    tokio::runtime::Runtime::new()?.block_on(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_offline_commands_parse() {
        let cli = Cli::try_parse_from(["multisig-spend", "finalize", "@signed.hex"]).unwrap();
        assert!(matches!(cli.command, Commands::Finalize { .. }));

        let cli = Cli::try_parse_from(["multisig-spend", "--chain", "fluxTestnet", "decode", "00"])
            .unwrap();
        assert_eq!(cli.chain.as_deref(), Some("fluxTestnet"));
        assert!(matches!(cli.command, Commands::Decode { .. }));
    }

    #[test]
    fn test_block_on_returns_command_result() {
        let done: CliResult<()> = Ok(());
        assert!(block_on(async { done }).is_ok());

        let failed: CliResult<()> = Err("explorer unreachable".into());
        assert!(block_on(async { failed }).is_err());
    }
}
