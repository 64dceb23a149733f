//! CLI commands for the spend engine
//!
//! Implements all command handlers for the CLI interface.

use crate::config::{ChainParams, EngineConfig};
use crate::core::{display_txid, Amount, Transaction, Utxo};
use crate::core::script::null_data_payload;
use crate::multisig::{finalize, sign, signature_status, RedeemScript};
use crate::network::{ExplorerClient, RelayClient};
use crate::wallet::{build_unsigned, select, spend, SpendRequest};
use std::fs;
use std::path::Path;

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Resolved configuration shared by every command
pub struct AppContext {
    pub config: EngineConfig,
    pub chain: &'static ChainParams,
}

impl AppContext {
    pub fn new(config: EngineConfig) -> CliResult<Self> {
        let chain = config.chain_params()?;
        Ok(Self { config, chain })
    }

    pub fn explorer(&self) -> CliResult<ExplorerClient> {
        Ok(ExplorerClient::from_config(&self.config)?)
    }

    /// Parse a whole-coin amount such as `1.25`
    pub fn parse_amount(&self, coins: &str) -> CliResult<Amount> {
        Ok(Amount::from_coins(coins, self.chain.decimals)?)
    }

    fn format_amount(&self, amount: Amount) -> String {
        let scale = 10u64.pow(self.chain.decimals);
        format!(
            "{}.{:0width$}",
            amount.as_sat() / scale,
            amount.as_sat() % scale,
            width = self.chain.decimals as usize
        )
    }
}

/// A payment described on the command line
pub struct Payment {
    pub sender: String,
    pub receiver: String,
    /// Defaults to the sender
    pub change: Option<String>,
    pub amount: Amount,
    pub fee: Amount,
    pub message: Option<String>,
}

impl Payment {
    fn change(&self) -> &str {
        self.change.as_deref().unwrap_or(&self.sender)
    }
}

/// Accept hex inline or as `@path` to a file containing it
pub fn read_hex_arg(arg: &str) -> CliResult<String> {
    match arg.strip_prefix('@') {
        Some(path) => Ok(fs::read_to_string(path)?.trim().to_string()),
        None => Ok(arg.trim().to_string()),
    }
}

/// Load a JSON array of UTXOs
pub fn load_utxos(path: &Path) -> CliResult<Vec<Utxo>> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

/// List the UTXOs of an address
pub async fn cmd_utxos(ctx: &AppContext, address: &str) -> CliResult<()> {
    let utxos = ctx.explorer()?.fetch_utxos(address).await?;

    if utxos.is_empty() {
        println!("📭 No unspent outputs for {}", address);
        return Ok(());
    }

    let total = Amount::total(utxos.iter().map(|u| &u.satoshis));
    println!("💰 Unspent outputs for {}", address);
    println!("   Count: {}", utxos.len());
    println!("   Total: {} sat", total);
    for utxo in &utxos {
        println!(
            "   └─ {}:{} = {}",
            utxo.txid,
            utxo.vout,
            ctx.format_amount(utxo.satoshis)
        );
    }

    Ok(())
}

/// Show which UTXOs would fund a payment
pub async fn cmd_select(
    ctx: &AppContext,
    address: &str,
    amount: Amount,
    fee: Amount,
) -> CliResult<()> {
    let target = amount
        .checked_add(fee)
        .ok_or(crate::core::AmountError::Overflow)?;
    let utxos = ctx.explorer()?.fetch_utxos(address).await?;
    let selection = select(&utxos, target);

    match selection.policy {
        None => {
            println!(
                "❌ No selection covers {} sat ({} UTXOs available)",
                target,
                utxos.len()
            );
        }
        Some(policy) => {
            println!(
                "🎯 Selected {} of {} UTXOs via {:?}",
                selection.len(),
                utxos.len(),
                policy
            );
            println!("   Target: {} sat", target);
            println!("   Total:  {} sat", selection.total());
            if selection.exceeds_cap() {
                println!("   ⚠️  Above the input limit; building will fail");
            }
            for utxo in &selection.utxos {
                println!("   └─ {}:{} = {} sat", utxo.txid, utxo.vout, utxo.satoshis);
            }
        }
    }

    Ok(())
}

/// Build an unsigned transaction and print its hex
pub async fn cmd_build(ctx: &AppContext, payment: &Payment) -> CliResult<()> {
    let target = payment
        .amount
        .checked_add(payment.fee)
        .ok_or(crate::core::AmountError::Overflow)?;
    let utxos = ctx.explorer()?.fetch_utxos(&payment.sender).await?;
    let selection = select(&utxos, target);

    let tx = build_unsigned(
        ctx.chain,
        &selection.utxos,
        &payment.receiver,
        payment.amount,
        payment.fee,
        payment.change(),
        payment.message.as_deref(),
    )?;

    log::info!(
        "Built unsigned transaction with {} inputs and {} outputs",
        tx.inputs.len(),
        tx.outputs.len()
    );
    println!("{}", tx.to_hex());
    Ok(())
}

/// Add a signature to a transaction
///
/// Spent outputs come from `utxos_file` when given; otherwise they are
/// fetched for the redeem script's own address.
pub async fn cmd_sign(
    ctx: &AppContext,
    tx_hex: &str,
    wif: &str,
    redeem_hex: &str,
    utxos_file: Option<&Path>,
) -> CliResult<()> {
    let known = match utxos_file {
        Some(path) => load_utxos(path)?,
        None => {
            let redeem = RedeemScript::from_hex(redeem_hex)?;
            let address = ctx.chain.multisig_address(redeem.as_bytes());
            ctx.explorer()?.fetch_utxos(&address).await?
        }
    };

    let signed = sign(tx_hex, ctx.chain.id, wif, redeem_hex, &known)?;
    println!("{}", signed);
    Ok(())
}

/// Finalize a signed transaction
pub fn cmd_finalize(ctx: &AppContext, tx_hex: &str) -> CliResult<()> {
    for status in signature_status(tx_hex, ctx.chain.id)? {
        if !status.is_complete() {
            log::warn!(
                "Input {} has {} signature(s), {} required",
                status.index,
                status.signatures,
                status
                    .required
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "unknown".to_string())
            );
        }
    }

    println!("{}", finalize(tx_hex, ctx.chain.id)?);
    Ok(())
}

/// Run a full spend and optionally hand it to the relay
pub async fn cmd_spend(
    ctx: &AppContext,
    payment: &Payment,
    wif: &str,
    redeem_hex: &str,
    relay: bool,
) -> CliResult<()> {
    let request = SpendRequest {
        chain: ctx.chain.id.to_string(),
        sender: payment.sender.clone(),
        receiver: payment.receiver.clone(),
        change: payment.change().to_string(),
        amount: payment.amount,
        fee: payment.fee,
        message: payment.message.clone(),
        private_key_wif: wif.to_string(),
        redeem_script_hex: redeem_hex.to_string(),
    };

    let explorer = ctx.explorer()?;
    let signed = spend(&explorer, &request).await?;

    if relay {
        let relay_client = RelayClient::from_config(&ctx.config)?;
        relay_client
            .send_transaction(&signed, ctx.chain.id, ctx.config.wallet_identity.as_deref())
            .await?;
        println!("📤 Partially signed transaction sent to the relay");
    }

    println!("{}", signed);
    Ok(())
}

/// Broadcast a finalized transaction
pub async fn cmd_broadcast(ctx: &AppContext, tx_hex: &str) -> CliResult<()> {
    let txid = ctx.explorer()?.broadcast(tx_hex).await?;
    println!("✅ Broadcast transaction {}", txid);
    Ok(())
}

/// Describe a raw transaction
pub fn cmd_decode(ctx: &AppContext, tx_hex: &str) -> CliResult<()> {
    let tx = Transaction::from_hex(tx_hex)?;
    let status = signature_status(tx_hex, ctx.chain.id)?;

    println!("🧾 Transaction {}", tx.txid());
    println!("   ├─ Version: {} (group {:#010x})", tx.version, tx.version_group_id);
    println!("   ├─ Inputs: {}", tx.inputs.len());
    for (input, s) in tx.inputs.iter().zip(&status) {
        let progress = match s.required {
            Some(m) => format!("{}/{} signatures", s.signatures, m),
            None if input.script_sig.is_empty() => "unsigned".to_string(),
            None => "non-multisig".to_string(),
        };
        println!(
            "   │  └─ {}:{} ({})",
            display_txid(&input.prev_hash),
            input.prev_index,
            progress
        );
    }
    println!("   └─ Outputs: {}", tx.outputs.len());
    for output in &tx.outputs {
        match null_data_payload(&output.script_pubkey) {
            Some(data) => println!("      └─ message: {}", String::from_utf8_lossy(&data)),
            None => println!(
                "      └─ {} to script {}",
                ctx.format_amount(output.value),
                hex::encode(&output.script_pubkey)
            ),
        }
    }

    Ok(())
}
