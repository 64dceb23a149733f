//! Spend orchestration
//!
//! Runs one spend attempt end to end: fetch the sender's UTXOs, select,
//! build and add the local co-signer's signature. The result is a partially
//! signed transaction for the remaining co-signers; it is never finalized
//! here.

use super::builder::{build_unsigned, BuildError};
use super::request::{RequestError, SpendRequest};
use super::selector::select;
use crate::config::{chain_params, ChainError};
use crate::core::AmountError;
use crate::multisig::{sign, SignError};
use crate::network::UtxoSource;
use thiserror::Error;

/// Errors from any stage of a spend
#[derive(Error, Debug)]
pub enum SpendError {
    #[error("Invalid request: {0}")]
    InvalidRequest(#[from] RequestError),
    #[error("Amount error: {0}")]
    Amount(#[from] AmountError),
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(#[from] ChainError),
    #[error("Build failed: {0}")]
    Build(#[from] BuildError),
    #[error("Signing failed: {0}")]
    Sign(#[from] SignError),
}

/// Produce a transaction carrying the local signature
///
/// Every UTXO returned by `source` is passed to the signer as known
/// outputs, not only the selected ones.
pub async fn spend<S>(source: &S, request: &SpendRequest) -> Result<String, SpendError>
where
    S: UtxoSource + ?Sized,
{
    request.validate()?;
    let chain = chain_params(&request.chain)?;
    let target = request
        .amount
        .checked_add(request.fee)
        .ok_or(AmountError::Overflow)?;

    let utxos = source.utxos(&request.sender).await;
    log::debug!("Fetched {} UTXOs for {}", utxos.len(), request.sender);

    let selection = select(&utxos, target);
    log::debug!(
        "Selected {} UTXOs via {:?} covering {}",
        selection.len(),
        selection.policy,
        target
    );

    let tx = build_unsigned(
        chain,
        &selection.utxos,
        &request.receiver,
        request.amount,
        request.fee,
        &request.change,
        request.message(),
    )?;

    let signed = sign(
        &tx.to_hex(),
        chain.id,
        &request.private_key_wif,
        &request.redeem_script_hex,
        &utxos,
    )?;

    log::info!(
        "Prepared {} -> {}: {} sat, fee {} sat, {} inputs, {} outputs",
        request.sender,
        request.receiver,
        request.amount,
        request.fee,
        tx.inputs.len(),
        tx.outputs.len()
    );
    Ok(signed)
}
