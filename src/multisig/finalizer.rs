//! Finalization of fully signed multisig transactions

use super::redeem::{MultisigScriptSig, RedeemScript};
use crate::config::{chain_params, ChainError, ChainParams};
use crate::core::{Transaction, TransactionError};
use serde::Serialize;
use thiserror::Error;

/// Finalization errors
#[derive(Error, Debug)]
pub enum FinalizeError {
    #[error("Malformed transaction: {0}")]
    MalformedTransaction(#[from] TransactionError),
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(#[from] ChainError),
}

fn parse_for_chain(tx_hex: &str, chain: &ChainParams) -> Result<Transaction, FinalizeError> {
    let tx = Transaction::from_hex(tx_hex)?;
    if tx.version != chain.tx_version {
        return Err(TransactionError::UnsupportedVersion {
            version: tx.version,
            overwintered: true,
        }
        .into());
    }
    if tx.version_group_id != chain.version_group_id {
        return Err(TransactionError::UnexpectedVersionGroup(tx.version_group_id).into());
    }
    Ok(tx)
}

/// Rewrite every multisig scriptSig into its final form
///
/// Placeholder slots are dropped, leaving `OP_0 <sig>... <redeemScript>`.
/// The number of signatures is not checked against the threshold; an
/// under-signed transaction is left for the network to reject. Inputs that
/// are not P2SH multisig spends pass through unchanged.
pub fn finalize(tx_hex: &str, chain: &str) -> Result<String, FinalizeError> {
    let chain = chain_params(chain)?;
    let mut tx = parse_for_chain(tx_hex, chain)?;

    let mut finalized = 0;
    for input in tx.inputs.iter_mut() {
        if let Some(script_sig) = MultisigScriptSig::parse(&input.script_sig) {
            input.script_sig = script_sig.to_final();
            finalized += 1;
        }
    }

    log::debug!(
        "Finalized {} of {} inputs of {}",
        finalized,
        tx.inputs.len(),
        tx.txid()
    );
    Ok(tx.to_hex())
}

/// Signature progress of one input
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InputStatus {
    pub index: usize,
    pub txid: String,
    pub vout: u32,
    /// Signatures present, placeholders excluded
    pub signatures: usize,
    /// Threshold of the input's redeem script, if it is a multisig spend
    pub required: Option<u8>,
}

impl InputStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self.required, Some(m) if self.signatures >= m as usize)
    }
}

/// Count the signatures on each input
///
/// Signatures are counted, not verified.
pub fn signature_status(tx_hex: &str, chain: &str) -> Result<Vec<InputStatus>, FinalizeError> {
    let chain = chain_params(chain)?;
    let tx = parse_for_chain(tx_hex, chain)?;

    Ok(tx
        .inputs
        .iter()
        .enumerate()
        .map(|(index, input)| {
            let multisig = MultisigScriptSig::parse(&input.script_sig);
            let required = multisig
                .as_ref()
                .and_then(|s| RedeemScript::parse(&s.redeem_script).ok())
                .map(|r| r.threshold());
            InputStatus {
                index,
                txid: input.prev_txid(),
                vout: input.prev_index,
                signatures: multisig.map(|s| s.present().count()).unwrap_or(0),
                required,
            }
        })
        .collect())
}
