//! Partial signing of P2SH multisig inputs
//!
//! Each call adds one co-signer's signature to every input and returns the
//! transaction in the incomplete scriptSig form so that the next co-signer
//! can continue. Signatures already present are preserved in their key's
//! slot.

use super::redeem::{MultisigScriptSig, RedeemScript};
use crate::config::{chain_params, ChainError, ChainParams};
use crate::core::{
    find_utxo, signature_hash, Amount, ScriptError, SigHashType, SighashError, Transaction,
    TransactionError, Utxo, MAX_WIRE_VALUE,
};
use crate::crypto::{verify_der, KeyError, KeyPair};
use thiserror::Error;

/// Signing errors
#[derive(Error, Debug)]
pub enum SignError {
    #[error("No known UTXO for input {txid}:{vout}")]
    MissingInputValue { txid: String, vout: u32 },
    #[error("Input {txid}:{vout} spends {value}, beyond the signed 64-bit value range")]
    ValueOutOfRange {
        txid: String,
        vout: u32,
        value: Amount,
    },
    #[error("Transaction error: {0}")]
    Transaction(#[from] TransactionError),
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
    #[error("Redeem script error: {0}")]
    Script(#[from] ScriptError),
    #[error("Signing key is not part of the redeem script")]
    KeyNotInRedeemScript,
    #[error("Input {0} is signed for a different redeem script")]
    RedeemScriptMismatch(usize),
    #[error("Signature hash error: {0}")]
    Sighash(#[from] SighashError),
    #[error("Unsupported chain: {0}")]
    UnsupportedChain(#[from] ChainError),
}

/// Add a signature from `private_key_wif` to every input of `tx_hex`
///
/// `known_utxos` must contain the output spent by each input: the signature
/// hash commits to the spent value, so a missing entry aborts the call
/// before anything is signed.
pub fn sign(
    tx_hex: &str,
    chain: &str,
    private_key_wif: &str,
    redeem_script_hex: &str,
    known_utxos: &[Utxo],
) -> Result<String, SignError> {
    let chain = chain_params(chain)?;
    let mut tx = Transaction::from_hex(tx_hex)?;
    let key = KeyPair::from_wif(private_key_wif, chain.wif_prefix)?;
    let redeem = RedeemScript::from_hex(redeem_script_hex)?;

    sign_transaction(&mut tx, chain, &key, &redeem, known_utxos)?;
    Ok(tx.to_hex())
}

/// Sign all inputs of a parsed transaction in place
pub fn sign_transaction(
    tx: &mut Transaction,
    chain: &ChainParams,
    key: &KeyPair,
    redeem: &RedeemScript,
    known_utxos: &[Utxo],
) -> Result<(), SignError> {
    let slot = redeem
        .position_of(&key.public_key_bytes())
        .ok_or(SignError::KeyNotInRedeemScript)?;

    let values = input_values(tx, known_utxos)?;

    let mut script_sigs = Vec::with_capacity(tx.inputs.len());
    for (index, value) in values.iter().enumerate() {
        let mut slots = existing_signatures(tx, index, *value, chain, redeem)?;

        let digest = signature_hash(
            tx,
            index,
            redeem.as_bytes(),
            *value,
            SigHashType::All,
            chain.consensus_branch_id,
        )?;
        let mut signature = key.sign_digest(&digest);
        signature.push(SigHashType::All.as_byte());
        slots[slot] = signature;

        script_sigs.push(
            MultisigScriptSig {
                signatures: slots,
                redeem_script: redeem.as_bytes().to_vec(),
            }
            .to_incomplete(),
        );
    }

    // scriptSigs are not committed to by the signature hash
    for (input, script_sig) in tx.inputs.iter_mut().zip(script_sigs) {
        input.script_sig = script_sig;
    }

    log::debug!(
        "Signed {} inputs with key {} of {}",
        tx.inputs.len(),
        slot + 1,
        redeem.pubkeys().len()
    );
    Ok(())
}

/// Value of the output spent by each input, in input order
fn input_values(tx: &Transaction, known_utxos: &[Utxo]) -> Result<Vec<Amount>, SignError> {
    tx.inputs
        .iter()
        .map(|input| {
            let txid = input.prev_txid();
            let vout = input.prev_index;
            let value = match find_utxo(known_utxos, &txid, vout) {
                Some(utxo) => utxo.satoshis,
                None => return Err(SignError::MissingInputValue { txid, vout }),
            };
            if value.as_sat() > MAX_WIRE_VALUE {
                return Err(SignError::ValueOutOfRange { txid, vout, value });
            }
            Ok(value)
        })
        .collect()
}

/// Signatures already on input `index`, one slot per redeem script key
fn existing_signatures(
    tx: &Transaction,
    index: usize,
    value: Amount,
    chain: &ChainParams,
    redeem: &RedeemScript,
) -> Result<Vec<Vec<u8>>, SignError> {
    let mut slots = vec![Vec::new(); redeem.pubkeys().len()];

    let script_sig = &tx.inputs[index].script_sig;
    if script_sig.is_empty() {
        return Ok(slots);
    }
    let existing = MultisigScriptSig::parse(script_sig)
        .filter(|s| s.redeem_script == redeem.as_bytes())
        .ok_or(SignError::RedeemScriptMismatch(index))?;

    for signature in existing.present() {
        match match_signature(tx, index, value, chain, redeem, &slots, signature)? {
            Some(position) => slots[position] = signature.clone(),
            None => log::warn!(
                "Dropping signature on input {} that matches no open key slot",
                index
            ),
        }
    }
    Ok(slots)
}

/// Find the unfilled key slot whose public key verifies `signature`
fn match_signature(
    tx: &Transaction,
    index: usize,
    value: Amount,
    chain: &ChainParams,
    redeem: &RedeemScript,
    slots: &[Vec<u8>],
    signature: &[u8],
) -> Result<Option<usize>, SignError> {
    let Some((hash_byte, der)) = signature.split_last() else {
        return Ok(None);
    };
    let Some(hash_type) = SigHashType::from_byte(*hash_byte) else {
        return Ok(None);
    };

    let digest = signature_hash(
        tx,
        index,
        redeem.as_bytes(),
        value,
        hash_type,
        chain.consensus_branch_id,
    )?;

    Ok(redeem
        .keys()
        .iter()
        .enumerate()
        .find(|(i, key)| slots[*i].is_empty() && verify_der(key, &digest, der))
        .map(|(i, _)| i))
}
