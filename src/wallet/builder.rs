//! Unsigned transaction construction
//!
//! Turns a coin selection into an unsigned transparent transaction: one
//! input per UTXO, the payment output, an optional change output and an
//! optional OP_RETURN message.

use super::selector::MAX_SELECTED_INPUTS;
use crate::config::ChainParams;
use crate::core::script::null_data_script;
use crate::core::{internal_txid, Amount, Transaction, TxInput, TxOutput, Utxo, MAX_WIRE_VALUE};
use thiserror::Error;

/// Largest value representable in an output's signed 64-bit field
pub const MAX_OUTPUT_VALUE: u64 = MAX_WIRE_VALUE;

/// Transaction construction errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    #[error("Selection infeasible: {0}")]
    SelectionInfeasible(String),
    #[error("Could not construct raw transaction: {0}")]
    ConstructionFailure(String),
}

fn output(chain: &ChainParams, address: &str, value: Amount) -> Result<TxOutput, BuildError> {
    if value.as_sat() > MAX_OUTPUT_VALUE {
        return Err(BuildError::ConstructionFailure(format!(
            "output value {} out of range",
            value
        )));
    }
    let script = chain
        .script_for_address(address)
        .map_err(|e| BuildError::ConstructionFailure(e.to_string()))?;
    Ok(TxOutput::new(value, script))
}

/// Build the unsigned transaction spending all of `inputs`
///
/// A change output is added only when the inputs strictly exceed
/// `amount + fee`; an exact cover produces none.
pub fn build_unsigned(
    chain: &ChainParams,
    inputs: &[Utxo],
    receiver: &str,
    amount: Amount,
    fee: Amount,
    change: &str,
    message: Option<&str>,
) -> Result<Transaction, BuildError> {
    if inputs.is_empty() {
        return Err(BuildError::SelectionInfeasible(
            "no spendable outputs selected".to_string(),
        ));
    }
    if inputs.len() > MAX_SELECTED_INPUTS {
        return Err(BuildError::SelectionInfeasible(format!(
            "{} inputs exceed the {} input limit",
            inputs.len(),
            MAX_SELECTED_INPUTS
        )));
    }

    let total_in = Amount::total(inputs.iter().map(|u| &u.satoshis));
    let outgoing = amount.as_sat() as u128 + fee.as_sat() as u128;
    if total_in < outgoing {
        return Err(BuildError::SelectionInfeasible(format!(
            "inputs total {} but {} is required",
            total_in, outgoing
        )));
    }

    let mut tx = Transaction::new(chain.tx_version, chain.version_group_id);

    for utxo in inputs {
        let prev_hash = internal_txid(&utxo.txid)
            .map_err(|e| BuildError::ConstructionFailure(e.to_string()))?;
        tx.inputs.push(TxInput::new(prev_hash, utxo.vout));
    }

    tx.outputs.push(output(chain, receiver, amount)?);

    if total_in > outgoing {
        let change_value = Amount::from_total(total_in - outgoing)
            .map_err(|e| BuildError::ConstructionFailure(e.to_string()))?;
        tx.outputs.push(output(chain, change, change_value)?);
    }

    if let Some(text) = message.filter(|m| !m.is_empty()) {
        tx.outputs
            .push(TxOutput::new(Amount::ZERO, null_data_script(text.as_bytes())));
    }

    log::debug!(
        "Built unsigned transaction: {} inputs, {} outputs",
        tx.inputs.len(),
        tx.outputs.len()
    );
    Ok(tx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FLUX;
    use crate::core::script::{null_data_payload, p2pkh_script};
    use crate::crypto::{decode_address, encode_address};

    fn receiver() -> String {
        encode_address(FLUX.pubkey_prefix, &[1u8; 20])
    }

    fn change() -> String {
        encode_address(FLUX.script_prefix, &[2u8; 20])
    }

    fn utxo(n: u8, sat: u64) -> Utxo {
        Utxo::new(hex::encode([n; 32]), n as u32, "a914", Amount::from_sat(sat))
    }

    fn build(
        inputs: &[Utxo],
        amount: u64,
        fee: u64,
        message: Option<&str>,
    ) -> Result<Transaction, BuildError> {
        build_unsigned(
            &FLUX,
            inputs,
            &receiver(),
            Amount::from_sat(amount),
            Amount::from_sat(fee),
            &change(),
            message,
        )
    }

    #[test]
    fn test_exact_cover_has_no_change() {
        let tx = build(&[utxo(1, 500_000), utxo(2, 300_000)], 700_000, 100_000, None).unwrap();

        assert_eq!(tx.inputs.len(), 2);
        assert_eq!(tx.outputs.len(), 1);
        assert_eq!(tx.outputs[0].value, Amount::from_sat(700_000));
        assert_eq!(tx.outputs[0].script_pubkey, p2pkh_script(&[1u8; 20]));
    }

    #[test]
    fn test_change_output_for_surplus() {
        let tx = build(&[utxo(1, 2_000_000)], 700_000, 100_000, None).unwrap();

        assert_eq!(tx.outputs.len(), 2);
        assert_eq!(tx.outputs[1].value, Amount::from_sat(1_200_000));
        let change_hash = decode_address(&change()).unwrap().hash;
        assert_eq!(
            tx.outputs[1].script_pubkey,
            crate::core::script::p2sh_script(&change_hash)
        );
    }

    #[test]
    fn test_version_fields_come_from_chain() {
        let tx = build(&[utxo(1, 2_000_000)], 700_000, 100_000, None).unwrap();
        assert_eq!(tx.version, 4);
        assert_eq!(tx.version_group_id, 0x892f_2085);
        assert_eq!(tx.lock_time, 0);
        assert_eq!(tx.expiry_height, 0);
    }

    #[test]
    fn test_inputs_reference_internal_byte_order() {
        let mut id = [0u8; 32];
        id[0] = 0xaa;
        let input = Utxo::new(hex::encode(id), 3, "", Amount::from_sat(10_000));

        let tx = build(&[input], 1_000, 0, None).unwrap();
        assert_eq!(tx.inputs[0].prev_hash[31], 0xaa);
        assert_eq!(tx.inputs[0].prev_index, 3);
        assert!(tx.inputs[0].script_sig.is_empty());
        assert_eq!(tx.inputs[0].prev_txid(), hex::encode(id));
    }

    #[test]
    fn test_message_output() {
        let tx = build(&[utxo(1, 2_000_000)], 700_000, 100_000, Some("invoice 42")).unwrap();

        assert_eq!(tx.outputs.len(), 3);
        let memo = &tx.outputs[2];
        assert_eq!(memo.value, Amount::ZERO);
        assert_eq!(null_data_payload(&memo.script_pubkey).unwrap(), b"invoice 42");

        let tx = build(&[utxo(1, 2_000_000)], 700_000, 100_000, Some("")).unwrap();
        assert_eq!(tx.outputs.len(), 2);
    }

    #[test]
    fn test_long_message_not_rejected() {
        let message = "m".repeat(1_000);
        let tx = build(&[utxo(1, 2_000_000)], 700_000, 100_000, Some(&message)).unwrap();
        assert_eq!(null_data_payload(&tx.outputs[2].script_pubkey).unwrap().len(), 1_000);
    }

    #[test]
    fn test_empty_selection_is_infeasible() {
        assert!(matches!(
            build(&[], 800_000, 0, None),
            Err(BuildError::SelectionInfeasible(_))
        ));
    }

    #[test]
    fn test_oversized_selection_is_infeasible() {
        let inputs: Vec<Utxo> = (0..=MAX_SELECTED_INPUTS)
            .map(|i| Utxo::new(format!("{:064x}", i), 0, "", Amount::from_sat(10)))
            .collect();
        assert!(matches!(
            build(&inputs, 100, 0, None),
            Err(BuildError::SelectionInfeasible(_))
        ));
    }

    #[test]
    fn test_under_funded_selection_is_infeasible() {
        assert!(matches!(
            build(&[utxo(1, 500)], 400, 200, None),
            Err(BuildError::SelectionInfeasible(_))
        ));
    }

    #[test]
    fn test_bad_address_is_construction_failure() {
        let result = build_unsigned(
            &FLUX,
            &[utxo(1, 2_000)],
            "t1-not-an-address",
            Amount::from_sat(1_000),
            Amount::ZERO,
            &change(),
            None,
        );
        assert!(matches!(result, Err(BuildError::ConstructionFailure(_))));
    }

    #[test]
    fn test_bad_txid_is_construction_failure() {
        let input = Utxo::new("xyz", 0, "", Amount::from_sat(2_000));
        assert!(matches!(
            build(&[input], 1_000, 0, None),
            Err(BuildError::ConstructionFailure(_))
        ));
    }

    #[test]
    fn test_out_of_range_value_is_construction_failure() {
        let input = utxo(1, u64::MAX);
        assert!(matches!(
            build(&[input], u64::MAX, 0, None),
            Err(BuildError::ConstructionFailure(_))
        ));
    }
}
