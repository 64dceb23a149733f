//! Sapling signature hashing (ZIP-243)
//!
//! Unlike legacy Bitcoin sighashes, the digest commits to the value of the
//! output being spent, so a signer must know every input's UTXO amount. All
//! hashes are BLAKE2b-256 with a personalization; the final one is bound to
//! the chain's consensus branch id.

use super::amount::Amount;
use super::encoding::write_var_bytes;
use super::script::SigHashType;
use super::transaction::Transaction;
use crate::crypto::blake2b_personal;
use thiserror::Error;

const PREVOUTS_PERSONAL: &[u8; 16] = b"ZcashPrevoutHash";
const SEQUENCE_PERSONAL: &[u8; 16] = b"ZcashSequencHash";
const OUTPUTS_PERSONAL: &[u8; 16] = b"ZcashOutputsHash";
const SIGHASH_PERSONAL_PREFIX: &[u8; 12] = b"ZcashSigHash";

/// Errors computing a signature hash
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SighashError {
    #[error("Input index {index} out of range ({count} inputs)")]
    InputOutOfRange { index: usize, count: usize },
}

fn sighash_personal(branch_id: u32) -> [u8; 16] {
    let mut personal = [0u8; 16];
    personal[..12].copy_from_slice(SIGHASH_PERSONAL_PREFIX);
    personal[12..].copy_from_slice(&branch_id.to_le_bytes());
    personal
}

fn hash_prevouts(tx: &Transaction) -> [u8; 32] {
    let mut data = Vec::with_capacity(tx.inputs.len() * 36);
    for input in &tx.inputs {
        data.extend_from_slice(&input.prev_hash);
        data.extend_from_slice(&input.prev_index.to_le_bytes());
    }
    blake2b_personal(PREVOUTS_PERSONAL, &data)
}

fn hash_sequence(tx: &Transaction) -> [u8; 32] {
    let data: Vec<u8> = tx
        .inputs
        .iter()
        .flat_map(|input| input.sequence.to_le_bytes())
        .collect();
    blake2b_personal(SEQUENCE_PERSONAL, &data)
}

fn hash_outputs(tx: &Transaction) -> [u8; 32] {
    let data: Vec<u8> = tx.outputs.iter().flat_map(|o| o.to_bytes()).collect();
    blake2b_personal(OUTPUTS_PERSONAL, &data)
}

/// Compute the signature hash for one transparent input
///
/// `script_code` is the redeem script for P2SH spends; `value` is the amount
/// of the UTXO being spent.
pub fn signature_hash(
    tx: &Transaction,
    input_index: usize,
    script_code: &[u8],
    value: Amount,
    hash_type: SigHashType,
    branch_id: u32,
) -> Result<[u8; 32], SighashError> {
    let input = tx
        .inputs
        .get(input_index)
        .ok_or(SighashError::InputOutOfRange {
            index: input_index,
            count: tx.inputs.len(),
        })?;

    let anyone_can_pay = hash_type.is_anyone_can_pay();
    let base = hash_type.base_type();

    let prevouts = if anyone_can_pay {
        [0u8; 32]
    } else {
        hash_prevouts(tx)
    };
    let sequence = if anyone_can_pay || base != SigHashType::All {
        [0u8; 32]
    } else {
        hash_sequence(tx)
    };
    let outputs = match base {
        SigHashType::All => hash_outputs(tx),
        SigHashType::Single if input_index < tx.outputs.len() => {
            blake2b_personal(OUTPUTS_PERSONAL, &tx.outputs[input_index].to_bytes())
        }
        _ => [0u8; 32],
    };

    let mut data = Vec::with_capacity(256 + script_code.len());
    data.extend_from_slice(&tx.header().to_le_bytes());
    data.extend_from_slice(&tx.version_group_id.to_le_bytes());
    data.extend_from_slice(&prevouts);
    data.extend_from_slice(&sequence);
    data.extend_from_slice(&outputs);
    // hashJoinSplits, hashShieldedSpends, hashShieldedOutputs
    data.extend_from_slice(&[0u8; 32 * 3]);
    data.extend_from_slice(&tx.lock_time.to_le_bytes());
    data.extend_from_slice(&tx.expiry_height.to_le_bytes());
    data.extend_from_slice(&tx.value_balance.to_le_bytes());
    data.extend_from_slice(&(hash_type.as_byte() as u32).to_le_bytes());

    data.extend_from_slice(&input.prev_hash);
    data.extend_from_slice(&input.prev_index.to_le_bytes());
    write_var_bytes(&mut data, script_code);
    data.extend_from_slice(&(value.as_sat() as i64).to_le_bytes());
    data.extend_from_slice(&input.sequence.to_le_bytes());

    Ok(blake2b_personal(&sighash_personal(branch_id), &data))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::transaction::{TxInput, TxOutput, SAPLING_VERSION, SAPLING_VERSION_GROUP_ID};
    use crate::core::vectors::{self, BRANCH_ID};

    fn tx() -> Transaction {
        let mut tx = Transaction::new(SAPLING_VERSION, SAPLING_VERSION_GROUP_ID);
        tx.inputs.push(TxInput::new([1u8; 32], 0));
        tx.inputs.push(TxInput::new([2u8; 32], 1));
        tx.outputs.push(TxOutput::new(Amount::from_sat(1000), vec![0x51]));
        tx
    }

    fn all(tx: &Transaction, index: usize, value: u64) -> [u8; 32] {
        signature_hash(tx, index, &[0xae], Amount::from_sat(value), SigHashType::All, BRANCH_ID)
            .unwrap()
    }

    #[test]
    fn test_reference_digests() {
        let tx = Transaction::from_hex(vectors::TX_HEX).unwrap();
        let redeem = hex::decode(vectors::REDEEM_HEX).unwrap();

        let cases = [
            (
                0,
                SigHashType::All,
                "f3cbff2864a0139db91ce15385149a59f6fde4c0d721dfa1ac479f9d93c57e51",
            ),
            (
                1,
                SigHashType::All,
                "41a56116c56644b29fa1893e10d698b8d51c3f3a80f0f7e1acd2026504bab624",
            ),
            (
                1,
                SigHashType::None,
                "7d58034253c01aa3ba600a4d36e2557c6fc65a5714fc1173ca7b6452327da8e8",
            ),
            (
                0,
                SigHashType::SingleAnyoneCanPay,
                "0e7bbe58bb526779e8de29ea7926145cd45ef01297dbc13ad1a383750c00c548",
            ),
        ];
        for (index, hash_type, expected) in cases {
            let value = Amount::from_sat(vectors::INPUT_VALUES[index]);
            let digest = signature_hash(&tx, index, &redeem, value, hash_type, BRANCH_ID).unwrap();
            assert_eq!(hex::encode(digest), expected, "input {} {:?}", index, hash_type);
        }
    }

    #[test]
    fn test_personalization_layout() {
        let personal = sighash_personal(BRANCH_ID);
        assert_eq!(&personal[..12], b"ZcashSigHash");
        assert_eq!(&personal[12..], &[0xbb, 0x09, 0xb8, 0x76]);
    }

    #[test]
    fn test_commits_to_input_value() {
        let tx = tx();
        assert_ne!(all(&tx, 0, 1000), all(&tx, 0, 1001));
    }

    #[test]
    fn test_commits_to_outputs_and_index() {
        let tx = tx();
        let mut changed = tx.clone();
        changed.outputs[0].value = Amount::from_sat(999);

        assert_ne!(all(&tx, 0, 5), all(&changed, 0, 5));
        assert_ne!(all(&tx, 0, 5), all(&tx, 1, 5));
    }

    #[test]
    fn test_branch_id_separates_chains() {
        let tx = tx();
        let a = signature_hash(&tx, 0, &[], Amount::ZERO, SigHashType::All, BRANCH_ID).unwrap();
        let b = signature_hash(&tx, 0, &[], Amount::ZERO, SigHashType::All, 0x2bb4_0e60).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_script_sig_not_committed() {
        let tx = tx();
        let mut signed = tx.clone();
        signed.inputs[1].script_sig = vec![0x00, 0x01, 0xff];
        assert_eq!(all(&tx, 0, 5), all(&signed, 0, 5));
    }

    #[test]
    fn test_out_of_range_input() {
        let result = signature_hash(&tx(), 5, &[], Amount::ZERO, SigHashType::All, BRANCH_ID);
        assert_eq!(
            result,
            Err(SighashError::InputOutOfRange { index: 5, count: 2 })
        );
    }
}
