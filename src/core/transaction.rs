//! Transparent Sapling (v4) transactions
//!
//! Flux-family chains use the Zcash Sapling transaction format. This engine
//! only produces and consumes fully transparent transactions: the shielded
//! spend, output and JoinSplit vectors are always empty.
//!
//! Wire layout:
//! - header (`version | 1 << 31`), version group id
//! - inputs, outputs
//! - lock time, expiry height
//! - value balance, empty shielded spends/outputs, no JoinSplits

use super::amount::Amount;
use super::encoding::{
    decode_hex, display_txid, write_compact_size, write_var_bytes, DecodeError, Reader,
};
use crate::crypto::double_sha256;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Constants
// =============================================================================

/// Header bit marking Overwinter-and-later transactions
pub const OVERWINTER_FLAG: u32 = 1 << 31;

/// Sapling transaction version
pub const SAPLING_VERSION: u32 = 4;

/// Sapling version group id
pub const SAPLING_VERSION_GROUP_ID: u32 = 0x892f_2085;

/// Sequence number that disables locktime
pub const SEQUENCE_FINAL: u32 = 0xFFFF_FFFF;

// =============================================================================
// Error Types
// =============================================================================

/// Transaction decoding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
    #[error("Unsupported transaction version {version} (overwintered: {overwintered})")]
    UnsupportedVersion { version: u32, overwintered: bool },
    #[error("Unexpected version group id {0:#010x}")]
    UnexpectedVersionGroup(u32),
    #[error("Shielded components are not supported")]
    ShieldedUnsupported,
    #[error("Negative output value {0}")]
    NegativeValue(i64),
}

// =============================================================================
// Inputs and Outputs
// =============================================================================

/// Transaction input (reference to a previous output)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxInput {
    /// Previous transaction hash, internal byte order
    pub prev_hash: [u8; 32],
    /// Index of the output in the previous transaction
    pub prev_index: u32,
    /// Unlocking script (empty until signed)
    pub script_sig: Vec<u8>,
    pub sequence: u32,
}

impl TxInput {
    /// Unsigned input spending `prev_hash:prev_index`
    pub fn new(prev_hash: [u8; 32], prev_index: u32) -> Self {
        Self {
            prev_hash,
            prev_index,
            script_sig: Vec::new(),
            sequence: SEQUENCE_FINAL,
        }
    }

    /// Display txid of the output being spent
    pub fn prev_txid(&self) -> String {
        display_txid(&self.prev_hash)
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.prev_hash);
        out.extend_from_slice(&self.prev_index.to_le_bytes());
        write_var_bytes(out, &self.script_sig);
        out.extend_from_slice(&self.sequence.to_le_bytes());
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, TransactionError> {
        Ok(Self {
            prev_hash: reader.read_array()?,
            prev_index: reader.read_u32()?,
            script_sig: reader.read_var_bytes()?,
            sequence: reader.read_u32()?,
        })
    }
}

/// Transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TxOutput {
    pub value: Amount,
    pub script_pubkey: Vec<u8>,
}

impl TxOutput {
    pub fn new(value: Amount, script_pubkey: Vec<u8>) -> Self {
        Self {
            value,
            script_pubkey,
        }
    }

    /// Serialized form, as committed to by signature hashes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(9 + self.script_pubkey.len());
        self.write(&mut out);
        out
    }

    fn write(&self, out: &mut Vec<u8>) {
        out.extend_from_slice(&(self.value.as_sat() as i64).to_le_bytes());
        write_var_bytes(out, &self.script_pubkey);
    }

    fn read(reader: &mut Reader<'_>) -> Result<Self, TransactionError> {
        let value = reader.read_i64()?;
        if value < 0 {
            return Err(TransactionError::NegativeValue(value));
        }
        Ok(Self {
            value: Amount::from_sat(value as u64),
            script_pubkey: reader.read_var_bytes()?,
        })
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// A transparent Sapling transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub version_group_id: u32,
    pub inputs: Vec<TxInput>,
    pub outputs: Vec<TxOutput>,
    pub lock_time: u32,
    pub expiry_height: u32,
    /// Net shielded value; always zero for transparent transactions
    pub value_balance: i64,
}

impl Transaction {
    /// Create an empty transaction with the given version fields
    pub fn new(version: u32, version_group_id: u32) -> Self {
        Self {
            version,
            version_group_id,
            inputs: Vec::new(),
            outputs: Vec::new(),
            lock_time: 0,
            expiry_height: 0,
            value_balance: 0,
        }
    }

    /// The 32-bit header word (version with the overwinter flag)
    pub fn header(&self) -> u32 {
        self.version | OVERWINTER_FLAG
    }

    /// Serialize to wire bytes
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.header().to_le_bytes());
        out.extend_from_slice(&self.version_group_id.to_le_bytes());

        write_compact_size(&mut out, self.inputs.len() as u64);
        for input in &self.inputs {
            input.write(&mut out);
        }
        write_compact_size(&mut out, self.outputs.len() as u64);
        for output in &self.outputs {
            output.write(&mut out);
        }

        out.extend_from_slice(&self.lock_time.to_le_bytes());
        out.extend_from_slice(&self.expiry_height.to_le_bytes());
        out.extend_from_slice(&self.value_balance.to_le_bytes());
        // vShieldedSpend, vShieldedOutput, vJoinSplit
        write_compact_size(&mut out, 0);
        write_compact_size(&mut out, 0);
        write_compact_size(&mut out, 0);
        out
    }

    /// Serialize to lowercase hex
    pub fn to_hex(&self) -> String {
        hex::encode(self.to_bytes())
    }

    /// Parse wire bytes; the whole buffer must be consumed
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, TransactionError> {
        let mut reader = Reader::new(bytes);

        let header = reader.read_u32()?;
        let overwintered = header & OVERWINTER_FLAG != 0;
        let version = header & !OVERWINTER_FLAG;
        if !overwintered || version != SAPLING_VERSION {
            return Err(TransactionError::UnsupportedVersion {
                version,
                overwintered,
            });
        }

        let version_group_id = reader.read_u32()?;
        if version_group_id != SAPLING_VERSION_GROUP_ID {
            return Err(TransactionError::UnexpectedVersionGroup(version_group_id));
        }

        let input_count = reader.read_len()?;
        let mut inputs = Vec::with_capacity(input_count.min(1024));
        for _ in 0..input_count {
            inputs.push(TxInput::read(&mut reader)?);
        }

        let output_count = reader.read_len()?;
        let mut outputs = Vec::with_capacity(output_count.min(1024));
        for _ in 0..output_count {
            outputs.push(TxOutput::read(&mut reader)?);
        }

        let lock_time = reader.read_u32()?;
        let expiry_height = reader.read_u32()?;
        let value_balance = reader.read_i64()?;

        let spends = reader.read_compact_size()?;
        let shielded_outputs = reader.read_compact_size()?;
        let joinsplits = reader.read_compact_size()?;
        if spends != 0 || shielded_outputs != 0 || joinsplits != 0 || value_balance != 0 {
            return Err(TransactionError::ShieldedUnsupported);
        }

        reader.finish()?;

        Ok(Self {
            version,
            version_group_id,
            inputs,
            outputs,
            lock_time,
            expiry_height,
            value_balance,
        })
    }

    /// Parse from hex
    pub fn from_hex(text: &str) -> Result<Self, TransactionError> {
        Self::from_bytes(&decode_hex(text)?)
    }

    /// Transaction id in display order
    pub fn txid(&self) -> String {
        display_txid(&double_sha256(&self.to_bytes()))
    }

    /// Get total output amount
    pub fn total_output(&self) -> u128 {
        Amount::total(self.outputs.iter().map(|o| &o.value))
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::script::{null_data_script, p2pkh_script};
    use crate::core::vectors;

    fn sample_tx() -> Transaction {
        let mut tx = Transaction::new(SAPLING_VERSION, SAPLING_VERSION_GROUP_ID);
        tx.inputs.push(TxInput::new([0x11; 32], 0));
        tx.inputs.push(TxInput::new([0x22; 32], 7));
        tx.outputs.push(TxOutput::new(Amount::from_sat(800_000), p2pkh_script(&[1u8; 20])));
        tx.outputs.push(TxOutput::new(Amount::ZERO, null_data_script(b"memo")));
        tx
    }

    #[test]
    fn test_reference_serialization_and_txid() {
        let tx = vectors::transaction();
        assert_eq!(tx.to_hex(), vectors::TX_HEX);
        assert_eq!(tx.txid(), vectors::TXID);
        assert_eq!(Transaction::from_hex(vectors::TX_HEX).unwrap(), tx);
    }

    #[test]
    fn test_header_bytes() {
        let bytes = sample_tx().to_bytes();
        assert_eq!(&bytes[..4], &[0x04, 0x00, 0x00, 0x80]);
        assert_eq!(&bytes[4..8], &[0x85, 0x20, 0x2f, 0x89]);
    }

    #[test]
    fn test_parse_serialized() {
        let tx = sample_tx();
        let parsed = Transaction::from_hex(&tx.to_hex()).unwrap();
        assert_eq!(parsed, tx);
        assert_eq!(parsed.total_output(), 800_000);
        assert_eq!(parsed.inputs[1].prev_index, 7);
        assert_eq!(parsed.inputs[0].sequence, SEQUENCE_FINAL);
    }

    #[test]
    fn test_empty_transaction_size() {
        // header 8 + 2 counts + locktime/expiry 8 + value balance 8 + 3 counts
        let tx = Transaction::new(SAPLING_VERSION, SAPLING_VERSION_GROUP_ID);
        assert_eq!(tx.to_bytes().len(), 29);
    }

    #[test]
    fn test_txid_changes_with_content() {
        let tx = sample_tx();
        let mut other = tx.clone();
        other.outputs[0].value = Amount::from_sat(1);
        assert_eq!(tx.txid().len(), 64);
        assert_ne!(tx.txid(), other.txid());
    }

    #[test]
    fn test_rejects_trailing_bytes() {
        let mut hex = sample_tx().to_hex();
        hex.push_str("00");
        assert!(matches!(
            Transaction::from_hex(&hex),
            Err(TransactionError::Decode(DecodeError::TrailingBytes(1)))
        ));
    }

    #[test]
    fn test_rejects_truncation_and_bad_hex() {
        let hex = sample_tx().to_hex();
        assert!(Transaction::from_hex(&hex[..hex.len() - 10]).is_err());
        assert!(matches!(
            Transaction::from_hex("zz"),
            Err(TransactionError::Decode(DecodeError::InvalidHex(_)))
        ));
    }

    #[test]
    fn test_rejects_legacy_version() {
        let mut bytes = sample_tx().to_bytes();
        bytes[3] = 0x00;
        assert!(matches!(
            Transaction::from_bytes(&bytes),
            Err(TransactionError::UnsupportedVersion {
                version: 4,
                overwintered: false
            })
        ));
    }

    #[test]
    fn test_rejects_negative_value() {
        let mut tx = sample_tx();
        tx.outputs.truncate(1);
        let mut bytes = tx.to_bytes();
        // value of the single output sits right after the output count
        let value_offset = 8 + 1 + 2 * (32 + 4 + 1 + 4) + 1;
        bytes[value_offset..value_offset + 8].copy_from_slice(&(-1i64).to_le_bytes());
        assert_eq!(
            Transaction::from_bytes(&bytes),
            Err(TransactionError::NegativeValue(-1))
        );
    }
}
