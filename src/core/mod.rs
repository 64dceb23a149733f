//! Core transaction components
//!
//! This module contains the fundamental building blocks:
//! - Smallest-unit amounts with checked arithmetic
//! - UTXOs as reported by the indexer
//! - Wire encoding and txid byte-order conversion
//! - Script parsing and standard locking scripts
//! - Transparent Sapling transactions
//! - ZIP-243 signature hashing

pub mod amount;
pub mod encoding;
pub mod script;
pub mod sighash;
pub mod transaction;
pub mod utxo;

pub use amount::{Amount, AmountError, COIN, MAX_WIRE_VALUE};
pub use encoding::{display_txid, internal_txid, DecodeError};
pub use script::{Instruction, ScriptError, SigHashType};
pub use sighash::{signature_hash, SighashError};
pub use transaction::{
    Transaction, TransactionError, TxInput, TxOutput, OVERWINTER_FLAG, SAPLING_VERSION,
    SAPLING_VERSION_GROUP_ID, SEQUENCE_FINAL,
};
pub use utxo::{find_utxo, Utxo};
