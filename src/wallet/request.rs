//! Spend requests

use crate::core::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Shortest receiver string accepted before any decoding is attempted
pub const MIN_RECEIVER_LEN: usize = 8;

/// Request validation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    #[error("Invalid receiver address {0:?}")]
    InvalidReceiver(String),
    #[error("Amount must be greater than zero")]
    ZeroAmount,
    #[error("Sender address is empty")]
    MissingSender,
}

/// Everything needed for one spend attempt
///
/// Built once per user action and not reused: amount or fee may change on a
/// retry. The private key is redacted from `Debug` output.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpendRequest {
    pub chain: String,
    pub sender: String,
    pub receiver: String,
    pub change: String,
    pub amount: Amount,
    pub fee: Amount,
    #[serde(default)]
    pub message: Option<String>,
    pub private_key_wif: String,
    pub redeem_script_hex: String,
}

impl SpendRequest {
    /// Reject requests the engine should not even try to fund
    pub fn validate(&self) -> Result<(), RequestError> {
        if self.sender.trim().is_empty() {
            return Err(RequestError::MissingSender);
        }
        if self.receiver.trim().len() < MIN_RECEIVER_LEN {
            return Err(RequestError::InvalidReceiver(self.receiver.clone()));
        }
        if self.amount == Amount::ZERO {
            return Err(RequestError::ZeroAmount);
        }
        Ok(())
    }

    /// Embedded message, treating an empty string as none
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref().filter(|m| !m.is_empty())
    }
}

impl fmt::Debug for SpendRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpendRequest")
            .field("chain", &self.chain)
            .field("sender", &self.sender)
            .field("receiver", &self.receiver)
            .field("change", &self.change)
            .field("amount", &self.amount)
            .field("fee", &self.fee)
            .field("message", &self.message)
            .field("private_key_wif", &"<redacted>")
            .field("redeem_script_hex", &self.redeem_script_hex)
            .finish()
    }
}
