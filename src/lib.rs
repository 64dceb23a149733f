//! Multisig-Spend: a transparent multisig spend engine for Flux in Rust
//!
//! This crate turns "send N coins from a P2SH multisig address" into a
//! partially signed transaction that the remaining co-signers complete:
//! - UTXO lookup through an Insight explorer (fail-soft)
//! - Seven-policy coin selection with an input-count ceiling
//! - Sapling (v4) raw transaction building with change and OP_RETURN memo
//! - ZIP-243 signature hashing and partial M-of-N signing
//! - Finalization into the canonical multisig scriptSig
//!
//! # Example
//!
//! ```rust,no_run
//! use multisig_spend::network::ExplorerClient;
//! use multisig_spend::wallet::{spend, SpendRequest};
//! use std::time::Duration;
//!
//! # async fn run(request: SpendRequest) -> Result<(), Box<dyn std::error::Error>> {
//! let explorer = ExplorerClient::new("https://explorer.runonflux.io", Duration::from_secs(30))?;
//!
//! // Fetch, select, build and sign with the local key
//! let partially_signed = spend(&explorer, &request).await?;
//! println!("Hand to co-signer: {}", partially_signed);
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod crypto;
pub mod multisig;
pub mod network;
pub mod wallet;

// Re-export commonly used types
pub use config::{chain_params, ChainParams, EngineConfig};
pub use core::{Amount, Transaction, Utxo};
pub use crypto::KeyPair;
pub use multisig::{finalize, sign, RedeemScript};
pub use network::{ExplorerClient, UtxoSource};
pub use wallet::{build_unsigned, select, spend, SpendRequest};
