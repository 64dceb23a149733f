//! Chain parameters
//!
//! Protocol constants per supported chain. The transaction version pair and
//! the consensus branch id are fixed by the chain; requests never choose them.

use crate::core::script::{p2pkh_script, p2sh_script};
use crate::core::{SAPLING_VERSION, SAPLING_VERSION_GROUP_ID};
use crate::crypto::{decode_address, script_address, AddressError};
use thiserror::Error;

/// Sapling consensus branch id, used by the sighash personalization
pub const SAPLING_BRANCH_ID: u32 = 0x76b8_09bb;

/// Errors resolving chains and addresses
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    #[error("Unknown chain: {0}")]
    UnknownChain(String),
    #[error("Address error: {0}")]
    Address(#[from] AddressError),
    #[error("Address {address} does not belong to chain {chain}")]
    ForeignAddress { address: String, chain: String },
}

/// Static parameters of a Flux-family chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    /// Identifier used in requests and relay messages
    pub id: &'static str,
    pub name: &'static str,
    /// Base58 prefix of P2PKH addresses
    pub pubkey_prefix: [u8; 2],
    /// Base58 prefix of P2SH addresses
    pub script_prefix: [u8; 2],
    /// WIF private key prefix
    pub wif_prefix: u8,
    pub tx_version: u32,
    pub version_group_id: u32,
    pub consensus_branch_id: u32,
    /// Display decimals of the coin
    pub decimals: u32,
    /// Default Insight explorer base URL
    pub explorer: &'static str,
}

pub static FLUX: ChainParams = ChainParams {
    id: "flux",
    name: "Flux",
    pubkey_prefix: [0x1c, 0xb8],
    script_prefix: [0x1c, 0xbd],
    wif_prefix: 0x80,
    tx_version: SAPLING_VERSION,
    version_group_id: SAPLING_VERSION_GROUP_ID,
    consensus_branch_id: SAPLING_BRANCH_ID,
    decimals: 8,
    explorer: "https://explorer.runonflux.io",
};

pub static FLUX_TESTNET: ChainParams = ChainParams {
    id: "fluxTestnet",
    name: "Flux Testnet",
    pubkey_prefix: [0x1d, 0x25],
    script_prefix: [0x1c, 0xba],
    wif_prefix: 0xef,
    tx_version: SAPLING_VERSION,
    version_group_id: SAPLING_VERSION_GROUP_ID,
    consensus_branch_id: SAPLING_BRANCH_ID,
    decimals: 8,
    explorer: "https://testnet.runonflux.io",
};

/// All supported chains
pub static CHAINS: [&ChainParams; 2] = [&FLUX, &FLUX_TESTNET];

/// Look up chain parameters by id
pub fn chain_params(id: &str) -> Result<&'static ChainParams, ChainError> {
    CHAINS
        .iter()
        .copied()
        .find(|c| c.id == id)
        .ok_or_else(|| ChainError::UnknownChain(id.to_string()))
}

impl ChainParams {
    /// Locking script paying to `address`
    pub fn script_for_address(&self, address: &str) -> Result<Vec<u8>, ChainError> {
        let decoded = decode_address(address)?;
        if decoded.prefix == self.pubkey_prefix {
            Ok(p2pkh_script(&decoded.hash))
        } else if decoded.prefix == self.script_prefix {
            Ok(p2sh_script(&decoded.hash))
        } else {
            Err(ChainError::ForeignAddress {
                address: address.to_string(),
                chain: self.id.to_string(),
            })
        }
    }

    /// Multisig (P2SH) address of a redeem script on this chain
    pub fn multisig_address(&self, redeem_script: &[u8]) -> String {
        script_address(self.script_prefix, redeem_script)
    }
}
