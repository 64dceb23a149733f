//! Insight explorer client
//!
//! Reads an address's unspent outputs and broadcasts finalized transactions:
//! - `GET  {explorer}/api/addr/{address}/utxo`
//! - `POST {explorer}/api/tx/send` with `{"rawtx": hex}`
//!
//! Responses are validated against a strict shape at this boundary; a
//! malformed record fails the whole fetch instead of being coerced.

use super::source::UtxoSource;
use crate::config::{ChainError, EngineConfig};
use crate::core::encoding::internal_txid;
use crate::core::{Amount, Utxo};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors talking to the explorer
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Malformed explorer response: {0}")]
    Schema(String),
    #[error("Chain error: {0}")]
    Chain(#[from] ChainError),
}

/// UTXO record as served by Insight
#[derive(Debug, Deserialize)]
struct ExplorerUtxo {
    txid: String,
    vout: u32,
    #[serde(rename = "scriptPubKey")]
    script_pubkey: String,
    satoshis: Amount,
}

impl TryFrom<ExplorerUtxo> for Utxo {
    type Error = FetchError;

    fn try_from(record: ExplorerUtxo) -> Result<Self, Self::Error> {
        internal_txid(&record.txid)
            .map_err(|_| FetchError::Schema(format!("invalid txid {:?}", record.txid)))?;
        hex::decode(&record.script_pubkey).map_err(|_| {
            FetchError::Schema(format!("invalid scriptPubKey {:?}", record.script_pubkey))
        })?;

        Ok(Utxo {
            txid: record.txid.to_ascii_lowercase(),
            vout: record.vout,
            script_pubkey: record.script_pubkey.to_ascii_lowercase(),
            satoshis: record.satoshis,
        })
    }
}

#[derive(Serialize)]
struct BroadcastRequest<'a> {
    rawtx: &'a str,
}

#[derive(Deserialize)]
struct BroadcastResponse {
    txid: String,
}

/// HTTP client for an Insight explorer
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    client: reqwest::Client,
    base_url: String,
}

impl ExplorerClient {
    /// Create a client for `base_url` (scheme included, e.g. `https://host`)
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Client for the explorer named by the configuration
    pub fn from_config(config: &EngineConfig) -> Result<Self, FetchError> {
        Self::new(&config.explorer_url()?, config.http_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Fetch the unspent outputs of `address`, surfacing every failure
    pub async fn fetch_utxos(&self, address: &str) -> Result<Vec<Utxo>, FetchError> {
        let url = format!("{}/api/addr/{}/utxo", self.base_url, address);
        log::debug!("Fetching UTXOs from {}", url);

        let records: Vec<ExplorerUtxo> = self
            .client
            .get(&url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let utxos = records
            .into_iter()
            .map(Utxo::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!("Explorer returned {} UTXOs for {}", utxos.len(), address);
        Ok(utxos)
    }

    /// Broadcast a finalized transaction, returning the txid the node reports
    pub async fn broadcast(&self, raw_tx_hex: &str) -> Result<String, FetchError> {
        let url = format!("{}/api/tx/send", self.base_url);
        let response: BroadcastResponse = self
            .client
            .post(&url)
            .json(&BroadcastRequest { rawtx: raw_tx_hex })
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        log::info!("Broadcast transaction {}", response.txid);
        Ok(response.txid)
    }
}

#[async_trait]
impl UtxoSource for ExplorerClient {
    async fn utxos(&self, address: &str) -> Vec<Utxo> {
        match self.fetch_utxos(address).await {
            Ok(utxos) => utxos,
            Err(e) => {
                log::warn!("Failed to fetch UTXOs for {}: {}", address, e);
                Vec::new()
            }
        }
    }
}
