//! Relay client
//!
//! Hands a partially signed transaction to the co-signing key device via the
//! relay service. The payload is opaque to the relay and the response body is
//! not interpreted.

use crate::config::EngineConfig;
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Relay errors
#[derive(Error, Debug)]
pub enum RelayError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("No wallet identity configured for the relay")]
    MissingIdentity,
}

/// Action kinds understood by the key device
pub const ACTION_TX: &str = "tx";

/// Body of `POST /v1/action`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RelayAction<'a> {
    pub action: &'a str,
    pub payload: &'a str,
    pub chain: &'a str,
    pub wk_identity: &'a str,
}

/// HTTP client for the relay service
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, RelayError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &EngineConfig) -> Result<Self, RelayError> {
        Self::new(&config.relay, config.http_timeout())
    }

    /// Post an action for the wallet/key pair identified by `wk_identity`
    pub async fn post_action(&self, action: &RelayAction<'_>) -> Result<(), RelayError> {
        let url = format!("{}/v1/action", self.base_url);
        log::debug!("Posting {} action for {} to relay", action.action, action.wk_identity);

        self.client
            .post(&url)
            .json(action)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }

    /// Send a partially signed transaction to the co-signer
    pub async fn send_transaction(
        &self,
        tx_hex: &str,
        chain: &str,
        wk_identity: Option<&str>,
    ) -> Result<(), RelayError> {
        let wk_identity = wk_identity.ok_or(RelayError::MissingIdentity)?;
        self.post_action(&RelayAction {
            action: ACTION_TX,
            payload: tx_hex,
            chain,
            wk_identity,
        })
        .await
    }
}
