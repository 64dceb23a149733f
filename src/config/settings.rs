//! Engine settings
//!
//! Endpoints and client options, loaded from a JSON file and overridable
//! from the command line. Key material never lives here.

use super::chains::{chain_params, ChainError, ChainParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Chain error: {0}")]
    ChainError(#[from] ChainError),
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EngineConfig {
    /// Chain id (see `config::chains`)
    pub chain: String,
    /// Explorer base URL; the chain default when unset
    pub explorer: Option<String>,
    /// Relay base URL
    pub relay: String,
    /// Identity of the wallet/key pair on the relay
    pub wallet_identity: Option<String>,
    /// Timeout applied to every HTTP request, in seconds
    pub http_timeout_secs: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            chain: "flux".to_string(),
            explorer: None,
            relay: "https://relay.ssp.runonflux.io".to_string(),
            wallet_identity: None,
            http_timeout_secs: 30,
        }
    }
}

impl EngineConfig {
    /// Load configuration from a JSON file; missing fields take defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config: EngineConfig = serde_json::from_reader(reader)?;
        config.chain_params()?;
        Ok(config)
    }

    /// Load from `path` if given, defaults otherwise
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Save configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let file = fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Parameters of the configured chain
    pub fn chain_params(&self) -> Result<&'static ChainParams, ChainError> {
        chain_params(&self.chain)
    }

    /// Explorer base URL without a trailing slash
    pub fn explorer_url(&self) -> Result<String, ChainError> {
        let url = match &self.explorer {
            Some(url) => url.clone(),
            None => self.chain_params()?.explorer.to_string(),
        };
        Ok(url.trim_end_matches('/').to_string())
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }
}
