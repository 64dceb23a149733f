//! Chain parameters and engine settings

pub mod chains;
pub mod settings;

pub use chains::{chain_params, ChainError, ChainParams, FLUX, FLUX_TESTNET, SAPLING_BRANCH_ID};
pub use settings::{ConfigError, EngineConfig};
