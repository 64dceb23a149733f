//! Networking collaborators
//!
//! The engine's only outbound calls:
//! - UTXO lookups and broadcast through an Insight explorer
//! - Handing partially signed transactions to the relay
//!
//! None of them retry; timeouts come from the HTTP client configuration.

pub mod explorer;
pub mod relay;
pub mod source;

pub use explorer::{ExplorerClient, FetchError};
pub use relay::{RelayAction, RelayClient, RelayError, ACTION_TX};
pub use source::{StaticSource, UtxoSource};
