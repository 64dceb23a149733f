//! UTXO sources
//!
//! The spend pipeline only needs "the spendable outputs of this address
//! right now". Sources are fail-soft: any failure yields an empty set, which
//! later surfaces as an infeasible selection.

use crate::core::Utxo;
use async_trait::async_trait;

/// Provider of the current unspent outputs of an address
#[async_trait]
pub trait UtxoSource: Send + Sync {
    /// Spendable outputs of `address`; empty on any failure
    async fn utxos(&self, address: &str) -> Vec<Utxo>;
}

/// A fixed UTXO set, for offline use and tests
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    utxos: Vec<Utxo>,
}

impl StaticSource {
    pub fn new(utxos: Vec<Utxo>) -> Self {
        Self { utxos }
    }
}

#[async_trait]
impl UtxoSource for StaticSource {
    async fn utxos(&self, _address: &str) -> Vec<Utxo> {
        self.utxos.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Amount;

    #[tokio::test]
    async fn test_static_source_returns_snapshot() {
        let utxo = Utxo::new("ab".repeat(32), 0, "", Amount::from_sat(10));
        let source = StaticSource::new(vec![utxo.clone()]);

        assert_eq!(source.utxos("any").await, vec![utxo.clone()]);
        assert_eq!(source.utxos("other").await, vec![utxo]);
        assert!(StaticSource::default().utxos("x").await.is_empty());
    }
}
