//! Unspent transaction outputs as reported by the indexer

use super::amount::Amount;
use serde::{Deserialize, Serialize};

/// Unspent Transaction Output (UTXO)
///
/// `txid` is in display (big-endian) hex, the form explorers and users see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Utxo {
    pub txid: String,
    pub vout: u32,
    #[serde(rename = "scriptPubKey")]
    pub script_pubkey: String,
    pub satoshis: Amount,
}

impl Utxo {
    pub fn new(
        txid: impl Into<String>,
        vout: u32,
        script_pubkey: impl Into<String>,
        satoshis: Amount,
    ) -> Self {
        Self {
            txid: txid.into(),
            vout,
            script_pubkey: script_pubkey.into(),
            satoshis,
        }
    }

    /// Check whether this output is the one referenced by `txid:vout`
    pub fn is_outpoint(&self, txid: &str, vout: u32) -> bool {
        self.vout == vout && self.txid.eq_ignore_ascii_case(txid)
    }
}

/// Find the UTXO referenced by a display txid and output index
pub fn find_utxo<'a>(utxos: &'a [Utxo], txid: &str, vout: u32) -> Option<&'a Utxo> {
    utxos.iter().find(|u| u.is_outpoint(txid, vout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_utxo_matches_txid_and_index() {
        let utxos = vec![
            Utxo::new("aa".repeat(32), 0, "", Amount::from_sat(1)),
            Utxo::new("aa".repeat(32), 1, "", Amount::from_sat(2)),
        ];

        let found = find_utxo(&utxos, &"AA".repeat(32), 1).unwrap();
        assert_eq!(found.satoshis, Amount::from_sat(2));
        assert!(find_utxo(&utxos, &"aa".repeat(32), 2).is_none());
        assert!(find_utxo(&utxos, &"bb".repeat(32), 0).is_none());
    }

    #[test]
    fn test_json_shape() {
        let json = r#"{"txid":"ab","vout":3,"scriptPubKey":"a914","satoshis":"500"}"#;
        let utxo: Utxo = serde_json::from_str(json).unwrap();
        assert_eq!(utxo.vout, 3);
        assert_eq!(utxo.satoshis.as_sat(), 500);
    }
}
