//! Multi-signature spending support
//!
//! Spends from P2SH M-of-N addresses where each co-signer adds a signature
//! in turn and the last one finalizes.
//!
//! # Example
//!
//! ```ignore
//! use multisig_spend::multisig::{finalize, sign};
//!
//! // First co-signer
//! let partial = sign(&unsigned_hex, "flux", &wif_a, &redeem_hex, &utxos)?;
//!
//! // Second co-signer completes and finalizes
//! let signed = sign(&partial, "flux", &wif_b, &redeem_hex, &utxos)?;
//! let final_hex = finalize(&signed, "flux")?;
//! ```

pub mod finalizer;
pub mod redeem;
pub mod signer;

pub use finalizer::{finalize, signature_status, FinalizeError, InputStatus};
pub use redeem::{MultisigScriptSig, RedeemScript};
pub use signer::{sign, sign_transaction, SignError};

#[cfg(test)]
pub(crate) mod testutil {
    use super::redeem::{MultisigScriptSig, RedeemScript};
    use super::signer::{sign, SignError};
    use crate::config::FLUX;
    use crate::core::{Amount, Transaction, Utxo};
    use crate::crypto::{pubkey_address, KeyPair};
    use crate::wallet::build_unsigned;

    /// M-of-N keys, two funding UTXOs on their address and an unsigned spend
    pub struct Fixture {
        pub keys: Vec<KeyPair>,
        pub redeem: RedeemScript,
        pub sender: String,
        pub utxos: Vec<Utxo>,
        pub unsigned: String,
    }

    impl Fixture {
        pub fn new(threshold: u8, signers: usize) -> Self {
            let keys: Vec<KeyPair> = (0..signers).map(|_| KeyPair::generate()).collect();
            let pubkeys: Vec<Vec<u8>> = keys.iter().map(|k| k.public_key_bytes()).collect();
            let redeem = RedeemScript::multisig(threshold, &pubkeys).unwrap();
            let sender = FLUX.multisig_address(redeem.as_bytes());
            let lock = hex::encode(FLUX.script_for_address(&sender).unwrap());

            let utxos = vec![
                Utxo::new(
                    format!("aa{}", "11".repeat(31)),
                    0,
                    lock.clone(),
                    Amount::from_sat(500_000),
                ),
                Utxo::new(format!("{}bb", "22".repeat(31)), 1, lock, Amount::from_sat(300_000)),
            ];
            let receiver =
                pubkey_address(FLUX.pubkey_prefix, &KeyPair::generate().public_key_bytes());
            let tx = build_unsigned(
                &FLUX,
                &utxos,
                &receiver,
                Amount::from_sat(600_000),
                Amount::from_sat(10_000),
                &sender,
                Some("rent"),
            )
            .unwrap();

            Self {
                keys,
                redeem,
                sender,
                utxos,
                unsigned: tx.to_hex(),
            }
        }

        pub fn wif(&self, i: usize) -> String {
            self.keys[i].to_wif(FLUX.wif_prefix)
        }

        pub fn sign(&self, tx_hex: &str, i: usize) -> Result<String, SignError> {
            sign(tx_hex, "flux", &self.wif(i), &self.redeem.to_hex(), &self.utxos)
        }
    }

    /// Signature slots of one input of a partially signed transaction
    pub fn slots(tx_hex: &str, input: usize) -> Vec<Vec<u8>> {
        let tx = Transaction::from_hex(tx_hex).unwrap();
        MultisigScriptSig::parse(&tx.inputs[input].script_sig)
            .unwrap()
            .signatures
    }
}
