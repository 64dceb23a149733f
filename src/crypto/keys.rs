//! ECDSA key handling for multisig signing
//!
//! Imports private keys from Wallet Import Format (WIF), produces DER
//! signatures over 32 byte digests and verifies them, all on secp256k1.

use rand::rngs::OsRng;
use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use thiserror::Error;

/// Flag byte appended to a WIF payload when the public key is compressed
const WIF_COMPRESSED_FLAG: u8 = 0x01;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("Invalid WIF encoding: {0}")]
    InvalidWif(String),
    #[error("WIF network prefix mismatch: expected {expected:#04x}, got {actual:#04x}")]
    WrongNetwork { expected: u8, actual: u8 },
    #[error("Invalid private key")]
    InvalidPrivateKey,
    #[error("Invalid public key")]
    InvalidPublicKey,
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub secret_key: SecretKey,
    pub public_key: PublicKey,
    /// Whether the public key is serialized in compressed form
    pub compressed: bool,
}

impl KeyPair {
    /// Generate a new random key pair (compressed)
    pub fn generate() -> Self {
        let secp = Secp256k1::new();
        let (secret_key, public_key) = secp.generate_keypair(&mut OsRng);
        Self {
            secret_key,
            public_key,
            compressed: true,
        }
    }

    /// Create a key pair from an existing secret key
    pub fn from_secret_key(secret_key: SecretKey, compressed: bool) -> Self {
        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);
        Self {
            secret_key,
            public_key,
            compressed,
        }
    }

    /// Decode a WIF private key, checking its network prefix
    ///
    /// WIF layout: `prefix | 32 byte key | [0x01 if compressed]`, Base58Check encoded.
    pub fn from_wif(wif: &str, prefix: u8) -> Result<Self, KeyError> {
        let payload = bs58::decode(wif.trim())
            .with_check(None)
            .into_vec()
            .map_err(|e| KeyError::InvalidWif(e.to_string()))?;

        let (version, body) = payload
            .split_first()
            .ok_or_else(|| KeyError::InvalidWif("empty payload".to_string()))?;
        if *version != prefix {
            return Err(KeyError::WrongNetwork {
                expected: prefix,
                actual: *version,
            });
        }

        let (key_bytes, compressed) = match body.len() {
            32 => (body, false),
            33 if body[32] == WIF_COMPRESSED_FLAG => (&body[..32], true),
            len => {
                return Err(KeyError::InvalidWif(format!(
                    "unexpected payload length {}",
                    len
                )))
            }
        };

        let secret_key =
            SecretKey::from_slice(key_bytes).map_err(|_| KeyError::InvalidPrivateKey)?;
        Ok(Self::from_secret_key(secret_key, compressed))
    }

    /// Encode the private key as WIF with the given network prefix
    pub fn to_wif(&self, prefix: u8) -> String {
        let mut payload = Vec::with_capacity(34);
        payload.push(prefix);
        payload.extend_from_slice(&self.secret_key.secret_bytes());
        if self.compressed {
            payload.push(WIF_COMPRESSED_FLAG);
        }
        bs58::encode(payload).with_check().into_string()
    }

    /// Serialized public key, in the form recorded by the WIF flag
    pub fn public_key_bytes(&self) -> Vec<u8> {
        if self.compressed {
            self.public_key.serialize().to_vec()
        } else {
            self.public_key.serialize_uncompressed().to_vec()
        }
    }

    /// Get the public key as a hex string
    pub fn public_key_hex(&self) -> String {
        hex::encode(self.public_key_bytes())
    }

    /// Sign a 32 byte digest, returning a low-S DER signature
    pub fn sign_digest(&self, digest: &[u8; 32]) -> Vec<u8> {
        let secp = Secp256k1::signing_only();
        let message = Message::from_digest(*digest);
        secp.sign_ecdsa(&message, &self.secret_key)
            .serialize_der()
            .to_vec()
    }
}

/// Parse a public key from its serialized bytes
pub fn public_key_from_slice(bytes: &[u8]) -> Result<PublicKey, KeyError> {
    PublicKey::from_slice(bytes).map_err(|_| KeyError::InvalidPublicKey)
}

/// Verify a DER signature over a 32 byte digest
///
/// High-S signatures are normalized before verification.
pub fn verify_der(public_key: &PublicKey, digest: &[u8; 32], der: &[u8]) -> bool {
    let secp = Secp256k1::verification_only();
    let message = Message::from_digest(*digest);
    let mut signature = match Signature::from_der(der) {
        Ok(sig) => sig,
        Err(_) => return false,
    };
    signature.normalize_s();
    secp.verify_ecdsa(&message, &signature, public_key).is_ok()
}
