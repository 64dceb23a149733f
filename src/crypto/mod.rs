//! Cryptographic utilities for the spend engine
//!
//! This module provides:
//! - SHA-256, HASH160 and personalized BLAKE2b hashing
//! - WIF key import and ECDSA signing (secp256k1)
//! - Base58Check transparent addresses

pub mod address;
pub mod hash;
pub mod keys;

pub use address::{
    decode_address, encode_address, pubkey_address, script_address, AddressError,
    DecodedAddress,
};
pub use hash::{blake2b_personal, double_sha256, hash160, sha256};
pub use keys::{public_key_from_slice, verify_der, KeyError, KeyPair};
