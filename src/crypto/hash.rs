//! Hashing primitives used by the transaction engine
//!
//! SHA-256 family for transaction ids and address checksums, HASH160 for
//! script and key hashes, and personalized BLAKE2b for Sapling signature
//! hashes.

use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

/// Length of a BLAKE2b personalization string
pub const PERSONALIZATION_LEN: usize = 16;

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes double SHA-256 hash (SHA-256 of SHA-256)
/// Used for transaction ids
pub fn double_sha256(data: &[u8]) -> [u8; 32] {
    sha256(&sha256(data))
}

/// RIPEMD-160 of SHA-256, the hash behind P2PKH and P2SH addresses
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let mut ripemd = Ripemd160::new();
    ripemd.update(sha256(data));
    ripemd.finalize().into()
}

/// BLAKE2b-256 with a 16 byte personalization
pub fn blake2b_personal(personal: &[u8; PERSONALIZATION_LEN], data: &[u8]) -> [u8; 32] {
    let hash = blake2b_simd::Params::new()
        .hash_length(32)
        .personal(personal)
        .hash(data);

    let mut out = [0u8; 32];
    out.copy_from_slice(hash.as_bytes());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256() {
        let hash = sha256(b"hello world");
        assert_eq!(
            hex::encode(hash),
            "b94d27b9934d3e08a52e52d7da7dabfac484efe37a5380ee9088f7ace2efcde9"
        );
    }

    #[test]
    fn test_double_sha256() {
        let data = b"hello world";
        assert_eq!(double_sha256(data), sha256(&sha256(data)));
    }

    #[test]
    fn test_hash160_length_and_determinism() {
        let a = hash160(b"redeem");
        let b = hash160(b"redeem");
        assert_eq!(a, b);
        assert_ne!(a, hash160(b"other"));
    }

    #[test]
    fn test_personalization_changes_digest() {
        let data = b"same data";
        let a = blake2b_personal(b"ZcashPrevoutHash", data);
        let b = blake2b_personal(b"ZcashOutputsHash", data);
        assert_ne!(a, b);
        assert_eq!(a, blake2b_personal(b"ZcashPrevoutHash", data));
    }
}
