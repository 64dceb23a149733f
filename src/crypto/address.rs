//! Base58Check transparent addresses
//!
//! Flux-family addresses carry a two byte version prefix followed by a
//! 20 byte HASH160 (of a public key for P2PKH, of a redeem script for P2SH).

use super::hash::hash160;
use thiserror::Error;

/// Length of the address version prefix
pub const ADDRESS_PREFIX_LEN: usize = 2;

/// Errors decoding an address
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("Invalid base58check address {0}")]
    InvalidEncoding(String),
    #[error("Invalid address length {0}, expected 22 bytes")]
    InvalidLength(usize),
}

/// A decoded address: version prefix plus hash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedAddress {
    pub prefix: [u8; ADDRESS_PREFIX_LEN],
    pub hash: [u8; 20],
}

/// Encode a 20 byte hash with the given prefix
pub fn encode_address(prefix: [u8; ADDRESS_PREFIX_LEN], hash: &[u8; 20]) -> String {
    let mut payload = Vec::with_capacity(ADDRESS_PREFIX_LEN + 20);
    payload.extend_from_slice(&prefix);
    payload.extend_from_slice(hash);
    bs58::encode(payload).with_check().into_string()
}

/// Decode a Base58Check address into its prefix and hash
pub fn decode_address(address: &str) -> Result<DecodedAddress, AddressError> {
    let payload = bs58::decode(address)
        .with_check(None)
        .into_vec()
        .map_err(|_| AddressError::InvalidEncoding(address.to_string()))?;

    if payload.len() != ADDRESS_PREFIX_LEN + 20 {
        return Err(AddressError::InvalidLength(payload.len()));
    }

    let mut prefix = [0u8; ADDRESS_PREFIX_LEN];
    prefix.copy_from_slice(&payload[..ADDRESS_PREFIX_LEN]);
    let mut hash = [0u8; 20];
    hash.copy_from_slice(&payload[ADDRESS_PREFIX_LEN..]);

    Ok(DecodedAddress { prefix, hash })
}

/// Address paying to the hash of a serialized public key
pub fn pubkey_address(prefix: [u8; ADDRESS_PREFIX_LEN], public_key: &[u8]) -> String {
    encode_address(prefix, &hash160(public_key))
}

/// Address paying to the hash of a redeem script
pub fn script_address(prefix: [u8; ADDRESS_PREFIX_LEN], redeem_script: &[u8]) -> String {
    encode_address(prefix, &hash160(redeem_script))
}

#[cfg(test)]
mod tests {
    use super::*;

    const P2PKH: [u8; 2] = [0x1c, 0xb8];

    #[test]
    fn test_flux_address_starts_with_t1() {
        let address = encode_address(P2PKH, &[7u8; 20]);
        assert!(address.starts_with("t1"));
    }

    #[test]
    fn test_decode_roundtrip() {
        let address = encode_address(P2PKH, &[42u8; 20]);
        let decoded = decode_address(&address).unwrap();
        assert_eq!(decoded.prefix, P2PKH);
        assert_eq!(decoded.hash, [42u8; 20]);
    }

    #[test]
    fn test_decode_rejects_bad_checksum() {
        let mut address = encode_address(P2PKH, &[1u8; 20]);
        let last = address.pop().unwrap();
        address.push(if last == '1' { '2' } else { '1' });
        assert!(decode_address(&address).is_err());
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let short = bs58::encode(vec![0x1c, 0xb8, 1, 2, 3]).with_check().into_string();
        assert_eq!(decode_address(&short), Err(AddressError::InvalidLength(5)));
    }
}
