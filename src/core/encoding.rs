//! Wire encoding primitives
//!
//! Little-endian integers, CompactSize length prefixes and the byte-order
//! conversion between display txids and the hashes stored inside inputs.

use thiserror::Error;

/// Upper bound on any single length prefix we are willing to allocate for
pub const MAX_VEC_SIZE: u64 = 4_000_000;

/// Errors decoding wire data
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("Invalid hex: {0}")]
    InvalidHex(String),
    #[error("Unexpected end of data at offset {0}")]
    UnexpectedEof(usize),
    #[error("Length prefix {0} exceeds limit")]
    OversizedLength(u64),
    #[error("{0} trailing bytes after transaction")]
    TrailingBytes(usize),
    #[error("Invalid txid {0:?}: expected 64 hex characters")]
    InvalidTxid(String),
}

/// Convert a hash as stored in a transaction input to the display txid
///
/// Inputs hold the previous transaction hash in internal (little-endian)
/// order; explorers and UTXO sets use the reversed, big-endian hex.
pub fn display_txid(internal: &[u8; 32]) -> String {
    let mut bytes = *internal;
    bytes.reverse();
    hex::encode(bytes)
}

/// Convert a display txid into the internal byte order used on the wire
pub fn internal_txid(display: &str) -> Result<[u8; 32], DecodeError> {
    let bytes = hex::decode(display).map_err(|_| DecodeError::InvalidTxid(display.to_string()))?;
    let mut hash: [u8; 32] = bytes
        .try_into()
        .map_err(|_| DecodeError::InvalidTxid(display.to_string()))?;
    hash.reverse();
    Ok(hash)
}

/// Cursor over a byte slice
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < len {
            return Err(DecodeError::UnexpectedEof(self.pos));
        }
        let slice = &self.data[self.pos..self.pos + len];
        self.pos += len;
        Ok(slice)
    }

    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_le_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.read_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_le_bytes(self.read_array()?))
    }

    /// Read a CompactSize integer
    pub fn read_compact_size(&mut self) -> Result<u64, DecodeError> {
        match self.read_u8()? {
            0xfd => Ok(self.read_u16()? as u64),
            0xfe => Ok(self.read_u32()? as u64),
            0xff => self.read_u64(),
            n => Ok(n as u64),
        }
    }

    /// Read a CompactSize count, bounded by `MAX_VEC_SIZE`
    pub fn read_len(&mut self) -> Result<usize, DecodeError> {
        let len = self.read_compact_size()?;
        if len > MAX_VEC_SIZE {
            return Err(DecodeError::OversizedLength(len));
        }
        Ok(len as usize)
    }

    /// Read a length-prefixed byte string
    pub fn read_var_bytes(&mut self) -> Result<Vec<u8>, DecodeError> {
        let len = self.read_len()?;
        Ok(self.read_bytes(len)?.to_vec())
    }

    /// Fail if any input is left unread
    pub fn finish(self) -> Result<(), DecodeError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(DecodeError::TrailingBytes(n)),
        }
    }
}

/// Append a CompactSize integer
pub fn write_compact_size(out: &mut Vec<u8>, n: u64) {
    match n {
        0..=0xfc => out.push(n as u8),
        0xfd..=0xffff => {
            out.push(0xfd);
            out.extend_from_slice(&(n as u16).to_le_bytes());
        }
        0x1_0000..=0xffff_ffff => {
            out.push(0xfe);
            out.extend_from_slice(&(n as u32).to_le_bytes());
        }
        _ => {
            out.push(0xff);
            out.extend_from_slice(&n.to_le_bytes());
        }
    }
}

/// Append a length-prefixed byte string
pub fn write_var_bytes(out: &mut Vec<u8>, bytes: &[u8]) {
    write_compact_size(out, bytes.len() as u64);
    out.extend_from_slice(bytes);
}

/// Decode hex text into bytes
pub fn decode_hex(text: &str) -> Result<Vec<u8>, DecodeError> {
    hex::decode(text.trim()).map_err(|e| DecodeError::InvalidHex(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_txid_reverses_bytes() {
        let mut internal = [0u8; 32];
        internal[0] = 0x01;
        internal[31] = 0xff;

        let display = display_txid(&internal);
        assert!(display.starts_with("ff"));
        assert!(display.ends_with("01"));
        assert_eq!(internal_txid(&display).unwrap(), internal);
    }

    #[test]
    fn test_known_txid_byte_order() {
        let display = "4a5e1e4baab89f3a32518a88c31bc87f618f76673e2cc77ab2127b7afdeda33b";
        let internal = internal_txid(display).unwrap();
        assert_eq!(
            hex::encode(internal),
            "3ba3edfd7a7b12b27ac72c3e67768f617fc81bc3888a51323a9fb8aa4b1e5e4a"
        );
        assert_eq!(display_txid(&internal), display);
    }

    #[test]
    fn test_internal_txid_rejects_bad_input() {
        assert!(internal_txid("abcd").is_err());
        assert!(internal_txid(&"zz".repeat(32)).is_err());
    }

    #[test]
    fn test_compact_size_boundaries() {
        for n in [0u64, 0xfc, 0xfd, 0xffff, 0x1_0000, 0xffff_ffff, 0x1_0000_0000] {
            let mut out = Vec::new();
            write_compact_size(&mut out, n);
            let mut reader = Reader::new(&out);
            assert_eq!(reader.read_compact_size().unwrap(), n);
            reader.finish().unwrap();
        }

        let mut out = Vec::new();
        write_compact_size(&mut out, 0xfd);
        assert_eq!(out, vec![0xfd, 0xfd, 0x00]);
    }

    #[test]
    fn test_reader_eof_and_trailing() {
        let data = [1u8, 2, 3];
        let mut reader = Reader::new(&data);
        assert!(matches!(reader.read_u32(), Err(DecodeError::UnexpectedEof(0))));
        reader.read_u8().unwrap();
        assert_eq!(reader.finish(), Err(DecodeError::TrailingBytes(2)));
    }

    #[test]
    fn test_oversized_length_rejected() {
        let mut out = Vec::new();
        write_compact_size(&mut out, MAX_VEC_SIZE + 1);
        let mut reader = Reader::new(&out);
        assert!(matches!(reader.read_len(), Err(DecodeError::OversizedLength(_))));
    }
}
