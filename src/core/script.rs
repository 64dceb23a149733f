//! Script parsing and assembly
//!
//! Just enough of the script language for transparent multisig spends:
//! push-data encoding, instruction parsing, and the standard locking scripts
//! (P2PKH, P2SH, OP_RETURN data carrier).

use serde::{Deserialize, Serialize};
use thiserror::Error;

// =============================================================================
// Opcodes
// =============================================================================

pub const OP_0: u8 = 0x00;
pub const OP_PUSHDATA1: u8 = 0x4c;
pub const OP_PUSHDATA2: u8 = 0x4d;
pub const OP_PUSHDATA4: u8 = 0x4e;
pub const OP_1NEGATE: u8 = 0x4f;
pub const OP_1: u8 = 0x51;
pub const OP_16: u8 = 0x60;
pub const OP_RETURN: u8 = 0x6a;
pub const OP_DUP: u8 = 0x76;
pub const OP_EQUAL: u8 = 0x87;
pub const OP_EQUALVERIFY: u8 = 0x88;
pub const OP_HASH160: u8 = 0xa9;
pub const OP_CHECKSIG: u8 = 0xac;
pub const OP_CHECKMULTISIG: u8 = 0xae;

// =============================================================================
// Script Errors
// =============================================================================

/// Script-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("Invalid script hex: {0}")]
    InvalidHex(String),
    #[error("Push of {0} bytes runs past end of script")]
    TruncatedPush(usize),
    #[error("Not a multisig redeem script: {0}")]
    NotMultisig(String),
    #[error("Invalid multisig threshold: {0} of {1}")]
    InvalidThreshold(u8, u8),
    #[error("Invalid public key in redeem script")]
    InvalidPublicKey,
}

// =============================================================================
// Signature Hash Types
// =============================================================================

/// Signature hash type determines what parts of the transaction are signed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum SigHashType {
    /// Sign all inputs and all outputs
    #[default]
    All = 0x01,
    /// Sign all inputs but no outputs (blank check)
    None = 0x02,
    /// Sign all inputs and only the output with same index
    Single = 0x03,
    /// SIGHASH_ALL | SIGHASH_ANYONECANPAY
    AllAnyoneCanPay = 0x81,
    /// SIGHASH_NONE | SIGHASH_ANYONECANPAY
    NoneAnyoneCanPay = 0x82,
    /// SIGHASH_SINGLE | SIGHASH_ANYONECANPAY
    SingleAnyoneCanPay = 0x83,
}

impl SigHashType {
    /// Parse sighash type from byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(SigHashType::All),
            0x02 => Some(SigHashType::None),
            0x03 => Some(SigHashType::Single),
            0x81 => Some(SigHashType::AllAnyoneCanPay),
            0x82 => Some(SigHashType::NoneAnyoneCanPay),
            0x83 => Some(SigHashType::SingleAnyoneCanPay),
            _ => None,
        }
    }

    pub fn as_byte(&self) -> u8 {
        *self as u8
    }

    /// Check if this sighash includes ANYONECANPAY flag
    pub fn is_anyone_can_pay(&self) -> bool {
        (*self as u8) & 0x80 != 0
    }

    /// Get the base type (without ANYONECANPAY flag)
    pub fn base_type(&self) -> SigHashType {
        match (*self as u8) & 0x1f {
            0x02 => SigHashType::None,
            0x03 => SigHashType::Single,
            _ => SigHashType::All,
        }
    }
}

// =============================================================================
// Instructions
// =============================================================================

/// A parsed script element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Data push (any of the push encodings, including OP_0 as empty)
    Push(Vec<u8>),
    /// Any non-push opcode
    Op(u8),
}

impl Instruction {
    pub fn push_bytes(&self) -> Option<&[u8]> {
        match self {
            Instruction::Push(data) => Some(data),
            Instruction::Op(_) => None,
        }
    }
}

/// Parse raw script bytes into instructions
pub fn parse_script(script: &[u8]) -> Result<Vec<Instruction>, ScriptError> {
    let mut instructions = Vec::new();
    let mut pos = 0;

    while pos < script.len() {
        let opcode = script[pos];
        pos += 1;

        let len = match opcode {
            OP_0 => {
                instructions.push(Instruction::Push(Vec::new()));
                continue;
            }
            0x01..=0x4b => opcode as usize,
            OP_PUSHDATA1 => read_le(script, &mut pos, 1)?,
            OP_PUSHDATA2 => read_le(script, &mut pos, 2)?,
            OP_PUSHDATA4 => read_le(script, &mut pos, 4)?,
            _ => {
                instructions.push(Instruction::Op(opcode));
                continue;
            }
        };

        if script.len() - pos < len {
            return Err(ScriptError::TruncatedPush(len));
        }
        instructions.push(Instruction::Push(script[pos..pos + len].to_vec()));
        pos += len;
    }

    Ok(instructions)
}

fn read_le(script: &[u8], pos: &mut usize, width: usize) -> Result<usize, ScriptError> {
    if script.len() - *pos < width {
        return Err(ScriptError::TruncatedPush(width));
    }
    let len = script[*pos..*pos + width]
        .iter()
        .rev()
        .fold(0usize, |acc, b| (acc << 8) | *b as usize);
    *pos += width;
    Ok(len)
}

/// Append a minimally encoded data push
///
/// Empty data becomes OP_0 and single bytes 1..=16 become OP_1..OP_16.
pub fn push_data(out: &mut Vec<u8>, data: &[u8]) {
    match data.len() {
        0 => out.push(OP_0),
        1 if (1..=16).contains(&data[0]) => out.push(OP_1 + data[0] - 1),
        1 if data[0] == 0x81 => out.push(OP_1NEGATE),
        len @ 1..=0x4b => {
            out.push(len as u8);
            out.extend_from_slice(data);
        }
        len @ 0x4c..=0xff => {
            out.push(OP_PUSHDATA1);
            out.push(len as u8);
            out.extend_from_slice(data);
        }
        len @ 0x100..=0xffff => {
            out.push(OP_PUSHDATA2);
            out.extend_from_slice(&(len as u16).to_le_bytes());
            out.extend_from_slice(data);
        }
        len => {
            out.push(OP_PUSHDATA4);
            out.extend_from_slice(&(len as u32).to_le_bytes());
            out.extend_from_slice(data);
        }
    }
}

/// Decode a small-integer opcode (OP_1..OP_16)
pub fn small_int(opcode: u8) -> Option<u8> {
    (OP_1..=OP_16)
        .contains(&opcode)
        .then(|| opcode - OP_1 + 1)
}

// =============================================================================
// Standard locking scripts
// =============================================================================

/// OP_DUP OP_HASH160 <20> OP_EQUALVERIFY OP_CHECKSIG
pub fn p2pkh_script(pubkey_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = vec![OP_DUP, OP_HASH160];
    push_data(&mut script, pubkey_hash);
    script.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
    script
}

/// OP_HASH160 <20> OP_EQUAL
pub fn p2sh_script(script_hash: &[u8; 20]) -> Vec<u8> {
    let mut script = vec![OP_HASH160];
    push_data(&mut script, script_hash);
    script.push(OP_EQUAL);
    script
}

/// OP_RETURN <data>, provably unspendable data carrier
///
/// No size limit is applied; relay policy decides what it accepts.
pub fn null_data_script(data: &[u8]) -> Vec<u8> {
    let mut script = vec![OP_RETURN];
    push_data(&mut script, data);
    script
}

/// Extract the payload of an OP_RETURN output, if it is one
pub fn null_data_payload(script: &[u8]) -> Option<Vec<u8>> {
    if script.first() != Some(&OP_RETURN) {
        return None;
    }
    let instructions = parse_script(&script[1..]).ok()?;
    let mut payload = Vec::new();
    for instruction in instructions {
        match instruction {
            Instruction::Push(data) => payload.extend_from_slice(&data),
            Instruction::Op(OP_1NEGATE) => payload.push(0x81),
            Instruction::Op(op) => payload.push(small_int(op)?),
        }
    }
    Some(payload)
}

// =============================================================================
// Tests
// =============================================================================
