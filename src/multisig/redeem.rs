//! M-of-N redeem scripts and the P2SH scriptSigs that spend them
//!
//! Redeem script layout: `OP_m <pubkey>... OP_n OP_CHECKMULTISIG`.
//!
//! A partially signed scriptSig keeps one slot per public key so that
//! co-signers can add theirs in place:
//! `OP_0 <sig|OP_0>... <redeemScript>`. The final form drops the
//! placeholders: `OP_0 <sig>... <redeemScript>`.

use crate::core::script::{
    parse_script, push_data, small_int, Instruction, OP_0, OP_1, OP_CHECKMULTISIG,
};
use crate::core::ScriptError;
use crate::crypto::public_key_from_slice;
use secp256k1::PublicKey;

/// Largest N an OP_n can express
pub const MAX_MULTISIG_KEYS: usize = 16;

/// A parsed M-of-N multisig redeem script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemScript {
    bytes: Vec<u8>,
    threshold: u8,
    pubkeys: Vec<Vec<u8>>,
    keys: Vec<PublicKey>,
}

impl RedeemScript {
    /// Parse and validate a redeem script
    pub fn parse(bytes: &[u8]) -> Result<Self, ScriptError> {
        let not_multisig = |why: &str| ScriptError::NotMultisig(why.to_string());
        let instructions = parse_script(bytes)?;

        let (first, rest) = instructions
            .split_first()
            .ok_or_else(|| not_multisig("empty script"))?;
        let (last, rest) = rest
            .split_last()
            .ok_or_else(|| not_multisig("script too short"))?;
        let (count, keys) = rest
            .split_last()
            .ok_or_else(|| not_multisig("script too short"))?;

        if *last != Instruction::Op(OP_CHECKMULTISIG) {
            return Err(not_multisig("missing OP_CHECKMULTISIG"));
        }
        let threshold = match first {
            Instruction::Op(op) => small_int(*op),
            Instruction::Push(_) => None,
        }
        .ok_or_else(|| not_multisig("threshold is not OP_1..OP_16"))?;
        let total = match count {
            Instruction::Op(op) => small_int(*op),
            Instruction::Push(_) => None,
        }
        .ok_or_else(|| not_multisig("key count is not OP_1..OP_16"))?;

        if total as usize != keys.len() || threshold > total {
            return Err(ScriptError::InvalidThreshold(threshold, total));
        }

        let mut pubkeys = Vec::with_capacity(keys.len());
        let mut parsed = Vec::with_capacity(keys.len());
        for key in keys {
            let data = key.push_bytes().ok_or(ScriptError::InvalidPublicKey)?;
            parsed.push(public_key_from_slice(data).map_err(|_| ScriptError::InvalidPublicKey)?);
            pubkeys.push(data.to_vec());
        }

        Ok(Self {
            bytes: bytes.to_vec(),
            threshold,
            pubkeys,
            keys: parsed,
        })
    }

    pub fn from_hex(text: &str) -> Result<Self, ScriptError> {
        let bytes = hex::decode(text.trim()).map_err(|e| ScriptError::InvalidHex(e.to_string()))?;
        Self::parse(&bytes)
    }

    /// Assemble an M-of-N script over `pubkeys`, in the given order
    pub fn multisig(threshold: u8, pubkeys: &[Vec<u8>]) -> Result<Self, ScriptError> {
        let total = pubkeys.len();
        if threshold == 0 || total == 0 || total > MAX_MULTISIG_KEYS || threshold as usize > total {
            return Err(ScriptError::InvalidThreshold(threshold, total.min(u8::MAX as usize) as u8));
        }

        let mut script = vec![OP_1 + threshold - 1];
        for key in pubkeys {
            push_data(&mut script, key);
        }
        script.push(OP_1 + total as u8 - 1);
        script.push(OP_CHECKMULTISIG);
        Self::parse(&script)
    }

    /// Signatures required (M)
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Public keys in script order
    pub fn pubkeys(&self) -> &[Vec<u8>] {
        &self.pubkeys
    }

    pub(crate) fn keys(&self) -> &[PublicKey] {
        &self.keys
    }

    /// Slot of a serialized public key, compared byte for byte
    pub fn position_of(&self, pubkey: &[u8]) -> Option<usize> {
        self.pubkeys.iter().position(|k| k.as_slice() == pubkey)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

/// The pushes of a P2SH multisig scriptSig
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultisigScriptSig {
    /// Signature pushes between the leading OP_0 and the redeem script;
    /// empty entries are placeholders
    pub signatures: Vec<Vec<u8>>,
    pub redeem_script: Vec<u8>,
}

impl MultisigScriptSig {
    /// Recognize `OP_0 <push>... <redeemScript>`
    ///
    /// Returns `None` for anything else, including scripts that contain
    /// non-push opcodes.
    pub fn parse(script_sig: &[u8]) -> Option<Self> {
        let instructions = parse_script(script_sig).ok()?;
        let (first, rest) = instructions.split_first()?;
        let (redeem, sigs) = rest.split_last()?;

        if *first != Instruction::Push(Vec::new()) {
            return None;
        }
        let redeem_script = redeem.push_bytes()?.to_vec();
        RedeemScript::parse(&redeem_script).ok()?;

        let signatures = sigs
            .iter()
            .map(|i| i.push_bytes().map(<[u8]>::to_vec))
            .collect::<Option<Vec<_>>>()?;

        Some(Self {
            signatures,
            redeem_script,
        })
    }

    /// Non-placeholder signatures, in order
    pub fn present(&self) -> impl Iterator<Item = &Vec<u8>> {
        self.signatures.iter().filter(|s| !s.is_empty())
    }

    /// Serialize keeping placeholders
    pub fn to_incomplete(&self) -> Vec<u8> {
        self.assemble(self.signatures.iter())
    }

    /// Serialize with placeholders removed
    pub fn to_final(&self) -> Vec<u8> {
        self.assemble(self.present())
    }

    fn assemble<'a>(&self, sigs: impl Iterator<Item = &'a Vec<u8>>) -> Vec<u8> {
        let mut script = vec![OP_0];
        for sig in sigs {
            push_data(&mut script, sig);
        }
        push_data(&mut script, &self.redeem_script);
        script
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;

    fn keys(n: usize) -> Vec<Vec<u8>> {
        (0..n).map(|_| KeyPair::generate().public_key_bytes()).collect()
    }

    #[test]
    fn test_build_and_parse_2_of_3() {
        let pubkeys = keys(3);
        let redeem = RedeemScript::multisig(2, &pubkeys).unwrap();

        assert_eq!(redeem.as_bytes()[0], 0x52);
        assert_eq!(redeem.as_bytes()[redeem.as_bytes().len() - 2], 0x53);
        assert_eq!(*redeem.as_bytes().last().unwrap(), OP_CHECKMULTISIG);

        let parsed = RedeemScript::from_hex(&redeem.to_hex()).unwrap();
        assert_eq!(parsed.threshold(), 2);
        assert_eq!(parsed.pubkeys(), pubkeys.as_slice());
        assert_eq!(parsed.position_of(&pubkeys[2]), Some(2));
        assert_eq!(parsed.position_of(&[0x02; 33]), None);
    }

    #[test]
    fn test_rejects_bad_thresholds() {
        let pubkeys = keys(2);
        assert!(RedeemScript::multisig(0, &pubkeys).is_err());
        assert!(RedeemScript::multisig(3, &pubkeys).is_err());
        assert!(RedeemScript::multisig(1, &[]).is_err());
    }

    #[test]
    fn test_rejects_non_multisig() {
        assert!(matches!(
            RedeemScript::parse(&[0x76, 0xa9]),
            Err(ScriptError::NotMultisig(_))
        ));
        assert!(RedeemScript::from_hex("zz").is_err());

        // count says 3 but only two keys follow
        let mut script = RedeemScript::multisig(2, &keys(2)).unwrap().as_bytes().to_vec();
        let n = script.len() - 2;
        script[n] = 0x53;
        assert_eq!(RedeemScript::parse(&script), Err(ScriptError::InvalidThreshold(2, 3)));
    }

    #[test]
    fn test_rejects_invalid_key() {
        let mut script = vec![0x51];
        push_data(&mut script, &[0x05; 33]);
        script.extend_from_slice(&[0x51, OP_CHECKMULTISIG]);
        assert_eq!(RedeemScript::parse(&script), Err(ScriptError::InvalidPublicKey));
    }

    #[test]
    fn test_script_sig_forms() {
        let redeem = RedeemScript::multisig(2, &keys(3)).unwrap();
        let sig = vec![0x30; 71];
        let script_sig = MultisigScriptSig {
            signatures: vec![Vec::new(), sig.clone(), Vec::new()],
            redeem_script: redeem.as_bytes().to_vec(),
        };

        let incomplete = script_sig.to_incomplete();
        let parsed = MultisigScriptSig::parse(&incomplete).unwrap();
        assert_eq!(parsed.signatures.len(), 3);
        assert_eq!(parsed, script_sig);

        let complete = script_sig.to_final();
        let parsed = MultisigScriptSig::parse(&complete).unwrap();
        assert_eq!(parsed.signatures, vec![sig]);
        assert_eq!(complete[0], OP_0);
    }

    #[test]
    fn test_script_sig_rejects_other_shapes() {
        assert!(MultisigScriptSig::parse(&[]).is_none());
        assert!(MultisigScriptSig::parse(&[0x01, 0xaa]).is_none());

        let mut p2pkh_sig = Vec::new();
        push_data(&mut p2pkh_sig, &[0x30; 71]);
        push_data(&mut p2pkh_sig, &[0x02; 33]);
        assert!(MultisigScriptSig::parse(&p2pkh_sig).is_none());
    }
}
