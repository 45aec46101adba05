//! Private key import (WIF, mini-key, hex) and the signing operations
//! built on it: DER sign/verify, compact recoverable sign/recover. Spec.md
//! §3/§4.3.

use secp256k1::ecdsa::Signature;
use secp256k1::{PublicKey, SecretKey};

use vault_common::hash::sha256;
use vault_common::secp;
use vault_common::{base58, Hash256};

use crate::chain_params::ChainParams;
use crate::error::Error;

/// A secp256k1 scalar plus the compressed/uncompressed shape its derived
/// public key should take, per spec.md §3.
#[derive(Clone)]
pub struct PrivateKey {
    pub secret: SecretKey,
    pub compressed: bool,
}

impl PrivateKey {
    pub fn from_secret(secret: [u8; 32], compressed: bool) -> Result<Self, Error> {
        let secret = secp::scalar_from_bytes(&secret).map_err(|_| Error::InvalidKey)?;
        Ok(PrivateKey { secret, compressed })
    }

    pub fn public_key(&self) -> PublicKey {
        secp::pubkey_from_secret(&self.secret)
    }

    pub fn sign(&self, digest: &Hash256) -> Signature {
        secp::sign(&self.secret, digest.as_bytes())
    }

    pub fn verify(pubkey: &PublicKey, digest: &Hash256, sig: &Signature) -> bool {
        secp::verify(pubkey, digest.as_bytes(), sig)
    }

    /// 65-byte `[recid+27+(compressed?4:0) || r || s]`, per spec.md §4.1.
    pub fn compact_sign(&self, digest: &Hash256) -> [u8; 65] {
        let recoverable = secp::sign_recoverable(&self.secret, digest.as_bytes());
        let (bytes, recid) = secp::compact_signature_with_recovery_id(&recoverable);
        let mut out = [0u8; 65];
        out[0] = (recid as u8) + 27 + if self.compressed { 4 } else { 0 };
        out[1..].copy_from_slice(&bytes);
        out
    }

    pub fn recover(digest: &Hash256, compact: &[u8; 65]) -> Result<(PublicKey, bool), Error> {
        let header = compact[0];
        if !(27..=34).contains(&header) {
            return Err(Error::InvalidKey);
        }
        let compressed = header >= 31;
        let recid = ((header - 27) & 0x03) as i32;
        let mut sig_bytes = [0u8; 64];
        sig_bytes.copy_from_slice(&compact[1..]);
        let recoverable = secp::recoverable_from_compact(&sig_bytes, recid).map_err(|_| Error::InvalidKey)?;
        let pubkey = secp::recover(digest.as_bytes(), &recoverable).map_err(|_| Error::InvalidKey)?;
        Ok((pubkey, compressed))
    }

    /// Imports a WIF base58check string, a mini-key (`S`-prefixed, 22/30
    /// chars), or a 64-char hex secret, per spec.md §3.
    pub fn import(s: &str, params: ChainParams) -> Result<Self, Error> {
        if let Some(key) = parse_wif(s, params) {
            return key;
        }
        if is_mini_key_format(s) {
            return parse_mini_key(s);
        }
        if s.len() == 64 {
            return parse_hex(s);
        }
        Err(Error::InvalidPrivateKeyFormat)
    }

    /// Exports as WIF; the source has no canonical export format for
    /// mini-keys or raw hex, per SPEC_FULL.md §C.
    pub fn export(&self, params: ChainParams) -> String {
        let mut payload = Vec::with_capacity(34);
        payload.push(params.privkey_wif);
        payload.extend_from_slice(&self.secret.secret_bytes());
        if self.compressed {
            payload.push(0x01);
        }
        base58::encode_check(&payload)
    }
}

fn parse_wif(s: &str, params: ChainParams) -> Option<Result<PrivateKey, Error>> {
    let decoded = base58::decode_check(s).ok()?;
    if decoded.len() != 33 && decoded.len() != 34 {
        return Some(Err(Error::InvalidPrivateKeyFormat));
    }
    if decoded[0] != params.privkey_wif {
        return None;
    }
    let compressed = decoded.len() == 34;
    if compressed && decoded[33] != 0x01 {
        return Some(Err(Error::InvalidPrivateKeyFormat));
    }
    let mut secret = [0u8; 32];
    secret.copy_from_slice(&decoded[1..33]);
    Some(PrivateKey::from_secret(secret, compressed))
}

fn is_mini_key_format(s: &str) -> bool {
    s.starts_with('S') && (s.len() == 22 || s.len() == 30)
}

/// Mini-key validation per spec.md §3: SHA-256(`key || '?'`) must have a
/// zero first byte.
fn parse_mini_key(s: &str) -> Result<PrivateKey, Error> {
    let mut check_input = s.as_bytes().to_vec();
    check_input.push(b'?');
    let digest = sha256(&check_input);
    if digest.as_bytes()[0] != 0 {
        return Err(Error::InvalidPrivateKeyFormat);
    }
    let secret = sha256(s.as_bytes());
    PrivateKey::from_secret(*secret.as_bytes(), false)
}

fn parse_hex(s: &str) -> Result<PrivateKey, Error> {
    if s.len() != 64 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(Error::InvalidPrivateKeyFormat);
    }
    let mut secret = [0u8; 32];
    for i in 0..32 {
        secret[i] = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).map_err(|_| Error::InvalidPrivateKeyFormat)?;
    }
    PrivateKey::from_secret(secret, true)
}
