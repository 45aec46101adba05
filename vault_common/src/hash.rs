//! Hash primitives used across every chain module. Free functions over
//! byte slices, mirroring the small set of digests the wire formats
//! actually need — no generic `Digest` trait surface exposed downstream.

use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256, Sha512};

use crate::fixed::{Hash160, Hash256, Hash512};

pub fn sha1(data: &[u8]) -> [u8; 20] {
    let mut h = Sha1::new();
    h.update(data);
    h.finalize().into()
}

pub fn sha256(data: &[u8]) -> Hash256 {
    let mut h = Sha256::new();
    h.update(data);
    Hash256(h.finalize().into())
}

/// Double SHA-256, used for transaction hashes and Base58Check checksums.
pub fn sha256d(data: &[u8]) -> Hash256 {
    sha256(sha256(data).as_bytes())
}

pub fn sha512(data: &[u8]) -> Hash512 {
    let mut h = Sha512::new();
    h.update(data);
    Hash512(h.finalize().into())
}

pub fn ripemd160(data: &[u8]) -> [u8; 20] {
    let mut h = Ripemd160::new();
    h.update(data);
    h.finalize().into()
}

/// RIPEMD-160(SHA-256(x)) — the hash behind P2PKH/P2SH addresses.
pub fn hash160(data: &[u8]) -> Hash160 {
    Hash160(ripemd160(sha256(data).as_bytes()))
}
