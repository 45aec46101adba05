//! secp256k1 scalar/point operations and ECDSA, wrapping the `secp256k1`
//! crate behind the narrower surface the wallet modules need: BIP-32
//! tweak-by-scalar, compressed point (de)serialization, and recoverable
//! signatures. A single process-wide context replaces the source's
//! `pthread_once`-guarded global (spec.md §9).

use once_cell::sync::Lazy;
use secp256k1::ecdsa::{RecoverableSignature, RecoveryId, Signature};
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};

use crate::error::Error;

/// Shared signing+verification context, built once per process.
pub static SECP: Lazy<Secp256k1<secp256k1::All>> = Lazy::new(Secp256k1::new);

pub fn scalar_from_bytes(bytes: &[u8; 32]) -> Result<SecretKey, Error> {
    SecretKey::from_slice(bytes).map_err(|_| Error::InvalidScalar)
}

/// CKDpriv-style scalar addition mod n: `(parent + tweak) mod n`.
pub fn scalar_add(parent: &SecretKey, tweak: &[u8; 32]) -> Result<SecretKey, Error> {
    parent
        .clone()
        .add_tweak(&secp256k1::Scalar::from_be_bytes(*tweak).map_err(|_| Error::InvalidScalar)?)
        .map_err(|_| Error::InvalidScalar)
}

pub fn pubkey_from_secret(secret: &SecretKey) -> PublicKey {
    PublicKey::from_secret_key(&SECP, secret)
}

/// CKDpub-style point addition: `parent_point + tweak*G`.
pub fn point_add_scalar(parent: &PublicKey, tweak: &[u8; 32]) -> Result<PublicKey, Error> {
    parent
        .add_exp_tweak(
            &SECP,
            &secp256k1::Scalar::from_be_bytes(*tweak).map_err(|_| Error::InvalidScalar)?,
        )
        .map_err(|_| Error::InvalidScalar)
}

pub fn pubkey_serialize_compressed(pubkey: &PublicKey) -> [u8; 33] {
    pubkey.serialize()
}

pub fn pubkey_serialize_uncompressed(pubkey: &PublicKey) -> [u8; 65] {
    pubkey.serialize_uncompressed()
}

pub fn pubkey_parse(bytes: &[u8]) -> Result<PublicKey, Error> {
    PublicKey::from_slice(bytes).map_err(|_| Error::InvalidPublicKey)
}

/// Deterministic (RFC-6979) ECDSA signature over a 32-byte digest.
pub fn sign(secret: &SecretKey, digest: &[u8; 32]) -> Signature {
    let msg = Message::from_digest(*digest);
    SECP.sign_ecdsa(&msg, secret)
}

pub fn verify(pubkey: &PublicKey, digest: &[u8; 32], sig: &Signature) -> bool {
    let msg = Message::from_digest(*digest);
    SECP.verify_ecdsa(&msg, sig, pubkey).is_ok()
}

/// Recoverable compact signature, used by the XRP/Ripple signing path's
/// parity-free verification and by tooling that recovers a pubkey from
/// a signature plus message.
pub fn sign_recoverable(secret: &SecretKey, digest: &[u8; 32]) -> RecoverableSignature {
    let msg = Message::from_digest(*digest);
    SECP.sign_ecdsa_recoverable(&msg, secret)
}

pub fn recover(
    digest: &[u8; 32],
    sig: &RecoverableSignature,
) -> Result<PublicKey, Error> {
    let msg = Message::from_digest(*digest);
    SECP.recover_ecdsa(&msg, sig).map_err(|_| Error::InvalidSignature)
}

pub fn compact_signature_with_recovery_id(
    sig: &RecoverableSignature,
) -> ([u8; 64], i32) {
    let (id, bytes) = sig.serialize_compact();
    (bytes, id.to_i32())
}

pub fn recoverable_from_compact(bytes: &[u8; 64], recovery_id: i32) -> Result<RecoverableSignature, Error> {
    let id = RecoveryId::from_i32(recovery_id).map_err(|_| Error::InvalidSignature)?;
    RecoverableSignature::from_compact(bytes, id).map_err(|_| Error::InvalidSignature)
}
