#![cfg_attr(not(test), deny(clippy::unwrap_used))]

//! Deterministic key hierarchy for the wallet core: BIP-39 mnemonics,
//! BIP-32 child-key derivation, private/public key import, signing and
//! compact-signature recovery (spec.md §4.3/§4.4).
//!
//! This crate is pure: it holds no wallet state and performs no I/O. The
//! heavier stateful engines in `vault_btc` and `vault_xrp` both depend on
//! it for key derivation and signing.

mod bip32;
mod bip38;
mod chain_params;
mod error;
mod mnemonic;
mod privkey;
mod pubkey;

pub use bip32::{
    ckd_priv, ckd_pub, deserialize_xpub, master_from_seed, mpk_from_seed, privkey_derive,
    pubkey_derive, serialize_xprv, ExtendedPrivKey, ExtendedPubKey, MasterPubKey,
};
pub use bip38::{decrypt_bip38, encrypt_bip38};
pub use chain_params::ChainParams;
pub use error::Error;
pub use mnemonic::{decode as mnemonic_decode, encode as mnemonic_encode, is_valid as mnemonic_valid, seed_from_mnemonic};
pub use privkey::PrivateKey;
pub use pubkey::{address_hash, serialize as pubkey_serialize};

/// Derives `indices.len()` private keys at `(seed, internal, index)` in one
/// pass, per the external interface `privkey_list` (spec.md §6). Stops
/// and returns the error at the first index that fails to derive.
pub fn privkey_list(seed: &[u8], internal: bool, indices: &[u32]) -> Result<Vec<secp256k1::SecretKey>, Error> {
    indices
        .iter()
        .map(|&index| bip32::privkey_derive(seed, internal, index))
        .collect()
}
