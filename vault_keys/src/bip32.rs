//! BIP-32 hierarchical deterministic key derivation and the chain-specific
//! master public key capture described in spec.md §3/§4.4.
//!
//! The source derives Bitcoin addresses from the legacy path `m/0'` rather
//! than BIP-44's `m/44'/0'/0'` (spec.md §9's open question); this is kept
//! unchanged since the spec explicitly forbids "modernizing" it.

use vault_common::hash::hash160;
use vault_common::hmac::hmac_sha512;
use vault_common::secp;

use crate::error::Error;

const HARDENED: u32 = 0x8000_0000;

/// An extended private key: 32-byte scalar + 32-byte chain code.
#[derive(Clone)]
pub struct ExtendedPrivKey {
    pub secret: secp256k1::SecretKey,
    pub chain_code: [u8; 32],
}

/// An extended public key: compressed point + chain code.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ExtendedPubKey {
    pub pubkey: secp256k1::PublicKey,
    pub chain_code: [u8; 32],
}

/// The master public key captured at the account derivation path, per
/// spec.md §3: `{ fingerprint, chainCode, pubKey }`, captured at `m/0'`.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct MasterPubKey {
    pub fingerprint: u32,
    pub chain_code: [u8; 32],
    pub pubkey: secp256k1::PublicKey,
}

/// Derives the master extended private key from a BIP-39 seed:
/// `HMAC-SHA512(key = "Bitcoin seed", data = seed)`.
pub fn master_from_seed(seed: &[u8]) -> ExtendedPrivKey {
    let i = hmac_sha512(b"Bitcoin seed", seed);
    let bytes = i.as_bytes();
    let mut il = [0u8; 32];
    let mut ir = [0u8; 32];
    il.copy_from_slice(&bytes[..32]);
    ir.copy_from_slice(&bytes[32..]);
    let secret = secp::scalar_from_bytes(&il).expect("HMAC output is a valid scalar with overwhelming probability");
    ExtendedPrivKey {
        secret,
        chain_code: ir,
    }
}

/// CKDpriv: private parent key -> private child key at index `i`.
///
/// `i >= 2^31` derives a hardened child (uses the parent's private key in
/// the HMAC input); otherwise uses the parent's public point. Returns
/// `Error::InvalidChildIndex` on the (astronomically rare) case the source
/// handles by advancing to the next index.
pub fn ckd_priv(parent: &ExtendedPrivKey, i: u32) -> Result<ExtendedPrivKey, Error> {
    let mut data = Vec::with_capacity(37);
    if i >= HARDENED {
        data.push(0x00);
        data.extend_from_slice(&parent.secret.secret_bytes());
    } else {
        let point = secp::pubkey_from_secret(&parent.secret);
        data.extend_from_slice(&secp::pubkey_serialize_compressed(&point));
    }
    data.extend_from_slice(&i.to_be_bytes());

    let hmac = hmac_sha512(&parent.chain_code, &data);
    let bytes = hmac.as_bytes();
    let mut il = [0u8; 32];
    let mut ir = [0u8; 32];
    il.copy_from_slice(&bytes[..32]);
    ir.copy_from_slice(&bytes[32..]);

    let child_secret = secp::scalar_add(&parent.secret, &il).map_err(|_| Error::InvalidChildIndex(i))?;
    Ok(ExtendedPrivKey {
        secret: child_secret,
        chain_code: ir,
    })
}

/// CKDpub: public parent key -> public child key at index `i`. Only
/// defined for non-hardened `i`.
pub fn ckd_pub(parent: &ExtendedPubKey, i: u32) -> Result<ExtendedPubKey, Error> {
    if i >= HARDENED {
        return Err(Error::InvalidChildIndex(i));
    }
    let mut data = Vec::with_capacity(37);
    data.extend_from_slice(&secp::pubkey_serialize_compressed(&parent.pubkey));
    data.extend_from_slice(&i.to_be_bytes());

    let hmac = hmac_sha512(&parent.chain_code, &data);
    let bytes = hmac.as_bytes();
    let mut il = [0u8; 32];
    let mut ir = [0u8; 32];
    il.copy_from_slice(&bytes[..32]);
    ir.copy_from_slice(&bytes[32..]);

    let child_pubkey =
        secp::point_add_scalar(&parent.pubkey, &il).map_err(|_| Error::InvalidChildIndex(i))?;
    Ok(ExtendedPubKey {
        pubkey: child_pubkey,
        chain_code: ir,
    })
}

impl From<&ExtendedPrivKey> for ExtendedPubKey {
    fn from(xprv: &ExtendedPrivKey) -> Self {
        ExtendedPubKey {
            pubkey: secp::pubkey_from_secret(&xprv.secret),
            chain_code: xprv.chain_code,
        }
    }
}

/// Builds the master public key at the legacy Bitcoin account path `m/0'`.
///
/// Fingerprint = first 4 bytes of HASH160 of the *parent* (master) public
/// key, captured before the `0'` derivation, per spec.md §4.4.
pub fn mpk_from_seed(seed: &[u8]) -> Result<MasterPubKey, Error> {
    let master = master_from_seed(seed);
    let master_pub = secp::pubkey_from_secret(&master.secret);
    let fingerprint_hash = hash160(&secp::pubkey_serialize_compressed(&master_pub));
    let mut fingerprint_bytes = [0u8; 4];
    fingerprint_bytes.copy_from_slice(&fingerprint_hash.as_bytes()[..4]);
    let fingerprint = u32::from_be_bytes(fingerprint_bytes);

    let account = ckd_priv(&master, HARDENED)?;
    let account_pub = ExtendedPubKey::from(&account);

    Ok(MasterPubKey {
        fingerprint,
        chain_code: account_pub.chain_code,
        pubkey: account_pub.pubkey,
    })
}

/// Derives the compressed public key for `m/0'/{internal?1:0}/index` given
/// the account-level master public key, per spec.md §4.4.
pub fn pubkey_derive(mpk: &MasterPubKey, internal: bool, index: u32) -> Result<secp256k1::PublicKey, Error> {
    let account = ExtendedPubKey {
        pubkey: mpk.pubkey,
        chain_code: mpk.chain_code,
    };
    let chain = ckd_pub(&account, if internal { 1 } else { 0 })?;
    let addr = ckd_pub(&chain, index)?;
    Ok(addr.pubkey)
}

/// Derives the private key for `m/0'/{internal?1:0}/index` directly from
/// the seed, used by the signing loop (spec.md §4.5.6) and by
/// `privkey_list`.
pub fn privkey_derive(seed: &[u8], internal: bool, index: u32) -> Result<secp256k1::SecretKey, Error> {
    let master = master_from_seed(seed);
    let account = ckd_priv(&master, HARDENED)?;
    let chain = ckd_priv(&account, if internal { 1 } else { 0 })?;
    let addr = ckd_priv(&chain, index)?;
    Ok(addr.secret)
}

/// Declared but not implemented, matching the source's placeholder
/// (spec.md §6/§9: `BRBIP32SerializeMasterPrivKey` returns zero in the
/// source; we surface that as an explicit error instead of silent zeros).
pub fn serialize_xprv(_xprv: &ExtendedPrivKey, _params: &crate::chain_params::ChainParams) -> Result<String, Error> {
    Err(Error::Unsupported)
}

/// Declared but not implemented, matching `BRBIP32DeserializeMasterPubKey`'s
/// placeholder behavior.
pub fn deserialize_xpub(_s: &str, _params: &crate::chain_params::ChainParams) -> Result<ExtendedPubKey, Error> {
    Err(Error::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ckd_pub_matches_ckd_priv_for_nonhardened_index() {
        let seed = [0x5au8; 32];
        let master = master_from_seed(&seed);
        let master_pub = ExtendedPubKey::from(&master);

        for i in [0u32, 1, 5, 100] {
            let child_priv = ckd_priv(&master, i).unwrap();
            let child_pub_from_priv = ExtendedPubKey::from(&child_priv);
            let child_pub_direct = ckd_pub(&master_pub, i).unwrap();
            assert_eq!(child_pub_from_priv.pubkey, child_pub_direct.pubkey);
            assert_eq!(child_pub_from_priv.chain_code, child_pub_direct.chain_code);
        }
    }

    #[test]
    fn ckd_pub_rejects_hardened_index() {
        let seed = [0x11u8; 32];
        let master = master_from_seed(&seed);
        let master_pub = ExtendedPubKey::from(&master);
        assert!(ckd_pub(&master_pub, HARDENED).is_err());
    }

    #[test]
    fn mpk_pubkey_derive_matches_direct_privkey_derive() {
        let seed = [0x99u8; 32];
        let mpk = mpk_from_seed(&seed).unwrap();

        for (internal, index) in [(false, 0u32), (false, 1), (true, 0), (true, 3)] {
            let pub_from_mpk = pubkey_derive(&mpk, internal, index).unwrap();
            let priv_direct = privkey_derive(&seed, internal, index).unwrap();
            let pub_from_priv = secp::pubkey_from_secret(&priv_direct);
            assert_eq!(pub_from_mpk, pub_from_priv);
        }
    }

    #[test]
    fn fingerprint_is_stable_for_same_seed() {
        let seed = [0x7eu8; 32];
        let a = mpk_from_seed(&seed).unwrap();
        let b = mpk_from_seed(&seed).unwrap();
        assert_eq!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn extended_key_serialization_placeholders_are_unsupported() {
        let seed = [0x01u8; 32];
        let master = master_from_seed(&seed);
        let params = crate::chain_params::ChainParams::mainnet();
        assert!(serialize_xprv(&master, &params).is_err());
        assert!(deserialize_xpub("anything", &params).is_err());
    }
}
