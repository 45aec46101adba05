//! XRP key derivation: `m/44'/144'/0'/0/index`, distinct from the Bitcoin
//! chains' legacy `m/0'` path (`BRRippleAccount.c`'s `deriveRippleKeyFromSeed`).

use vault_common::secp;
use vault_keys::{ckd_priv, master_from_seed, ExtendedPrivKey};

use crate::address;
use crate::error::Error;

const HARDENED: u32 = 0x8000_0000;
const PURPOSE: u32 = 44;
const COIN_TYPE: u32 = 144;

/// A derived XRP signing key, together with the account ID and address it
/// controls.
pub struct Account {
    pub secret: secp256k1::SecretKey,
    pub pubkey_compressed: [u8; 33],
    pub account_id: [u8; 20],
    pub address: String,
}

/// Derives the account at `m/44'/144'/0'/0/index` from a BIP-39 seed.
pub fn derive(seed: &[u8], index: u32) -> Result<Account, Error> {
    let master = master_from_seed(seed);
    let purpose = ckd_priv(&master, PURPOSE | HARDENED)?;
    let coin_type = ckd_priv(&purpose, COIN_TYPE | HARDENED)?;
    let account_level = ckd_priv(&coin_type, HARDENED)?;
    let chain = ckd_priv(&account_level, 0)?;
    let key: ExtendedPrivKey = ckd_priv(&chain, index)?;

    let pubkey = secp::pubkey_from_secret(&key.secret);
    let pubkey_compressed = secp::pubkey_serialize_compressed(&pubkey);
    let account_id = address::account_id_from_pubkey(&pubkey_compressed);
    let addr = address::address_from_account_id(&account_id);

    Ok(Account {
        secret: key.secret,
        pubkey_compressed,
        account_id,
        address: addr,
    })
}
