//! BIP-38 passphrase-encrypted private keys. Declared but not implemented,
//! matching the source (spec.md §1's explicit out-of-scope list and §9's
//! open question: "preserve the declared surface and return unsupported
//! errors"). `vault_common::scrypt` exists for exactly this format even
//! though no call path reaches it yet.

use crate::error::Error;
use crate::privkey::PrivateKey;

pub fn encrypt_bip38(_key: &PrivateKey, _passphrase: &str) -> Result<String, Error> {
    Err(Error::Unsupported)
}

pub fn decrypt_bip38(_encrypted: &str, _passphrase: &str) -> Result<PrivateKey, Error> {
    Err(Error::Unsupported)
}
