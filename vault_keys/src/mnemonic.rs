//! BIP-39 mnemonic encode/decode/validate and PBKDF2 seed stretching.
//!
//! Checksum and wordlist handling is delegated to the `bip39` crate (the
//! teacher's own `lwk_signer` depends on it directly); seed derivation is
//! built on this workspace's own `vault_common::pbkdf2`, matching spec.md
//! §4.4's explicit PBKDF2-HMAC-SHA512 construction.

use bip39::Mnemonic;

use crate::error::Error;

/// Encodes entropy (16/20/24/28/32 bytes) as a checksummed mnemonic phrase.
pub fn encode(entropy: &[u8]) -> Result<String, Error> {
    if entropy.len() % 4 != 0 || !(16..=32).contains(&entropy.len()) {
        return Err(Error::InvalidEntropyLength);
    }
    let mnemonic = Mnemonic::from_entropy(entropy).map_err(|_| Error::InvalidEntropyLength)?;
    Ok(mnemonic.to_string())
}

/// Decodes a mnemonic phrase back to its entropy, rejecting unknown words
/// and checksum failures.
pub fn decode(phrase: &str) -> Result<Vec<u8>, Error> {
    let mnemonic = Mnemonic::parse_normalized(phrase).map_err(|_| Error::InvalidMnemonic)?;
    Ok(mnemonic.to_entropy())
}

/// Validates a phrase without returning its entropy.
pub fn is_valid(phrase: &str) -> bool {
    Mnemonic::parse_normalized(phrase).is_ok()
}

/// Derives the 64-byte BIP-39 seed: PBKDF2-HMAC-SHA512(mnemonic, "mnemonic"
/// + passphrase, 2048 rounds). Inputs are expected already in NFKD form;
/// the BIP-39 English wordlist is pure ASCII so this holds for the common
/// case without pulling in a Unicode-normalization crate for the rest.
pub fn seed_from_mnemonic(phrase: &str, passphrase: &str) -> [u8; 64] {
    let mut salt = String::with_capacity(8 + passphrase.len());
    salt.push_str("mnemonic");
    salt.push_str(passphrase);
    let seed = vault_common::pbkdf2::pbkdf2_hmac_sha512(phrase.as_bytes(), salt.as_bytes(), 2048, 64);
    let mut out = [0u8; 64];
    out.copy_from_slice(&seed);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        for len in [16usize, 20, 24, 28, 32] {
            let entropy = vec![0x42u8; len];
            let phrase = encode(&entropy).unwrap();
            let decoded = decode(&phrase).unwrap();
            assert_eq!(decoded, entropy);
            assert!(is_valid(&phrase));
        }
    }

    #[test]
    fn rejects_bad_checksum() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        assert!(is_valid(phrase));
        let mutated = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon";
        assert!(!is_valid(mutated));
        assert!(decode(mutated).is_err());
    }

    #[test]
    fn rejects_unknown_word() {
        let phrase = "notaword abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        assert!(!is_valid(phrase));
    }

    #[test]
    fn seed_is_deterministic_and_64_bytes() {
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let a = seed_from_mnemonic(phrase, "");
        let b = seed_from_mnemonic(phrase, "");
        assert_eq!(a, b);
        assert_ne!(a, seed_from_mnemonic(phrase, "TREZOR"));
    }

    #[test]
    fn trezor_test_vector_seed() {
        // Standard BIP-39 test vector (trezor test suite), entropy=all zero 16 bytes.
        let phrase = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";
        let seed = seed_from_mnemonic(phrase, "TREZOR");
        let expected = "5eb00bbddcf069084889a8ab9155568165f5c453ccb85e70811aaed6f6da5fc19a5ac40b389cd370d086206dec8aa6c43daea6690f20ad3d8d48b2d2ce9e38e6";
        assert_eq!(hex::encode_bytes(&seed), expected);
    }

    mod hex {
        pub fn encode_bytes(bytes: &[u8]) -> String {
            bytes.iter().map(|b| format!("{b:02x}")).collect()
        }
    }
}
