//! PBKDF2-HMAC-SHA256/SHA512 (spec.md §4.1), used for BIP-39 seed
//! stretching (2048 rounds, salt `"mnemonic" + passphrase`) and available
//! over SHA-256 for the rest of the declared C1 surface.

use pbkdf2::pbkdf2_hmac;
use sha2::{Sha256, Sha512};

pub fn pbkdf2_hmac_sha512(password: &[u8], salt: &[u8], rounds: u32, out_len: usize) -> Vec<u8> {
    let mut out = vec![0u8; out_len];
    pbkdf2_hmac::<Sha512>(password, salt, rounds, &mut out);
    out
}

pub fn pbkdf2_hmac_sha256(password: &[u8], salt: &[u8], rounds: u32, out_len: usize) -> Vec<u8> {
    let mut out = vec![0u8; out_len];
    pbkdf2_hmac::<Sha256>(password, salt, rounds, &mut out);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_length_matches_request() {
        let out = pbkdf2_hmac_sha512(b"password", b"salt", 1, 64);
        assert_eq!(out.len(), 64);
    }

    #[test]
    fn deterministic() {
        let a = pbkdf2_hmac_sha512(b"pw", b"salt", 2048, 64);
        let b = pbkdf2_hmac_sha512(b"pw", b"salt", 2048, 64);
        assert_eq!(a, b);
    }

    #[test]
    fn sha256_variant_output_length_matches_request() {
        let out = pbkdf2_hmac_sha256(b"password", b"salt", 1, 32);
        assert_eq!(out.len(), 32);
    }

    #[test]
    fn sha256_variant_is_deterministic() {
        let a = pbkdf2_hmac_sha256(b"pw", b"salt", 2048, 32);
        let b = pbkdf2_hmac_sha256(b"pw", b"salt", 2048, 32);
        assert_eq!(a, b);
    }
}
