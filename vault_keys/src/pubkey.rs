//! Public key serialization and the address hash computation shared by
//! every script template in `vault_btc` (spec.md §4.3).

use vault_common::hash::hash160;
use vault_common::secp;
use vault_common::Hash160;

/// Serializes `pubkey` compressed (33 bytes) or uncompressed (65 bytes)
/// depending on `compressed`.
pub fn serialize(pubkey: &secp256k1::PublicKey, compressed: bool) -> Vec<u8> {
    if compressed {
        secp::pubkey_serialize_compressed(pubkey).to_vec()
    } else {
        secp::pubkey_serialize_uncompressed(pubkey).to_vec()
    }
}

/// `RIPEMD-160(SHA-256(pubkey-bytes))`, used as the P2PKH/P2PK address hash.
pub fn address_hash(pubkey: &secp256k1::PublicKey, compressed: bool) -> Hash160 {
    hash160(&serialize(pubkey, compressed))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_common::secp::scalar_from_bytes;

    #[test]
    fn compressed_and_uncompressed_hash_to_different_addresses() {
        let secret = scalar_from_bytes(&[1u8; 32]).unwrap();
        let pubkey = secp::pubkey_from_secret(&secret);
        assert_ne!(address_hash(&pubkey, true), address_hash(&pubkey, false));
    }

    #[test]
    fn known_hash_for_privkey_one_compressed() {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        let secret = scalar_from_bytes(&bytes).unwrap();
        let pubkey = secp::pubkey_from_secret(&secret);
        assert_eq!(
            address_hash(&pubkey, true).to_hex(),
            "751e76e8199196d454941c45d1b3a323f1433bd6"
        );
    }
}
