//! Ripple address strings: Base58Check(0x00 || 20-byte account ID) using
//! the Ripple alphabet (spec.md §4.7).

use vault_common::hash::hash160;

use crate::base58;
use crate::error::Error;

/// Sentinel account ID used by `BRRippleTransfer.c` to represent the
/// network fee as a pseudo-transfer target. Never a real address.
pub const FEE_ACCOUNT_ID: [u8; 20] = [0xffu8; 20];

/// Sentinel account ID for an as-yet-unresolved counterparty.
pub const UNKNOWN_ACCOUNT_ID: [u8; 20] = [0x00u8; 20];

/// Derives the 20-byte account ID from a compressed secp256k1 public key:
/// `RIPEMD160(SHA256(pubkey))`, identical to a Bitcoin P2PKH hash.
pub fn account_id_from_pubkey(pubkey_compressed: &[u8; 33]) -> [u8; 20] {
    hash160(pubkey_compressed).0
}

/// Encodes an account ID as an `r`-prefixed address string. The two
/// sentinel account IDs are special-cased to their literal labels rather
/// than base58-encoded, per spec.md §3.
pub fn address_from_account_id(account_id: &[u8; 20]) -> String {
    if *account_id == FEE_ACCOUNT_ID {
        return "__fee__".to_string();
    }
    if *account_id == UNKNOWN_ACCOUNT_ID {
        return "unknown".to_string();
    }
    let mut payload = Vec::with_capacity(21);
    payload.push(0x00);
    payload.extend_from_slice(account_id);
    base58::encode_check(&payload)
}

/// Decodes an address string back to its 20-byte account ID. Recognizes
/// the `__fee__`/`unknown` sentinel labels before attempting Base58Check.
pub fn account_id_from_address(address: &str) -> Result<[u8; 20], Error> {
    if address == "__fee__" {
        return Ok(FEE_ACCOUNT_ID);
    }
    if address == "unknown" {
        return Ok(UNKNOWN_ACCOUNT_ID);
    }
    let payload = base58::decode_check(address)?;
    if payload.len() != 21 || payload[0] != 0x00 {
        return Err(Error::InvalidAddress);
    }
    let mut out = [0u8; 20];
    out.copy_from_slice(&payload[1..]);
    Ok(out)
}

/// True if `address` parses as a well-formed Ripple address.
pub fn is_valid(address: &str) -> bool {
    account_id_from_address(address).is_ok()
}

/// Exchange accounts known to require a destination tag to route an
/// incoming payment to the correct customer, per `BRGenericRipple.c`'s
/// `knownDestinationTagRequiringAddresses` table. Best-effort advisory
/// list, not an on-ledger rule.
const DESTINATION_TAG_REQUIRED: [&str; 9] = [
    "rLNaPoKeeBjZe2qs6x52yVPZpZ8td4dc6w", // Coinbase(1)
    "rw2ciyaNshpHe7bCHo4bRWq6pqqynnWKQg", // Coinbase(2)
    "rEb8TK3gBgk5auZkwc6sHnwrGVJH8DuaLh", // Binance(1)
    "rJb5KsHsDHF1YS5B5DU6QCkH5NsPaKQTcy", // Binance(2)
    "rEy8TFcrAPvhpKrwyrscNYyqBGUkE9hKaJ", // Binance(3)
    "rXieaAC3nevTKgVu2SYoShjTCS2Tfczqx",  // Wirex(1)
    "r9HwsqBnAUN4nF6nDqxd4sgP8DrDnDcZP3",  // BitBay
    "rLbKbPyuvs4wc1h13BEPHgbFGsRXMeFGL6", // BitBank(1)
    "rw7m3CtVHwGSdhFjV4MyJozmZJv3DYQnsA", // BitBank(2)
];

/// Whether `address` is a known exchange account that requires callers to
/// also set a destination tag on payments into it.
pub fn requires_destination_tag(address: &str) -> bool {
    DESTINATION_TAG_REQUIRED.contains(&address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_paperkey_address() {
        // account ID from spec test vector S1
        let account_id = hex_lit("effc2752b5c9da2288c5d01f304ec82951e37ca2");
        assert_eq!(account_id.len(), 20);
        let mut id = [0u8; 20];
        id.copy_from_slice(&account_id);
        assert_eq!(address_from_account_id(&id), "r41vZ8exoVyUfVzs56yeN8xB5gDhSkho9a");
    }

    #[test]
    fn address_roundtrips_through_account_id() {
        let id = [0x42u8; 20];
        let address = address_from_account_id(&id);
        assert_eq!(account_id_from_address(&address).unwrap(), id);
    }

    #[test]
    fn invalid_address_rejected() {
        assert!(!is_valid("not an address"));
    }

    #[test]
    fn fee_sentinel_round_trips_through_its_literal_label() {
        assert_eq!(address_from_account_id(&FEE_ACCOUNT_ID), "__fee__");
        assert_eq!(account_id_from_address("__fee__").unwrap(), FEE_ACCOUNT_ID);
        assert!(is_valid("__fee__"));
    }

    #[test]
    fn unknown_sentinel_round_trips_through_its_literal_label() {
        assert_eq!(address_from_account_id(&UNKNOWN_ACCOUNT_ID), "unknown");
        assert_eq!(account_id_from_address("unknown").unwrap(), UNKNOWN_ACCOUNT_ID);
        assert!(is_valid("unknown"));
    }

    fn hex_lit(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }
}
