//! Address recognition and emission for the three standard script
//! templates (spec.md §4.3). Strict for scriptPubKey ("received output"
//! recognition: missing a type means missing funds, so only the exact
//! templates are accepted); permissive for scriptSig ("spend" attribution
//! only, so best-effort is fine).

use vault_common::base58;
use vault_common::hash::hash160;
use vault_keys::ChainParams;

use crate::script;

const OP_DUP: u8 = 0x76;
const OP_HASH160: u8 = 0xa9;
const OP_EQUALVERIFY: u8 = 0x88;
const OP_CHECKSIG: u8 = 0xac;
const OP_EQUAL: u8 = 0x87;

fn encode_address(version: u8, hash20: &[u8]) -> String {
    let mut payload = Vec::with_capacity(21);
    payload.push(version);
    payload.extend_from_slice(hash20);
    base58::encode_check(&payload)
}

/// Recognizes P2PKH, P2SH, and P2PK scriptPubKeys, returning the
/// corresponding Base58Check address. Any other shape returns `None`.
pub fn address_from_script_pubkey(script: &[u8], params: ChainParams) -> Option<String> {
    // P2PKH: OP_DUP OP_HASH160 <20> <hash20> OP_EQUALVERIFY OP_CHECKSIG
    if script.len() == 25
        && script[0] == OP_DUP
        && script[1] == OP_HASH160
        && script[2] == 0x14
        && script[23] == OP_EQUALVERIFY
        && script[24] == OP_CHECKSIG
    {
        return Some(encode_address(params.pubkey_address, &script[3..23]));
    }

    // P2SH: OP_HASH160 <20> <hash20> OP_EQUAL
    if script.len() == 23 && script[0] == OP_HASH160 && script[1] == 0x14 && script[22] == OP_EQUAL {
        return Some(encode_address(params.script_address, &script[2..22]));
    }

    // P2PK: <33|65 pubkey> OP_CHECKSIG
    if script.len() == 35 && script[0] == 33 && script[34] == OP_CHECKSIG {
        let hash20 = hash160(&script[1..34]);
        return Some(encode_address(params.pubkey_address, hash20.as_bytes()));
    }
    if script.len() == 67 && script[0] == 65 && script[66] == OP_CHECKSIG {
        let hash20 = hash160(&script[1..66]);
        return Some(encode_address(params.pubkey_address, hash20.as_bytes()));
    }

    None
}

/// Best-effort address attribution from a scriptSig, per spec.md §4.3:
/// a trailing 33/65-byte push is read as a spending pubkey (P2PKH); a
/// trailing push over a prior push is otherwise read as a P2SH
/// redeemscript; a lone signature push is not yet recoverable.
pub fn address_from_script_sig(script_sig: &[u8], params: ChainParams) -> Option<String> {
    let elements = script::parse(script_sig)?;
    if elements.len() < 2 {
        return None;
    }
    let last = elements.last()?;
    let last_bytes = last.slice(script_sig);

    if last.len == 33 || last.len == 65 {
        let hash20 = hash160(last_bytes);
        return Some(encode_address(params.pubkey_address, hash20.as_bytes()));
    }

    let hash20 = hash160(last_bytes);
    Some(encode_address(params.script_address, hash20.as_bytes()))
}

/// Emits the scriptPubKey template for a Base58Check address, or `None`
/// if the version byte matches neither the pubkey- nor script-address
/// version for `params`.
pub fn script_pubkey_from_address(address: &str, params: ChainParams) -> Option<Vec<u8>> {
    let decoded = base58::decode_check(address).ok()?;
    if decoded.len() != 21 {
        return None;
    }
    let version = decoded[0];
    let hash20 = &decoded[1..];

    if version == params.pubkey_address {
        let mut out = vec![OP_DUP, OP_HASH160, 0x14];
        out.extend_from_slice(hash20);
        out.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        Some(out)
    } else if version == params.script_address {
        let mut out = vec![OP_HASH160, 0x14];
        out.extend_from_slice(hash20);
        out.push(OP_EQUAL);
        Some(out)
    } else {
        None
    }
}

pub fn is_valid(address: &str, params: ChainParams) -> bool {
    script_pubkey_from_address(address, params).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p2pkh_script(hash20: &[u8; 20]) -> Vec<u8> {
        let mut s = vec![OP_DUP, OP_HASH160, 0x14];
        s.extend_from_slice(hash20);
        s.extend_from_slice(&[OP_EQUALVERIFY, OP_CHECKSIG]);
        s
    }

    #[test]
    fn p2pkh_roundtrips_through_address() {
        let hash20 = [0x89u8; 20];
        let script = p2pkh_script(&hash20);
        let addr = address_from_script_pubkey(&script, ChainParams::mainnet()).unwrap();
        let script2 = script_pubkey_from_address(&addr, ChainParams::mainnet()).unwrap();
        assert_eq!(script, script2);
    }

    #[test]
    fn flipping_a_hash_byte_changes_the_address() {
        let hash20 = [0x89u8; 20];
        let script = p2pkh_script(&hash20);
        let addr1 = address_from_script_pubkey(&script, ChainParams::mainnet()).unwrap();

        let mut hash20_flipped = hash20;
        hash20_flipped[0] ^= 0x01;
        let script2 = p2pkh_script(&hash20_flipped);
        let addr2 = address_from_script_pubkey(&script2, ChainParams::mainnet()).unwrap();

        assert_ne!(addr1, addr2);
    }

    #[test]
    fn flipping_the_length_byte_yields_no_address() {
        let hash20 = [0x89u8; 20];
        let mut script = p2pkh_script(&hash20);
        script[2] = 0x13; // wrong push length
        assert!(address_from_script_pubkey(&script, ChainParams::mainnet()).is_none());
    }

    #[test]
    fn p2sh_roundtrips_through_address() {
        let hash20 = [0x55u8; 20];
        let mut script = vec![OP_HASH160, 0x14];
        script.extend_from_slice(&hash20);
        script.push(OP_EQUAL);
        let addr = address_from_script_pubkey(&script, ChainParams::mainnet()).unwrap();
        assert_eq!(
            script_pubkey_from_address(&addr, ChainParams::mainnet()).unwrap(),
            script
        );
    }

    #[test]
    fn p2pk_compressed_derives_hash160_address() {
        let mut script = vec![33u8];
        script.extend_from_slice(&[0x02u8; 33]);
        script.push(OP_CHECKSIG);
        let addr = address_from_script_pubkey(&script, ChainParams::mainnet()).unwrap();
        let hash20 = hash160(&[0x02u8; 33]);
        assert_eq!(
            addr,
            encode_address(ChainParams::mainnet().pubkey_address, hash20.as_bytes())
        );
    }

    #[test]
    fn script_sig_trailing_pubkey_attributes_p2pkh() {
        let mut sig_sig = script::push_data(&[0xAAu8; 71]); // DER signature push
        let pubkey = [0x03u8; 33];
        sig_sig.extend(script::push_data(&pubkey));
        let addr = address_from_script_sig(&sig_sig, ChainParams::mainnet()).unwrap();
        let hash20 = hash160(&pubkey);
        assert_eq!(
            addr,
            encode_address(ChainParams::mainnet().pubkey_address, hash20.as_bytes())
        );
    }

    #[test]
    fn script_sig_lone_signature_push_is_unrecoverable() {
        let sig_sig = script::push_data(&[0xAAu8; 71]);
        assert!(address_from_script_sig(&sig_sig, ChainParams::mainnet()).is_none());
    }

    #[test]
    fn script_pubkey_from_address_rejects_wrong_network() {
        let hash20 = [0x10u8; 20];
        let script = p2pkh_script(&hash20);
        let addr = address_from_script_pubkey(&script, ChainParams::mainnet()).unwrap();
        assert!(script_pubkey_from_address(&addr, ChainParams::testnet()).is_none());
        assert!(!is_valid(&addr, ChainParams::testnet()));
        assert!(is_valid(&addr, ChainParams::mainnet()));
    }
}
