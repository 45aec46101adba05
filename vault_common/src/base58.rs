//! Base58 and Base58Check using the Bitcoin alphabet. The XRP chain uses
//! a different alphabet permutation, so it keeps its own codec in
//! `vault_xrp::base58` rather than parameterizing this one — the two
//! never share a call site.

use crate::error::Error;
use crate::hash::sha256d;

const ALPHABET: &[u8; 58] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

pub fn encode(data: &[u8]) -> String {
    encode_with_alphabet(data, ALPHABET)
}

pub fn decode(s: &str) -> Result<Vec<u8>, Error> {
    decode_with_alphabet(s, ALPHABET)
}

pub fn encode_check(payload: &[u8]) -> String {
    let checksum = sha256d(payload);
    let mut buf = Vec::with_capacity(payload.len() + 4);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&checksum.as_bytes()[..4]);
    encode(&buf)
}

pub fn decode_check(s: &str) -> Result<Vec<u8>, Error> {
    let raw = decode(s)?;
    if raw.len() < 4 {
        return Err(Error::InvalidBase58Length);
    }
    let (payload, checksum) = raw.split_at(raw.len() - 4);
    let expected = sha256d(payload);
    if &expected.as_bytes()[..4] != checksum {
        return Err(Error::InvalidChecksum);
    }
    Ok(payload.to_vec())
}

pub(crate) fn encode_with_alphabet(data: &[u8], alphabet: &[u8; 58]) -> String {
    let zeros = data.iter().take_while(|&&b| b == 0).count();

    // Big-endian base-256 -> base-58 conversion by repeated division.
    let mut digits: Vec<u8> = vec![0];
    for &byte in data {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            carry += (*digit as u32) << 8;
            *digit = (carry % 58) as u8;
            carry /= 58;
        }
        while carry > 0 {
            digits.push((carry % 58) as u8);
            carry /= 58;
        }
    }

    let mut out = String::with_capacity(zeros + digits.len());
    out.extend(std::iter::repeat(alphabet[0] as char).take(zeros));
    out.extend(digits.iter().rev().map(|&d| alphabet[d as usize] as char));
    out
}

pub(crate) fn decode_with_alphabet(s: &str, alphabet: &[u8; 58]) -> Result<Vec<u8>, Error> {
    let zero_char = alphabet[0];
    let zeros = s.bytes().take_while(|&b| b == zero_char).count();

    let mut bytes: Vec<u8> = vec![0];
    for (i, c) in s.bytes().enumerate() {
        let digit = alphabet
            .iter()
            .position(|&a| a == c)
            .ok_or(Error::InvalidBase58Char(i))? as u32;
        let mut carry = digit;
        for byte in bytes.iter_mut() {
            carry += (*byte as u32) * 58;
            *byte = (carry & 0xff) as u8;
            carry >>= 8;
        }
        while carry > 0 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
        }
    }

    let mut out = vec![0u8; zeros];
    out.extend(bytes.iter().rev());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_empty() {
        assert_eq!(encode(b""), "");
    }

    #[test]
    fn encode_leading_zero_bytes() {
        assert_eq!(encode(&[0, 0, 1]), "112");
    }

    #[test]
    fn roundtrip_arbitrary_bytes() {
        let data = b"the quick brown fox jumps over the lazy dog";
        let encoded = encode(data);
        let decoded = decode(&encoded).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn check_roundtrip() {
        let payload = [0x00u8, 0x01, 0x02, 0x03];
        let s = encode_check(&payload);
        assert_eq!(decode_check(&s).unwrap(), payload);
    }

    #[test]
    fn check_rejects_corrupted_checksum() {
        let payload = [0x00u8, 0x01, 0x02, 0x03];
        let mut s = encode_check(&payload).into_bytes();
        let last = s.len() - 1;
        s[last] = if s[last] == b'1' { b'2' } else { b'1' };
        let s = String::from_utf8(s).unwrap();
        assert!(matches!(
            decode_check(&s),
            Err(Error::InvalidChecksum) | Err(Error::InvalidBase58Char(_))
        ));
    }

    #[test]
    fn known_p2pkh_address() {
        // Base58Check(0x00 || HASH160(pubkey)) for privkey=1's compressed pubkey.
        let hash160 = hex_lit("751e76e8199196d454941c45d1b3a323f1433bd6");
        let mut payload = vec![0x00];
        payload.extend_from_slice(&hash160);
        assert_eq!(encode_check(&payload), "1BgGZ9tcN4rm9KBzDn7KprQz87SZ26SAMH");
    }

    fn hex_lit(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }
}
