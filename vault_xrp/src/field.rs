//! The Ripple canonical binary field codec: type/field tag encoding,
//! canonical sort order, length-prefixed blobs, drops-only amount
//! encoding, and the `Memos` STArray (spec.md §4.7, `BRRippleSerialize.c`).
//!
//! Deliberately narrower than the full Ripple binary schema: only the
//! fields a Payment transaction actually carries are supported, and a
//! nested `STObject`/`PathSet` outside of `Memos` is not decodable — this
//! mirrors the source's own `get_STObject`/`get_PathSet`, which return 0
//! unconditionally rather than attempt a generic schema walk.

/// A single memo attached to a transaction, as a `Memo` STObject nested
/// inside the top-level `Memos` STArray.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Memo {
    pub memo_type: Vec<u8>,
    pub memo_data: Vec<u8>,
    pub memo_format: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    UInt16(u16),
    UInt32(u32),
    Hash256([u8; 32]),
    /// XRP drops only; issued-currency amounts are not produced or
    /// accepted (spec.md's XRP scope is drops-denominated payments).
    Amount(u64),
    Blob(Vec<u8>),
    Account([u8; 20]),
    Memos(Vec<Memo>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub type_code: u8,
    pub field_code: u8,
    pub value: Value,
}

impl Field {
    pub fn account(id: [u8; 20]) -> Field {
        Field { type_code: 8, field_code: 1, value: Value::Account(id) }
    }
    pub fn transaction_type(t: u16) -> Field {
        Field { type_code: 1, field_code: 2, value: Value::UInt16(t) }
    }
    pub fn flags(f: u32) -> Field {
        Field { type_code: 2, field_code: 2, value: Value::UInt32(f) }
    }
    pub fn source_tag(t: u32) -> Field {
        Field { type_code: 2, field_code: 3, value: Value::UInt32(t) }
    }
    pub fn sequence(s: u32) -> Field {
        Field { type_code: 2, field_code: 4, value: Value::UInt32(s) }
    }
    pub fn destination_tag(t: u32) -> Field {
        Field { type_code: 2, field_code: 14, value: Value::UInt32(t) }
    }
    pub fn last_ledger_sequence(s: u32) -> Field {
        Field { type_code: 2, field_code: 27, value: Value::UInt32(s) }
    }
    pub fn account_txn_id(h: [u8; 32]) -> Field {
        Field { type_code: 5, field_code: 9, value: Value::Hash256(h) }
    }
    pub fn invoice_id(h: [u8; 32]) -> Field {
        Field { type_code: 5, field_code: 17, value: Value::Hash256(h) }
    }
    pub fn fee(drops: u64) -> Field {
        Field { type_code: 6, field_code: 8, value: Value::Amount(drops) }
    }
    pub fn amount(drops: u64) -> Field {
        Field { type_code: 6, field_code: 1, value: Value::Amount(drops) }
    }
    pub fn send_max(drops: u64) -> Field {
        Field { type_code: 6, field_code: 9, value: Value::Amount(drops) }
    }
    pub fn deliver_min(drops: u64) -> Field {
        Field { type_code: 6, field_code: 10, value: Value::Amount(drops) }
    }
    pub fn signing_pub_key(key: Vec<u8>) -> Field {
        Field { type_code: 7, field_code: 3, value: Value::Blob(key) }
    }
    pub fn txn_signature(sig: Vec<u8>) -> Field {
        Field { type_code: 7, field_code: 4, value: Value::Blob(sig) }
    }
    pub fn destination(id: [u8; 20]) -> Field {
        Field { type_code: 8, field_code: 3, value: Value::Account(id) }
    }
    pub fn memos(memos: Vec<Memo>) -> Field {
        Field { type_code: 15, field_code: 9, value: Value::Memos(memos) }
    }
}

fn encode_field_id(type_code: u8, field_code: u8, out: &mut Vec<u8>) {
    if type_code < 16 {
        if field_code < 16 {
            out.push((type_code << 4) | field_code);
        } else {
            out.push(type_code << 4);
            out.push(field_code);
        }
    } else if field_code < 16 {
        out.push(field_code);
        out.push(type_code);
    } else {
        out.push(0);
        out.push(type_code);
        out.push(field_code);
    }
}

fn decode_field_id(buf: &[u8]) -> Option<(u8, u8, usize)> {
    let first = *buf.first()?;
    if first == 0 {
        let type_code = *buf.get(1)?;
        let field_code = *buf.get(2)?;
        Some((type_code, field_code, 3))
    } else if first & 0x0f == 0 {
        let type_code = first >> 4;
        let field_code = *buf.get(1)?;
        Some((type_code, field_code, 2))
    } else if first & 0xf0 == 0 {
        let field_code = first;
        let type_code = *buf.get(1)?;
        Some((type_code, field_code, 2))
    } else {
        Some((first >> 4, first & 0x0f, 1))
    }
}

fn encode_length(len: usize, out: &mut Vec<u8>) {
    if len <= 192 {
        out.push(len as u8);
    } else if len <= 12480 {
        let l = len - 193;
        out.push(193 + (l >> 8) as u8);
        out.push((l & 0xff) as u8);
    } else {
        let l = len - 12481;
        out.push(241 + (l >> 16) as u8);
        out.push(((l >> 8) & 0xff) as u8);
        out.push((l & 0xff) as u8);
    }
}

fn decode_length(buf: &[u8]) -> Option<(usize, usize)> {
    let b0 = *buf.first()? as usize;
    if b0 <= 192 {
        Some((b0, 1))
    } else if b0 <= 240 {
        let b1 = *buf.get(1)? as usize;
        Some((193 + (b0 - 193) * 256 + b1, 2))
    } else if b0 <= 254 {
        let b1 = *buf.get(1)? as usize;
        let b2 = *buf.get(2)? as usize;
        Some((12481 + (b0 - 241) * 65536 + b1 * 256 + b2, 3))
    } else {
        None
    }
}

fn encode_amount(drops: u64, out: &mut Vec<u8>) {
    out.extend_from_slice(&(drops | 0x4000_0000_0000_0000).to_be_bytes());
}

fn decode_amount(buf: &[u8]) -> Option<u64> {
    if buf.len() < 8 {
        return None;
    }
    let raw = u64::from_be_bytes(buf[..8].try_into().ok()?);
    if raw & 0x8000_0000_0000_0000 != 0 {
        // Issued-currency amount: not supported by this codec.
        return None;
    }
    Some(raw & 0x3fff_ffff_ffff_ffff)
}

/// Object-end marker: type 14, field 1.
const OBJECT_END: u8 = 0xe1;
/// Array-end marker: type 15, field 1.
const ARRAY_END: u8 = 0xf1;
/// The wrapping `Memo` STObject's own field id: type 14, field 10.
const MEMO_OBJECT_ID: u8 = 0xea;

fn encode_field(field: &Field, out: &mut Vec<u8>) {
    match &field.value {
        Value::UInt16(v) => {
            encode_field_id(field.type_code, field.field_code, out);
            out.extend_from_slice(&v.to_be_bytes());
        }
        Value::UInt32(v) => {
            encode_field_id(field.type_code, field.field_code, out);
            out.extend_from_slice(&v.to_be_bytes());
        }
        Value::Hash256(h) => {
            encode_field_id(field.type_code, field.field_code, out);
            out.extend_from_slice(h);
        }
        Value::Amount(drops) => {
            encode_field_id(field.type_code, field.field_code, out);
            encode_amount(*drops, out);
        }
        Value::Blob(bytes) => {
            encode_field_id(field.type_code, field.field_code, out);
            encode_length(bytes.len(), out);
            out.extend_from_slice(bytes);
        }
        Value::Account(id) => {
            encode_field_id(field.type_code, field.field_code, out);
            encode_length(20, out);
            out.extend_from_slice(id);
        }
        Value::Memos(memos) => {
            encode_field_id(field.type_code, field.field_code, out);
            for memo in memos {
                out.push(MEMO_OBJECT_ID);
                if !memo.memo_type.is_empty() {
                    encode_field_id(7, 12, out);
                    encode_length(memo.memo_type.len(), out);
                    out.extend_from_slice(&memo.memo_type);
                }
                if !memo.memo_data.is_empty() {
                    encode_field_id(7, 13, out);
                    encode_length(memo.memo_data.len(), out);
                    out.extend_from_slice(&memo.memo_data);
                }
                if !memo.memo_format.is_empty() {
                    encode_field_id(7, 14, out);
                    encode_length(memo.memo_format.len(), out);
                    out.extend_from_slice(&memo.memo_format);
                }
                out.push(OBJECT_END);
            }
            out.push(ARRAY_END);
        }
    }
}

/// Serializes `fields` in canonical sort order (ascending by `(type_code,
/// field_code)`), per `compare_function`/`qsort` in the source.
pub fn serialize(fields: &mut [Field]) -> Vec<u8> {
    fields.sort_by_key(|f| (f.type_code, f.field_code));
    let mut out = Vec::new();
    for field in fields.iter() {
        encode_field(field, &mut out);
    }
    out
}

fn decode_memo_object(buf: &[u8]) -> Option<(Memo, usize)> {
    let mut pos = 0;
    let mut memo = Memo::default();
    loop {
        if *buf.get(pos)? == OBJECT_END {
            pos += 1;
            break;
        }
        let (type_code, field_code, id_len) = decode_field_id(&buf[pos..])?;
        if type_code != 7 || !(12..=14).contains(&field_code) {
            return None;
        }
        pos += id_len;
        let (len, len_len) = decode_length(&buf[pos..])?;
        pos += len_len;
        let content = buf.get(pos..pos + len)?.to_vec();
        pos += len;
        match field_code {
            12 => memo.memo_type = content,
            13 => memo.memo_data = content,
            14 => memo.memo_format = content,
            _ => unreachable!(),
        }
    }
    Some((memo, pos))
}

fn decode_memos(buf: &[u8]) -> Option<(Vec<Memo>, usize)> {
    let mut pos = 0;
    let mut memos = Vec::new();
    loop {
        if *buf.get(pos)? == ARRAY_END {
            pos += 1;
            break;
        }
        if *buf.get(pos)? != MEMO_OBJECT_ID {
            // Only Memo objects are supported inside an STArray.
            return None;
        }
        pos += 1;
        let (memo, consumed) = decode_memo_object(&buf[pos..])?;
        pos += consumed;
        memos.push(memo);
    }
    Some((memos, pos))
}

/// Parses as many fields as the codec understands, stopping (without
/// erroring) at the first field it cannot decode — matching
/// `rippleDeserialize`'s behavior of returning whatever prefix parsed.
pub fn deserialize(buf: &[u8]) -> Vec<Field> {
    let mut pos = 0;
    let mut fields = Vec::new();
    while pos + 1 < buf.len() {
        let Some((type_code, field_code, id_len)) = decode_field_id(&buf[pos..]) else {
            break;
        };
        let body = &buf[pos + id_len..];
        let parsed = match type_code {
            1 => body.get(..2).map(|b| (Value::UInt16(u16::from_be_bytes([b[0], b[1]])), 2)),
            2 => body
                .get(..4)
                .map(|b| (Value::UInt32(u32::from_be_bytes([b[0], b[1], b[2], b[3]])), 4)),
            5 => body.get(..32).map(|b| {
                let mut h = [0u8; 32];
                h.copy_from_slice(b);
                (Value::Hash256(h), 32)
            }),
            6 => decode_amount(body).map(|a| (Value::Amount(a), 8)),
            7 => decode_length(body).and_then(|(len, len_len)| {
                body.get(len_len..len_len + len).map(|b| (Value::Blob(b.to_vec()), len_len + len))
            }),
            8 => decode_length(body).and_then(|(len, len_len)| {
                if len != 20 {
                    return None;
                }
                body.get(len_len..len_len + len).map(|b| {
                    let mut id = [0u8; 20];
                    id.copy_from_slice(b);
                    (Value::Account(id), len_len + len)
                })
            }),
            15 => decode_memos(body).map(|(memos, consumed)| (Value::Memos(memos), consumed)),
            _ => None,
        };
        let Some((value, consumed)) = parsed else {
            break;
        };
        fields.push(Field { type_code, field_code, value });
        pos += id_len + consumed;
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_id_roundtrips_for_common_case() {
        let mut out = Vec::new();
        encode_field_id(2, 4, &mut out);
        assert_eq!(out, vec![0x24]);
        assert_eq!(decode_field_id(&out), Some((2, 4, 1)));
    }

    #[test]
    fn field_id_roundtrips_for_uncommon_field() {
        let mut out = Vec::new();
        encode_field_id(2, 27, &mut out);
        assert_eq!(out, vec![0x20, 27]);
        assert_eq!(decode_field_id(&out), Some((2, 27, 2)));
    }

    #[test]
    fn length_roundtrips_across_all_three_ranges() {
        for len in [0usize, 192, 193, 12480, 12481, 918744] {
            let mut out = Vec::new();
            encode_length(len, &mut out);
            assert_eq!(decode_length(&out), Some((len, out.len())));
        }
    }

    #[test]
    fn amount_test_vector_s2_decodes_to_one_million_drops() {
        // fieldid 0x61 = type 6 field 1 (Amount); value carries bit62 set.
        let value = hex_lit("40000000000F4240");
        assert_eq!(decode_amount(&value), Some(1_000_000));
    }

    #[test]
    fn amount_encode_decode_roundtrip() {
        let mut out = Vec::new();
        encode_amount(50_000_000, &mut out);
        assert_eq!(decode_amount(&out), Some(50_000_000));
    }

    #[test]
    fn serialize_sorts_fields_by_type_then_field_code() {
        let mut fields = vec![Field::sequence(2), Field::account([1u8; 20]), Field::fee(10)];
        let bytes = serialize(&mut fields);
        // Account (type 8) must come after Sequence (type 2) and Fee (type 6).
        let account_id_pos = bytes.iter().position(|&b| b == 0x81).unwrap();
        let sequence_id_pos = bytes.iter().position(|&b| b == 0x24).unwrap();
        assert!(sequence_id_pos < account_id_pos);
    }

    #[test]
    fn memos_roundtrip_through_serialize_and_deserialize() {
        let memo = Memo {
            memo_type: b"test".to_vec(),
            memo_data: b"hello".to_vec(),
            memo_format: Vec::new(),
        };
        let mut fields = vec![Field::memos(vec![memo.clone()])];
        let bytes = serialize(&mut fields);
        let parsed = deserialize(&bytes);
        assert_eq!(parsed.len(), 1);
        match &parsed[0].value {
            Value::Memos(memos) => assert_eq!(memos, &vec![memo]),
            _ => panic!("expected Memos"),
        }
    }

    fn hex_lit(s: &str) -> Vec<u8> {
        (0..s.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&s[i..i + 2], 16).unwrap())
            .collect()
    }
}
