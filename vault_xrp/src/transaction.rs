//! The XRP Payment transaction: construction, canonical serialization,
//! signing and the transaction-hash digest (spec.md §4.8,
//! `BRRippleTransaction.c`/`BRRippleSignature.c`).

use vault_common::hash::sha512;
use vault_common::secp;

use crate::account;
use crate::address;
use crate::error::Error;
use crate::field::{Field, Memo};

/// The only transaction type this codec builds or recognizes.
pub const PAYMENT: u16 = 0;

/// `tfFullyCanonicalSig`, the default (and only) flag the source sets.
pub const FULLY_CANONICAL_SIG: u32 = 0x8000_0000;

/// A fee basis as `pricePerCostFactor * costFactor` drops
/// (`BRRippleFeeBasis.c`'s default is 10 drops/cost-unit, cost factor 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeBasis {
    pub price_per_cost_factor: u64,
    pub cost_factor: u32,
}

impl FeeBasis {
    pub const DEFAULT: FeeBasis = FeeBasis { price_per_cost_factor: 10, cost_factor: 1 };

    pub fn fee_drops(&self) -> u64 {
        self.price_per_cost_factor * self.cost_factor as u64
    }
}

impl Default for FeeBasis {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Payment-specific fields, nested the way the source's
/// `BRRipplePaymentTxRecord` nests them under the transaction.
#[derive(Debug, Clone, Default)]
pub struct Payment {
    pub destination: [u8; 20],
    pub amount_drops: u64,
    pub destination_tag: Option<u32>,
    pub invoice_id: Option<[u8; 32]>,
    pub send_max: Option<u64>,
    pub deliver_min: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Transaction {
    pub source: [u8; 20],
    pub transaction_type: u16,
    pub fee_drops: u64,
    pub sequence: u32,
    pub flags: u32,
    pub last_ledger_sequence: u32,
    pub source_tag: Option<u32>,
    pub account_txn_id: Option<[u8; 32]>,
    pub public_key: Option<[u8; 33]>,
    pub signature: Option<Vec<u8>>,
    pub payment: Payment,
    pub memos: Vec<Memo>,
    pub tx_hash: Option<[u8; 32]>,
}

impl Transaction {
    /// Builds an unsigned Payment: `{source, target, amount, feeBasis}`,
    /// per spec.md §4.8's construction step. `sequence` and
    /// `last_ledger_sequence` are filled in later, by the account/wallet.
    pub fn new_payment(source: [u8; 20], destination: [u8; 20], amount_drops: u64, fee_basis: FeeBasis) -> Transaction {
        Transaction {
            source,
            transaction_type: PAYMENT,
            fee_drops: fee_basis.fee_drops(),
            sequence: 0,
            flags: FULLY_CANONICAL_SIG,
            last_ledger_sequence: 0,
            source_tag: None,
            account_txn_id: None,
            public_key: None,
            signature: None,
            payment: Payment { destination, amount_drops, ..Payment::default() },
            memos: Vec::new(),
            tx_hash: None,
        }
    }

    fn build_fields(&self, include_signature: bool) -> Vec<Field> {
        let mut fields = vec![
            Field::account(self.source),
            Field::transaction_type(self.transaction_type),
            Field::sequence(self.sequence),
            Field::fee(self.fee_drops),
            Field::destination(self.payment.destination),
            Field::amount(self.payment.amount_drops),
        ];
        if let Some(pubkey) = self.public_key {
            fields.push(Field::signing_pub_key(pubkey.to_vec()));
        }
        fields.push(Field::flags(self.flags));
        if include_signature {
            if let Some(sig) = &self.signature {
                fields.push(Field::txn_signature(sig.clone()));
            }
        }
        if self.last_ledger_sequence > 0 {
            fields.push(Field::last_ledger_sequence(self.last_ledger_sequence));
        }
        if let Some(tag) = self.source_tag {
            fields.push(Field::source_tag(tag));
        }
        if let Some(tag) = self.payment.destination_tag {
            fields.push(Field::destination_tag(tag));
        }
        if let Some(hash) = self.account_txn_id {
            fields.push(Field::account_txn_id(hash));
        }
        if let Some(hash) = self.payment.invoice_id {
            fields.push(Field::invoice_id(hash));
        }
        if let Some(send_max) = self.payment.send_max {
            fields.push(Field::send_max(send_max));
        }
        if let Some(deliver_min) = self.payment.deliver_min {
            fields.push(Field::deliver_min(deliver_min));
        }
        if !self.memos.is_empty() {
            fields.push(Field::memos(self.memos.clone()));
        }
        fields
    }

    fn serialize_with(&self, include_signature: bool) -> Vec<u8> {
        let mut fields = self.build_fields(include_signature);
        crate::field::serialize(&mut fields)
    }

    /// Canonical serialization including the signature field, if present.
    pub fn serialize(&self) -> Vec<u8> {
        self.serialize_with(self.signature.is_some())
    }

    /// Requires a destination tag per the known-custodial-exchange list
    /// (spec.md §4.8's validation note).
    pub fn requires_destination_tag(&self) -> bool {
        address::requires_destination_tag(&address::address_from_account_id(&self.payment.destination))
            && self.payment.destination_tag.is_none()
    }

    /// Signs and re-serializes the transaction per spec.md §4.8's 7-step
    /// algorithm, deriving the signing key at `m/44'/144'/0'/0/account_index`
    /// from `seed`. Returns the final signed bytes; `self.tx_hash` and
    /// `self.signature` are populated as a side effect.
    pub fn sign(&mut self, seed: &[u8], account_index: u32, sequence: u32, last_ledger_sequence: u32) -> Result<Vec<u8>, Error> {
        let account = account::derive(seed, account_index)?;

        self.source = account.account_id;
        self.sequence = sequence;
        self.last_ledger_sequence = last_ledger_sequence;
        self.public_key = Some(account.pubkey_compressed);
        self.signature = None;

        let unsigned = self.serialize_with(false);
        let digest = signing_digest(&unsigned);
        let sig = secp::sign(&account.secret, &digest);
        self.signature = Some(sig.serialize_der().to_vec());

        let signed = self.serialize_with(true);
        let tx_hash = transaction_hash(&signed);
        self.tx_hash = Some(tx_hash);
        log::debug!(
            "signed payment sequence={} hash={}",
            sequence,
            tx_hash.iter().map(|b| format!("{b:02x}")).collect::<String>()
        );
        Ok(signed)
    }

    /// Parses a serialized Payment blob, matching `rippleTransactionCreateFromBytes`
    /// plus `getFieldInfo`'s field dispatch.
    pub fn deserialize(bytes: &[u8]) -> Transaction {
        let fields = crate::field::deserialize(bytes);
        let mut tx = Transaction {
            source: [0u8; 20],
            transaction_type: PAYMENT,
            fee_drops: 0,
            sequence: 0,
            flags: 0,
            last_ledger_sequence: 0,
            source_tag: None,
            account_txn_id: None,
            public_key: None,
            signature: None,
            payment: Payment::default(),
            memos: Vec::new(),
            tx_hash: None,
        };

        for field in &fields {
            use crate::field::Value;
            match (field.type_code, field.field_code, &field.value) {
                (1, 2, Value::UInt16(v)) => tx.transaction_type = *v,
                (2, 2, Value::UInt32(v)) => tx.flags = *v,
                (2, 3, Value::UInt32(v)) => tx.source_tag = Some(*v),
                (2, 4, Value::UInt32(v)) => tx.sequence = *v,
                (2, 14, Value::UInt32(v)) => tx.payment.destination_tag = Some(*v),
                (2, 27, Value::UInt32(v)) => tx.last_ledger_sequence = *v,
                (5, 9, Value::Hash256(h)) => tx.account_txn_id = Some(*h),
                (5, 17, Value::Hash256(h)) => tx.payment.invoice_id = Some(*h),
                (6, 8, Value::Amount(a)) => tx.fee_drops = *a,
                (6, 1, Value::Amount(a)) => tx.payment.amount_drops = *a,
                (6, 9, Value::Amount(a)) => tx.payment.send_max = Some(*a),
                (6, 10, Value::Amount(a)) => tx.payment.deliver_min = Some(*a),
                (7, 3, Value::Blob(b)) if b.len() == 33 => {
                    let mut pk = [0u8; 33];
                    pk.copy_from_slice(b);
                    tx.public_key = Some(pk);
                }
                (7, 4, Value::Blob(b)) => tx.signature = Some(b.clone()),
                (8, 1, Value::Account(a)) => tx.source = *a,
                (8, 3, Value::Account(a)) => tx.payment.destination = *a,
                (15, 9, Value::Memos(m)) => tx.memos = m.clone(),
                _ => {}
            }
        }

        tx.tx_hash = Some(transaction_hash(bytes));
        tx
    }
}

fn prefixed_sha512_first32(prefix: &[u8; 4], body: &[u8]) -> [u8; 32] {
    let mut buf = Vec::with_capacity(4 + body.len());
    buf.extend_from_slice(prefix);
    buf.extend_from_slice(body);
    let digest = sha512(&buf);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest.as_bytes()[..32]);
    out
}

/// `STX\0` signing digest (spec.md §4.8 step 3).
fn signing_digest(unsigned: &[u8]) -> [u8; 32] {
    prefixed_sha512_first32(&[0x53, 0x54, 0x58, 0x00], unsigned)
}

/// `TXN\0` transaction-id digest (spec.md §4.8 step 6).
fn transaction_hash(signed: &[u8]) -> [u8; 32] {
    prefixed_sha512_first32(&[0x54, 0x58, 0x4e, 0x00], signed)
}
