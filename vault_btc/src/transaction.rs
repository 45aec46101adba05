//! UTXO transaction model and serialization (spec.md §3/§4.6).
//!
//! Per spec.md §9's "cyclic dependency from wallet to transaction" design
//! note, inputs/outputs carry no `address` field: that denormalized cache
//! is re-architected as an index the wallet owns (`wallet::AddressIndex`)
//! rather than living on the transaction itself.

use vault_common::hash::sha256d;
use vault_common::varint;
use vault_common::Hash256;

pub const UNCONFIRMED_HEIGHT: u32 = u32::MAX;
const SIGHASH_ALL: u32 = 0x01;

/// A transaction input. `script` is the *previous output's* scriptPubKey,
/// carried so the signing loop can substitute it in per spec.md §4.6;
/// `signature` is the actual scriptSig, empty until the input is signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn {
    pub prev_tx_hash: Hash256,
    pub prev_out_index: u32,
    pub script: Vec<u8>,
    pub signature: Vec<u8>,
    pub sequence: u32,
}

impl TxIn {
    pub fn new(prev_tx_hash: Hash256, prev_out_index: u32, script: Vec<u8>) -> Self {
        TxIn {
            prev_tx_hash,
            prev_out_index,
            script,
            signature: Vec::new(),
            sequence: 0xffff_ffff,
        }
    }

    pub fn is_signed(&self) -> bool {
        !self.signature.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut {
    pub amount: u64,
    pub script: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub tx_hash: Hash256,
    pub version: u32,
    pub inputs: Vec<TxIn>,
    pub outputs: Vec<TxOut>,
    pub lock_time: u32,
    pub block_height: u32,
    pub timestamp: u32,
}

impl Transaction {
    pub fn new(inputs: Vec<TxIn>, outputs: Vec<TxOut>) -> Self {
        let mut tx = Transaction {
            tx_hash: Hash256::ZERO,
            version: 1,
            inputs,
            outputs,
            lock_time: 0,
            block_height: UNCONFIRMED_HEIGHT,
            timestamp: 0,
        };
        tx.tx_hash = tx.compute_tx_hash();
        tx
    }

    pub fn is_unconfirmed(&self) -> bool {
        self.block_height == UNCONFIRMED_HEIGHT
    }

    /// `version || varint(inCount) || inputs || varint(outCount) || outputs
    /// || lockTime`, per spec.md §4.6. When `subscript_index` is `Some(i)`,
    /// input `i`'s script field (the referenced scriptPubKey) stands in
    /// for its scriptSig and every other input's script is empty — the
    /// signing-subscript substitution used to build the pre-signature
    /// digest. Otherwise every input serializes its actual `signature`.
    fn serialize_inner(&self, subscript_index: Option<usize>) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&self.version.to_le_bytes());
        out.extend_from_slice(&varint::encode(self.inputs.len() as u64));

        for (i, input) in self.inputs.iter().enumerate() {
            out.extend_from_slice(input.prev_tx_hash.as_bytes());
            out.extend_from_slice(&input.prev_out_index.to_le_bytes());

            let script: &[u8] = match subscript_index {
                Some(j) if j == i => &input.script,
                Some(_) => &[],
                None => &input.signature,
            };
            out.extend_from_slice(&varint::encode(script.len() as u64));
            out.extend_from_slice(script);
            out.extend_from_slice(&input.sequence.to_le_bytes());
        }

        out.extend_from_slice(&varint::encode(self.outputs.len() as u64));
        for output in &self.outputs {
            out.extend_from_slice(&output.amount.to_le_bytes());
            out.extend_from_slice(&varint::encode(output.script.len() as u64));
            out.extend_from_slice(&output.script);
        }

        out.extend_from_slice(&self.lock_time.to_le_bytes());
        out
    }

    /// Fully serialized form, no subscript substitution. `txHash` is the
    /// double-SHA-256 of this.
    pub fn serialize(&self) -> Vec<u8> {
        self.serialize_inner(None)
    }

    /// Pre-signature digest input for input `index`: the subscript
    /// substitution above, plus a trailing little-endian `SIGHASH_ALL`
    /// that is hashed but never included in the final transaction
    /// (spec.md §4.5.6/§4.6).
    pub fn serialize_for_signing(&self, index: usize) -> Vec<u8> {
        let mut out = self.serialize_inner(Some(index));
        out.extend_from_slice(&SIGHASH_ALL.to_le_bytes());
        out
    }

    pub fn compute_tx_hash(&self) -> Hash256 {
        sha256d(&self.serialize())
    }
}
