//! Wallet-owned denormalized `{txHash, outputIndex} -> address` /
//! `{txHash, inputIndex} -> address` index, replacing the address fields
//! spec.md §3 puts directly on `TxIn`/`TxOut`, per spec.md §9's "cyclic
//! dependency from wallet to transaction" design note. The transaction
//! model stays pure; only the wallet needs this cache, for membership
//! tests.

use std::collections::HashMap;

use vault_common::Hash256;
use vault_keys::ChainParams;

use crate::address::{address_from_script_pubkey, address_from_script_sig};
use crate::transaction::Transaction;

#[derive(Debug, Clone, Default)]
pub struct AddressIndex {
    outputs: HashMap<(Hash256, u32), String>,
    inputs: HashMap<(Hash256, u32), String>,
}

impl AddressIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derives and caches the address for every input/output of `tx`:
    /// outputs from their scriptPubKey (spec.md §4.3's strict path),
    /// inputs from their scriptSig (the permissive path), per spec.md §3.
    pub fn index_transaction(&mut self, tx: &Transaction, params: ChainParams) {
        for (i, output) in tx.outputs.iter().enumerate() {
            if let Some(addr) = address_from_script_pubkey(&output.script, params) {
                self.outputs.insert((tx.tx_hash, i as u32), addr);
            }
        }
        for (i, input) in tx.inputs.iter().enumerate() {
            let addr = if input.is_signed() {
                address_from_script_sig(&input.signature, params)
            } else {
                address_from_script_pubkey(&input.script, params)
            };
            if let Some(addr) = addr {
                self.inputs.insert((tx.tx_hash, i as u32), addr);
            }
        }
    }

    pub fn output_address(&self, tx_hash: Hash256, output_index: u32) -> Option<&str> {
        self.outputs.get(&(tx_hash, output_index)).map(|s| s.as_str())
    }

    pub fn input_address(&self, tx_hash: Hash256, input_index: u32) -> Option<&str> {
        self.inputs.get(&(tx_hash, input_index)).map(|s| s.as_str())
    }

    pub fn remove_transaction(&mut self, tx_hash: Hash256, num_inputs: usize, num_outputs: usize) {
        for i in 0..num_outputs {
            self.outputs.remove(&(tx_hash, i as u32));
        }
        for i in 0..num_inputs {
            self.inputs.remove(&(tx_hash, i as u32));
        }
    }
}
