//! Topological ordering of a wallet's transaction list (spec.md §4.5.4).
//!
//! Re-architected per spec.md §9's design note: rather than smuggling the
//! owning wallet through an overloaded pointer field on the comparator's
//! arguments, the comparator closure simply closes over the wallet state
//! it needs. No pointer trick, same ordering semantics.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use vault_common::Hash256;

use crate::transaction::Transaction;
use crate::wallet::chain::AddressChain;
use crate::wallet::index::AddressIndex;

/// `true` if `t` spends, directly or transitively (following `all_tx`),
/// any output of the transaction hashed `target`.
fn depends_on(all_tx: &HashMap<Hash256, Transaction>, t: &Transaction, target: Hash256, visited: &mut HashSet<Hash256>) -> bool {
    for input in &t.inputs {
        if input.prev_tx_hash == target {
            return true;
        }
        if visited.insert(input.prev_tx_hash) {
            if let Some(parent) = all_tx.get(&input.prev_tx_hash) {
                if depends_on(all_tx, parent, target, visited) {
                    return true;
                }
            }
        }
    }
    false
}

/// `(chain, index)` position of a transaction's first output's address,
/// internal chain checked before external, used only to break ties
/// between otherwise-unordered transactions.
fn tie_key(index: &AddressIndex, internal: &AddressChain, external: &AddressChain, t: &Transaction) -> (u8, u32) {
    if let Some(addr) = index.output_address(t.tx_hash, 0) {
        if let Some(i) = internal.index_of(addr) {
            return (0, i);
        }
        if let Some(i) = external.index_of(addr) {
            return (1, i);
        }
    }
    (2, 0)
}

/// Stable merge sort over `transactions` implementing spec.md §4.5.4's
/// `txCompare`: dependency order first, then confirmation height, then
/// the address-chain position tie-break.
pub fn sort_transactions(
    transactions: &mut Vec<Transaction>,
    all_tx: &HashMap<Hash256, Transaction>,
    internal: &AddressChain,
    external: &AddressChain,
    index: &AddressIndex,
) {
    transactions.sort_by(|a, b| {
        let mut visited = HashSet::new();
        if depends_on(all_tx, b, a.tx_hash, &mut visited) {
            return Ordering::Less;
        }
        visited.clear();
        if depends_on(all_tx, a, b.tx_hash, &mut visited) {
            return Ordering::Greater;
        }
        match a.block_height.cmp(&b.block_height) {
            Ordering::Equal => tie_key(index, internal, external, a).cmp(&tie_key(index, internal, external, b)),
            other => other,
        }
    });
}
