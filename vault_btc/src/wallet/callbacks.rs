//! Wallet mutation notifications, modeled as a capability interface per
//! spec.md §9's design note ("Callbacks as function-pointer + opaque
//! context... Model as a capability interface... Do not invoke handler
//! methods while holding the wallet lock").

use vault_common::Hash256;

use crate::transaction::Transaction;

/// Implementors must be safe to call from any thread; the wallet makes no
/// promise about which thread fires a given callback, only that
/// callbacks from a single mutator are observed in mutation order
/// (spec.md §5).
pub trait WalletCallbacks: Send + Sync {
    fn balance_changed(&self, _balance: u64) {}
    fn tx_added(&self, _tx: &Transaction) {}
    fn tx_updated(&self, _tx: &Transaction) {}
    fn tx_deleted(&self, _tx_hash: Hash256) {}
}

/// The default no-op handler, used when a caller hasn't registered one.
#[derive(Debug, Default)]
pub struct NoCallbacks;

impl WalletCallbacks for NoCallbacks {}
