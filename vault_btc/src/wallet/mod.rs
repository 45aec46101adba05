//! The UTXO wallet engine (spec.md §4.5) — the hardest piece of this
//! crate. Maintains the all-transactions/UTXO/spent-output sets, balance
//! history, topological transaction order, receive/change address chain
//! expansion, coin selection, and the signing loop, all serialized
//! through one per-wallet mutex (spec.md §4.5.7/§5).

mod callbacks;
mod chain;
mod coin_select;
mod index;
mod topo;

pub use callbacks::{NoCallbacks, WalletCallbacks};
pub use chain::AddressChain;
pub use index::AddressIndex;

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use vault_common::hash::sha256d;
use vault_common::Hash256;
use vault_keys::{privkey_derive, ChainParams, MasterPubKey};

use crate::address::address_from_script_pubkey;
use crate::error::Error;
use crate::fee;
use crate::model::OutPoint;
use crate::script::push_data;
use crate::transaction::{Transaction, TxOut};

const SIGHASH_ALL_BYTE: u8 = 0x01;

pub struct WalletConfig {
    pub master_pub_key: MasterPubKey,
    pub chain_params: ChainParams,
    pub external_gap_limit: usize,
    pub internal_gap_limit: usize,
    pub fee_per_kb: u64,
}

impl WalletConfig {
    pub fn new(master_pub_key: MasterPubKey, chain_params: ChainParams) -> Self {
        WalletConfig {
            master_pub_key,
            chain_params,
            external_gap_limit: 10,
            internal_gap_limit: 5,
            fee_per_kb: fee::TX_FEE_PER_KB,
        }
    }
}

struct WalletState {
    master_pub_key: MasterPubKey,
    chain_params: ChainParams,
    external_chain: AddressChain,
    internal_chain: AddressChain,
    external_gap_limit: usize,
    internal_gap_limit: usize,
    fee_per_kb: u64,
    balance: u64,
    total_sent: u64,
    total_received: u64,
    balance_hist: Vec<u64>,
    all_tx: HashMap<Hash256, Transaction>,
    invalid_tx: HashSet<Hash256>,
    spent_outputs: HashSet<OutPoint>,
    used_addrs: HashSet<String>,
    all_addrs: HashSet<String>,
    transactions: Vec<Hash256>,
    utxos: Vec<OutPoint>,
    address_index: AddressIndex,
}

/// The UTXO wallet engine. `seed_supplier` stands in for the external
/// "auth_prompt" collaborator of spec.md §6: it is asked for the BIP-39
/// seed only when signing, and may decline (returns `None`), in which
/// case signing reports `Error::SignerRefused`.
pub struct Wallet {
    seed_supplier: Box<dyn Fn() -> Option<Vec<u8>> + Send + Sync>,
    callbacks: Mutex<Box<dyn WalletCallbacks>>,
    state: Mutex<WalletState>,
}

enum Event {
    BalanceChanged(u64),
    TxAdded(Transaction),
    TxUpdated(Transaction),
    TxDeleted(Hash256),
}

impl Wallet {
    pub fn new<F>(config: WalletConfig, existing_transactions: Vec<Transaction>, seed_supplier: F) -> Result<Self, Error>
    where
        F: Fn() -> Option<Vec<u8>> + Send + Sync + 'static,
    {
        let mut state = WalletState {
            master_pub_key: config.master_pub_key,
            chain_params: config.chain_params,
            external_chain: AddressChain::new(),
            internal_chain: AddressChain::new(),
            external_gap_limit: config.external_gap_limit,
            internal_gap_limit: config.internal_gap_limit,
            fee_per_kb: config.fee_per_kb,
            balance: 0,
            total_sent: 0,
            total_received: 0,
            balance_hist: Vec::new(),
            all_tx: HashMap::new(),
            invalid_tx: HashSet::new(),
            spent_outputs: HashSet::new(),
            used_addrs: HashSet::new(),
            all_addrs: HashSet::new(),
            transactions: Vec::new(),
            utxos: Vec::new(),
            address_index: AddressIndex::new(),
        };

        expand_chains(&mut state)?;

        for tx in existing_transactions {
            insert_transaction(&mut state, tx)?;
        }
        recompute(&mut state);

        Ok(Wallet {
            seed_supplier: Box::new(seed_supplier),
            callbacks: Mutex::new(Box::new(NoCallbacks)),
            state: Mutex::new(state),
        })
    }

    pub fn set_callbacks(&self, callbacks: Box<dyn WalletCallbacks>) {
        *self.callbacks.lock().expect("wallet callback mutex poisoned") = callbacks;
    }

    pub fn receive_address(&self) -> String {
        let state = self.state.lock().expect("wallet mutex poisoned");
        state
            .external_chain
            .next_unused(&state.used_addrs)
            .expect("external chain is kept expanded past the gap limit")
            .to_string()
    }

    pub fn change_address(&self) -> String {
        let state = self.state.lock().expect("wallet mutex poisoned");
        state
            .internal_chain
            .next_unused(&state.used_addrs)
            .expect("internal chain is kept expanded past the gap limit")
            .to_string()
    }

    pub fn balance(&self) -> u64 {
        self.state.lock().expect("wallet mutex poisoned").balance
    }

    pub fn total_sent(&self) -> u64 {
        self.state.lock().expect("wallet mutex poisoned").total_sent
    }

    pub fn total_received(&self) -> u64 {
        self.state.lock().expect("wallet mutex poisoned").total_received
    }

    pub fn utxos(&self) -> Vec<OutPoint> {
        self.state.lock().expect("wallet mutex poisoned").utxos.clone()
    }

    /// Snapshot of the wallet's transactions in topological order.
    pub fn transactions(&self) -> Vec<Transaction> {
        let state = self.state.lock().expect("wallet mutex poisoned");
        state
            .transactions
            .iter()
            .filter_map(|h| state.all_tx.get(h).cloned())
            .collect()
    }

    pub fn set_fee_per_kb(&self, fee_per_kb: u64) {
        let mut state = self.state.lock().expect("wallet mutex poisoned");
        state.fee_per_kb = fee_per_kb;
    }

    pub fn fee_for_tx(&self, tx: &Transaction) -> u64 {
        let state = self.state.lock().expect("wallet mutex poisoned");
        fee::fee_for_size(fee::estimate_size(tx), state.fee_per_kb)
    }

    /// Builds an unsigned transaction paying `amount` to `to_address`,
    /// selecting and attaching a change output as needed (spec.md
    /// §4.5.2). Returns `Ok(None)` for the external interface's "null
    /// transaction" failure convention is modeled as `Err` here instead,
    /// matching this crate's `Result`-everywhere error discipline.
    pub fn create_transaction(&self, amount: u64, to_address: &str) -> Result<Transaction, Error> {
        let state = self.state.lock().expect("wallet mutex poisoned");
        let script = crate::address::script_pubkey_from_address(to_address, state.chain_params)
            .ok_or(Error::InvalidTransaction)?;
        let change_address = state
            .internal_chain
            .next_unused(&state.used_addrs)
            .expect("internal chain is kept expanded past the gap limit")
            .to_string();

        coin_select::select_coins(
            &state.utxos,
            &state.all_tx,
            &state.all_addrs,
            state.fee_per_kb,
            &change_address,
            state.chain_params,
            vec![TxOut { amount, script }],
        )
    }

    /// Signs every input whose referenced scriptPubKey is a P2PKH the
    /// wallet derived a key for. Returns whether *every* input is now
    /// signed; an individual input's failure to match a wallet key is
    /// silent (spec.md §4.5.6/§7).
    pub fn sign_transaction(&self, tx: &mut Transaction) -> Result<bool, Error> {
        let seed = (self.seed_supplier)().ok_or(Error::SignerRefused)?;
        let (chain_params, external, internal) = {
            let state = self.state.lock().expect("wallet mutex poisoned");
            (state.chain_params, state.external_chain.clone(), state.internal_chain.clone())
        };

        let mut any_signed = false;
        for i in 0..tx.inputs.len() {
            let script = tx.inputs[i].script.clone();
            let addr = match address_from_script_pubkey(&script, chain_params) {
                Some(a) => a,
                None => continue,
            };
            let (internal_chain, index) = if let Some(idx) = external.index_of(&addr) {
                (false, idx)
            } else if let Some(idx) = internal.index_of(&addr) {
                (true, idx)
            } else {
                continue;
            };

            let privkey = match privkey_derive(&seed, internal_chain, index) {
                Ok(k) => k,
                Err(_) => continue,
            };
            let digest = sha256d(&tx.serialize_for_signing(i));
            let sig = vault_common::secp::sign(&privkey, digest.as_bytes());
            let der = sig.serialize_der();
            let mut der_with_hashtype = der.to_vec();
            der_with_hashtype.push(SIGHASH_ALL_BYTE);

            let pubkey = vault_common::secp::pubkey_from_secret(&privkey);
            let pubkey_bytes = vault_common::secp::pubkey_serialize_compressed(&pubkey);

            let mut script_sig = push_data(&der_with_hashtype);
            script_sig.extend(push_data(&pubkey_bytes));
            tx.inputs[i].signature = script_sig;
            any_signed = true;
        }

        tx.tx_hash = tx.compute_tx_hash();
        let all_signed = tx.inputs.iter().all(|i| i.is_signed());
        if !all_signed && !any_signed {
            return Err(Error::NotAuthorized);
        }
        log::debug!("signed transaction {} (all_signed={})", tx.tx_hash, all_signed);
        Ok(all_signed)
    }

    /// Registers `tx` into the wallet, extends both address chains, and
    /// recomputes balance/ordering (spec.md §4.5.5).
    pub fn register_transaction(&self, tx: Transaction) -> Result<(), Error> {
        let mut events = Vec::new();
        {
            let mut state = self.state.lock().expect("wallet mutex poisoned");
            if state.all_tx.contains_key(&tx.tx_hash) {
                return Err(Error::Duplicate);
            }
            let old_balance = state.balance;
            let recorded = tx.clone();

            insert_transaction(&mut state, tx)?;
            recompute(&mut state);
            expand_chains(&mut state)?;

            log::debug!("registered transaction {}", recorded.tx_hash);
            events.push(Event::TxAdded(recorded));
            if state.balance != old_balance {
                log::info!("wallet balance changed: {} -> {}", old_balance, state.balance);
                events.push(Event::BalanceChanged(state.balance));
            }
        }
        self.fire(events);
        Ok(())
    }

    /// Removes `tx_hash` and, recursively, every later-or-equal-height
    /// transaction that spends one of its outputs (spec.md §4.5.5).
    pub fn remove_transaction(&self, tx_hash: Hash256) {
        let mut events = Vec::new();
        {
            let mut state = self.state.lock().expect("wallet mutex poisoned");
            let old_balance = state.balance;
            let mut removed = Vec::new();
            remove_recursive(&mut state, tx_hash, &mut removed);
            recompute(&mut state);

            for h in removed {
                log::debug!("removed transaction {}", h);
                events.push(Event::TxDeleted(h));
            }
            if state.balance != old_balance {
                log::info!("wallet balance changed: {} -> {}", old_balance, state.balance);
                events.push(Event::BalanceChanged(state.balance));
            }
        }
        self.fire(events);
    }

    /// Updates confirmation height/timestamp for a batch of transactions
    /// (e.g. after a new block is seen) and recomputes balance/ordering.
    pub fn update_transactions(&self, hashes: &[Hash256], height: u32, timestamp: u32) {
        let mut events = Vec::new();
        {
            let mut state = self.state.lock().expect("wallet mutex poisoned");
            let old_balance = state.balance;
            for &h in hashes {
                if let Some(tx) = state.all_tx.get_mut(&h) {
                    tx.block_height = height;
                    tx.timestamp = timestamp;
                    events.push(Event::TxUpdated(tx.clone()));
                }
            }
            recompute(&mut state);
            if state.balance != old_balance {
                events.push(Event::BalanceChanged(state.balance));
            }
        }
        self.fire(events);
    }

    /// Fires queued callbacks outside the wallet lock (spec.md §4.5.7/§9).
    fn fire(&self, events: Vec<Event>) {
        let callbacks = self.callbacks.lock().expect("wallet callback mutex poisoned");
        for event in events {
            match event {
                Event::BalanceChanged(b) => callbacks.balance_changed(b),
                Event::TxAdded(tx) => callbacks.tx_added(&tx),
                Event::TxUpdated(tx) => callbacks.tx_updated(&tx),
                Event::TxDeleted(h) => callbacks.tx_deleted(h),
            }
        }
    }
}

/// `containsTransaction` per spec.md §4.5.5: true if any output address or
/// any referenced-previous-output address is already known to the wallet.
fn contains_transaction(state: &WalletState, tx: &Transaction) -> bool {
    for output in &tx.outputs {
        if let Some(addr) = address_from_script_pubkey(&output.script, state.chain_params) {
            if state.all_addrs.contains(&addr) {
                return true;
            }
        }
    }
    for input in &tx.inputs {
        if let Some(addr) = address_from_script_pubkey(&input.script, state.chain_params) {
            if state.all_addrs.contains(&addr) {
                return true;
            }
        }
    }
    false
}

fn insert_transaction(state: &mut WalletState, tx: Transaction) -> Result<(), Error> {
    if !contains_transaction(state, &tx) {
        return Err(Error::InvalidTransaction);
    }
    let tx_hash = tx.tx_hash;
    state.address_index.index_transaction(&tx, state.chain_params);

    for output in &tx.outputs {
        if let Some(addr) = address_from_script_pubkey(&output.script, state.chain_params) {
            state.used_addrs.insert(addr.clone());
            state.all_addrs.insert(addr);
        }
    }
    for input in &tx.inputs {
        if let Some(addr) = address_from_script_pubkey(&input.script, state.chain_params) {
            state.used_addrs.insert(addr.clone());
            state.all_addrs.insert(addr);
        }
    }

    state.all_tx.insert(tx_hash, tx);
    state.transactions.push(tx_hash);
    Ok(())
}

fn remove_recursive(state: &mut WalletState, tx_hash: Hash256, removed: &mut Vec<Hash256>) {
    if !state.all_tx.contains_key(&tx_hash) {
        return;
    }
    let target_height = state.all_tx[&tx_hash].block_height;

    let dependents: Vec<Hash256> = state
        .all_tx
        .values()
        .filter(|t| t.block_height >= target_height && t.tx_hash != tx_hash)
        .filter(|t| t.inputs.iter().any(|i| i.prev_tx_hash == tx_hash))
        .map(|t| t.tx_hash)
        .collect();

    for dep in dependents {
        remove_recursive(state, dep, removed);
    }

    if let Some(tx) = state.all_tx.remove(&tx_hash) {
        state.transactions.retain(|h| *h != tx_hash);
        state
            .address_index
            .remove_transaction(tx_hash, tx.inputs.len(), tx.outputs.len());
        removed.push(tx_hash);
    }
}

/// Recomputes `utxos`, `spentOutputs`, `invalidTx`, `balance`,
/// `totalSent`/`totalReceived`, and `balanceHist` from scratch, per
/// spec.md §4.5.3, and re-sorts `transactions` topologically per §4.5.4.
fn recompute(state: &mut WalletState) {
    let mut ordered: Vec<Transaction> = state
        .transactions
        .iter()
        .filter_map(|h| state.all_tx.get(h).cloned())
        .collect();
    topo::sort_transactions(&mut ordered, &state.all_tx, &state.internal_chain, &state.external_chain, &state.address_index);
    state.transactions = ordered.iter().map(|t| t.tx_hash).collect();

    state.utxos.clear();
    state.balance_hist.clear();
    state.spent_outputs.clear();
    state.invalid_tx.clear();
    state.total_sent = 0;
    state.total_received = 0;

    let mut balance: u64 = 0;

    for tx in &ordered {
        let spent: Vec<OutPoint> = tx
            .inputs
            .iter()
            .map(|i| OutPoint::new(i.prev_tx_hash, i.prev_out_index))
            .collect();

        let spends_invalid_output = spent.iter().any(|o| state.spent_outputs.contains(o))
            || tx.inputs.iter().any(|i| state.invalid_tx.contains(&i.prev_tx_hash));
        if tx.is_unconfirmed() && spends_invalid_output {
            state.invalid_tx.insert(tx.tx_hash);
            continue;
        }

        for o in &spent {
            state.spent_outputs.insert(*o);
        }

        let balance_before = balance;

        for (i, output) in tx.outputs.iter().enumerate() {
            if let Some(addr) = address_from_script_pubkey(&output.script, state.chain_params) {
                if state.all_addrs.contains(&addr) {
                    state.utxos.push(OutPoint::new(tx.tx_hash, i as u32));
                    balance += output.amount;
                }
            }
        }

        let spent_now: Vec<OutPoint> = state
            .utxos
            .iter()
            .filter(|u| state.spent_outputs.contains(u))
            .cloned()
            .collect();
        if !spent_now.is_empty() {
            let mut removed_amount = 0u64;
            state.utxos.retain(|u| {
                if spent_now.contains(u) {
                    if let Some(t) = state.all_tx.get(&u.tx_hash) {
                        if let Some(out) = t.outputs.get(u.output_index as usize) {
                            removed_amount += out.amount;
                        }
                    }
                    false
                } else {
                    true
                }
            });
            balance = balance.saturating_sub(removed_amount);
        }

        if balance > balance_before {
            state.total_received += balance - balance_before;
        } else if balance < balance_before {
            state.total_sent += balance_before - balance;
        }

        state.balance_hist.push(balance);
    }

    state.balance = balance;
}

fn expand_chains(state: &mut WalletState) -> Result<(), Error> {
    let used = state.used_addrs.clone();
    let mpk = state.master_pub_key;
    let params = state.chain_params;
    let external_gap = state.external_gap_limit;
    let internal_gap = state.internal_gap_limit;

    let new_external = state.external_chain.unused_addresses(external_gap, false, &mpk, params, &used)?;
    let new_internal = state.internal_chain.unused_addresses(internal_gap, true, &mpk, params, &used)?;
    for a in new_external.into_iter().chain(new_internal) {
        state.all_addrs.insert(a);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::TxIn;
    use vault_keys::mpk_from_seed;

    fn test_wallet(seed: [u8; 32]) -> Wallet {
        let mpk = mpk_from_seed(&seed).unwrap();
        let config = WalletConfig::new(mpk, ChainParams::mainnet());
        Wallet::new(config, Vec::new(), move || Some(seed.to_vec())).unwrap()
    }

    #[test]
    fn fresh_wallet_receive_and_change_addresses_differ_and_start_at_index_zero() {
        let wallet = test_wallet([0x10u8; 32]);
        let receive = wallet.receive_address();
        let change = wallet.change_address();
        assert_ne!(receive, change);

        let state = wallet.state.lock().unwrap();
        assert_eq!(state.external_chain.index_of(&receive), Some(0));
        assert_eq!(state.internal_chain.index_of(&change), Some(0));
    }

    #[test]
    fn registering_a_tx_paying_receive_address_advances_it() {
        let wallet = test_wallet([0x20u8; 32]);
        let receive0 = wallet.receive_address();
        let script = crate::address::script_pubkey_from_address(&receive0, ChainParams::mainnet()).unwrap();

        let coinbase_like = Transaction::new(
            vec![TxIn::new(Hash256::ZERO, 0xffff_ffff, vec![])],
            vec![TxOut {
                amount: 50_000,
                script,
            }],
        );
        // coinbase-like inputs reference no wallet address; seed the
        // all_addrs set first via a receive-address-only transaction is
        // not how containsTransaction works, so this tx must pay the
        // address directly, which it does via its single output.
        wallet.register_transaction(coinbase_like).unwrap();

        let receive1 = wallet.receive_address();
        assert_ne!(receive0, receive1);
        assert_eq!(wallet.balance(), 50_000);
    }

    #[test]
    fn duplicate_registration_is_rejected() {
        let wallet = test_wallet([0x30u8; 32]);
        let receive0 = wallet.receive_address();
        let script = crate::address::script_pubkey_from_address(&receive0, ChainParams::mainnet()).unwrap();
        let tx = Transaction::new(
            vec![TxIn::new(Hash256::ZERO, 0, vec![])],
            vec![TxOut { amount: 1000, script }],
        );
        wallet.register_transaction(tx.clone()).unwrap();
        assert!(matches!(wallet.register_transaction(tx), Err(Error::Duplicate)));
    }

    #[test]
    fn unrelated_transaction_is_rejected_as_invalid() {
        let wallet = test_wallet([0x40u8; 32]);
        let tx = Transaction::new(
            vec![TxIn::new(Hash256::ZERO, 0, vec![])],
            vec![TxOut {
                amount: 1000,
                script: vec![0x51], // not a recognized template, no wallet address
            }],
        );
        assert!(matches!(wallet.register_transaction(tx), Err(Error::InvalidTransaction)));
    }

    #[test]
    fn removing_a_transaction_zeroes_its_contribution_to_balance() {
        let wallet = test_wallet([0x50u8; 32]);
        let receive0 = wallet.receive_address();
        let script = crate::address::script_pubkey_from_address(&receive0, ChainParams::mainnet()).unwrap();
        let tx = Transaction::new(
            vec![TxIn::new(Hash256::ZERO, 0, vec![])],
            vec![TxOut { amount: 7000, script }],
        );
        let tx_hash = tx.tx_hash;
        wallet.register_transaction(tx).unwrap();
        assert_eq!(wallet.balance(), 7000);

        wallet.remove_transaction(tx_hash);
        assert_eq!(wallet.balance(), 0);
    }
}
