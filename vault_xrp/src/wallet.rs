//! The XRP wallet: a single-account transfer ledger that tracks balance
//! and sequence number as transfers are added, mirroring
//! `BRRippleWallet.c`/`BRRippleTransfer.c` (spec.md §4.9).

use crate::address::FEE_ACCOUNT_ID;
use crate::transaction::FeeBasis;

/// One observed value movement touching this wallet's account, either as
/// source or target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub tx_hash: [u8; 32],
    pub source: [u8; 20],
    pub target: [u8; 20],
    pub amount_drops: u64,
    pub timestamp: u64,
    pub block_height: u64,
}

impl Transfer {
    pub fn new(source: [u8; 20], target: [u8; 20], amount_drops: u64, tx_hash: [u8; 32], timestamp: u64, block_height: u64) -> Transfer {
        Transfer { tx_hash, source, target, amount_drops, timestamp, block_height }
    }

    /// A pure-fee entry, recorded against the `__fee__` sentinel target.
    pub fn fee_entry(source: [u8; 20], fee_drops: u64, tx_hash: [u8; 32], timestamp: u64, block_height: u64) -> Transfer {
        Transfer::new(source, FEE_ACCOUNT_ID, fee_drops, tx_hash, timestamp, block_height)
    }

    /// Returns `amount` if this is a `__fee__`-sentinel entry, else zero.
    pub fn fee(&self) -> u64 {
        if self.target == FEE_ACCOUNT_ID {
            self.amount_drops
        } else {
            0
        }
    }

    fn equal_identity(&self, other: &Transfer) -> bool {
        self.tx_hash == other.tx_hash && self.source == other.source && self.target == other.target
    }
}

pub struct Wallet {
    account_address: [u8; 20],
    fee_basis: FeeBasis,
    balance: i64,
    sequence: u32,
    transfers: Vec<Transfer>,
}

impl Wallet {
    pub fn new(account_address: [u8; 20]) -> Wallet {
        Wallet {
            account_address,
            fee_basis: FeeBasis::default(),
            balance: 0,
            sequence: 0,
            transfers: Vec::new(),
        }
    }

    pub fn address(&self) -> [u8; 20] {
        self.account_address
    }

    pub fn has_address(&self, address: &[u8; 20]) -> bool {
        self.account_address == *address
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub fn set_balance(&mut self, balance: i64) {
        self.balance = balance;
    }

    pub fn fee_basis(&self) -> FeeBasis {
        self.fee_basis
    }

    pub fn set_fee_basis(&mut self, fee_basis: FeeBasis) {
        self.fee_basis = fee_basis;
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }

    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    pub fn has_transfer(&self, transfer: &Transfer) -> bool {
        self.transfers.iter().any(|t| t.equal_identity(transfer))
    }

    /// Adds `transfer` unless an identical `(txHash, source, target)` entry
    /// already exists, updating balance and the account's sequence number
    /// (= count of transfers sourced from this account) as a side effect.
    pub fn add_transfer(&mut self, transfer: Transfer) -> bool {
        if self.has_transfer(&transfer) {
            return false;
        }
        if transfer.source == self.account_address {
            self.balance -= transfer.amount_drops as i64 + transfer.fee() as i64;
        } else {
            self.balance += transfer.amount_drops as i64;
        }
        self.transfers.push(transfer);
        self.sequence = self
            .transfers
            .iter()
            .filter(|t| t.source == self.account_address)
            .count() as u32;
        log::debug!(
            "added transfer {} to ledger (balance={}, sequence={})",
            transfer.tx_hash.iter().map(|b| format!("{b:02x}")).collect::<String>(),
            self.balance,
            self.sequence
        );
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(byte: u8) -> [u8; 20] {
        [byte; 20]
    }

    #[test]
    fn incoming_transfer_increases_balance() {
        let mut wallet = Wallet::new(account(1));
        let transfer = Transfer::new(account(2), account(1), 1_000, [0xaa; 32], 0, 0);
        assert!(wallet.add_transfer(transfer));
        assert_eq!(wallet.balance(), 1_000);
        assert_eq!(wallet.sequence(), 0);
    }

    #[test]
    fn outgoing_transfer_decreases_balance_by_amount_plus_fee() {
        let mut wallet = Wallet::new(account(1));
        wallet.set_balance(10_000);
        let transfer = Transfer::new(account(1), account(2), 1_000, [0xbb; 32], 0, 0);
        let fee = Transfer::fee_entry(account(1), 12, [0xbb; 32], 0, 0);
        wallet.add_transfer(transfer);
        wallet.add_transfer(fee);
        assert_eq!(wallet.balance(), 10_000 - 1_000 - 24);
        assert_eq!(wallet.sequence(), 2);
    }

    #[test]
    fn duplicate_transfer_is_rejected_and_does_not_reapply_balance() {
        let mut wallet = Wallet::new(account(1));
        let transfer = Transfer::new(account(2), account(1), 1_000, [0xcc; 32], 0, 0);
        assert!(wallet.add_transfer(transfer));
        assert!(!wallet.add_transfer(transfer));
        assert_eq!(wallet.balance(), 1_000);
    }

    #[test]
    fn sequence_counts_only_transfers_sourced_from_this_account() {
        let mut wallet = Wallet::new(account(1));
        wallet.add_transfer(Transfer::new(account(1), account(2), 100, [1; 32], 0, 0));
        wallet.add_transfer(Transfer::new(account(3), account(1), 200, [2; 32], 0, 0));
        wallet.add_transfer(Transfer::new(account(1), account(4), 300, [3; 32], 0, 0));
        assert_eq!(wallet.sequence(), 2);
    }
}
