//! The receive/change address chain and its gap-limit expansion logic
//! (spec.md §3/§4.5.1). Addresses are appended, never removed or
//! reordered.

use vault_keys::{pubkey_derive, ChainParams, MasterPubKey};

use crate::address::address_from_script_pubkey;
use crate::error::Error;

/// An ordered, append-only sequence of derived addresses for one side
/// (external/receive or internal/change) of the wallet.
#[derive(Debug, Clone, Default)]
pub struct AddressChain {
    pub addresses: Vec<String>,
}

impl AddressChain {
    pub fn new() -> Self {
        AddressChain {
            addresses: Vec::new(),
        }
    }

    /// Index of the first address past the trailing run of unused ones,
    /// i.e. the count of addresses that are definitely used plus however
    /// many of the trailing unused ones are *not* part of the gap.
    fn trailing_unused_len(&self, used: &std::collections::HashSet<String>) -> usize {
        self.addresses
            .iter()
            .rev()
            .take_while(|a| !used.contains(*a))
            .count()
    }

    /// Ensures the chain's trailing run of unused addresses is at least
    /// `gap_limit`, deriving and appending new ones as needed. Returns the
    /// addresses that make up that trailing run (spec.md §4.5.1).
    pub fn unused_addresses(
        &mut self,
        gap_limit: usize,
        internal: bool,
        mpk: &MasterPubKey,
        params: ChainParams,
        used: &std::collections::HashSet<String>,
    ) -> Result<Vec<String>, Error> {
        while self.trailing_unused_len(used) < gap_limit {
            let index = self.addresses.len() as u32;
            let pubkey = pubkey_derive(mpk, internal, index)?;
            let hash20 = vault_keys::address_hash(&pubkey, true);
            let mut script = vec![0x76, 0xa9, 0x14];
            script.extend_from_slice(hash20.as_bytes());
            script.extend_from_slice(&[0x88, 0xac]);
            let address = address_from_script_pubkey(&script, params)
                .expect("a freshly built P2PKH template always recognizes back to an address");
            self.addresses.push(address);
        }

        let run = self.trailing_unused_len(used);
        let start = self.addresses.len() - run;
        Ok(self.addresses[start..].to_vec())
    }

    /// The next address that has never appeared in a registered
    /// transaction: the first element of the chain's trailing unused run.
    pub fn next_unused(&self, used: &std::collections::HashSet<String>) -> Option<&str> {
        let run = self.trailing_unused_len(used);
        if run == 0 {
            return None;
        }
        self.addresses.get(self.addresses.len() - run).map(|s| s.as_str())
    }

    pub fn index_of(&self, address: &str) -> Option<u32> {
        self.addresses.iter().position(|a| a == address).map(|i| i as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use vault_keys::mpk_from_seed;

    fn test_mpk() -> MasterPubKey {
        mpk_from_seed(&[0x44u8; 32]).unwrap()
    }

    #[test]
    fn fresh_chain_expands_to_exactly_the_gap_limit() {
        let mut chain = AddressChain::new();
        let used = HashSet::new();
        let unused = chain
            .unused_addresses(10, false, &test_mpk(), ChainParams::mainnet(), &used)
            .unwrap();
        assert_eq!(unused.len(), 10);
        assert_eq!(chain.addresses.len(), 10);
    }

    #[test]
    fn marking_the_first_address_used_grows_the_chain_by_one() {
        let mut chain = AddressChain::new();
        let mut used = HashSet::new();
        chain
            .unused_addresses(5, false, &test_mpk(), ChainParams::mainnet(), &used)
            .unwrap();
        let first = chain.addresses[0].clone();
        used.insert(first);

        chain
            .unused_addresses(5, false, &test_mpk(), ChainParams::mainnet(), &used)
            .unwrap();
        assert_eq!(chain.addresses.len(), 6);
    }

    #[test]
    fn addresses_are_never_removed_or_reordered() {
        let mut chain = AddressChain::new();
        let used = HashSet::new();
        chain
            .unused_addresses(3, false, &test_mpk(), ChainParams::mainnet(), &used)
            .unwrap();
        let snapshot = chain.addresses.clone();
        chain
            .unused_addresses(3, false, &test_mpk(), ChainParams::mainnet(), &used)
            .unwrap();
        assert_eq!(&chain.addresses[..snapshot.len()], &snapshot[..]);
    }

    #[test]
    fn next_unused_is_the_first_address_for_a_fresh_chain() {
        let mut chain = AddressChain::new();
        let used = HashSet::new();
        chain
            .unused_addresses(10, false, &test_mpk(), ChainParams::mainnet(), &used)
            .unwrap();
        assert_eq!(chain.next_unused(&used), Some(chain.addresses[0].as_str()));
    }
}
