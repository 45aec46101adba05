#![cfg_attr(not(test), deny(clippy::unwrap_used))]

//! The XRP chain module: account derivation at `m/44'/144'/0'/0/index`,
//! the Ripple canonical binary field codec, Payment transaction
//! construction/signing/serialization, and a single-account transfer
//! ledger (spec.md §4.7-§4.9).
//!
//! Depends on `vault_common` for hashing and `vault_keys` for the shared
//! BIP-32/BIP-39 primitives; holds no networking or persistence logic of
//! its own, matching `vault_btc`'s scope split for the UTXO chains.

pub mod account;
pub mod address;
pub mod base58;
mod error;
pub mod field;
pub mod transaction;
pub mod wallet;

pub use error::Error;
