#![cfg_attr(not(test), deny(clippy::unwrap_used))]

//! The UTXO wallet core: Bitcoin-family script/address recognition, the
//! transaction model and its signing-subscript serialization, fee
//! estimation and coin selection, and the wallet engine that ties
//! address-chain expansion, balance recomputation, and signing together
//! (spec.md §4.2-§4.6).
//!
//! Depends on `vault_common` for hashing/Base58/varint and `vault_keys`
//! for key derivation and signing; holds no networking or persistence
//! logic of its own (spec.md §1's non-goals).

pub mod address;
mod error;
pub mod fee;
mod model;
pub mod script;
pub mod transaction;
pub mod wallet;

pub use error::Error;
pub use model::{CheckpointHeader, OutPoint};
