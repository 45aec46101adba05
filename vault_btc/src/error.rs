#[allow(missing_docs)]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Common(#[from] vault_common::Error),

    #[error(transparent)]
    Keys(#[from] vault_keys::Error),

    #[error("script did not parse to exactly the end of its byte stream")]
    InvalidScript,

    #[error("address string base58check-decodes but its version byte matches no known address type")]
    UnknownAddressType,

    #[error("coin selection could not cover amount + fee from the available UTXO set")]
    InsufficientFunds,

    #[error("seed supplier declined to produce a signing key")]
    SignerRefused,

    #[error("no wallet-owned key matches any input's scriptPubKey")]
    NotAuthorized,

    #[error("transaction references no address known to this wallet")]
    InvalidTransaction,

    #[error("transaction with this hash is already registered")]
    Duplicate,
}
