/// Errors surfaced by key import, BIP-32 derivation and mnemonic handling.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Common(#[from] vault_common::Error),

    #[error("private key scalar is out of range")]
    InvalidKey,

    #[error("WIF/mini-key/hex private key string is malformed")]
    InvalidPrivateKeyFormat,

    #[error("mnemonic phrase is malformed or fails its checksum")]
    InvalidMnemonic,

    #[error("entropy length is not a supported multiple of 4 bytes")]
    InvalidEntropyLength,

    #[error("BIP-32 derivation index {0} produced an invalid child key; caller should retry with index+1")]
    InvalidChildIndex(u32),

    #[error("this function is declared but not implemented, matching the source's placeholder surface")]
    Unsupported,
}
