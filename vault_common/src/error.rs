/// Errors shared by every codec and primitive in this crate.
///
/// Downstream crates wrap this with `#[error(transparent)]` rather than
/// flattening it, so a caller can always match on the original kind.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid base58 character at position {0}")]
    InvalidBase58Char(usize),

    #[error("base58check payload shorter than the 4-byte checksum")]
    InvalidBase58Length,

    #[error("base58check checksum mismatch")]
    InvalidChecksum,

    #[error("hex string has odd length or non-hex characters")]
    InvalidHex,

    #[error("varint encoding did not fit the expected width")]
    InvalidVarInt,

    #[error("scrypt parameters are invalid")]
    InvalidScryptParams,

    #[error("value is not a valid secp256k1 scalar")]
    InvalidScalar,

    #[error("value is not a valid secp256k1 public key")]
    InvalidPublicKey,

    #[error("signature is invalid or does not recover")]
    InvalidSignature,
}
