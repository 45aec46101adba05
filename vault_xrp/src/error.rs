#[allow(missing_docs)]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Common(#[from] vault_common::Error),

    #[error(transparent)]
    Keys(#[from] vault_keys::Error),

    #[error("address string base58check-decodes to the wrong length or checksum")]
    InvalidAddress,

    #[error("field codec encountered a type/field combination it does not know how to decode")]
    BadField,
}
