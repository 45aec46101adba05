//! scrypt key stretching, used only by the (unsupported) BIP-38
//! encrypted-private-key format. Kept as a primitive in this crate
//! because `vault_keys::bip38` references it even though it never
//! reaches a working code path yet — see `SPEC_FULL.md` §C.

use crate::error::Error;

pub fn scrypt(password: &[u8], salt: &[u8], log2_n: u8, r: u32, p: u32, out_len: usize) -> Result<Vec<u8>, Error> {
    let params =
        scrypt::Params::new(log2_n, r, p, out_len).map_err(|_| Error::InvalidScryptParams)?;
    let mut out = vec![0u8; out_len];
    scrypt::scrypt(password, salt, &params, &mut out).map_err(|_| Error::InvalidScryptParams)?;
    Ok(out)
}
