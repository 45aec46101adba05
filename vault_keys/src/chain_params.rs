//! Runtime chain parameters, replacing the source's build-time testnet flag
//! (spec.md §9's open question: "Testnet version bytes switch via a build
//! flag in the source; here we model that as a runtime chain-params
//! parameter.").

/// Base58Check version bytes and BIP-32 extended-key prefixes for one
/// network. Copy, not a global: callers pick mainnet or testnet per wallet
/// instance rather than compiling two binaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainParams {
    pub pubkey_address: u8,
    pub script_address: u8,
    pub privkey_wif: u8,
    pub xprv_prefix: [u8; 4],
    pub xpub_prefix: [u8; 4],
}

impl ChainParams {
    pub const fn mainnet() -> Self {
        ChainParams {
            pubkey_address: 0x00,
            script_address: 0x05,
            privkey_wif: 0x80,
            xprv_prefix: [0x04, 0x88, 0xAD, 0xE4],
            xpub_prefix: [0x04, 0x88, 0xB2, 0x1E],
        }
    }

    pub const fn testnet() -> Self {
        ChainParams {
            pubkey_address: 0x6F,
            script_address: 0xC4,
            privkey_wif: 0xEF,
            xprv_prefix: [0x04, 0x35, 0x83, 0x94],
            xpub_prefix: [0x04, 0x35, 0x87, 0xCF],
        }
    }
}

impl Default for ChainParams {
    fn default() -> Self {
        Self::mainnet()
    }
}
