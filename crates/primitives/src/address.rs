//! EIP-55 address checksum validation.

use sha3::{Digest, Keccak256};

/// Returns `true` if `address` is a `0x`-prefixed, EIP-55 checksummed
/// Ethereum address.
///
/// The check is strict: an address written entirely in lower- or upper-case
/// hex does not pass, matching the behavior of `web3.utils
/// .checkAddressChecksum`.
pub fn is_checksum_address(address: &str) -> bool {
    let Some(body) = address.strip_prefix("0x") else {
        return false;
    };
    if body.len() != 40 || !body.bytes().all(|b| b.is_ascii_hexdigit()) {
        return false;
    }

    let hash = Keccak256::digest(body.to_ascii_lowercase().as_bytes());
    let nibbles = hex::encode(hash);

    body.bytes().zip(nibbles.bytes()).all(|(ch, nibble)| {
        if ch.is_ascii_digit() {
            return true;
        }
        // Letters are upper-cased exactly when the corresponding hash nibble
        // is >= 8. `hex::encode` yields lowercase digits, so `8..=9` and
        // `a..=f` compare greater than `7`.
        let expect_upper = nibble > b'7';
        if expect_upper {
            ch.is_ascii_uppercase()
        } else {
            ch.is_ascii_lowercase()
        }
    })
}
