// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;

pub struct StoreKeys;

impl StoreKeys {
    pub fn board() -> String {
        String::from("//board")
    }

    /// Capability cache entries are keyed by the lower-cased account so a
    /// checksummed and a lower-case rendering of the same account share one
    /// slot.
    pub fn capability(account: &Address) -> String {
        format!("//capability/{:#x}", account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capability_keys_are_lower_cased() {
        let account = Address::repeat_byte(0xAB);
        let key = StoreKeys::capability(&account);
        assert_eq!(key, key.to_lowercase());
        assert!(key.starts_with("//capability/0x"));
    }
}
