// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque reference naming one ciphertext held by the confidential-compute
/// provider.
///
/// Handles are never decoded locally; they are only handed back to the
/// provider for arithmetic or decryption. Two handles are equal iff they name
/// the same ciphertext. The all-zero handle is the never-written placeholder
/// and resolves to the clear value zero without a provider round trip.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CiphertextHandle(pub [u8; 32]);

impl CiphertextHandle {
    pub const ZERO: CiphertextHandle = CiphertextHandle([0u8; 32]);

    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Display for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ct:0x{}", hex::encode(&self.0[..8]))
    }
}

impl fmt::Debug for CiphertextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CiphertextHandle({})", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_handle_is_placeholder() {
        assert!(CiphertextHandle::ZERO.is_zero());
        assert!(!CiphertextHandle([1u8; 32]).is_zero());
    }

    #[test]
    fn equality_is_by_name() {
        let a = CiphertextHandle([7u8; 32]);
        let b = CiphertextHandle([7u8; 32]);
        let c = CiphertextHandle([8u8; 32]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
