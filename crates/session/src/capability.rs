// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use agora_events::{AgoraError, OrderedSet};
use agora_provider::{Capability, ComputeProvider, Keypair, Signature};
use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use zeroize::Zeroize;

/// The persisted form of one account's decryption credential: ephemeral key
/// pair, wallet signature and the signed validity window. Overwritten
/// wholesale on renewal, never merged.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecryptionCapability {
    pub public_key: String,
    pub private_key: String,
    pub signature: Signature,
    /// Unix seconds at issuance. The window is fixed from here, not sliding.
    pub issued_at: i64,
    pub duration_seconds: u64,
    pub contracts: OrderedSet<Address>,
}

impl DecryptionCapability {
    pub fn expires_at(&self) -> i64 {
        self.issued_at + self.duration_seconds as i64
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.expires_at()
    }

    /// A capability is reusable only when it is unexpired and its signed
    /// contract scope equals the requested scope, order-independent. Anything
    /// else forces a renewal; the scope is never silently widened.
    pub fn is_valid_for(&self, contracts: &OrderedSet<Address>, now: DateTime<Utc>) -> bool {
        !self.is_expired(now) && &self.contracts == contracts
    }

    /// Rebuild the provider-side capability object from the stored parts.
    pub async fn to_capability(
        &self,
        provider: &dyn ComputeProvider,
    ) -> Result<Capability, AgoraError> {
        let keypair = Keypair {
            public_key: self.public_key.clone(),
            private_key: self.private_key.clone(),
        };
        provider
            .issue_capability(
                &keypair,
                &self.contracts,
                self.issued_at,
                self.duration_seconds,
                &self.signature,
            )
            .await
    }
}

impl Drop for DecryptionCapability {
    fn drop(&mut self) {
        self.private_key.zeroize();
    }
}

/// The ephemeral private key stays out of log output.
impl std::fmt::Debug for DecryptionCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptionCapability")
            .field("public_key", &self.public_key)
            .field("issued_at", &self.issued_at)
            .field("duration_seconds", &self.duration_seconds)
            .field("contracts", &self.contracts)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn capability(issued_at: i64, duration_seconds: u64, contracts: Vec<Address>) -> DecryptionCapability {
        DecryptionCapability {
            public_key: "apk_test".into(),
            private_key: "ask_test".into(),
            signature: Signature(vec![1, 2, 3]),
            issued_at,
            duration_seconds,
            contracts: OrderedSet::from(contracts),
        }
    }

    fn at(ts: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(ts, 0).unwrap()
    }

    #[test]
    fn expires_exactly_at_the_window_edge() {
        let cap = capability(1_000, 100, vec![Address::repeat_byte(1)]);
        assert!(!cap.is_expired(at(1_099)));
        assert!(cap.is_expired(at(1_100)));
    }

    #[test]
    fn reuse_requires_set_equal_scope() {
        let a = Address::repeat_byte(1);
        let b = Address::repeat_byte(2);
        let cap = capability(0, 1_000, vec![a, b]);

        // order-independent equality
        assert!(cap.is_valid_for(&OrderedSet::from(vec![b, a]), at(10)));
        // narrower or wider scopes force renewal
        assert!(!cap.is_valid_for(&OrderedSet::from(vec![a]), at(10)));
        assert!(!cap.is_valid_for(&OrderedSet::from(vec![a, b, Address::repeat_byte(3)]), at(10)));
    }

    #[test]
    fn expired_capability_is_never_reused() {
        let a = Address::repeat_byte(1);
        let cap = capability(0, 10, vec![a]);
        assert!(!cap.is_valid_for(&OrderedSet::from(vec![a]), at(10)));
    }
}
