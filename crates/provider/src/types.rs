// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use agora_events::{AgoraError, CiphertextHandle, OrderedSet};
use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque byte blob attesting that a handle encrypts a range-bound value the
/// submitter may present for one (contract, account) pair. Single-use: the
/// provider rejects a proof it has already consumed.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputProof(pub Vec<u8>);

impl fmt::Debug for InputProof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InputProof({} bytes)", self.0.len())
    }
}

/// A freshly encrypted rating: the ciphertext handle plus its input proof.
/// Created client-side, consumed exactly once by the submission path, never
/// stored after validation.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EncryptedScore {
    pub handle: CiphertextHandle,
    pub proof: InputProof,
}

/// Ephemeral key pair generated by the provider for one decryption session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keypair {
    pub public_key: String,
    pub private_key: String,
}

/// Signature produced by the external wallet signer over an
/// [`AuthorizationPayload`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Signature(pub Vec<u8>);

/// Structured payload the wallet signs to authorize a decryption session.
/// Binds the ephemeral public key to the contract scope and validity window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationPayload {
    pub public_key: String,
    pub contracts: Vec<Address>,
    pub issued_at: i64,
    pub duration_seconds: u64,
}

impl AuthorizationPayload {
    pub fn new(
        public_key: impl Into<String>,
        contracts: &OrderedSet<Address>,
        issued_at: i64,
        duration_seconds: u64,
    ) -> Self {
        Self {
            public_key: public_key.into(),
            contracts: contracts.iter().copied().collect(),
            issued_at,
            duration_seconds,
        }
    }

    pub fn to_signing_bytes(&self) -> Result<Vec<u8>, AgoraError> {
        serde_json::to_vec(self).map_err(|e| AgoraError::data(e.to_string()))
    }

    pub fn digest(&self) -> Result<[u8; 32], AgoraError> {
        let mut hasher = Sha256::new();
        hasher.update(self.to_signing_bytes()?);
        Ok(hasher.finalize().into())
    }
}

/// Capability returned by the provider once a signed authorization has been
/// accepted. Opaque to every other component: it is only ever handed back to
/// [`crate::ComputeProvider::batch_decrypt`].
#[derive(Clone)]
pub struct Capability {
    pub(crate) account: Address,
    pub(crate) public_key: String,
    pub(crate) private_key: String,
    pub(crate) contracts: OrderedSet<Address>,
    pub(crate) issued_at: i64,
    pub(crate) duration_seconds: u64,
}

impl Capability {
    /// Account the capability was issued to.
    pub fn account(&self) -> Address {
        self.account
    }

    /// True when the capability's signed scope covers the given contract.
    pub fn covers(&self, contract: Address) -> bool {
        self.contracts.contains(&contract)
    }
}

/// The ephemeral private key stays out of log output.
impl fmt::Debug for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Capability")
            .field("account", &self.account)
            .field("public_key", &self.public_key)
            .field("contracts", &self.contracts)
            .field("issued_at", &self.issued_at)
            .field("duration_seconds", &self.duration_seconds)
            .finish_non_exhaustive()
    }
}
