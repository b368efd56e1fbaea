// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use agora_events::AgoraError;
use alloy_primitives::Address;
use async_trait::async_trait;

use crate::{AuthorizationPayload, Signature, WalletSigner};

use super::MockSignature;

/// Scripted behavior for the mock wallet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignerMode {
    Approve,
    Reject,
    Unavailable,
}

/// In-process wallet signer. Counts signature requests so tests can assert
/// that a cached capability was reused rather than re-signed.
pub struct MockWalletSigner {
    mode: Mutex<SignerMode>,
    requests: AtomicUsize,
}

impl MockWalletSigner {
    pub fn new(mode: SignerMode) -> Self {
        Self {
            mode: Mutex::new(mode),
            requests: AtomicUsize::new(0),
        }
    }

    pub fn approving() -> Self {
        Self::new(SignerMode::Approve)
    }

    pub fn rejecting() -> Self {
        Self::new(SignerMode::Reject)
    }

    pub fn unavailable() -> Self {
        Self::new(SignerMode::Unavailable)
    }

    pub fn set_mode(&self, mode: SignerMode) {
        if let Ok(mut guard) = self.mode.lock() {
            *guard = mode;
        }
    }

    /// Number of times a signature has been requested, including rejected and
    /// failed attempts.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WalletSigner for MockWalletSigner {
    async fn sign(
        &self,
        account: Address,
        payload: &AuthorizationPayload,
    ) -> Result<Signature, AgoraError> {
        self.requests.fetch_add(1, Ordering::SeqCst);

        let mode = *self
            .mode
            .lock()
            .map_err(|_| AgoraError::SignerUnavailable {
                reason: "signer state poisoned".into(),
            })?;

        match mode {
            SignerMode::Reject => Err(AgoraError::UserRejected),
            SignerMode::Unavailable => Err(AgoraError::SignerUnavailable {
                reason: "wallet transport closed".into(),
            }),
            SignerMode::Approve => {
                let sig = MockSignature {
                    account,
                    digest: payload.digest()?,
                };
                let bytes = bincode::serialize(&sig)
                    .map_err(|e| AgoraError::data(e.to_string()))?;
                Ok(Signature(bytes))
            }
        }
    }
}
