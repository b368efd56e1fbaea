// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use alloy_primitives::Address;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failure taxonomy for the aggregation core.
///
/// Callers branch on the variant to decide between re-authorizing, retrying
/// later, or aborting, never on message text. Authorization failures
/// (`Unauthorized`, `UserRejected`) are distinct from transient transport
/// failures (`ProviderUnavailable`, `SignerUnavailable`) so a caller can
/// render "authorize first" versus "try again later".
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Error)]
pub enum AgoraError {
    /// The category id does not exist in the registry. Raised locally before
    /// any provider call.
    #[error("category {category} is out of range ({count} categories exist)")]
    InvalidCategory { category: u8, count: u8 },

    /// Raw score outside the bounds the input proof attests to.
    #[error("score {value} is outside the accepted range")]
    ScoreOutOfRange { value: u64 },

    /// The provider rejected the (handle, proof, submitter, contract)
    /// binding, or the proof was already consumed.
    #[error("input proof rejected for {submitter} on {contract}")]
    InvalidProof { submitter: Address, contract: Address },

    /// The capability signature does not cover the contract, or the account
    /// holds no ACL entry for the requested aggregate. Retrying unchanged
    /// will fail again; the caller should prompt for (re-)authorization.
    #[error("{account} is not authorized to decrypt on {contract}")]
    Unauthorized { account: Address, contract: Address },

    /// Transport or timeout failure talking to the confidential-compute
    /// provider. Safe to retry with backoff; the core never retries itself.
    #[error("confidential-compute provider unavailable: {reason}")]
    ProviderUnavailable { reason: String },

    /// The external signer could not be reached.
    #[error("signer unavailable: {reason}")]
    SignerUnavailable { reason: String },

    /// The user declined the signature request. Terminal for this attempt.
    #[error("signature request rejected by user")]
    UserRejected,

    /// Local persistence fault.
    #[error("data store failure: {reason}")]
    Data { reason: String },
}

impl AgoraError {
    pub fn provider_unavailable(reason: impl Into<String>) -> Self {
        AgoraError::ProviderUnavailable {
            reason: reason.into(),
        }
    }

    pub fn data(reason: impl Into<String>) -> Self {
        AgoraError::Data {
            reason: reason.into(),
        }
    }

    /// True for failures worth retrying after a delay; false for failures
    /// that need a changed request or a fresh authorization.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            AgoraError::ProviderUnavailable { .. } | AgoraError::SignerUnavailable { .. }
        )
    }
}
