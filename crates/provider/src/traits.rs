// SPDX-License-Identifier: LGPL-3.0-only
//
// This file is provided WITHOUT ANY WARRANTY;
// without even the implied warranty of MERCHANTABILITY
// or FITNESS FOR A PARTICULAR PURPOSE.

use std::collections::HashMap;

use agora_events::{AgoraError, CiphertextHandle, OrderedSet};
use alloy_primitives::Address;
use async_trait::async_trait;

use crate::{AuthorizationPayload, Capability, EncryptedScore, InputProof, Keypair, Signature};

/// The confidential-compute provider. Every call crosses a trust boundary and
/// may take arbitrarily long; all are cancellable by dropping the future.
///
/// The provider owns the ciphertext namespace: handles are only meaningful to
/// it, and it enforces the replay protection on input proofs, rejecting a
/// consumed proof on re-presentation. The aggregation core relies on that
/// guarantee and does not keep its own nonce set.
#[async_trait]
pub trait ComputeProvider: Send + Sync {
    /// Encrypt a clear value client-side, producing a handle and the input
    /// proof binding it to the (contract, account) pair.
    async fn encrypt_input(
        &self,
        contract: Address,
        account: Address,
        value: u64,
    ) -> Result<EncryptedScore, AgoraError>;

    /// Check that the proof attests `handle` for this submitter/contract
    /// pair, and consume it.
    async fn verify_and_bind_proof(
        &self,
        handle: CiphertextHandle,
        proof: &InputProof,
        submitter: Address,
        contract: Address,
    ) -> Result<(), AgoraError>;

    /// Encrypt a public constant. Used for aggregate initialization and the
    /// count increment.
    async fn trivial_encrypt(&self, value: u64) -> Result<CiphertextHandle, AgoraError>;

    /// Sum two ciphertexts without decrypting either; returns a fresh handle.
    async fn homomorphic_add(
        &self,
        a: CiphertextHandle,
        b: CiphertextHandle,
    ) -> Result<CiphertextHandle, AgoraError>;

    /// Record provider-side permission for `account` to decrypt `handle`.
    async fn allow(&self, handle: CiphertextHandle, account: Address) -> Result<(), AgoraError>;

    /// Generate an ephemeral key pair for a decryption session.
    async fn generate_keypair(&self) -> Result<Keypair, AgoraError>;

    /// Turn a signed authorization into a capability. The key pair travels
    /// with the capability so the decryption response can be unwrapped.
    async fn issue_capability(
        &self,
        keypair: &Keypair,
        contracts: &OrderedSet<Address>,
        issued_at: i64,
        duration_seconds: u64,
        signature: &Signature,
    ) -> Result<Capability, AgoraError>;

    /// One decryption round trip for a batch of handles. Fails with
    /// `Unauthorized` when the capability does not cover a request's contract
    /// or the account holds no permission for a handle.
    async fn batch_decrypt(
        &self,
        capability: &Capability,
        requests: &[(CiphertextHandle, Address)],
    ) -> Result<HashMap<CiphertextHandle, u64>, AgoraError>;
}

/// External wallet signer. Produces the signature over an authorization
/// payload, or fails with `UserRejected` / `SignerUnavailable`.
#[async_trait]
pub trait WalletSigner: Send + Sync {
    async fn sign(
        &self,
        account: Address,
        payload: &AuthorizationPayload,
    ) -> Result<Signature, AgoraError>;
}
